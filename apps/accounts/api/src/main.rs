use axum::Router;
use axum_helpers::{create_app, create_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_accounts::{
    CredentialService, EventBus, InMemoryUserRepository, LogResetNotifier, SessionTokenIssuer,
    handlers, listeners,
};
use std::sync::Arc;
use tracing::info;

mod config;

use config::Config;

/// Wire the domain together and mount it under the configured prefix.
fn build_app(config: &Config) -> Router {
    let events = EventBus::new();
    listeners::register_default_listeners(&events);

    let service = CredentialService::new(
        InMemoryUserRepository::new(),
        SessionTokenIssuer::new(&config.session),
        events,
        Arc::new(LogResetNotifier),
    );

    create_router::<handlers::ApiDoc>(handlers::router(service), &config.api_prefix)
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    info!(
        environment = ?config.environment,
        api_prefix = %config.api_prefix,
        session_ttl_seconds = config.session.ttl.num_seconds(),
        "Starting accounts API"
    );

    let app = build_app(&config);

    create_app(app, &config.server)
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Accounts API shutdown complete");
    Ok(())
}
