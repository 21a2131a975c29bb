use crate::Environment;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Install color-eyre with file:line locations and without the env section.
///
/// Call early in `main()`. Safe to call more than once.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(environment: &Environment) -> &'static str {
    match environment {
        Environment::Production => "info,tower_http=info",
        Environment::Development => "debug,tower_http=debug",
    }
}

/// Initialize tracing for the given environment.
///
/// Production writes flattened JSON lines without targets; development
/// writes pretty multi-line events. Both carry `tracing_error::ErrorLayer`
/// so eyre reports include span traces. Calling this again after a
/// subscriber is installed is a no-op.
pub fn init_tracing(environment: &Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(environment)));

    let output: Box<dyn Layer<Registry> + Send + Sync> = match environment {
        Environment::Production => fmt::layer()
            .json()
            .with_target(false)
            .flatten_event(true)
            .boxed(),
        Environment::Development => fmt::layer().with_target(true).pretty().boxed(),
    };

    let result = tracing_subscriber::registry()
        .with(output)
        .with(tracing_error::ErrorLayer::default())
        .with(filter)
        .try_init();

    match result {
        Ok(()) => info!(%environment, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized, skipping re-initialization"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_per_environment() {
        assert!(default_filter(&Environment::Production).starts_with("info"));
        assert!(default_filter(&Environment::Development).starts_with("debug"));
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        temp_env::with_var("RUST_LOG", Some("warn"), || {
            init_tracing(&Environment::Production);
            init_tracing(&Environment::Development);
        });
    }
}
