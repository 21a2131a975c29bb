//! Side effects of account events, registered once at startup.

use tracing::info;

use crate::events::{Event, EventBus, EventName};

/// Register the standard `user.created` listeners: welcome mail first,
/// then the audit record.
pub fn register_default_listeners(bus: &EventBus) {
    bus.register(EventName::UserCreated, send_welcome_email);
    bus.register(EventName::UserCreated, audit_user_creation);
}

fn send_welcome_email(event: &Event) -> eyre::Result<()> {
    match event {
        Event::UserCreated(user) => {
            info!(
                user_id = user.user_id,
                email = %user.email,
                "Sending welcome email to {}",
                user.display_name()
            );
        }
    }
    Ok(())
}

fn audit_user_creation(event: &Event) -> eyre::Result<()> {
    match event {
        Event::UserCreated(user) => {
            info!(
                target: "audit",
                event = %event.name(),
                user_id = user.user_id,
                "Logging user creation for {}",
                user.display_name()
            );
        }
    }
    Ok(())
}
