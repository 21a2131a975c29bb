//! Synchronous in-process publish/subscribe.
//!
//! Listeners are registered per [`EventName`] and invoked on the
//! publisher's task, in registration order, before [`EventBus::dispatch`]
//! returns. A listener that errors or panics is logged and skipped; the
//! remaining listeners still run and the publisher never sees the failure.

use serde::Serialize;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use strum::{AsRefStr, Display, EnumString};
use tracing::{error, trace, warn};

use crate::models::{User, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum EventName {
    #[strum(serialize = "user.created")]
    UserCreated,
}

/// Payload of `user.created`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserCreated {
    pub user_id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl UserCreated {
    /// "<first> <last>"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl From<&User> for UserCreated {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "name", content = "payload")]
pub enum Event {
    #[serde(rename = "user.created")]
    UserCreated(UserCreated),
}

impl Event {
    pub fn name(&self) -> EventName {
        match self {
            Event::UserCreated(_) => EventName::UserCreated,
        }
    }
}

pub type Listener = Arc<dyn Fn(&Event) -> eyre::Result<()> + Send + Sync>;

#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Arc<Mutex<HashMap<EventName, Vec<Listener>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener for `name`. No deduplication.
    pub fn register<F>(&self, name: EventName, listener: F)
    where
        F: Fn(&Event) -> eyre::Result<()> + Send + Sync + 'static,
    {
        self.register_shared(name, Arc::new(listener));
    }

    /// Append an already-shared listener. Registering the same `Arc`
    /// twice means it runs twice per dispatch.
    pub fn register_shared(&self, name: EventName, listener: Listener) {
        self.lock().entry(name).or_default().push(listener);
    }

    pub fn listener_count(&self, name: EventName) -> usize {
        self.lock().get(&name).map_or(0, Vec::len)
    }

    /// Invoke every listener registered for `event.name()`, in order.
    ///
    /// The list is snapshotted under the lock and invoked after releasing
    /// it, so a listener may itself register without deadlocking.
    /// Registrations made during a dispatch apply from the next one.
    pub fn dispatch(&self, event: &Event) {
        let name = event.name();
        let listeners: Vec<Listener> = match self.lock().get(&name) {
            Some(listeners) => listeners.clone(),
            None => return,
        };

        for (index, listener) in listeners.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(Ok(())) => trace!(event = %name, index, "Listener completed"),
                Ok(Err(e)) => warn!(event = %name, index, error = ?e, "Listener failed"),
                Err(panic) => error!(
                    event = %name,
                    index,
                    panic = panic_message(panic.as_ref()),
                    "Listener panicked"
                ),
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<EventName, Vec<Listener>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<EventName, usize> = self
            .lock()
            .iter()
            .map(|(name, listeners)| (*name, listeners.len()))
            .collect();
        f.debug_struct("EventBus").field("listeners", &counts).finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
