//! Delivery of password-reset tokens to the account holder.

use async_trait::async_trait;
use eyre::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

#[async_trait]
pub trait ResetNotifier: Send + Sync {
    /// Deliver `token` to every address in `recipients`.
    async fn send(&self, recipients: &[String], token: &str) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Writes deliveries to the log. The development delivery channel: the
/// token itself only appears at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogResetNotifier;

#[async_trait]
impl ResetNotifier for LogResetNotifier {
    async fn send(&self, recipients: &[String], token: &str) -> Result<()> {
        tracing::info!(?recipients, "Reset password link sent");
        tracing::debug!(?recipients, token, "Reset token issued");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// A single captured delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetDelivery {
    pub recipients: Vec<String>,
    pub token: String,
}

/// Notifier that captures deliveries for assertions
#[derive(Debug, Clone, Default)]
pub struct MockResetNotifier {
    sent: Arc<Mutex<Vec<ResetDelivery>>>,
    failure_message: Option<String>,
}

impl MockResetNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every send fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failure_message: Some(message.into()),
        }
    }

    pub async fn deliveries(&self) -> Vec<ResetDelivery> {
        self.sent.lock().await.clone()
    }

    /// Token from the most recent delivery addressed to `email`
    pub async fn last_token_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|d| d.recipients.iter().any(|r| r == email))
            .map(|d| d.token.clone())
    }
}

#[async_trait]
impl ResetNotifier for MockResetNotifier {
    async fn send(&self, recipients: &[String], token: &str) -> Result<()> {
        if let Some(message) = &self.failure_message {
            return Err(eyre::eyre!(message.clone()));
        }

        self.sent.lock().await.push(ResetDelivery {
            recipients: recipients.to_vec(),
            token: token.to_string(),
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
