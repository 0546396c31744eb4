//! Notifier interface and recording implementation

use async_trait::async_trait;
use std::sync::Mutex;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Outbound notification delivery
///
/// Implemented by the surrounding application's email and in-app
/// notification pipelines. Failures here are non-fatal: the executor
/// records them and moves on.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send an email
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> StoreResult<()>;

    /// Send an in-app notification to a user
    async fn send_in_app(&self, user_id: &str, message: &str) -> StoreResult<()>;
}

/// A notification captured by [`MemoryNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentNotification {
    Email {
        to: String,
        subject: String,
        body: String,
    },
    InApp {
        user_id: String,
        message: String,
    },
}

/// In-memory notifier that records everything it is asked to send
#[derive(Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<SentNotification>>,
}

impl MemoryNotifier {
    /// Create an empty notifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, in order
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> StoreResult<()> {
        debug!(to, subject, "Recording email");
        self.sent
            .lock()
            .map_err(|_| StoreError::Backend("notifier lock poisoned".to_string()))?
            .push(SentNotification::Email {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        Ok(())
    }

    async fn send_in_app(&self, user_id: &str, message: &str) -> StoreResult<()> {
        debug!(user_id, "Recording in-app notification");
        self.sent
            .lock()
            .map_err(|_| StoreError::Backend("notifier lock poisoned".to_string()))?
            .push(SentNotification::InApp {
                user_id: user_id.to_string(),
                message: message.to_string(),
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notifier_records_in_order() {
        let notifier = MemoryNotifier::new();
        notifier
            .send_email("a@example.com", "Hi", "Body")
            .await
            .unwrap();
        notifier.send_in_app("U1", "Ping").await.unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(matches!(sent[0], SentNotification::Email { ref to, .. } if to == "a@example.com"));
        assert!(matches!(sent[1], SentNotification::InApp { ref user_id, .. } if user_id == "U1"));
    }
}
