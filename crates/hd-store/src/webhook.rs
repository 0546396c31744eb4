//! Webhook client interface, HTTP implementation, and recording fake

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

/// Outbound webhook delivery
///
/// Every call is timeout-bounded by the caller: one slow endpoint must not
/// stall a dispatch pass.
#[async_trait]
pub trait WebhookClient: Send + Sync {
    /// POST a JSON payload to an external URL
    async fn post(&self, url: &str, payload: &Value, timeout: Duration) -> StoreResult<()>;
}

/// reqwest-backed webhook client
pub struct HttpWebhookClient {
    client: reqwest::Client,
}

impl HttpWebhookClient {
    /// Create a client with default settings
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpWebhookClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebhookClient for HttpWebhookClient {
    async fn post(&self, url: &str, payload: &Value, timeout: Duration) -> StoreResult<()> {
        debug!(url, ?timeout, "Posting webhook");

        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                warn!(url, error = %e, "Webhook request failed");
                StoreError::Webhook(e.to_string())
            })?;

        response.error_for_status().map_err(|e| {
            warn!(url, error = %e, "Webhook endpoint returned an error status");
            StoreError::Webhook(e.to_string())
        })?;

        Ok(())
    }
}

/// In-memory webhook client that records every post
#[derive(Default)]
pub struct MemoryWebhookClient {
    posts: Mutex<Vec<(String, Value)>>,
}

impl MemoryWebhookClient {
    /// Create an empty client
    pub fn new() -> Self {
        Self::default()
    }

    /// All posted (url, payload) pairs, in order
    pub fn posts(&self) -> Vec<(String, Value)> {
        self.posts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WebhookClient for MemoryWebhookClient {
    async fn post(&self, url: &str, payload: &Value, _timeout: Duration) -> StoreResult<()> {
        debug!(url, "Recording webhook post");
        self.posts
            .lock()
            .map_err(|_| StoreError::Backend("webhook recorder lock poisoned".to_string()))?
            .push((url.to_string(), payload.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_client_records_posts() {
        let client = MemoryWebhookClient::new();
        client
            .post(
                "https://hooks.example.com/a",
                &json!({"ticket_id": "T-1"}),
                Duration::from_secs(5),
            )
            .await
            .unwrap();

        let posts = client.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, "https://hooks.example.com/a");
        assert_eq!(posts[0].1["ticket_id"], "T-1");
    }
}
