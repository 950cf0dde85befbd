//! Chat webhook poster — `POST {url}` with `{"text": ...}`.
//! The response body is ignored; any non-2xx status is an error. No retries.

use async_trait::async_trait;
use threadwatch_core::error::{Result, ThreadWatchError};
use threadwatch_core::traits::ChatTransport;

pub struct WebhookPoster {
    client: reqwest::Client,
    timeout: std::time::Duration,
}

impl WebhookPoster {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: std::time::Duration::from_secs(timeout_secs),
        }
    }
}

impl Default for WebhookPoster {
    fn default() -> Self {
        Self::new(10)
    }
}

#[async_trait]
impl ChatTransport for WebhookPoster {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn post(&self, webhook_url: &str, text: &str) -> Result<()> {
        let resp = self
            .client
            .post(webhook_url)
            .header("Content-Type", "application/json; charset=UTF-8")
            .json(&serde_json::json!({ "text": text }))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ThreadWatchError::Transport(format!("Webhook send failed: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            tracing::debug!("✅ Webhook accepted ({status})");
            Ok(())
        } else {
            Err(ThreadWatchError::Transport(format!("Webhook error {status}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_posts_text_body() {
        let server = MockServer::start_async().await;
        let hook = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/spaces/abc/messages")
                .json_body(json!({"text": "New Discord message from user: alice"}));
            then.status(200).json_body(json!({"name": "spaces/abc/messages/1"}));
        });

        let poster = WebhookPoster::default();
        poster
            .post(&server.url("/v1/spaces/abc/messages"), "New Discord message from user: alice")
            .await
            .expect("post");
        hook.assert_calls(1);
    }

    #[tokio::test]
    async fn test_server_error_is_transport_error() {
        let server = MockServer::start_async().await;
        let hook = server.mock(|when, then| {
            when.method(POST).path("/hook");
            then.status(500);
        });

        let poster = WebhookPoster::default();
        let err = poster.post(&server.url("/hook"), "hi").await.unwrap_err();
        assert!(matches!(err, ThreadWatchError::Transport(_)));
        // Not retried.
        hook.assert_calls(1);
    }
}
