//! Boundary traits. The core calls these; concrete platforms implement them.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Alert, ChannelInfo};

/// Looks up a channel's ancestry on the chat platform.
#[async_trait]
pub trait ChannelResolver: Send + Sync {
    /// Every failure mode (network, status, body) surfaces as one `Err`.
    async fn resolve(&self, channel_id: &str) -> Result<ChannelInfo>;
}

/// Receives alerts from the escalation sweeper.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, alert: &Alert) -> Result<()>;
}

/// Posts a text message to a chat webhook.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    fn name(&self) -> &str;
    async fn post(&self, webhook_url: &str, text: &str) -> Result<()>;
}

/// Sends the email-tier alert. Formatting is up to the implementation.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    fn name(&self) -> &str;
    async fn send_alert(&self, alert: &Alert) -> Result<()>;
}
