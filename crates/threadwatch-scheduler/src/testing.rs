//! Test doubles shared by the scheduler tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use threadwatch_core::error::{Result, ThreadWatchError};
use threadwatch_core::traits::{AlertSink, ChannelResolver};
use threadwatch_core::types::{Alert, AlertTier, Author, ChannelInfo, MessageEvent};

/// Resolver answering from a fixed table. Unknown channels fail.
#[derive(Default)]
pub struct ScriptedResolver {
    channels: HashMap<String, ChannelInfo>,
}

impl ScriptedResolver {
    pub fn with(mut self, channel_id: &str, parent_id: &str, guild_id: &str) -> Self {
        self.channels.insert(
            channel_id.to_string(),
            ChannelInfo {
                parent_id: Some(parent_id.to_string()),
                guild_id: Some(guild_id.to_string()),
            },
        );
        self
    }
}

#[async_trait]
impl ChannelResolver for ScriptedResolver {
    async fn resolve(&self, channel_id: &str) -> Result<ChannelInfo> {
        self.channels
            .get(channel_id)
            .cloned()
            .ok_or_else(|| ThreadWatchError::Resolve(format!("no such channel {channel_id}")))
    }
}

/// Sink that records every alert. Optionally fails every delivery.
#[derive(Default)]
pub struct RecordingSink {
    pub alerts: Mutex<Vec<Alert>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            alerts: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn tiers(&self) -> Vec<(String, AlertTier)> {
        self.alerts
            .lock()
            .unwrap()
            .iter()
            .map(|a| (a.thread.thread_id.clone(), a.tier))
            .collect()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn deliver(&self, alert: &Alert) -> Result<()> {
        self.alerts.lock().unwrap().push(alert.clone());
        if self.fail {
            return Err(ThreadWatchError::Transport("webhook returned 500".into()));
        }
        Ok(())
    }
}

pub fn root_event(thread_id: &str, author: &str, at: DateTime<Utc>) -> MessageEvent {
    MessageEvent {
        author: Author { username: author.to_string() },
        id: thread_id.to_string(),
        channel_id: thread_id.to_string(),
        timestamp: at,
    }
}

pub fn reply_event(thread_id: &str, message_id: &str, at: DateTime<Utc>) -> MessageEvent {
    MessageEvent {
        author: Author { username: "helper".to_string() },
        id: message_id.to_string(),
        channel_id: thread_id.to_string(),
        timestamp: at,
    }
}
