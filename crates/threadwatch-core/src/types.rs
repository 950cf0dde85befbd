//! Shared data types: inbound platform events, tracked threads, and alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author block of an inbound message event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    pub username: String,
}

/// A MESSAGE_CREATE payload as relayed from the chat platform.
///
/// When `id == channel_id` the message is the root of a newly created thread;
/// otherwise it is a reply posted inside the thread `channel_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageEvent {
    pub author: Author,
    pub id: String,
    pub channel_id: String,
    pub timestamp: DateTime<Utc>,
}

impl MessageEvent {
    pub fn is_thread_root(&self) -> bool {
        self.id == self.channel_id
    }
}

/// A THREAD_DELETE payload. Only `id` is required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreadDeleteEvent {
    pub id: String,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Ancestry of a channel as returned by the channel lookup service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelInfo {
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub guild_id: Option<String>,
}

/// Escalation level of a tracked thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// No alert sent yet.
    Unalerted,
    /// Chat alert sent.
    FirstAlert,
    /// Email alert sent. Next transition fires the escalation and removes the record.
    SecondAlert,
}

impl Level {
    pub fn as_u8(&self) -> u8 {
        match self {
            Level::Unalerted => 0,
            Level::FirstAlert => 1,
            Level::SecondAlert => 2,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// One monitored thread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackedThread {
    pub thread_id: String,
    /// Owning guild, used for the deep link.
    pub group_id: String,
    pub author: String,
    /// Timestamp of the root message. Never updated.
    pub created_at: DateTime<Utc>,
    pub level: Level,
    /// Silence measured by the last sweep that touched this thread.
    #[serde(default)]
    pub last_elapsed_ms: i64,
}

impl TrackedThread {
    pub fn new(thread_id: &str, group_id: &str, author: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            thread_id: thread_id.to_string(),
            group_id: group_id.to_string(),
            author: author.to_string(),
            created_at,
            level: Level::Unalerted,
            last_elapsed_ms: 0,
        }
    }

    /// Whole hours of silence as of the last sweep.
    pub fn elapsed_hours(&self) -> i64 {
        self.last_elapsed_ms / (60 * 60 * 1000)
    }
}

/// Which transport an alert goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTier {
    /// Level 0 -> 1: standard chat webhook.
    Chat,
    /// Level 1 -> 2: email.
    Email,
    /// Terminal: escalation chat webhook.
    Escalation,
}

impl std::fmt::Display for AlertTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertTier::Chat => write!(f, "chat"),
            AlertTier::Email => write!(f, "email"),
            AlertTier::Escalation => write!(f, "escalation"),
        }
    }
}

/// A formatted alert ready for a transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub tier: AlertTier,
    /// Snapshot of the record at the moment the threshold was crossed.
    pub thread: TrackedThread,
    /// Deep link to the thread.
    pub link: String,
    /// Chat message body.
    pub text: String,
}
