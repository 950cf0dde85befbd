//! Alert formatting — turns a tracked thread into the message a transport sends.
//! Deterministic: same record, same text.

use threadwatch_core::config::DiscordConfig;
use threadwatch_core::types::{Alert, AlertTier, TrackedThread};

/// Builds alerts for the channel of interest.
#[derive(Debug, Clone)]
pub struct AlertFormatter {
    web_base: String,
    channel_id: String,
}

impl AlertFormatter {
    pub fn new(web_base: &str, channel_id: &str) -> Self {
        Self {
            web_base: web_base.trim_end_matches('/').to_string(),
            channel_id: channel_id.to_string(),
        }
    }

    pub fn from_config(config: &DiscordConfig) -> Self {
        Self::new(&config.web_base, &config.channel_id)
    }

    /// Deep link: `<web_base>/<guild>/<channel>/threads/<thread>`.
    pub fn link(&self, thread: &TrackedThread) -> String {
        format!(
            "{}/{}/{}/threads/{}",
            self.web_base, thread.group_id, self.channel_id, thread.thread_id
        )
    }

    /// Chat body. Hours are floored.
    pub fn chat_text(&self, thread: &TrackedThread) -> String {
        format!(
            "New Discord message from user: {}, has not been answered for: {} hours.\nLink: {}",
            thread.author,
            thread.elapsed_hours(),
            self.link(thread)
        )
    }

    pub fn build(&self, tier: AlertTier, thread: &TrackedThread) -> Alert {
        Alert {
            tier,
            thread: thread.clone(),
            link: self.link(thread),
            text: self.chat_text(thread),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_chat_text_format() {
        let formatter = AlertFormatter::new("https://discord.com/channels/", "555");
        let mut thread = TrackedThread::new("777", "999", "alice", Utc::now());
        thread.last_elapsed_ms = 3 * 60 * 60 * 1000 + 1;

        assert_eq!(
            formatter.chat_text(&thread),
            "New Discord message from user: alice, has not been answered for: 3 hours.\n\
             Link: https://discord.com/channels/999/555/threads/777"
        );
    }

    #[test]
    fn test_under_an_hour_reports_zero() {
        let formatter = AlertFormatter::new("https://discord.com/channels", "555");
        let mut thread = TrackedThread::new("777", "999", "bob", Utc::now());
        thread.last_elapsed_ms = 10 * 60 * 1000;
        assert!(formatter.chat_text(&thread).contains("for: 0 hours"));
    }

    #[test]
    fn test_build_carries_tier_and_link() {
        let formatter = AlertFormatter::new("https://discord.com/channels", "555");
        let thread = TrackedThread::new("777", "999", "bob", Utc::now());
        let alert = formatter.build(AlertTier::Escalation, &thread);
        assert_eq!(alert.tier, AlertTier::Escalation);
        assert_eq!(alert.link, "https://discord.com/channels/999/555/threads/777");
        assert_eq!(alert.thread.thread_id, "777");
    }
}
