//! Discord REST channel lookup — resolves a thread's parent channel and guild.

use async_trait::async_trait;
use threadwatch_core::config::DiscordConfig;
use threadwatch_core::error::{Result, ThreadWatchError};
use threadwatch_core::traits::ChannelResolver;
use threadwatch_core::types::ChannelInfo;

/// `GET /channels/{id}` with a bot token.
pub struct DiscordResolver {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
    timeout: std::time::Duration,
}

impl DiscordResolver {
    pub fn new(api_base: &str, bot_token: &str, timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            timeout: std::time::Duration::from_secs(timeout_secs),
        }
    }

    pub fn from_config(config: &DiscordConfig) -> Self {
        Self::new(&config.api_base, &config.bot_token, config.timeout_secs)
    }

    fn channel_url(&self, channel_id: &str) -> String {
        format!("{}/channels/{}", self.api_base, channel_id)
    }
}

#[async_trait]
impl ChannelResolver for DiscordResolver {
    async fn resolve(&self, channel_id: &str) -> Result<ChannelInfo> {
        let resp = self
            .client
            .get(self.channel_url(channel_id))
            .header("Authorization", format!("Bot {}", self.bot_token))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ThreadWatchError::Resolve(format!("Discord request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ThreadWatchError::Resolve(format!(
                "Discord API error {status} for channel {channel_id}"
            )));
        }

        resp.json::<ChannelInfo>()
            .await
            .map_err(|e| ThreadWatchError::Resolve(format!("Invalid channel response: {e}")))
    }
}
