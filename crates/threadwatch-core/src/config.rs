//! ThreadWatch configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ThreadWatchError};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadWatchConfig {
    /// Verbose logging.
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for ThreadWatchConfig {
    fn default() -> Self {
        Self {
            debug: false,
            alerts: AlertsConfig::default(),
            discord: DiscordConfig::default(),
            email: None,
            gateway: GatewayConfig::default(),
        }
    }
}

impl ThreadWatchConfig {
    /// Load config from the default path (~/.threadwatch/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            let mut config = Self::default();
            config.apply_env();
            Ok(config)
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ThreadWatchError::Config(format!("Failed to read config: {e}")))?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| ThreadWatchError::Config(format!("Failed to parse config: {e}")))?;
        config.apply_env();
        Ok(config)
    }

    /// Secrets from the environment win over the file.
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("THREADWATCH_BOT_TOKEN")
            && !token.is_empty()
        {
            self.discord.bot_token = token;
        }
        if let Some(email) = self.email.as_mut()
            && let Ok(password) = std::env::var("THREADWATCH_SMTP_PASSWORD")
            && !password.is_empty()
        {
            email.password = password;
        }
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.discord.channel_id.is_empty() {
            return Err(ThreadWatchError::Config("discord.channel_id is required".into()));
        }
        if self.discord.bot_token.is_empty() {
            return Err(ThreadWatchError::Config(
                "discord.bot_token is required (or set THREADWATCH_BOT_TOKEN)".into(),
            ));
        }
        if self.alerts.alert_webhook.is_empty() {
            return Err(ThreadWatchError::Config("alerts.alert_webhook is required".into()));
        }
        if self.alerts.escalation_webhook.is_empty() {
            return Err(ThreadWatchError::Config("alerts.escalation_webhook is required".into()));
        }
        if self.alerts.sweep_interval_secs == 0 {
            return Err(ThreadWatchError::Config("alerts.sweep_interval_secs must be > 0".into()));
        }
        if !self.alerts.is_ascending() {
            tracing::warn!(
                "⚠️ Alert thresholds are not ascending ({} / {} / {} min)",
                self.alerts.first_mins,
                self.alerts.second_mins,
                self.alerts.escalation_mins
            );
        }
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the ThreadWatch home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".threadwatch")
    }

    /// Expand `~` in a user-supplied path.
    pub fn expand_path(p: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(p).to_string())
    }
}

/// Escalation thresholds and chat webhooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Silence before the chat alert, in minutes.
    #[serde(default = "default_first_mins")]
    pub first_mins: u64,
    /// Silence before the email alert, in minutes.
    #[serde(default = "default_second_mins")]
    pub second_mins: u64,
    /// Silence before the escalation alert, in minutes.
    #[serde(default = "default_escalation_mins")]
    pub escalation_mins: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    #[serde(default)]
    pub alert_webhook: String,
    #[serde(default)]
    pub escalation_webhook: String,
}

fn default_first_mins() -> u64 { 60 }
fn default_second_mins() -> u64 { 240 }
fn default_escalation_mins() -> u64 { 1440 }
fn default_sweep_interval() -> u64 { 60 }

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            first_mins: default_first_mins(),
            second_mins: default_second_mins(),
            escalation_mins: default_escalation_mins(),
            sweep_interval_secs: default_sweep_interval(),
            alert_webhook: String::new(),
            escalation_webhook: String::new(),
        }
    }
}

impl AlertsConfig {
    pub fn is_ascending(&self) -> bool {
        self.first_mins <= self.second_mins && self.second_mins <= self.escalation_mins
    }
}

/// Discord access: channel of interest, bot credential, endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Parent channel whose threads are monitored.
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Base for deep links in alert messages.
    #[serde(default = "default_web_base")]
    pub web_base: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String { "https://discord.com/api/v10".into() }
fn default_web_base() -> String { "https://discord.com/channels".into() }
fn default_timeout() -> u64 { 10 }

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            channel_id: String::new(),
            bot_token: String::new(),
            api_base: default_api_base(),
            web_base: default_web_base(),
            timeout_secs: default_timeout(),
        }
    }
}

/// SMTP settings for the email tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Sender mailbox, e.g. `ThreadWatch <bot@example.com>`.
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub recipients: Vec<String>,
}

fn default_smtp_host() -> String { "smtp.gmail.com".into() }
fn default_smtp_port() -> u16 { 587 }

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from: String::new(),
            recipients: vec![],
        }
    }
}

/// HTTP ingress configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 { 3000 }
fn default_host() -> String { "127.0.0.1".into() }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}
