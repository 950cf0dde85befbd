//! Notification dispatch — routes an alert to the transport for its tier.
//! Chat tier → alert webhook, email tier → SMTP, escalation tier → escalation webhook.

use std::sync::Arc;

use async_trait::async_trait;
use threadwatch_core::config::AlertsConfig;
use threadwatch_core::error::{Result, ThreadWatchError};
use threadwatch_core::traits::{AlertSink, ChatTransport, EmailTransport};
use threadwatch_core::types::{Alert, AlertTier};

/// Tier-based alert router.
pub struct Dispatcher {
    chat: Arc<dyn ChatTransport>,
    email: Option<Arc<dyn EmailTransport>>,
    alert_webhook: String,
    escalation_webhook: String,
}

impl Dispatcher {
    pub fn new(
        chat: Arc<dyn ChatTransport>,
        email: Option<Arc<dyn EmailTransport>>,
        alert_webhook: &str,
        escalation_webhook: &str,
    ) -> Self {
        Self {
            chat,
            email,
            alert_webhook: alert_webhook.to_string(),
            escalation_webhook: escalation_webhook.to_string(),
        }
    }

    pub fn from_config(
        config: &AlertsConfig,
        chat: Arc<dyn ChatTransport>,
        email: Option<Arc<dyn EmailTransport>>,
    ) -> Self {
        Self::new(chat, email, &config.alert_webhook, &config.escalation_webhook)
    }
}

#[async_trait]
impl AlertSink for Dispatcher {
    async fn deliver(&self, alert: &Alert) -> Result<()> {
        match alert.tier {
            AlertTier::Chat => {
                tracing::debug!("💬 Chat alert via {} for {}", self.chat.name(), alert.thread.thread_id);
                self.chat.post(&self.alert_webhook, &alert.text).await
            }
            AlertTier::Email => match &self.email {
                Some(email) => {
                    tracing::debug!("📧 Email alert via {} for {}", email.name(), alert.thread.thread_id);
                    email.send_alert(alert).await
                }
                None => Err(ThreadWatchError::Email("no email transport configured".into())),
            },
            AlertTier::Escalation => {
                tracing::debug!("🚨 Escalation alert via {} for {}", self.chat.name(), alert.thread.thread_id);
                self.chat.post(&self.escalation_webhook, &alert.text).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;
    use threadwatch_core::types::TrackedThread;

    #[derive(Default)]
    struct RecordingChat {
        posts: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ChatTransport for RecordingChat {
        fn name(&self) -> &str {
            "recording"
        }
        async fn post(&self, webhook_url: &str, text: &str) -> Result<()> {
            self.posts.lock().unwrap().push((webhook_url.to_string(), text.to_string()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingEmail {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EmailTransport for RecordingEmail {
        fn name(&self) -> &str {
            "recording"
        }
        async fn send_alert(&self, alert: &Alert) -> Result<()> {
            self.sent.lock().unwrap().push(alert.thread.thread_id.clone());
            Ok(())
        }
    }

    fn alert(tier: AlertTier) -> Alert {
        Alert {
            tier,
            thread: TrackedThread::new("t1", "g1", "alice", Utc::now()),
            link: "https://discord.com/channels/g1/c1/threads/t1".into(),
            text: "hello".into(),
        }
    }

    #[tokio::test]
    async fn test_routes_by_tier() {
        let chat = Arc::new(RecordingChat::default());
        let email = Arc::new(RecordingEmail::default());
        let dispatcher = Dispatcher::new(chat.clone(), Some(email.clone()), "https://alert", "https://escalate");

        dispatcher.deliver(&alert(AlertTier::Chat)).await.unwrap();
        dispatcher.deliver(&alert(AlertTier::Email)).await.unwrap();
        dispatcher.deliver(&alert(AlertTier::Escalation)).await.unwrap();

        let posts = chat.posts.lock().unwrap().clone();
        assert_eq!(
            posts,
            vec![
                ("https://alert".to_string(), "hello".to_string()),
                ("https://escalate".to_string(), "hello".to_string()),
            ]
        );
        assert_eq!(email.sent.lock().unwrap().as_slice(), ["t1".to_string()]);
    }

    #[tokio::test]
    async fn test_email_tier_without_transport_errors() {
        let chat = Arc::new(RecordingChat::default());
        let dispatcher = Dispatcher::new(chat.clone(), None, "https://alert", "https://escalate");
        let err = dispatcher.deliver(&alert(AlertTier::Email)).await.unwrap_err();
        assert!(matches!(err, ThreadWatchError::Email(_)));
        assert!(chat.posts.lock().unwrap().is_empty());
    }
}
