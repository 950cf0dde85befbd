//! Email transport — second-tier alerts over SMTP (async lettre).
//!
//! Supports Gmail, Outlook, and custom servers via STARTTLS relay.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message as LettreMessage, Tokio1Executor};
use threadwatch_core::config::EmailConfig;
use threadwatch_core::error::{Result, ThreadWatchError};
use threadwatch_core::traits::EmailTransport;
use threadwatch_core::types::Alert;

/// SMTP mailer. Addresses are parsed once, at construction.
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let from_addr = if config.from.is_empty() { &config.username } else { &config.from };
        let from: Mailbox = from_addr
            .parse()
            .map_err(|e| ThreadWatchError::Email(format!("Invalid from: {e}")))?;

        if config.recipients.is_empty() {
            return Err(ThreadWatchError::Email("email.recipients is empty".into()));
        }
        let recipients = config
            .recipients
            .iter()
            .map(|r| {
                r.parse::<Mailbox>()
                    .map_err(|e| ThreadWatchError::Email(format!("Invalid recipient {r}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| ThreadWatchError::Email(format!("SMTP relay: {e}")))?
            .port(config.smtp_port);
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            mailer: builder.build(),
            from,
            recipients,
        })
    }

    fn build_message(&self, alert: &Alert) -> Result<LettreMessage> {
        let mut builder = LettreMessage::builder()
            .from(self.from.clone())
            .subject(email_subject(alert))
            .header(ContentType::TEXT_PLAIN);
        for to in &self.recipients {
            builder = builder.to(to.clone());
        }
        builder
            .body(email_body(alert))
            .map_err(|e| ThreadWatchError::Email(format!("Build email: {e}")))
    }
}

#[async_trait]
impl EmailTransport for SmtpMailer {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn send_alert(&self, alert: &Alert) -> Result<()> {
        let message = self.build_message(alert)?;
        self.mailer
            .send(message)
            .await
            .map_err(|e| ThreadWatchError::Email(format!("SMTP send: {e}")))?;

        tracing::info!(
            "📤 Email alert sent to {} recipient(s) for thread {}",
            self.recipients.len(),
            alert.thread.thread_id
        );
        Ok(())
    }
}

pub fn email_subject(alert: &Alert) -> String {
    format!(
        "Unanswered Discord thread from {} ({} hours)",
        alert.thread.author,
        alert.thread.elapsed_hours()
    )
}

pub fn email_body(alert: &Alert) -> String {
    format!(
        "A Discord thread started by {} has not been answered for {} hours.\n\n\
         Thread: {}\nLink: {}\n",
        alert.thread.author,
        alert.thread.elapsed_hours(),
        alert.thread.thread_id,
        alert.link
    )
}
