//! # ThreadWatch Channels
//! Platform implementations of the core boundary traits:
//! Discord channel lookup, chat webhook posting, and SMTP email.

pub mod discord;
pub mod email;
pub mod webhook;

pub use discord::DiscordResolver;
pub use email::SmtpMailer;
pub use webhook::WebhookPoster;
