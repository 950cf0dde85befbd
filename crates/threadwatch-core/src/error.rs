//! Error types shared by every ThreadWatch crate.

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ThreadWatchError>;

#[derive(Debug, thiserror::Error)]
pub enum ThreadWatchError {
    #[error("Config error: {0}")]
    Config(String),

    /// Channel lookup failed: network error, non-2xx status, or malformed body.
    #[error("Channel resolve failed: {0}")]
    Resolve(String),

    /// Chat webhook delivery failed.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Email error: {0}")]
    Email(String),

    /// Inbound event body that does not decode.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),
}
