//! # ThreadWatch Core
//! Configuration, error type, shared types, and the boundary traits the
//! escalation engine talks to.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::ThreadWatchConfig;
pub use error::{Result, ThreadWatchError};
pub use types::{Alert, AlertTier, ChannelInfo, Level, MessageEvent, ThreadDeleteEvent, TrackedThread};
