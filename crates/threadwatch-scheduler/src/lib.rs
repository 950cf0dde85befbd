//! # ThreadWatch Scheduler
//!
//! Escalation state machine for unanswered threads.
//!
//! ## Architecture
//! ```text
//! Platform events ──► EventIngestor ──► TrackingStore ◄── EscalationEngine (tokio interval)
//!                                                          └── on threshold → Dispatcher
//!                                                                ├── level 0→1: chat webhook
//!                                                                ├── level 1→2: email
//!                                                                └── level 2→gone: escalation webhook
//! ```

pub mod dispatch;
pub mod engine;
pub mod ingest;
pub mod notify;
pub mod store;

#[cfg(test)]
mod testing;

pub use dispatch::Dispatcher;
pub use engine::{EscalationEngine, SweepReport, Thresholds, Transition, next_transition, spawn_sweeper};
pub use ingest::{EventIngestor, IngestOutcome};
pub use notify::AlertFormatter;
pub use store::{Ticket, TrackingStore, Visit};
