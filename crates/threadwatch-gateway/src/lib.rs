//! # ThreadWatch Gateway
//! HTTP ingress: the platform relay posts MESSAGE_CREATE and THREAD_DELETE
//! events here, and operators can inspect what is being tracked.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start_server};
