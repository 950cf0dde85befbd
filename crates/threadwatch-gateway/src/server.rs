//! HTTP ingress server using Axum.

use axum::{
    Router,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use threadwatch_core::config::GatewayConfig;
use threadwatch_scheduler::{EventIngestor, TrackingStore};
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server.
pub struct AppState {
    pub store: TrackingStore,
    pub ingestor: Arc<EventIngestor>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(store: TrackingStore, ingestor: Arc<EventIngestor>) -> Self {
        Self {
            store,
            ingestor,
            start_time: std::time::Instant::now(),
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(super::routes::health_check))
        .route("/api/v1/threads", get(super::routes::list_threads))
        .route("/api/v1/events", post(super::routes::gateway_event))
        .route("/api/v1/events/message-create", post(super::routes::message_create))
        .route("/api/v1/events/thread-delete", post(super::routes::thread_delete))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until `shutdown` resolves.
pub async fn start_server<F>(config: &GatewayConfig, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Ingress listening on http://{}", addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}
