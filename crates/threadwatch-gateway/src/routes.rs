//! API route handlers for the ingress gateway.

use axum::{Json, extract::State};
use std::sync::Arc;

use threadwatch_core::error::{Result, ThreadWatchError};
use threadwatch_core::types::{MessageEvent, ThreadDeleteEvent};
use threadwatch_scheduler::IngestOutcome;

use super::server::AppState;

/// Health check endpoint.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "threadwatch",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Snapshot of tracked threads, oldest first.
pub async fn list_threads(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let threads: Vec<serde_json::Value> = state
        .store
        .snapshot()
        .await
        .into_iter()
        .map(|t| {
            serde_json::json!({
                "thread_id": t.thread_id,
                "guild_id": t.group_id,
                "author": t.author,
                "level": t.level.as_u8(),
                "created_at": t.created_at.to_rfc3339(),
            })
        })
        .collect();

    Json(serde_json::json!({
        "ok": true,
        "channel_id": state.ingestor.channel_id(),
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "count": threads.len(),
        "threads": threads,
    }))
}

/// MESSAGE_CREATE relay.
pub async fn message_create(State(state): State<Arc<AppState>>, body: String) -> Json<serde_json::Value> {
    match decoded::<MessageEvent>(serde_json::from_str(&body), "MESSAGE_CREATE") {
        Ok(event) => Json(handle_message(&state, &event).await),
        Err(e) => invalid(e),
    }
}

/// THREAD_DELETE relay.
pub async fn thread_delete(State(state): State<Arc<AppState>>, body: String) -> Json<serde_json::Value> {
    match decoded::<ThreadDeleteEvent>(serde_json::from_str(&body), "THREAD_DELETE") {
        Ok(event) => Json(handle_delete(&state, &event).await),
        Err(e) => invalid(e),
    }
}

/// Raw gateway dispatch envelope: `{"t": "<EVENT_NAME>", "d": {...}}`.
/// Events other than MESSAGE_CREATE and THREAD_DELETE are acknowledged and ignored.
pub async fn gateway_event(State(state): State<Arc<AppState>>, body: String) -> Json<serde_json::Value> {
    let payload: serde_json::Value = match decoded(serde_json::from_str(&body), "gateway envelope") {
        Ok(v) => v,
        Err(e) => return invalid(e),
    };

    let event_type = payload["t"].as_str().unwrap_or("");
    let data = payload["d"].clone();

    match event_type {
        "MESSAGE_CREATE" => match decoded::<MessageEvent>(serde_json::from_value(data), event_type) {
            Ok(event) => Json(handle_message(&state, &event).await),
            Err(e) => invalid(e),
        },
        "THREAD_DELETE" => match decoded::<ThreadDeleteEvent>(serde_json::from_value(data), event_type) {
            Ok(event) => Json(handle_delete(&state, &event).await),
            Err(e) => invalid(e),
        },
        other => {
            tracing::debug!("Ignoring gateway event '{other}'");
            Json(serde_json::json!({"ok": true, "outcome": "ignored"}))
        }
    }
}

async fn handle_message(state: &AppState, event: &MessageEvent) -> serde_json::Value {
    match state.ingestor.on_thread_created(event).await {
        IngestOutcome::Tracked => serde_json::json!({"ok": true, "outcome": "tracked"}),
        IngestOutcome::Ignored => serde_json::json!({"ok": true, "outcome": "ignored"}),
        IngestOutcome::Dropped(reason) => {
            serde_json::json!({"ok": true, "outcome": "dropped", "reason": reason})
        }
        IngestOutcome::Answered { cleared } => {
            serde_json::json!({"ok": true, "outcome": "answered", "cleared": cleared})
        }
    }
}

async fn handle_delete(state: &AppState, event: &ThreadDeleteEvent) -> serde_json::Value {
    let removed = state.ingestor.on_thread_removed(event).await;
    serde_json::json!({"ok": true, "outcome": "removed", "removed": removed})
}

/// Tag a decode failure with the kind of payload that failed.
fn decoded<T>(parsed: serde_json::Result<T>, kind: &str) -> Result<T> {
    parsed.map_err(|e| ThreadWatchError::InvalidEvent(format!("{kind}: {e}")))
}

fn invalid(error: ThreadWatchError) -> Json<serde_json::Value> {
    tracing::warn!("[ingress] {error}");
    Json(serde_json::json!({"ok": false, "error": error.to_string()}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use threadwatch_core::error::{Result, ThreadWatchError};
    use threadwatch_core::traits::ChannelResolver;
    use threadwatch_core::types::{ChannelInfo, TrackedThread};
    use threadwatch_scheduler::{EventIngestor, TrackingStore};

    struct ForumResolver;

    #[async_trait]
    impl ChannelResolver for ForumResolver {
        async fn resolve(&self, channel_id: &str) -> Result<ChannelInfo> {
            match channel_id {
                "down" => Err(ThreadWatchError::Resolve("503".into())),
                _ => Ok(ChannelInfo {
                    parent_id: Some("forum".into()),
                    guild_id: Some("g1".into()),
                }),
            }
        }
    }

    fn test_state() -> Arc<AppState> {
        let store = TrackingStore::new();
        let ingestor = EventIngestor::new(store.clone(), Arc::new(ForumResolver), "forum");
        Arc::new(AppState::new(store, Arc::new(ingestor)))
    }

    fn root(id: &str) -> String {
        serde_json::json!({
            "author": {"username": "alice"},
            "id": id,
            "channel_id": id,
            "timestamp": "2024-03-01T10:00:00.000000+00:00"
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_health_check() {
        let json = health_check().await.0;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "threadwatch");
    }

    #[tokio::test]
    async fn test_message_create_tracks_root() {
        let state = test_state();
        let json = message_create(State(state.clone()), root("t1")).await.0;
        assert_eq!(json["outcome"], "tracked");
        assert!(state.store.get("t1").await.is_some());
    }

    #[tokio::test]
    async fn test_message_create_resolve_failure_drops() {
        let state = test_state();
        let json = message_create(State(state.clone()), root("down")).await.0;
        assert_eq!(json["outcome"], "dropped");
        assert!(state.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_malformed_event_rejected() {
        let state = test_state();
        let json = message_create(State(state.clone()), r#"{"id": 5}"#.into()).await.0;
        assert_eq!(json["ok"], false);
        assert!(json["error"].as_str().unwrap().contains("Invalid event: MESSAGE_CREATE"));

        // Ingress keeps working afterwards.
        let json = message_create(State(state), root("t1")).await.0;
        assert_eq!(json["ok"], true);
    }

    #[tokio::test]
    async fn test_decode_failures_are_invalid_events() {
        let err = decoded::<ThreadDeleteEvent>(serde_json::from_str("{}"), "THREAD_DELETE").unwrap_err();
        assert!(matches!(err, ThreadWatchError::InvalidEvent(_)));
        assert!(err.to_string().starts_with("Invalid event: THREAD_DELETE: missing field `id`"));

        let state = test_state();
        let json = gateway_event(State(state.clone()), "not json".into()).await.0;
        assert_eq!(json["ok"], false);
        assert!(json["error"].as_str().unwrap().contains("Invalid event: gateway envelope"));

        let json = gateway_event(State(state), r#"{"t": "THREAD_DELETE", "d": {"id": 7}}"#.into()).await.0;
        assert_eq!(json["ok"], false);
        assert!(json["error"].as_str().unwrap().contains("Invalid event: THREAD_DELETE"));
    }

    #[tokio::test]
    async fn test_thread_delete_removes() {
        let state = test_state();
        state
            .store
            .put("t1", TrackedThread::new("t1", "g1", "alice", Utc::now()))
            .await;

        let json = thread_delete(State(state.clone()), r#"{"id": "t1"}"#.into()).await.0;
        assert_eq!(json["removed"], true);
        let json = thread_delete(State(state.clone()), r#"{"id": "t1"}"#.into()).await.0;
        assert_eq!(json["ok"], true);
        assert_eq!(json["removed"], false);
    }

    #[tokio::test]
    async fn test_gateway_envelope_dispatch() {
        let state = test_state();
        let create = format!(r#"{{"t": "MESSAGE_CREATE", "d": {}}}"#, root("t1"));
        let json = gateway_event(State(state.clone()), create).await.0;
        assert_eq!(json["outcome"], "tracked");

        let reply = serde_json::json!({
            "t": "MESSAGE_CREATE",
            "d": {
                "author": {"username": "helper"},
                "id": "m2",
                "channel_id": "t1",
                "timestamp": "2024-03-01T10:05:00+00:00"
            }
        });
        let json = gateway_event(State(state.clone()), reply.to_string()).await.0;
        assert_eq!(json["outcome"], "answered");
        assert_eq!(json["cleared"], true);
        assert!(state.store.is_empty().await);

        let json = gateway_event(State(state), r#"{"t": "TYPING_START", "d": {}}"#.into()).await.0;
        assert_eq!(json["outcome"], "ignored");
    }

    #[tokio::test]
    async fn test_list_threads() {
        let state = test_state();
        message_create(State(state.clone()), root("t1")).await;
        let json = list_threads(State(state)).await.0;
        assert_eq!(json["count"], 1);
        assert_eq!(json["channel_id"], "forum");
        assert_eq!(json["threads"][0]["level"], 0);
        assert_eq!(json["threads"][0]["author"], "alice");
    }
}
