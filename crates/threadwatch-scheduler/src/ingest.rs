//! Event ingestor — applies platform events to the tracking store.
//!
//! Root messages in a thread under the channel of interest start tracking.
//! Any other message inside a tracked thread counts as an answer and clears it.
//! Thread deletion clears it unconditionally.

use std::sync::Arc;

use threadwatch_core::traits::ChannelResolver;
use threadwatch_core::types::{MessageEvent, ThreadDeleteEvent, TrackedThread};

use crate::store::{Ticket, TrackingStore};

/// What happened to an inbound message event.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// New (or overwritten) record at level 0.
    Tracked,
    /// Root message outside the channel of interest.
    Ignored,
    /// Channel lookup failed, or the thread was answered or deleted during it.
    Dropped(String),
    /// Reply inside a thread. `cleared` is true when a record was removed.
    Answered { cleared: bool },
}

pub struct EventIngestor {
    store: TrackingStore,
    resolver: Arc<dyn ChannelResolver>,
    channel_id: String,
}

impl EventIngestor {
    pub fn new(store: TrackingStore, resolver: Arc<dyn ChannelResolver>, channel_id: &str) -> Self {
        Self {
            store,
            resolver,
            channel_id: channel_id.to_string(),
        }
    }

    /// Handle a MESSAGE_CREATE event.
    pub async fn on_thread_created(&self, event: &MessageEvent) -> IngestOutcome {
        tracing::debug!("📨 Message {} from {}", event.id, event.author.username);

        if !event.is_thread_root() {
            let cleared = self.store.delete(&event.channel_id).await.is_some();
            if cleared {
                tracing::info!("✅ Thread {} answered, tracking cleared", event.channel_id);
            }
            return IngestOutcome::Answered { cleared };
        }

        // The lookup runs on its own task so a dropped request can never leave
        // the id pending. The store is not locked while it waits.
        let ticket = self.store.begin_pending(&event.id).await;
        let lookup = tokio::spawn(admit_root(
            ticket,
            self.store.clone(),
            self.resolver.clone(),
            self.channel_id.clone(),
            event.clone(),
        ));
        match lookup.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("❌ Lookup task for thread {} failed: {e}", event.id);
                IngestOutcome::Dropped(e.to_string())
            }
        }
    }

    /// Handle a THREAD_DELETE event. Returns true if a record was removed.
    pub async fn on_thread_removed(&self, event: &ThreadDeleteEvent) -> bool {
        tracing::debug!("🗑️ Thread delete event for {}", event.id);
        self.store.delete(&event.id).await.is_some()
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }
}

/// Resolve a root message's thread and track it. Always closes the pending
/// lookup opened by the caller, whichever way the lookup ends.
async fn admit_root(
    ticket: Ticket,
    store: TrackingStore,
    resolver: Arc<dyn ChannelResolver>,
    channel_id: String,
    event: MessageEvent,
) -> IngestOutcome {
    let (record, outcome) = match resolver.resolve(&event.channel_id).await {
        Err(e) => {
            tracing::warn!("⚠️ Dropping thread {}: {e}", event.channel_id);
            (None, IngestOutcome::Dropped(e.to_string()))
        }
        Ok(info) if info.parent_id.as_deref() != Some(channel_id.as_str()) => {
            tracing::debug!("Channel {} has parent {:?}, ignoring", event.channel_id, info.parent_id);
            (None, IngestOutcome::Ignored)
        }
        Ok(info) => match info.guild_id {
            Some(guild_id) => {
                let record = TrackedThread::new(&event.id, &guild_id, &event.author.username, event.timestamp);
                (Some(record), IngestOutcome::Tracked)
            }
            None => {
                tracing::warn!("⚠️ Dropping thread {}: lookup returned no guild", event.channel_id);
                (None, IngestOutcome::Dropped("missing guild_id".into()))
            }
        },
    };

    let tracking = record.is_some();
    let inserted = store.finish_pending(ticket, record).await;
    if inserted {
        tracing::info!("👀 Tracking thread {} from {}", event.id, event.author.username);
    } else if tracking {
        tracing::info!("🗑️ Thread {} was answered or deleted during lookup, not tracking", event.id);
        return IngestOutcome::Dropped("cleared during lookup".into());
    }
    outcome
}
