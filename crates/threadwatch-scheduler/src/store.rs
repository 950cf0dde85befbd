//! In-memory tracking store — the authoritative map of monitored threads.
//! Cheap to clone: every clone shares the same map behind one async mutex,
//! so the ingestor and the sweeper never see a half-written record.
//!
//! Ids whose channel lookup is still in flight are kept as pending. A delete
//! that lands on a pending id cancels it, and the lookup's insert is skipped.

use std::collections::HashMap;
use std::sync::Arc;

use threadwatch_core::types::TrackedThread;
use tokio::sync::Mutex;

/// What the sweeper wants done with an entry it visited.
#[derive(Debug, Clone, PartialEq)]
pub enum Visit {
    Keep,
    Replace(TrackedThread),
    Remove,
}

/// Handle for one in-flight lookup, returned by `begin_pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Default)]
struct Inner {
    records: HashMap<String, TrackedThread>,
    /// Live lookups by ticket. A delete drops every ticket for its id.
    pending: HashMap<Ticket, String>,
    next_ticket: u64,
}

/// Thread id → tracked thread.
#[derive(Clone, Default)]
pub struct TrackingStore {
    inner: Arc<Mutex<Inner>>,
}

impl TrackingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Returns the previous record, if any.
    pub async fn put(&self, id: &str, record: TrackedThread) -> Option<TrackedThread> {
        self.inner.lock().await.records.insert(id.to_string(), record)
    }

    pub async fn get(&self, id: &str) -> Option<TrackedThread> {
        self.inner.lock().await.records.get(id).cloned()
    }

    /// Remove an entry and cancel any pending lookup for it.
    /// Unknown ids are a no-op.
    pub async fn delete(&self, id: &str) -> Option<TrackedThread> {
        let mut inner = self.inner.lock().await;
        inner.pending.retain(|_, pending_id| pending_id.as_str() != id);
        inner.records.remove(id)
    }

    /// Register a lookup for `id`. Must be closed with `finish_pending`.
    pub async fn begin_pending(&self, id: &str) -> Ticket {
        let mut inner = self.inner.lock().await;
        let ticket = Ticket(inner.next_ticket);
        inner.next_ticket += 1;
        inner.pending.insert(ticket, id.to_string());
        ticket
    }

    /// Close a lookup, inserting `record` unless a delete for its id arrived
    /// after `begin_pending`. Returns true if the record was inserted.
    pub async fn finish_pending(&self, ticket: Ticket, record: Option<TrackedThread>) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(id) = inner.pending.remove(&ticket) else {
            return false;
        };
        match record {
            Some(record) => {
                inner.records.insert(id, record);
                true
            }
            None => false,
        }
    }

    pub async fn pending_len(&self) -> usize {
        self.inner.lock().await.pending.len()
    }

    /// Read-only visit of every entry.
    pub async fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&TrackedThread),
    {
        let inner = self.inner.lock().await;
        for record in inner.records.values() {
            visitor(record);
        }
    }

    /// Visit every entry under a single lock and apply the returned decision.
    /// Returns how many entries were replaced or removed.
    pub async fn visit_mut<F>(&self, mut visitor: F) -> usize
    where
        F: FnMut(&TrackedThread) -> Visit,
    {
        let mut inner = self.inner.lock().await;
        let map = &mut inner.records;
        let mut changed = 0;
        let mut removed = Vec::new();

        for (id, record) in map.iter_mut() {
            match visitor(record) {
                Visit::Keep => {}
                Visit::Replace(next) => {
                    *record = next;
                    changed += 1;
                }
                Visit::Remove => removed.push(id.clone()),
            }
        }

        for id in &removed {
            map.remove(id);
        }
        changed + removed.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.records.is_empty()
    }

    /// All records, oldest first.
    pub async fn snapshot(&self) -> Vec<TrackedThread> {
        let mut records: Vec<TrackedThread> =
            self.inner.lock().await.records.values().cloned().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.thread_id.cmp(&b.thread_id)));
        records
    }
}
