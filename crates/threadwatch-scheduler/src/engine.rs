//! Escalation engine — the periodic sweep over tracked threads.
//! Uses tokio::interval for ticking; each tick applies at most one level
//! transition per thread, then hands the resulting alerts to the sink.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use threadwatch_core::config::AlertsConfig;
use threadwatch_core::traits::AlertSink;
use threadwatch_core::types::{Alert, AlertTier, Level};
use tokio::time::{Interval, MissedTickBehavior};

use crate::notify::AlertFormatter;
use crate::store::{TrackingStore, Visit};

const MINUTE_MS: i64 = 60 * 1000;

/// Escalation thresholds in milliseconds of silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub first_ms: i64,
    pub second_ms: i64,
    pub escalation_ms: i64,
}

impl Thresholds {
    pub fn from_minutes(first: u64, second: u64, escalation: u64) -> Self {
        Self {
            first_ms: minutes_to_ms(first),
            second_ms: minutes_to_ms(second),
            escalation_ms: minutes_to_ms(escalation),
        }
    }

    pub fn from_config(config: &AlertsConfig) -> Self {
        Self::from_minutes(config.first_mins, config.second_mins, config.escalation_mins)
    }
}

/// Saturates at `i64::MAX`, which no elapsed time ever reaches.
fn minutes_to_ms(minutes: u64) -> i64 {
    i64::try_from(minutes).unwrap_or(i64::MAX).saturating_mul(MINUTE_MS)
}

/// One step of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub tier: AlertTier,
    /// `None` means the record is removed after the alert.
    pub next: Option<Level>,
}

/// Decide the transition for a thread at `level` after `elapsed_ms` of silence.
///
/// Only the threshold for the current level is consulted, so a thread that
/// slept through several thresholds still advances one tier per sweep.
pub fn next_transition(level: Level, elapsed_ms: i64, thresholds: &Thresholds) -> Option<Transition> {
    match level {
        Level::SecondAlert if elapsed_ms >= thresholds.escalation_ms => Some(Transition {
            tier: AlertTier::Escalation,
            next: None,
        }),
        Level::FirstAlert if elapsed_ms >= thresholds.second_ms => Some(Transition {
            tier: AlertTier::Email,
            next: Some(Level::SecondAlert),
        }),
        Level::Unalerted if elapsed_ms >= thresholds.first_ms => Some(Transition {
            tier: AlertTier::Chat,
            next: Some(Level::FirstAlert),
        }),
        _ => None,
    }
}

/// Outcome of one sweep cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Records left in the store after the sweep.
    pub tracked: usize,
    pub fired: usize,
    pub failed: usize,
}

/// The sweeper: owns a handle to the store and the alert sink.
pub struct EscalationEngine {
    store: TrackingStore,
    thresholds: Thresholds,
    formatter: AlertFormatter,
    sink: Arc<dyn AlertSink>,
}

impl EscalationEngine {
    pub fn new(
        store: TrackingStore,
        thresholds: Thresholds,
        formatter: AlertFormatter,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            store,
            thresholds,
            formatter,
            sink,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Apply the transition policy to every record as of `now`.
    ///
    /// All state changes happen under the store lock, before any transport is
    /// touched. Returns the alerts to dispatch.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Vec<Alert> {
        let mut alerts = Vec::new();

        self.store
            .visit_mut(|record| {
                let elapsed_ms = (now - record.created_at).num_milliseconds();
                let Some(transition) = next_transition(record.level, elapsed_ms, &self.thresholds) else {
                    return Visit::Keep;
                };

                let mut next = record.clone();
                next.last_elapsed_ms = elapsed_ms;
                alerts.push(self.formatter.build(transition.tier, &next));

                match transition.next {
                    Some(level) => {
                        next.level = level;
                        Visit::Replace(next)
                    }
                    None => Visit::Remove,
                }
            })
            .await;

        alerts
    }

    /// Sweep, then deliver every alert once. Delivery failures are logged and
    /// counted but never undo the transition.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> SweepReport {
        let alerts = self.sweep(now).await;
        let results = futures::future::join_all(alerts.iter().map(|a| self.sink.deliver(a))).await;

        let mut report = SweepReport {
            tracked: self.store.len().await,
            fired: alerts.len(),
            failed: 0,
        };

        for (alert, result) in alerts.iter().zip(results) {
            match result {
                Ok(()) => tracing::info!(
                    "🔔 {} alert sent for thread {} ({}h silent)",
                    alert.tier,
                    alert.thread.thread_id,
                    alert.thread.elapsed_hours()
                ),
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        "⚠️ {} alert for thread {} failed: {e}",
                        alert.tier,
                        alert.thread.thread_id
                    );
                }
            }
        }

        report
    }
}

/// Ticks every `interval_secs`. A sweep that overruns pushes the next tick
/// back instead of firing a burst of catch-up sweeps.
fn sweep_interval(interval_secs: u64) -> Interval {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Spawn the sweep loop. Runs until the runtime shuts down.
pub async fn spawn_sweeper(engine: Arc<EscalationEngine>, interval_secs: u64) {
    tracing::info!("⏰ Escalation sweeper started (every {}s)", interval_secs);

    let mut interval = sweep_interval(interval_secs);

    loop {
        interval.tick().await;
        tracing::debug!("Sweeping tracked threads");
        let report = engine.run_cycle(Utc::now()).await;
        if report.fired > 0 {
            tracing::debug!(
                "Sweep done: {} fired, {} failed, {} still tracked",
                report.fired,
                report.failed,
                report.tracked
            );
        }
    }
}
