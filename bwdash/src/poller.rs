//! Snapshot polling state machine: retrieve both documents, feed the
//! snapshot store and metric streams, and track consecutive failures.

use tracing::{debug, warn};

use crate::fetch::DocumentSource;
use crate::snapshot::SnapshotStore;
use crate::source::select_active;
use crate::stream::{Direction, Sample, StreamKey, StreamSet};
use crate::types::{detect_order, HistoryDoc, SeriesOrder};

/// Consecutive poll-level failures before updates stop for good.
pub const MAX_FAILED_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
    /// Terminal: reached after MAX_FAILED_ATTEMPTS consecutive failures.
    /// Recovery only via an explicit external restart.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Updated,
    Failed { failures: u32 },
    Stopped,
    /// A poll was requested while one was in flight, or after stop.
    Skipped,
}

/// Wall-clock seam; tests drive the poller with a fixed now.
pub trait Clock {
    fn now_epoch(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

pub struct Poller {
    state: PollerState,
    failures: u32,
    store: SnapshotStore,
    streams: StreamSet,
    active_source: Option<String>,
}

impl Poller {
    pub fn new() -> Self {
        Self {
            state: PollerState::Idle,
            failures: 0,
            store: SnapshotStore::new(),
            streams: StreamSet::new(),
            active_source: None,
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn streams(&self) -> &StreamSet {
        &self.streams
    }

    pub fn active_source(&self) -> Option<&str> {
        self.active_source.as_deref()
    }

    /// External restart out of the terminal state. Last-known-good data is
    /// kept; only the failure bookkeeping resets.
    pub fn restart(&mut self) {
        if self.state == PollerState::Stopped {
            self.state = PollerState::Idle;
            self.failures = 0;
        }
    }

    /// Run one poll cycle. Both documents must arrive and parse for the
    /// cycle to count as a success; a failed cycle leaves the prior
    /// snapshot untouched. Never retries within a cycle.
    pub async fn poll<S: DocumentSource>(&mut self, source: &S) -> PollOutcome {
        match self.state {
            PollerState::Stopped => return PollOutcome::Skipped,
            PollerState::Polling => return PollOutcome::Skipped,
            PollerState::Idle => {}
        }
        self.state = PollerState::Polling;

        let (status, history) =
            futures::future::join(source.fetch_status(), source.fetch_history()).await;

        let outcome = match (status, history) {
            (Ok(status), Ok(history)) => {
                self.failures = 0;
                self.active_source = select_active(&status);
                if let Some(active) = self.active_source.clone() {
                    self.ingest_history(&active, &history);
                }
                debug!(
                    active = self.active_source.as_deref().unwrap_or("-"),
                    interfaces = history.interfaces.len(),
                    "poll succeeded"
                );
                self.store.replace(status, history);
                PollOutcome::Updated
            }
            (status, history) => {
                let err = status.err().or_else(|| history.err());
                self.failures += 1;
                warn!(failures = self.failures, error = ?err, "poll failed");
                if self.failures >= MAX_FAILED_ATTEMPTS {
                    self.state = PollerState::Stopped;
                    return PollOutcome::Stopped;
                }
                PollOutcome::Failed {
                    failures: self.failures,
                }
            }
        };
        self.state = PollerState::Idle;
        outcome
    }

    /// Append history samples for the active source, skipping anything at
    /// or before each stream's latest timestamp so re-delivered arrays do
    /// not duplicate.
    fn ingest_history(&mut self, active: &str, history: &HistoryDoc) {
        for (interface, series) in &history.interfaces {
            for (direction, raw) in [
                (Direction::In, &series.inbound),
                (Direction::Out, &series.out),
            ] {
                let order = history.order.or_else(|| detect_order(raw));
                let key = StreamKey {
                    source: active.to_string(),
                    interface: interface.clone(),
                    direction,
                };
                let stream = self.streams.entry(key);
                let cutoff = stream.latest().map(|s| s.timestamp);
                // Normalize to oldest-first; ≤1 element needs no reorder
                let oldest_first: Box<dyn Iterator<Item = &(i64, f64)>> = match order {
                    Some(SeriesOrder::NewestFirst) => Box::new(raw.iter().rev()),
                    _ => Box::new(raw.iter()),
                };
                for &(ts, value) in oldest_first {
                    if cutoff.map_or(false, |c| ts <= c) {
                        continue;
                    }
                    stream.append(Sample {
                        timestamp: ts,
                        value,
                    });
                }
            }
        }
    }
}

impl Default for Poller {
    fn default() -> Self {
        Self::new()
    }
}
