//! Last-known-good document pair and the staleness classifier.

use crate::types::{HistoryDoc, StatusDoc};

/// Data older than this (seconds) is stale. A fixed wall-clock constant,
/// deliberately not derived from the poll interval: staleness is about
/// absolute silence, not configured cadence.
pub const STALE_AFTER_SECS: i64 = 60;

/// Holds the two most recent documents. Replacement is wholesale on a
/// successful poll; a failed or partial poll never touches the prior pair.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    status: Option<StatusDoc>,
    history: Option<HistoryDoc>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, status: StatusDoc, history: HistoryDoc) {
        self.status = Some(status);
        self.history = Some(history);
    }

    pub fn status(&self) -> Option<&StatusDoc> {
        self.status.as_ref()
    }

    pub fn history(&self) -> Option<&HistoryDoc> {
        self.history.as_ref()
    }

    /// Merged freshness instant: the max of the two document timestamps.
    /// Either channel going quiet on its own drags the age up, which is
    /// exactly what staleness should measure.
    pub fn freshness(&self) -> Option<i64> {
        match (&self.status, &self.history) {
            (Some(s), Some(h)) => Some(s.timestamp.max(h.timestamp)),
            (Some(s), None) => Some(s.timestamp),
            (None, Some(h)) => Some(h.timestamp),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    Unknown,
}

/// Pure classification of data age against the fixed threshold.
/// `age > 60` is stale; exactly 60 still counts as fresh.
pub fn classify(now: i64, freshness: Option<i64>) -> Freshness {
    match freshness {
        None => Freshness::Unknown,
        Some(ts) if now - ts > STALE_AFTER_SECS => Freshness::Stale,
        Some(_) => Freshness::Fresh,
    }
}
