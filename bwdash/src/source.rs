//! Active-source selection: pick which appliance the dashboard follows
//! when several are monitored.

use crate::types::{IfaceStatus, StatusDoc};

/// One source plus its derived activity score (count of interfaces
/// currently reporting `ok`). Recomputed on every successful poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAggregate {
    pub source: String,
    pub interfaces: Vec<String>,
    pub activity_score: usize,
}

pub fn aggregate_sources(doc: &StatusDoc) -> Vec<SourceAggregate> {
    doc.bandwidth_data
        .iter()
        .map(|(source, ifaces)| SourceAggregate {
            source: source.clone(),
            interfaces: ifaces.keys().cloned().collect(),
            activity_score: ifaces
                .values()
                .filter(|e| e.status == IfaceStatus::Ok)
                .count(),
        })
        .collect()
}

/// Highest activity score wins; ties go to the first source in document
/// order. When no source has an `ok` interface, fall back to the first
/// source present rather than selecting nothing. Flapping across polls is
/// accepted; callers wanting render stability debounce above this layer.
pub fn select_active(doc: &StatusDoc) -> Option<String> {
    let aggregates = aggregate_sources(doc);
    let mut best: Option<&SourceAggregate> = None;
    for agg in &aggregates {
        let beats = match best {
            Some(top) => agg.activity_score > top.activity_score,
            None => agg.activity_score > 0,
        };
        if beats {
            best = Some(agg);
        }
    }
    best.or_else(|| aggregates.first()).map(|a| a.source.clone())
}
