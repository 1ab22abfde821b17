//! Types that mirror the collector's two published JSON documents.

use indexmap::IndexMap;
use serde::Deserialize;

/// Per-interface state as reported by the collector in the status document.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IfaceStatus {
    Ok,
    NewInterface,
    IncompleteData,
    InvalidFormat,
    InvalidTime,
    MissingValues,
    Error,
}

impl IfaceStatus {
    /// Short label shown in place of rates when the interface has no usable data.
    pub fn label(self) -> &'static str {
        match self {
            IfaceStatus::Ok => "ok",
            IfaceStatus::NewInterface => "waiting",
            IfaceStatus::IncompleteData => "incomplete",
            IfaceStatus::InvalidFormat => "bad format",
            IfaceStatus::InvalidTime => "bad time",
            IfaceStatus::MissingValues => "missing",
            IfaceStatus::Error => "error",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IfaceEntry {
    pub status: IfaceStatus,
    pub display_name: Option<String>,
    // Mb/s; absent when the collector could not compute a rate this cycle
    #[serde(rename = "in")]
    pub inbound: Option<f64>,
    pub out: Option<f64>,
}

/// Current-state document. Map ordering is semantic (source tie-break,
/// row ordering), hence IndexMap throughout.
#[derive(Debug, Deserialize, Clone)]
pub struct StatusDoc {
    pub timestamp: i64,
    #[serde(default)]
    pub bandwidth_data: IndexMap<String, IndexMap<String, IfaceEntry>>,
    /// Configured rate ceilings keyed "<display>-<dir>", Mb/s.
    #[serde(default)]
    pub max_bandwidth: IndexMap<String, f64>,
    #[serde(default)]
    pub interface_names: IndexMap<String, String>,
    /// Seconds the collector spent questioning each source last cycle.
    #[serde(default)]
    pub polling_times: IndexMap<String, f64>,
}

/// Declared element order of a history series.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeriesOrder {
    NewestFirst,
    OldestFirst,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DirectionSeries {
    #[serde(rename = "in", default)]
    pub inbound: Vec<(i64, f64)>,
    #[serde(default)]
    pub out: Vec<(i64, f64)>,
}

/// Rolling history document: per-interface (timestamp, Mb/s) arrays.
#[derive(Debug, Deserialize, Clone)]
pub struct HistoryDoc {
    pub timestamp: i64,
    pub interval: i64,
    /// Producers should declare element order explicitly; when absent the
    /// consumer falls back to [`detect_order`].
    #[serde(default)]
    pub order: Option<SeriesOrder>,
    #[serde(default)]
    pub interfaces: IndexMap<String, DirectionSeries>,
}

/// Compatibility shim for documents that do not declare `order`: infer it
/// from the first two timestamps. With fewer than two elements the order is
/// unknowable; `None` means "ingest element-wise, do not reorder" (a single
/// element needs no order anyway).
pub fn detect_order(series: &[(i64, f64)]) -> Option<SeriesOrder> {
    let first = series.first()?;
    let second = series.get(1)?;
    if first.0 >= second.0 {
        Some(SeriesOrder::NewestFirst)
    } else {
        Some(SeriesOrder::OldestFirst)
    }
}
