//! Incremental view reconciliation: compare candidate row values against the
//! last values actually applied, and emit only the mutations that differ.
//! Pure with respect to any rendering surface, so it unit-tests without one.

use std::collections::HashMap;

use crate::stream::Direction;
use crate::types::{IfaceStatus, StatusDoc};
use crate::ui::util::fmt_rate;

/// Bar values below this are treated as zero for display purposes.
pub const ZERO_EPSILON: f64 = 0.005;

/// Fixed five-band step function of fill percentage. A step function, not a
/// gradient, so every entity shares one visual vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBand {
    Inactive,
    Nominal,
    Elevated,
    High,
    VeryHigh,
    Critical,
}

pub fn band_for(pct: f64) -> ColorBand {
    if pct <= 0.0 {
        ColorBand::Inactive
    } else if pct <= 50.0 {
        ColorBand::Nominal
    } else if pct <= 70.0 {
        ColorBand::Elevated
    } else if pct <= 80.0 {
        ColorBand::High
    } else if pct <= 90.0 {
        ColorBand::VeryHigh
    } else {
        ColorBand::Critical
    }
}

/// `min(value / stream_max * 100, 100)`, guarded: a non-positive ceiling or
/// an effectively-zero value yields 0.
pub fn fill_percentage(value: f64, stream_max: f64) -> f64 {
    if value < ZERO_EPSILON || stream_max <= 0.0 {
        return 0.0;
    }
    (value / stream_max * 100.0).min(100.0)
}

/// Candidate values for one displayed row, as computed from the latest
/// snapshot. `bar_value`/`stream_max` are raw Mb/s; percentage and band are
/// derived here so callers cannot disagree on the scaling rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RowValues {
    pub entity: String,
    pub label: String,
    pub in_text: String,
    pub out_text: String,
    pub in_value: f64,
    pub out_value: f64,
    pub in_max: f64,
    pub out_max: f64,
}

/// Candidate rows for one source, straight from the status document and in
/// document order. `stream_max` supplies the bar ceiling per display name
/// and direction; sorting is the caller's concern.
pub fn rows_for_source(
    status: &StatusDoc,
    source: &str,
    stream_max: impl Fn(&str, Direction) -> f64,
) -> Vec<RowValues> {
    let Some(ifaces) = status.bandwidth_data.get(source) else {
        return Vec::new();
    };
    ifaces
        .iter()
        .map(|(id, entry)| {
            let display = entry
                .display_name
                .clone()
                .or_else(|| status.interface_names.get(id).cloned())
                .unwrap_or_else(|| id.to_string());
            let (in_value, in_text) = direction_cell(entry.inbound, entry.status);
            let (out_value, out_text) = direction_cell(entry.out, entry.status);
            RowValues {
                entity: display.clone(),
                label: display.clone(),
                in_text,
                out_text,
                in_value,
                out_value,
                in_max: stream_max(&display, Direction::In),
                out_max: stream_max(&display, Direction::Out),
            }
        })
        .collect()
}

/// Text and bar value for one direction cell: a formatted rate when the
/// entry is usable, otherwise the status label with an empty bar. The
/// degradation is scoped to the row and never counts against the poll.
pub fn direction_cell(value: Option<f64>, status: IfaceStatus) -> (f64, String) {
    if status != IfaceStatus::Ok {
        return (0.0, status.label().to_string());
    }
    match value {
        Some(v) => (v, fmt_rate(v)),
        None => (0.0, "waiting".to_string()),
    }
}

/// Last-applied attributes for one direction of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeView {
    pub text: String,
    pub pct: f64,
    pub band: ColorBand,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    pub label: String,
    pub inbound: GaugeView,
    pub outbound: GaugeView,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    SetLabel {
        entity: String,
        value: String,
    },
    SetText {
        entity: String,
        direction: Direction,
        value: String,
    },
    SetBar {
        entity: String,
        direction: Direction,
        pct: f64,
    },
    SetBand {
        entity: String,
        direction: Direction,
        band: ColorBand,
    },
}

/// Owns the cache of last-applied values. Applying the same rows twice
/// yields no mutations the second time.
#[derive(Debug, Default)]
pub struct ViewReconciler {
    state: HashMap<String, EntityView>,
}

impl ViewReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The applied view, i.e. exactly what a renderer should draw.
    pub fn view(&self, entity: &str) -> Option<&EntityView> {
        self.state.get(entity)
    }

    pub fn reconcile(&mut self, rows: &[RowValues]) -> Vec<Mutation> {
        let mut mutations = Vec::new();
        for row in rows {
            match self.state.get_mut(&row.entity) {
                None => {
                    let view = EntityView {
                        label: row.label.clone(),
                        inbound: gauge_from(row, Direction::In),
                        outbound: gauge_from(row, Direction::Out),
                    };
                    mutations.push(Mutation::SetLabel {
                        entity: row.entity.clone(),
                        value: view.label.clone(),
                    });
                    for (direction, gauge) in
                        [(Direction::In, &view.inbound), (Direction::Out, &view.outbound)]
                    {
                        mutations.push(Mutation::SetText {
                            entity: row.entity.clone(),
                            direction,
                            value: gauge.text.clone(),
                        });
                        mutations.push(Mutation::SetBar {
                            entity: row.entity.clone(),
                            direction,
                            pct: gauge.pct,
                        });
                        mutations.push(Mutation::SetBand {
                            entity: row.entity.clone(),
                            direction,
                            band: gauge.band,
                        });
                    }
                    self.state.insert(row.entity.clone(), view);
                }
                Some(view) => {
                    if view.label != row.label {
                        view.label = row.label.clone();
                        mutations.push(Mutation::SetLabel {
                            entity: row.entity.clone(),
                            value: row.label.clone(),
                        });
                    }
                    reconcile_gauge(
                        &row.entity,
                        Direction::In,
                        &mut view.inbound,
                        gauge_from(row, Direction::In),
                        &mut mutations,
                    );
                    reconcile_gauge(
                        &row.entity,
                        Direction::Out,
                        &mut view.outbound,
                        gauge_from(row, Direction::Out),
                        &mut mutations,
                    );
                }
            }
        }
        mutations
    }
}

fn gauge_from(row: &RowValues, direction: Direction) -> GaugeView {
    let (text, value, max) = match direction {
        Direction::In => (&row.in_text, row.in_value, row.in_max),
        Direction::Out => (&row.out_text, row.out_value, row.out_max),
    };
    let pct = fill_percentage(value, max);
    GaugeView {
        text: text.clone(),
        pct,
        band: band_for(pct),
    }
}

/// Per-attribute diff for one direction. A candidate bar collapsing to zero
/// while a non-zero applied value exists is suppressed, so one transient
/// zero-valued sample does not visually flatten an active indicator. The
/// suppression never touches the text attribute and is independent between
/// directions.
fn reconcile_gauge(
    entity: &str,
    direction: Direction,
    applied: &mut GaugeView,
    candidate: GaugeView,
    mutations: &mut Vec<Mutation>,
) {
    if applied.text != candidate.text {
        applied.text = candidate.text.clone();
        mutations.push(Mutation::SetText {
            entity: entity.to_string(),
            direction,
            value: candidate.text,
        });
    }
    let suppress_zero = candidate.pct <= 0.0 && applied.pct > 0.0;
    if !suppress_zero {
        if applied.pct != candidate.pct {
            applied.pct = candidate.pct;
            mutations.push(Mutation::SetBar {
                entity: entity.to_string(),
                direction,
                pct: candidate.pct,
            });
        }
        if applied.band != candidate.band {
            applied.band = candidate.band;
            mutations.push(Mutation::SetBand {
                entity: entity.to_string(),
                direction,
                band: candidate.band,
            });
        }
    }
}
