//! Chart geometry: auto-scaled axis ticks and (time, value) → unit-square
//! point mapping. Pure; `ui::graph` turns the output into widgets.

use crate::stream::Sample;

/// Headroom multiplier so peaks are not clipped at the canvas edge.
pub const HEADROOM: f64 = 1.2;
/// Floor for the value ceiling, avoids division by zero on empty data.
pub const MIN_CEILING: f64 = 0.1;
/// Charts never collapse below a five-minute window.
pub const MIN_WINDOW_SECS: i64 = 300;
/// Samples implied to fall more than this fraction beyond the window are
/// dropped rather than clamped, so stale tails are not drawn.
pub const WINDOW_TOLERANCE: f64 = 0.02;

/// Value ceiling for one chart: headroom over the window max across both
/// directions, floored to stay positive.
pub fn value_ceiling(window_max: f64) -> f64 {
    (window_max * HEADROOM).max(MIN_CEILING)
}

/// "Nice" axis tick values for a chart topping out at `max_value`.
/// Candidate steps are magnitude/5, magnitude/2, magnitude and magnitude*2;
/// the smallest one yielding at most `max_ticks` ticks wins. Ticks run
/// `i*step` while `<= max_value * 1.01`. Non-positive input degenerates to
/// a single zero tick.
pub fn nice_axis_values(max_value: f64, max_ticks: usize) -> Vec<f64> {
    if !(max_value > 0.0) {
        return vec![0.0];
    }
    // Cap so limit and the magnitude candidates stay finite; a hostile
    // document can put any finite value in a stream
    let max_value = max_value.min(1e300);
    let max_ticks = max_ticks.max(3).min(6);
    let magnitude = 10f64.powf(max_value.log10().floor());
    let candidates = [
        magnitude / 5.0,
        magnitude / 2.0,
        magnitude,
        magnitude * 2.0,
    ];
    let limit = max_value * 1.01;
    let mut step = candidates[candidates.len() - 1];
    for cand in candidates {
        let count = (limit / cand).floor() as usize + 1;
        if count <= max_ticks {
            step = cand;
            break;
        }
    }
    let mut ticks = Vec::new();
    let mut i = 0u32;
    loop {
        let v = f64::from(i) * step;
        if v > limit {
            break;
        }
        ticks.push(v);
        i += 1;
    }
    ticks
}

/// Tick values for a rendered chart: nice ticks over the headroom ceiling,
/// extended by whole steps until the top tick clears it. The renderer snaps
/// its y bound to the top tick (evenly spread labels must be value-true),
/// so without the extension a window max landing exactly on a tick would
/// draw flush against the canvas edge.
pub fn axis_ticks(window_max: f64, max_ticks: usize) -> Vec<f64> {
    let ceiling = value_ceiling(window_max).min(1e300);
    let mut ticks = nice_axis_values(ceiling, max_ticks);
    if ticks.len() >= 2 {
        let step = ticks[1] - ticks[0];
        while ticks.last().map_or(false, |&t| t < ceiling) {
            let next = ticks.last().copied().unwrap_or(0.0) + step;
            ticks.push(next);
        }
    }
    ticks
}

/// Effective time window: the observed span, floored at five minutes.
pub fn effective_window(now: i64, oldest: Option<i64>) -> i64 {
    let span = oldest.map_or(0, |ts| now - ts);
    span.max(MIN_WINDOW_SECS)
}

/// Map samples onto the unit square: x mirrored so the most recent sample
/// is rightmost, y scaled by `ceiling`. Samples older than the window by
/// more than the tolerance are dropped. Output is sorted by x ascending,
/// ready to connect with straight segments.
pub fn map_points<'a, I>(samples: I, now: i64, window_secs: i64, ceiling: f64) -> Vec<(f64, f64)>
where
    I: IntoIterator<Item = &'a Sample>,
{
    let window = window_secs.max(1) as f64;
    let mut points: Vec<(f64, f64)> = samples
        .into_iter()
        .filter_map(|s| {
            let age = (now - s.timestamp) as f64;
            let frac = age / window;
            if frac > 1.0 + WINDOW_TOLERANCE {
                return None;
            }
            let x = (1.0 - frac).clamp(0.0, 1.0);
            let y = (s.value / ceiling).clamp(0.0, 1.0);
            Some((x, y))
        })
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    points
}
