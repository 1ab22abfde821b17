//! History chart for one interface pair: inbound and outbound drawn as two
//! line datasets over the effective time window.

use ratatui::{
    layout::Rect,
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
};

use crate::chart::{axis_ticks, effective_window, map_points, MIN_CEILING};
use crate::stream::MetricStream;
use crate::ui::theme;
use crate::ui::util::fmt_rate;

pub fn draw_graph(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    now: i64,
    inbound: Option<&MetricStream>,
    outbound: Option<&MetricStream>,
) {
    let oldest = [inbound, outbound]
        .into_iter()
        .flatten()
        .flat_map(|s| s.windowed(now, i64::MAX / 2).map(|x| x.timestamp))
        .min();
    let window = effective_window(now, oldest);

    let window_max = [inbound, outbound]
        .into_iter()
        .flatten()
        .flat_map(|s| s.windowed(now, window).map(|x| x.value))
        .fold(0.0f64, f64::max);
    // Axis top snaps to the last tick; axis_ticks guarantees it clears the
    // headroom ceiling so peaks never sit on the border
    let ticks = axis_ticks(window_max, 6);
    let ceiling = ticks.last().copied().unwrap_or(MIN_CEILING).max(MIN_CEILING);

    let in_pts: Vec<(f64, f64)> = inbound
        .map(|s| map_points(s.windowed(now, window), now, window, ceiling))
        .unwrap_or_default();
    let out_pts: Vec<(f64, f64)> = outbound
        .map(|s| map_points(s.windowed(now, window), now, window, ceiling))
        .unwrap_or_default();

    let datasets = vec![
        Dataset::default()
            .name("in")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme::IN_LINE))
            .data(&in_pts),
        Dataset::default()
            .name("out")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme::OUT_LINE))
            .data(&out_pts),
    ];

    let y_labels: Vec<Span> = ticks.iter().map(|t| Span::raw(fmt_rate(*t))).collect();
    let x_labels: Vec<Span> = vec![
        Span::raw(format!("-{}m", window / 60)),
        Span::raw(format!("-{}m", window / 120)),
        Span::raw("now".to_string()),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string()),
        )
        .x_axis(Axis::default().bounds([0.0, 1.0]).labels(x_labels))
        .y_axis(Axis::default().bounds([0.0, 1.0]).labels(y_labels));
    f.render_widget(chart, area);
}
