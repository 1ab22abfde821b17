//! Top header: active source, data age, staleness and stopped alerts.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::poller::PollerState;
use crate::snapshot::Freshness;
use crate::ui::theme;
use crate::ui::util::{fmt_age, fmt_poll_secs};

pub struct HeaderInfo<'a> {
    pub active_source: Option<&'a str>,
    pub freshness: Freshness,
    pub data_age: Option<i64>,
    pub poll_secs: Option<f64>,
    pub poller_state: PollerState,
    pub failures: u32,
}

pub fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, info: &HeaderInfo<'_>) {
    let mut spans: Vec<Span> = Vec::new();
    spans.push(Span::raw(format!(
        "bwdash — source: {}",
        info.active_source.unwrap_or("-")
    )));
    match info.data_age {
        Some(age) => spans.push(Span::raw(format!(" | data age: {}", fmt_age(age)))),
        None => spans.push(Span::raw(" | waiting for data")),
    }
    if let Some(p) = info.poll_secs {
        spans.push(Span::raw(format!(" | poll {}", fmt_poll_secs(p))));
    }
    if info.failures > 0 && info.poller_state != PollerState::Stopped {
        spans.push(Span::raw(format!(" | failures: {}", info.failures)));
    }

    // Persistent, unmissable alerts. Stopped wins over stale.
    let alert = Style::default()
        .fg(theme::ALERT_FG)
        .bg(theme::ALERT_BG)
        .add_modifier(Modifier::BOLD);
    if info.poller_state == PollerState::Stopped {
        spans.push(Span::styled(
            "  UPDATES STOPPED — press 'r' to restart  ",
            alert,
        ));
    } else if info.freshness == Freshness::Stale {
        spans.push(Span::styled("  STALE DATA  ", alert));
    }

    spans.push(Span::raw("  (q quit, s sort, tab chart, r restart)"));
    let line = Line::from(spans);
    f.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}
