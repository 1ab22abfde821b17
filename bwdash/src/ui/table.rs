//! Per-interface rows: name, inbound and outbound rate text, fill bar in
//! the band color. Rows render exclusively from the reconciler's applied
//! view, never straight from the snapshot.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::reconcile::{EntityView, GaugeView};
use crate::ui::theme;

pub fn draw_table(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    rows: &[&EntityView],
    selected: usize,
    sort_label: &str,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Interfaces (sort: {sort_label})"));
    f.render_widget(block, area);

    let inner = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };
    if inner.height == 0 {
        return;
    }

    let show_n = (inner.height as usize).min(rows.len());
    let constraints: Vec<Constraint> = (0..show_n).map(|_| Constraint::Length(1)).collect();
    let vchunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, view) in rows.iter().take(show_n).enumerate() {
        let rect = vchunks[i];
        let hchunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(16),
                Constraint::Percentage(50),
                Constraint::Percentage(50),
            ])
            .split(rect);

        let mut name_style = Style::default();
        if i == selected {
            name_style = name_style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }
        let name = Line::from(Span::styled(format!(" {}", view.label), name_style));
        f.render_widget(Paragraph::new(name), hchunks[0]);

        draw_gauge(f, hchunks[1], "↓", &view.inbound);
        draw_gauge(f, hchunks[2], "↑", &view.outbound);
    }
}

fn draw_gauge(f: &mut ratatui::Frame<'_>, area: Rect, arrow: &str, gauge: &GaugeView) {
    // Reserve space for the rate text on the right of the bar
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(8), Constraint::Length(14)])
        .split(area);

    let color = theme::band_color(gauge.band);
    let width = cols[0].width.saturating_sub(1) as usize;
    let filled = ((gauge.pct / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    let bar: String = "█".repeat(filled) + &"░".repeat(width - filled);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(bar, Style::default().fg(color)))),
        cols[0],
    );

    let label = format!("{arrow} {:>10}", gauge.text);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(label, Style::default().fg(color))))
            .right_aligned(),
        cols[1],
    );
}
