//! App state and main loop: input handling, poll scheduling, reconciling
//! the table view, and drawing.

use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDir, Layout},
    Terminal,
};
use tokio::time::sleep;
use tracing::debug;

use crate::fetch::DocumentSource;
use crate::poller::{Clock, Poller, PollerState, SystemClock};
use crate::prefs::{load_prefs, save_prefs, PrefsFile, SortBy};
use crate::reconcile::{rows_for_source, RowValues, ViewReconciler};
use crate::snapshot::classify;
use crate::stream::{Direction, StreamKey};
use crate::types::StatusDoc;
use crate::ui::{graph::draw_graph, header::draw_header, header::HeaderInfo, table::draw_table};
use crate::ui::util::fmt_rate;

pub struct App {
    poller: Poller,
    reconciler: ViewReconciler,
    clock: SystemClock,

    sort: SortBy,
    /// Display order of entities after the latest reconcile pass.
    row_order: Vec<String>,
    selected: usize,

    interval: Duration,
    last_poll: Instant,

    should_quit: bool,
}

impl App {
    pub fn new(interval: Duration) -> Self {
        Self {
            poller: Poller::new(),
            reconciler: ViewReconciler::new(),
            clock: SystemClock,
            sort: load_prefs().sort,
            row_order: Vec::new(),
            selected: 0,
            interval,
            last_poll: Instant::now()
                .checked_sub(interval)
                .unwrap_or_else(Instant::now), // trigger immediately on first loop
            should_quit: false,
        }
    }

    pub async fn run<S: DocumentSource>(&mut self, source: &S) -> anyhow::Result<()> {
        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let res = self.event_loop(&mut terminal, source).await;

        // Teardown
        disable_raw_mode()?;
        let backend = terminal.backend_mut();
        execute!(backend, LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn event_loop<B: ratatui::backend::Backend, S: DocumentSource>(
        &mut self,
        terminal: &mut Terminal<B>,
        source: &S,
    ) -> anyhow::Result<()> {
        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                if let Event::Key(k) = event::read()? {
                    self.handle_key(k.code);
                }
            }
            if self.should_quit {
                break;
            }

            // Fetch on schedule; a skipped or failed poll still waits a
            // full interval before the next attempt
            if self.poller.state() != PollerState::Stopped
                && self.last_poll.elapsed() >= self.interval
            {
                let outcome = self.poller.poll(source).await;
                debug!(?outcome, "poll cycle");
                self.last_poll = Instant::now();
            }

            // Reconcile + draw every tick: freshness and elapsed-time
            // displays stay current even while the poller is backed off
            self.reconcile_rows();
            terminal.draw(|f| self.draw(f))?;

            sleep(Duration::from_millis(250)).await;
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('s') => {
                self.sort = self.sort.next();
                let _ = save_prefs(&PrefsFile {
                    sort: self.sort,
                    version: 1,
                });
            }
            KeyCode::Tab | KeyCode::Right => {
                if !self.row_order.is_empty() {
                    self.selected = (self.selected + 1) % self.row_order.len();
                }
            }
            KeyCode::BackTab | KeyCode::Left => {
                if !self.row_order.is_empty() {
                    self.selected =
                        (self.selected + self.row_order.len() - 1) % self.row_order.len();
                }
            }
            KeyCode::Char('r') => {
                // External restart is the only way out of Stopped
                self.poller.restart();
            }
            _ => {}
        }
    }

    /// Build candidate row values from the latest snapshot and feed them
    /// through the reconciler. Only differing attributes mutate the view.
    fn reconcile_rows(&mut self) {
        let Some(active) = self.poller.active_source().map(str::to_string) else {
            return;
        };
        let Some(status) = self.poller.store().status() else {
            return;
        };

        let mut rows: Vec<RowValues> = rows_for_source(status, &active, |display, direction| {
            self.stream_max(status, &active, display, direction)
        });

        match self.sort {
            SortBy::Document => {}
            SortBy::Name => rows.sort_by(|a, b| a.label.cmp(&b.label)),
            SortBy::RateInDesc => rows.sort_by(|a, b| b.in_value.total_cmp(&a.in_value)),
            SortBy::RateOutDesc => rows.sort_by(|a, b| b.out_value.total_cmp(&a.out_value)),
        }

        let mutations = self.reconciler.reconcile(&rows);
        if !mutations.is_empty() {
            debug!(count = mutations.len(), "applied view mutations");
        }

        self.row_order = rows.into_iter().map(|r| r.entity).collect();
        if self.selected >= self.row_order.len() {
            self.selected = 0;
        }
    }

    /// Bar ceiling: the larger of the configured ceiling and the stream's
    /// long-run observed max.
    fn stream_max(
        &self,
        status: &StatusDoc,
        active: &str,
        display: &str,
        direction: Direction,
    ) -> f64 {
        let dir = match direction {
            Direction::In => "in",
            Direction::Out => "out",
        };
        let configured = status
            .max_bandwidth
            .get(&format!("{display}-{dir}"))
            .copied()
            .unwrap_or(0.0);
        let observed = self
            .poller
            .streams()
            .get(&StreamKey {
                source: active.to_string(),
                interface: display.to_string(),
                direction,
            })
            .map(|s| s.observed_max())
            .unwrap_or(0.0);
        configured.max(observed)
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();
        let rows = Layout::default()
            .direction(LayoutDir::Vertical)
            .constraints([
                Constraint::Length(2),  // header
                Constraint::Min(6),     // interface table
                Constraint::Length(12), // history chart
            ])
            .split(area);

        let now = self.clock.now_epoch();
        let freshness_ts = self.poller.store().freshness();
        let active = self.poller.active_source().map(str::to_string);
        let info = HeaderInfo {
            active_source: active.as_deref(),
            freshness: classify(now, freshness_ts),
            data_age: freshness_ts.map(|ts| (now - ts).max(0)),
            poll_secs: active.as_deref().and_then(|a| {
                self.poller
                    .store()
                    .status()
                    .and_then(|s| s.polling_times.get(a).copied())
            }),
            poller_state: self.poller.state(),
            failures: self.poller.failures(),
        };
        draw_header(f, rows[0], &info);

        let views: Vec<_> = self
            .row_order
            .iter()
            .filter_map(|e| self.reconciler.view(e))
            .collect();
        draw_table(f, rows[1], &views, self.selected, self.sort.label());

        if let (Some(active), Some(entity)) = (active.as_deref(), self.row_order.get(self.selected))
        {
            let key = |direction| StreamKey {
                source: active.to_string(),
                interface: entity.clone(),
                direction,
            };
            let inbound = self.poller.streams().get(&key(Direction::In));
            let outbound = self.poller.streams().get(&key(Direction::Out));
            let title = format!(
                "{entity} — in {} / out {}",
                fmt_rate_of(inbound),
                fmt_rate_of(outbound)
            );
            draw_graph(f, rows[2], &title, now, inbound, outbound);
        } else {
            draw_graph(f, rows[2], "history", now, None, None);
        }
    }
}

fn fmt_rate_of(stream: Option<&crate::stream::MetricStream>) -> String {
    stream
        .and_then(|s| s.latest())
        .map(|s| fmt_rate(s.value))
        .unwrap_or_else(|| "-".into())
}
