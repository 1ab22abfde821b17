//! Poller state machine: failure counting, give-up, restart, ingestion.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use bwdash::fetch::{DocumentSource, FetchError};
use bwdash::poller::{PollOutcome, Poller, PollerState, MAX_FAILED_ATTEMPTS};
use bwdash::reconcile::rows_for_source;
use bwdash::stream::{Direction, StreamKey};
use bwdash::types::{HistoryDoc, StatusDoc};

/// Scripted document source: pops one pre-loaded result per fetch and
/// counts calls. An exhausted script parse-fails.
#[derive(Default)]
struct ScriptedSource {
    status: Mutex<VecDeque<Result<StatusDoc, FetchError>>>,
    history: Mutex<VecDeque<Result<HistoryDoc, FetchError>>>,
    calls: AtomicU32,
}

impl ScriptedSource {
    fn push_ok(&self, status: serde_json::Value, history: serde_json::Value) {
        self.status
            .lock()
            .unwrap()
            .push_back(Ok(serde_json::from_value(status).unwrap()));
        self.history
            .lock()
            .unwrap()
            .push_back(Ok(serde_json::from_value(history).unwrap()));
    }

    fn push_failure(&self) {
        self.status.lock().unwrap().push_back(Err(parse_err()));
        self.history.lock().unwrap().push_back(Err(parse_err()));
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

fn parse_err() -> FetchError {
    FetchError::Parse(serde_json::from_str::<serde_json::Value>("{").unwrap_err())
}

impl DocumentSource for ScriptedSource {
    async fn fetch_status(&self) -> Result<StatusDoc, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.status
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(parse_err()))
    }

    async fn fetch_history(&self) -> Result<HistoryDoc, FetchError> {
        self.history
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(parse_err()))
    }
}

fn two_source_status(a_ok: usize, b_ok: usize) -> serde_json::Value {
    let iface = |ok: bool| {
        serde_json::json!({
            "status": if ok { "ok" } else { "error" },
            "display_name": "WAN",
            "in": 1.0,
            "out": 2.0
        })
    };
    let build = |n: usize| {
        let mut m = serde_json::Map::new();
        for i in 0..3 {
            m.insert(format!("opt{i}"), iface(i < n));
        }
        serde_json::Value::Object(m)
    };
    serde_json::json!({
        "timestamp": 1000,
        "bandwidth_data": { "fwA": build(a_ok), "fwB": build(b_ok) }
    })
}

fn empty_history() -> serde_json::Value {
    serde_json::json!({ "timestamp": 1000, "interval": 10, "interfaces": {} })
}

#[tokio::test]
async fn successful_poll_updates_snapshot_and_selection() {
    let source = ScriptedSource::default();
    source.push_ok(two_source_status(3, 1), empty_history());
    let mut poller = Poller::new();

    assert_eq!(poller.poll(&source).await, PollOutcome::Updated);
    assert_eq!(poller.state(), PollerState::Idle);
    assert_eq!(poller.failures(), 0);
    assert_eq!(poller.active_source(), Some("fwA"));
    assert!(poller.store().status().is_some());
}

#[tokio::test]
async fn selection_flips_when_activity_moves() {
    let source = ScriptedSource::default();
    source.push_ok(two_source_status(3, 1), empty_history());
    source.push_ok(two_source_status(0, 2), empty_history());
    let mut poller = Poller::new();

    poller.poll(&source).await;
    assert_eq!(poller.active_source(), Some("fwA"));
    poller.poll(&source).await;
    assert_eq!(poller.active_source(), Some("fwB"));
}

#[tokio::test]
async fn no_ok_interfaces_falls_back_to_first_source() {
    let source = ScriptedSource::default();
    source.push_ok(two_source_status(0, 0), empty_history());
    let mut poller = Poller::new();

    poller.poll(&source).await;
    assert_eq!(poller.active_source(), Some("fwA"));
}

#[tokio::test]
async fn failures_preserve_prior_snapshot() {
    let source = ScriptedSource::default();
    source.push_ok(two_source_status(1, 0), empty_history());
    source.push_failure();
    let mut poller = Poller::new();

    poller.poll(&source).await;
    let ts = poller.store().freshness();
    assert_eq!(
        poller.poll(&source).await,
        PollOutcome::Failed { failures: 1 }
    );
    assert_eq!(poller.store().freshness(), ts);
}

#[tokio::test]
async fn gives_up_after_three_consecutive_failures() {
    let source = ScriptedSource::default();
    for _ in 0..MAX_FAILED_ATTEMPTS {
        source.push_failure();
    }
    let mut poller = Poller::new();

    assert_eq!(
        poller.poll(&source).await,
        PollOutcome::Failed { failures: 1 }
    );
    assert_eq!(
        poller.poll(&source).await,
        PollOutcome::Failed { failures: 2 }
    );
    assert_eq!(poller.poll(&source).await, PollOutcome::Stopped);
    assert_eq!(poller.state(), PollerState::Stopped);

    // No further retrieval attempts once stopped
    let before = source.calls();
    assert_eq!(poller.poll(&source).await, PollOutcome::Skipped);
    assert_eq!(source.calls(), before);
}

#[tokio::test]
async fn success_resets_the_failure_counter() {
    let source = ScriptedSource::default();
    source.push_failure();
    source.push_failure();
    source.push_ok(two_source_status(1, 0), empty_history());
    source.push_failure();
    let mut poller = Poller::new();

    poller.poll(&source).await;
    poller.poll(&source).await;
    assert_eq!(poller.failures(), 2);
    assert_eq!(poller.poll(&source).await, PollOutcome::Updated);
    assert_eq!(poller.failures(), 0);
    // One fresh failure starts the count over rather than stopping
    assert_eq!(
        poller.poll(&source).await,
        PollOutcome::Failed { failures: 1 }
    );
}

#[tokio::test]
async fn restart_is_the_only_way_out_of_stopped() {
    let source = ScriptedSource::default();
    for _ in 0..MAX_FAILED_ATTEMPTS {
        source.push_failure();
    }
    source.push_ok(two_source_status(1, 0), empty_history());
    let mut poller = Poller::new();

    for _ in 0..MAX_FAILED_ATTEMPTS {
        poller.poll(&source).await;
    }
    assert_eq!(poller.state(), PollerState::Stopped);

    poller.restart();
    assert_eq!(poller.state(), PollerState::Idle);
    assert_eq!(poller.failures(), 0);
    assert_eq!(poller.poll(&source).await, PollOutcome::Updated);
}

fn history_with_series(series: serde_json::Value, order: Option<&str>) -> serde_json::Value {
    let mut doc = serde_json::json!({
        "timestamp": 1000,
        "interval": 10,
        "interfaces": { "WAN": series }
    });
    if let Some(o) = order {
        doc["order"] = serde_json::json!(o);
    }
    doc
}

fn wan_key(direction: Direction) -> StreamKey {
    StreamKey {
        source: "fwA".into(),
        interface: "WAN".into(),
        direction,
    }
}

#[tokio::test]
async fn ingests_newest_first_history_into_oldest_first_streams() {
    let source = ScriptedSource::default();
    // The collector prepends entries, so documents arrive newest-first
    let series = serde_json::json!({
        "in": [[300, 3.0], [200, 2.0], [100, 1.0]],
        "out": [[300, 30.0], [200, 20.0], [100, 10.0]]
    });
    source.push_ok(two_source_status(1, 0), history_with_series(series, None));
    let mut poller = Poller::new();
    poller.poll(&source).await;

    let stream = poller.streams().get(&wan_key(Direction::In)).unwrap();
    let order: Vec<i64> = stream.windowed(300, 10_000).map(|s| s.timestamp).collect();
    assert_eq!(order, vec![100, 200, 300]);
    assert_eq!(stream.latest().unwrap().value, 3.0);
}

#[tokio::test]
async fn declared_order_beats_the_detection_shim() {
    let source = ScriptedSource::default();
    let series = serde_json::json!({ "in": [[100, 1.0], [200, 2.0]], "out": [] });
    source.push_ok(
        two_source_status(1, 0),
        history_with_series(series, Some("oldest_first")),
    );
    let mut poller = Poller::new();
    poller.poll(&source).await;

    let stream = poller.streams().get(&wan_key(Direction::In)).unwrap();
    assert_eq!(stream.latest().unwrap().timestamp, 200);
}

#[tokio::test]
async fn single_sample_series_ingests_without_guessing_order() {
    let source = ScriptedSource::default();
    let series = serde_json::json!({ "in": [[100, 1.5]], "out": [] });
    source.push_ok(two_source_status(1, 0), history_with_series(series, None));
    let mut poller = Poller::new();
    poller.poll(&source).await;

    let stream = poller.streams().get(&wan_key(Direction::In)).unwrap();
    assert_eq!(stream.len(), 1);
    assert_eq!(stream.latest().unwrap().value, 1.5);
}

#[tokio::test]
async fn redelivered_history_does_not_duplicate_samples() {
    let source = ScriptedSource::default();
    let series = serde_json::json!({
        "in": [[200, 2.0], [100, 1.0]],
        "out": [[200, 20.0], [100, 10.0]]
    });
    source.push_ok(
        two_source_status(1, 0),
        history_with_series(series.clone(), None),
    );
    // Second poll re-delivers the same array plus one new entry
    let extended = serde_json::json!({
        "in": [[300, 3.0], [200, 2.0], [100, 1.0]],
        "out": [[300, 30.0], [200, 20.0], [100, 10.0]]
    });
    source.push_ok(two_source_status(1, 0), history_with_series(extended, None));
    let mut poller = Poller::new();

    poller.poll(&source).await;
    poller.poll(&source).await;
    let stream = poller.streams().get(&wan_key(Direction::In)).unwrap();
    assert_eq!(stream.len(), 3);
}

#[tokio::test]
async fn entry_level_degradation_does_not_fail_the_poll() {
    let source = ScriptedSource::default();
    source.push_ok(
        serde_json::json!({
            "timestamp": 1000,
            "bandwidth_data": {
                "fwA": {
                    "wan": { "status": "ok", "display_name": "WAN", "in": 1.0, "out": 2.0 },
                    "opt1": { "status": "missing_values", "display_name": "DMZ" }
                }
            }
        }),
        empty_history(),
    );
    let mut poller = Poller::new();

    // One broken interface degrades its own row only
    assert_eq!(poller.poll(&source).await, PollOutcome::Updated);
    assert_eq!(poller.state(), PollerState::Idle);
    assert_eq!(poller.failures(), 0);

    let status = poller.store().status().unwrap();
    let rows = rows_for_source(status, "fwA", |_, _| 100.0);
    assert_eq!(rows[0].in_value, 1.0);
    assert_eq!(rows[1].in_text, "missing");
    assert_eq!(rows[1].out_text, "missing");
    assert_eq!(rows[1].in_value, 0.0);
}
