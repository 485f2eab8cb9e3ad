//! Autosave timing tests
//!
//! Uses tokio's paused clock so the debounce and rate-limit windows can be
//! checked deterministically against the wall-clock contract the form layer
//! relies on. `sleep` drives the clock: under a paused runtime it advances
//! virtual time and polls pending tasks, so scheduled commits actually run.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use procura::{AutosaveCoordinator, AutosaveError, CommitRequest, DraftSink};
use tokio::time::{sleep, Instant};

struct RecordingSink {
    commits: AtomicUsize,
    payloads: Mutex<Vec<serde_json::Value>>,
    times: Mutex<Vec<Instant>>,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(RecordingSink {
            commits: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
            times: Mutex::new(Vec::new()),
        })
    }

    fn count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

/// Local handle around the shared recorder so it can carry the sink trait.
struct SinkHandle(Arc<RecordingSink>);

#[async_trait]
impl DraftSink for SinkHandle {
    async fn commit(&self, request: CommitRequest) -> Result<(), AutosaveError> {
        self.0.commits.fetch_add(1, Ordering::SeqCst);
        self.0.payloads.lock().unwrap().push(request.payload);
        self.0.times.lock().unwrap().push(Instant::now());
        Ok(())
    }
}

fn edit(field: &str, value: &str) -> CommitRequest {
    CommitRequest {
        state_id: Some(101),
        payload: serde_json::json!({ field: value }),
    }
}

#[tokio::test(start_paused = true)]
async fn test_typing_burst_produces_single_commit_at_window_end() {
    let sink = RecordingSink::new();
    let mut coordinator = AutosaveCoordinator::new(SinkHandle(Arc::clone(&sink)));
    let start = Instant::now();

    coordinator.trigger(edit("predmet", "N"), false).await.unwrap();
    sleep(Duration::from_millis(500)).await;
    coordinator.trigger(edit("predmet", "Ná"), false).await.unwrap();
    sleep(Duration::from_millis(1500)).await;
    coordinator.trigger(edit("predmet", "Nákup"), false).await.unwrap();

    sleep(Duration::from_millis(4000)).await;
    assert_eq!(sink.count(), 1);
    let fired = sink.times.lock().unwrap()[0];
    assert_eq!(fired.duration_since(start), Duration::from_millis(3000));
    // The commit carries the latest payload, not the first.
    assert_eq!(sink.payloads.lock().unwrap()[0]["predmet"], "Nákup");
}

#[tokio::test(start_paused = true)]
async fn test_rapid_discrete_choices_are_rate_limited() {
    let sink = RecordingSink::new();
    let mut coordinator = AutosaveCoordinator::new(SinkHandle(Arc::clone(&sink)));
    let start = Instant::now();

    coordinator.trigger(edit("zdroj_financovani", "LP"), true).await.unwrap();
    assert_eq!(sink.count(), 1);

    sleep(Duration::from_millis(200)).await;
    coordinator.trigger(edit("zdroj_financovani", "Smlouva"), true).await.unwrap();
    // Second click is deferred, not dropped and not committed inline.
    assert_eq!(sink.count(), 1);
    assert!(coordinator.is_scheduled());

    sleep(Duration::from_millis(2000)).await;
    assert_eq!(sink.count(), 2);
    let times = sink.times.lock().unwrap();
    assert!(times[1].duration_since(start) >= Duration::from_millis(1000));
    drop(times);
    assert_eq!(sink.payloads.lock().unwrap()[1]["zdroj_financovani"], "Smlouva");
}

#[tokio::test(start_paused = true)]
async fn test_immediate_supersedes_pending_delayed_commit() {
    let sink = RecordingSink::new();
    let mut coordinator = AutosaveCoordinator::new(SinkHandle(Arc::clone(&sink)));

    coordinator.trigger(edit("popis", "rozepsaný text"), false).await.unwrap();
    sleep(Duration::from_millis(100)).await;
    coordinator.trigger(edit("zdroj_financovani", "Pokladna"), true).await.unwrap();

    // The immediate commit replaced the delayed one; nothing else fires.
    assert_eq!(sink.count(), 1);
    sleep(Duration::from_millis(10_000)).await;
    assert_eq!(sink.count(), 1);
    assert_eq!(sink.payloads.lock().unwrap()[0]["zdroj_financovani"], "Pokladna");
}

#[tokio::test(start_paused = true)]
async fn test_commits_never_overlap() {
    let sink = RecordingSink::new();
    let mut coordinator = AutosaveCoordinator::new(SinkHandle(Arc::clone(&sink)));

    for i in 0..10 {
        coordinator.trigger(edit("predmet", &format!("v{i}")), false).await.unwrap();
        sleep(Duration::from_millis(100)).await;
    }
    sleep(Duration::from_millis(10_000)).await;

    // Ten rapid edits within one window collapse to one write.
    assert_eq!(sink.count(), 1);
    assert_eq!(sink.payloads.lock().unwrap()[0]["predmet"], "v9");
}
