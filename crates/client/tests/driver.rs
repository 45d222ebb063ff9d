//! Driver behaviour under paused tokio time.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use nudge_client::{TokioClock, run_engine, spawn_poller};
use nudge_engine::render::HeadlessSurface;
use nudge_engine::{Engine, EventSource, FeedFetchError, PageEvent, RawEventRecord, WidgetConfig};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Replays scripted poll results, then returns empty batches.
struct ScriptedSource {
	script: Mutex<VecDeque<Result<Vec<RawEventRecord>, FeedFetchError>>>,
	calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
	fn new(script: Vec<Result<Vec<RawEventRecord>, FeedFetchError>>) -> (Self, Arc<AtomicUsize>) {
		let calls = Arc::new(AtomicUsize::new(0));
		let source = Self {
			script: Mutex::new(script.into()),
			calls: Arc::clone(&calls),
		};
		(source, calls)
	}
}

#[async_trait]
impl EventSource for ScriptedSource {
	async fn fetch(&self) -> Result<Vec<RawEventRecord>, FeedFetchError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		let next = self.script.lock().unwrap().pop_front();
		next.unwrap_or_else(|| Ok(Vec::new()))
	}
}

fn batch(ids: &[&str]) -> Vec<RawEventRecord> {
	let records: Vec<_> = ids
		.iter()
		.map(|id| json!({ "id": id, "type": "purchase", "timestamp": "2026-05-01T12:00:00Z", "title": id }))
		.collect();
	serde_json::from_value(json!(records)).unwrap()
}

fn malformed() -> FeedFetchError {
	FeedFetchError::Malformed(serde_json::from_str::<Vec<RawEventRecord>>("{").unwrap_err())
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn failed_cycles_are_skipped_and_polling_continues() {
	let (source, calls) = ScriptedSource::new(vec![
		Err(FeedFetchError::Status(503)),
		Err(malformed()),
		Ok(batch(&["a"])),
		Err(FeedFetchError::Transport("connection reset".to_string())),
		Ok(batch(&["a", "b"])),
	]);
	let cancel = CancellationToken::new();
	let (batch_tx, batch_rx) = mpsc::channel(8);
	let (_page_tx, page_rx) = mpsc::unbounded_channel::<PageEvent>();

	let poller = spawn_poller(source, Duration::from_secs(30), batch_tx, cancel.clone());
	let engine = Engine::new(WidgetConfig::defaults_for("site"), HeadlessSurface::new(), (), TokioClock::new());
	let driver = tokio::spawn(run_engine(engine, batch_rx, page_rx, cancel.clone()));

	tokio::time::sleep(Duration::from_secs(200)).await;
	cancel.cancel();
	let engine = driver.await.unwrap();
	poller.await.unwrap();

	// Polls at 0, 30, 60, ..., 180 seconds.
	assert_eq!(calls.load(Ordering::SeqCst), 7);
	assert_eq!(engine.surface().mounted_total(), 2);
	assert!(engine.scheduler().is_idle());
	assert_eq!(engine.scheduler().timer_count(), 0);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn driver_sleeps_until_the_next_wakeup() {
	let cancel = CancellationToken::new();
	let (batch_tx, batch_rx) = mpsc::channel(8);
	let (_page_tx, page_rx) = mpsc::unbounded_channel::<PageEvent>();
	let engine = Engine::new(WidgetConfig::defaults_for("site"), HeadlessSurface::new(), (), TokioClock::new());
	let driver = tokio::spawn(run_engine(engine, batch_rx, page_rx, cancel.clone()));

	batch_tx.send(batch(&["a"])).await.unwrap();
	// Shown at 3 s, hidden at 8 s, detached at 8.5 s.
	tokio::time::sleep(Duration::from_millis(3050)).await;
	cancel.cancel();
	let engine = driver.await.unwrap();
	assert_eq!(engine.surface().len(), 1);
	assert_eq!(engine.scheduler().visible_count(), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn navigation_events_reach_the_engine() {
	let cancel = CancellationToken::new();
	let (batch_tx, batch_rx) = mpsc::channel(8);
	let (page_tx, page_rx) = mpsc::unbounded_channel();
	let engine = Engine::new(WidgetConfig::defaults_for("site"), HeadlessSurface::new(), (), TokioClock::new());
	let driver = tokio::spawn(run_engine(engine, batch_rx, page_rx, cancel.clone()));

	batch_tx.send(batch(&["a", "b"])).await.unwrap();
	tokio::time::sleep(Duration::from_secs(1)).await;
	page_tx.send(PageEvent::Navigate).unwrap();
	tokio::time::sleep(Duration::from_secs(30)).await;
	cancel.cancel();

	let engine = driver.await.unwrap();
	assert_eq!(engine.page().session, 1);
	assert_eq!(engine.surface().mounted_total(), 0);
	assert!(engine.scheduler().is_idle());
}
