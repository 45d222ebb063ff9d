//! Async driver for one engine.

use std::future;
use std::time::Duration;

use nudge_engine::{Clock, Engine, EventSource, ImpressionSink, PageEvent, RawEventRecord, Surface};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Polls `source` every `interval` and forwards non-empty batches.
///
/// The first poll happens immediately. A failed cycle is logged and skipped;
/// the next poll still runs on the fixed interval. The task ends when
/// `cancel` fires or the receiver is dropped.
pub fn spawn_poller<E>(source: E, interval: Duration, batches: mpsc::Sender<Vec<RawEventRecord>>, cancel: CancellationToken) -> JoinHandle<()>
where
	E: EventSource + 'static,
{
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(interval);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
		loop {
			tokio::select! {
				biased;
				() = cancel.cancelled() => break,
				_ = ticker.tick() => {}
			}
			let result = tokio::select! {
				biased;
				() = cancel.cancelled() => break,
				result = source.fetch() => result,
			};
			match result {
				Ok(records) if records.is_empty() => tracing::trace!("feed poll returned no records"),
				Ok(records) => {
					if batches.send(records).await.is_err() {
						break;
					}
				}
				Err(err) => tracing::warn!(error = %err, "feed poll failed, skipping cycle"),
			}
		}
		tracing::debug!("feed poller stopped");
	})
}

/// Runs `engine` until `cancel` fires, then hands it back.
///
/// Batches and page events are applied as they arrive; in between, the
/// driver sleeps until the engine's next wakeup. Closed input channels are
/// simply no longer polled.
pub async fn run_engine<S, I, C>(
	mut engine: Engine<S, I, C>,
	mut batches: mpsc::Receiver<Vec<RawEventRecord>>,
	mut page_events: mpsc::UnboundedReceiver<PageEvent>,
	cancel: CancellationToken,
) -> Engine<S, I, C>
where
	S: Surface,
	I: ImpressionSink,
	C: Clock,
{
	let mut batches_open = true;
	let mut page_open = true;
	engine.tick();

	loop {
		let wakeup = engine.next_wakeup().map(|at| at.saturating_sub(engine.now()));
		let sleep = async move {
			match wakeup {
				Some(delay) => tokio::time::sleep(delay).await,
				None => future::pending().await,
			}
		};

		tokio::select! {
			biased;
			() = cancel.cancelled() => break,
			batch = batches.recv(), if batches_open => match batch {
				Some(records) => {
					let enqueued = engine.ingest(&records);
					tracing::debug!(enqueued, "batch received");
				}
				None => batches_open = false,
			},
			event = page_events.recv(), if page_open => match event {
				Some(event) => {
					engine.page_event(event);
				}
				None => page_open = false,
			},
			() = sleep => {}
		}
		engine.tick();
	}

	tracing::debug!(?engine, "engine driver stopped");
	engine
}
