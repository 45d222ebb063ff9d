use nudge_engine::{Impression, ImpressionSink};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Fire-and-forget impression reporter.
///
/// [`report`](ImpressionSink::report) only enqueues; a background task posts
/// each impression to `{endpoint}/track-impression`. Failures are logged and
/// never reach the engine.
#[derive(Debug, Clone)]
pub struct HttpImpressionSink {
	tx: mpsc::UnboundedSender<Impression>,
}

impl HttpImpressionSink {
	/// Spawns the reporter task. It stops once every sink clone is dropped
	/// and the queue is drained, or when `cancel` fires.
	pub fn spawn(client: reqwest::Client, url: Url, cancel: CancellationToken) -> (Self, JoinHandle<()>) {
		let (tx, rx) = mpsc::unbounded_channel();
		let task = tokio::spawn(report_loop(client, url, rx, cancel));
		(Self { tx }, task)
	}
}

impl ImpressionSink for HttpImpressionSink {
	fn report(&self, impression: Impression) {
		if self.tx.send(impression).is_err() {
			tracing::debug!("impression reporter stopped, dropping impression");
		}
	}
}

async fn report_loop(client: reqwest::Client, url: Url, mut rx: mpsc::UnboundedReceiver<Impression>, cancel: CancellationToken) {
	loop {
		let impression = tokio::select! {
			biased;
			() = cancel.cancelled() => break,
			next = rx.recv() => match next {
				Some(impression) => impression,
				None => break,
			},
		};
		match client.post(url.clone()).json(&impression).send().await {
			Ok(response) if response.status().is_success() => {
				tracing::trace!(event_id = %impression.event_id, "impression delivered");
			}
			Ok(response) => {
				tracing::warn!(event_id = %impression.event_id, status = response.status().as_u16(), "impression rejected");
			}
			Err(err) => {
				tracing::warn!(event_id = %impression.event_id, error = %err, "impression delivery failed");
			}
		}
	}
	tracing::debug!("impression reporter stopped");
}
