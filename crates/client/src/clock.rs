use std::time::Duration;

use nudge_engine::Clock;
use tokio::time::Instant;

/// Engine clock backed by tokio's time driver, so paused-time tests and the
/// driver's sleeps agree on what "now" is.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
	origin: Instant,
}

impl TokioClock {
	pub fn new() -> Self {
		Self { origin: Instant::now() }
	}
}

impl Default for TokioClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for TokioClock {
	fn now(&self) -> Duration {
		self.origin.elapsed()
	}
}
