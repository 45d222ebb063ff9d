//! Monotonic time sources for the engine.
//!
//! The engine never reads time on its own; it asks a [`Clock`] for the time
//! elapsed since the clock's origin. Production embeds use [`SystemClock`];
//! tests and offline replays drive a [`ManualClock`] by hand.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Source of monotonic engine time.
pub trait Clock: Send {
	/// Time elapsed since this clock's origin.
	fn now(&self) -> Duration;

	/// Wall-clock time, used for impression timestamps and relative-time text.
	fn wall(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// Clock backed by [`Instant`], anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
	origin: Instant,
}

impl SystemClock {
	pub fn new() -> Self {
		Self { origin: Instant::now() }
	}
}

impl Default for SystemClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for SystemClock {
	fn now(&self) -> Duration {
		self.origin.elapsed()
	}
}

/// Hand-driven clock. Clones share the same reading, so a test can keep one
/// handle while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
	nanos: Arc<AtomicU64>,
}

impl ManualClock {
	/// Creates a clock reading zero.
	pub fn new() -> Self {
		Self::default()
	}

	/// Moves the clock forward.
	pub fn advance(&self, by: Duration) {
		let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
		self.nanos.fetch_add(by, Ordering::AcqRel);
	}

	/// Jumps to an absolute reading. Moving backwards is ignored.
	pub fn set(&self, at: Duration) {
		let at = u64::try_from(at.as_nanos()).unwrap_or(u64::MAX);
		self.nanos.fetch_max(at, Ordering::AcqRel);
	}
}

impl Clock for ManualClock {
	fn now(&self) -> Duration {
		Duration::from_nanos(self.nanos.load(Ordering::Acquire))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn manual_clock_is_shared_between_clones() {
		let clock = ManualClock::new();
		let handle = clock.clone();
		handle.advance(Duration::from_millis(250));
		assert_eq!(clock.now(), Duration::from_millis(250));
	}

	#[test]
	fn manual_clock_never_runs_backwards() {
		let clock = ManualClock::new();
		clock.set(Duration::from_secs(5));
		clock.set(Duration::from_secs(2));
		assert_eq!(clock.now(), Duration::from_secs(5));
	}
}
