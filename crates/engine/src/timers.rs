//! Cancellable deadline set.
//!
//! Stands in for browser `setTimeout` handles: every scheduled timer gets a
//! [`TimerHandle`] that can be cancelled before it fires, and due timers are
//! popped in deadline order by the scheduler's tick.

use std::collections::BTreeMap;
use std::time::Duration;

use rustc_hash::FxHashMap;

/// Handle to one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Ordered set of pending deadlines carrying a payload each.
#[derive(Debug)]
pub struct Timers<K> {
	/// Pending timers ordered by deadline, ties broken by scheduling order.
	queue: BTreeMap<(Duration, u64), K>,
	/// Deadline lookup for cancellation.
	deadlines: FxHashMap<u64, Duration>,
	next_id: u64,
}

impl<K> Default for Timers<K> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K> Timers<K> {
	pub fn new() -> Self {
		Self {
			queue: BTreeMap::new(),
			deadlines: FxHashMap::default(),
			next_id: 0,
		}
	}

	/// Schedules `key` to fire at `at`.
	pub fn schedule(&mut self, at: Duration, key: K) -> TimerHandle {
		let id = self.next_id;
		self.next_id = self.next_id.wrapping_add(1);
		self.queue.insert((at, id), key);
		self.deadlines.insert(id, at);
		TimerHandle(id)
	}

	/// Cancels a timer. Returns false if it already fired or was cancelled.
	pub fn cancel(&mut self, handle: TimerHandle) -> bool {
		match self.deadlines.remove(&handle.0) {
			Some(at) => self.queue.remove(&(at, handle.0)).is_some(),
			None => false,
		}
	}

	/// Pops the earliest timer whose deadline is at or before `now`.
	pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, TimerHandle, K)> {
		let (&(at, _), _) = self.queue.first_key_value()?;
		if at > now {
			return None;
		}
		let ((at, id), key) = self.queue.pop_first()?;
		self.deadlines.remove(&id);
		Some((at, TimerHandle(id), key))
	}

	/// Earliest pending deadline.
	pub fn next_deadline(&self) -> Option<Duration> {
		self.queue.first_key_value().map(|(&(at, _), _)| at)
	}

	pub fn len(&self) -> usize {
		self.queue.len()
	}

	pub fn is_empty(&self) -> bool {
		self.queue.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pops_in_deadline_order() {
		let mut timers = Timers::new();
		timers.schedule(Duration::from_millis(300), "late");
		timers.schedule(Duration::from_millis(100), "early");
		timers.schedule(Duration::from_millis(100), "early-second");

		let now = Duration::from_millis(500);
		let order: Vec<_> = std::iter::from_fn(|| timers.pop_due(now)).map(|(_, _, k)| k).collect();
		assert_eq!(order, ["early", "early-second", "late"]);
	}

	#[test]
	fn does_not_pop_future_timers() {
		let mut timers = Timers::new();
		timers.schedule(Duration::from_secs(2), ());
		assert!(timers.pop_due(Duration::from_secs(1)).is_none());
		assert_eq!(timers.next_deadline(), Some(Duration::from_secs(2)));
	}

	#[test]
	fn cancelled_timer_never_fires() {
		let mut timers = Timers::new();
		let handle = timers.schedule(Duration::from_millis(10), "gone");
		assert!(timers.cancel(handle));
		assert!(!timers.cancel(handle));
		assert!(timers.pop_due(Duration::from_secs(60)).is_none());
		assert!(timers.is_empty());
	}
}
