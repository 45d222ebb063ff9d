//! Event feed: fetched records → deduplicated, oldest-first notifications.
//!
//! The collaborator serves the most recent events newest first. The feed
//! re-sorts each batch chronologically so the scheduler replays activity in
//! the order it happened, and suppresses ids already handed out using a
//! bounded FIFO recency window. Fetching is polling; callers re-invoke
//! [`EventSource::fetch`] on a fixed interval.

use std::collections::VecDeque;

use async_trait::async_trait;
use rustc_hash::FxHashSet;

use crate::error::FeedFetchError;
use crate::event::{NotificationEvent, RawEventRecord};

/// Default number of recently seen ids remembered for deduplication.
pub const DEFAULT_RECENCY_CAPACITY: usize = 500;

/// Source of one finite batch of raw records per call.
#[async_trait]
pub trait EventSource: Send + Sync {
	async fn fetch(&self) -> Result<Vec<RawEventRecord>, FeedFetchError>;
}

/// Bounded set of recently seen ids. The oldest id is evicted first.
#[derive(Debug)]
pub struct RecencyWindow {
	order: VecDeque<String>,
	seen: FxHashSet<String>,
	capacity: usize,
}

impl RecencyWindow {
	pub fn new(capacity: usize) -> Self {
		let capacity = capacity.max(1);
		Self {
			order: VecDeque::with_capacity(capacity),
			seen: FxHashSet::default(),
			capacity,
		}
	}

	pub fn contains(&self, id: &str) -> bool {
		self.seen.contains(id)
	}

	/// Records `id`. Returns false if it was already present.
	pub fn insert(&mut self, id: &str) -> bool {
		if self.seen.contains(id) {
			return false;
		}
		while self.order.len() >= self.capacity {
			if let Some(evicted) = self.order.pop_front() {
				self.seen.remove(&evicted);
			}
		}
		self.order.push_back(id.to_string());
		self.seen.insert(id.to_string());
		true
	}

	pub fn len(&self) -> usize {
		self.order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}
}

/// Feed cursor for one engine instance.
#[derive(Debug)]
pub struct EventFeed {
	window: RecencyWindow,
}

impl Default for EventFeed {
	fn default() -> Self {
		Self::new(DEFAULT_RECENCY_CAPACITY)
	}
}

impl EventFeed {
	pub fn new(recency_capacity: usize) -> Self {
		Self {
			window: RecencyWindow::new(recency_capacity),
		}
	}

	/// Turns one fetched batch into a lazy, oldest-first sequence of unseen
	/// events.
	///
	/// Presence pings and unusable records are dropped up front. An id is
	/// marked as seen when the iterator yields it.
	pub fn next_batch(&mut self, records: &[RawEventRecord]) -> FeedBatch<'_> {
		let mut events: Vec<NotificationEvent> = records.iter().filter_map(NotificationEvent::from_record).collect();
		// Served newest first; reversing before the stable sort keeps equal
		// timestamps in the order they happened.
		events.reverse();
		events.sort_by_key(|event| event.timestamp);
		tracing::trace!(fetched = records.len(), displayable = events.len(), "feed batch prepared");
		FeedBatch {
			events: events.into_iter(),
			window: &mut self.window,
		}
	}

	pub fn has_seen(&self, id: &str) -> bool {
		self.window.contains(id)
	}
}

/// Lazy iterator over one batch, deduplicating as it goes.
#[derive(Debug)]
pub struct FeedBatch<'a> {
	events: std::vec::IntoIter<NotificationEvent>,
	window: &'a mut RecencyWindow,
}

impl Iterator for FeedBatch<'_> {
	type Item = NotificationEvent;

	fn next(&mut self) -> Option<Self::Item> {
		for event in self.events.by_ref() {
			if self.window.insert(&event.id) {
				return Some(event);
			}
			tracing::trace!(event_id = %event.id, "duplicate event suppressed");
		}
		None
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(0, self.events.size_hint().1)
	}
}
