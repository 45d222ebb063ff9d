//! Scheduler slot types.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use smallvec::SmallVec;

use crate::event::NotificationEvent;
use crate::timers::TimerHandle;

/// Identifier of one slot, unique per scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub(crate) u64);

impl SlotId {
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for SlotId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Lifecycle state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SlotState {
	/// Queued, not yet on screen.
	#[default]
	Pending,
	/// Mounted, entry styles applied.
	Showing,
	/// Settled at full visibility.
	HoldingFull,
	/// Exit styles applied, waiting for the exit window to close.
	Hiding,
	/// Detached or discarded.
	Removed,
}

impl SlotState {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Showing => "showing",
			Self::HoldingFull => "holding_full",
			Self::Hiding => "hiding",
			Self::Removed => "removed",
		}
	}

	/// Counts against the concurrency limit.
	pub const fn is_visible(self) -> bool {
		matches!(self, Self::Showing | Self::HoldingFull)
	}

	/// Occupies a lane on screen.
	pub const fn is_on_screen(self) -> bool {
		matches!(self, Self::Showing | Self::HoldingFull | Self::Hiding)
	}
}

impl fmt::Display for SlotState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One event moving through the display lifecycle.
#[derive(Debug, Clone)]
pub struct ScheduledSlot {
	pub(super) id: SlotId,
	pub(super) event: Arc<NotificationEvent>,
	pub(super) state: SlotState,
	/// When the slot entered the queue.
	pub(super) enqueued_at: Duration,
	/// Planned admission time while waiting on the spacing gap.
	pub(super) scheduled_show: Option<Duration>,
	pub(super) shown_at: Option<Duration>,
	/// Auto-hide deadline; `None` while pending or for sticky slots.
	pub(super) expected_hide: Option<Duration>,
	/// Stacking lane while on screen.
	pub(super) lane: Option<u16>,
	/// Timers that would transition this slot.
	pub(super) timers: SmallVec<[TimerHandle; 2]>,
}

impl ScheduledSlot {
	pub(super) fn new(id: SlotId, event: Arc<NotificationEvent>, now: Duration) -> Self {
		Self {
			id,
			event,
			state: SlotState::Pending,
			enqueued_at: now,
			scheduled_show: None,
			shown_at: None,
			expected_hide: None,
			lane: None,
			timers: SmallVec::new(),
		}
	}

	pub fn id(&self) -> SlotId {
		self.id
	}

	pub fn event(&self) -> &NotificationEvent {
		&self.event
	}

	pub fn state(&self) -> SlotState {
		self.state
	}

	pub fn enqueued_at(&self) -> Duration {
		self.enqueued_at
	}

	pub fn scheduled_show(&self) -> Option<Duration> {
		self.scheduled_show
	}

	pub fn shown_at(&self) -> Option<Duration> {
		self.shown_at
	}

	pub fn expected_hide(&self) -> Option<Duration> {
		self.expected_hide
	}

	pub fn lane(&self) -> Option<u16> {
		self.lane
	}

	/// Number of live timers owned by this slot.
	pub fn timer_count(&self) -> usize {
		self.timers.len()
	}

	/// Records the change from `from` to the slot's current state.
	pub(super) fn transition(&self, from: SlotState, at: Duration) -> Transition {
		Transition {
			slot: self.id,
			event: Arc::clone(&self.event),
			from,
			to: self.state,
			lane: self.lane,
			at,
		}
	}
}

/// State change emitted by the scheduler for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
	pub slot: SlotId,
	pub event: Arc<NotificationEvent>,
	pub from: SlotState,
	pub to: SlotState,
	pub lane: Option<u16>,
	/// Engine time the transition took effect.
	pub at: Duration,
}

impl Transition {
	/// True for slots dropped before they were ever rendered.
	pub fn is_discard(&self) -> bool {
		self.from == SlotState::Pending && self.to == SlotState::Removed
	}
}
