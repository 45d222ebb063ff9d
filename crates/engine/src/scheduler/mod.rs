//! Display scheduler.
//!
//! Owns every [`ScheduledSlot`] and moves each one through
//!
//! ```text
//! Pending ──admit──▶ Showing ──settle──▶ HoldingFull ──hide──▶ Hiding ──exit window──▶ Removed
//!    └──────────────── revoked / overflow ─────────────────────────────────────────────▶ Removed
//! ```
//!
//! Admission is strict FIFO by arrival and gated by the trigger verdict, the
//! on-screen capacity and the spacing interval. All waits are cancellable
//! timers evaluated by [`Scheduler::tick`]; a slot that leaves the scheduler
//! early takes its timers with it, so no stale transition can fire later.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Overflow, WidgetConfig};
use crate::event::NotificationEvent;
use crate::timers::{TimerHandle, Timers};

mod slot;

pub use slot::{ScheduledSlot, SlotId, SlotState, Transition};

/// Grace between mounting a notification and applying its settled styles, so
/// the initial styles are committed before the transition starts.
pub const SETTLE_GRACE: Duration = Duration::from_millis(100);
/// Time between applying exit styles and detaching the element.
pub const EXIT_WINDOW: Duration = Duration::from_millis(500);

/// Admission verdict for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
	/// Trigger evaluator and device rules permit showing.
	pub eligible: bool,
	/// Maximum slots on screen (Showing, HoldingFull or Hiding).
	pub capacity: usize,
}

impl Gate {
	pub const fn open(capacity: usize) -> Self {
		Self { eligible: true, capacity }
	}

	pub const fn closed() -> Self {
		Self { eligible: false, capacity: 1 }
	}
}

/// Timing and queue settings the scheduler applies to new admissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerPolicy {
	/// Zero keeps a slot until a replacement is pending.
	pub display_duration: Duration,
	pub interval: Duration,
	pub max_pending: usize,
	pub overflow: Overflow,
}

impl SchedulerPolicy {
	pub fn from_config(config: &WidgetConfig) -> Self {
		Self {
			display_duration: config.timing.display_duration,
			interval: config.timing.interval,
			max_pending: config.limits.max_pending,
			overflow: config.limits.overflow,
		}
	}
}

impl Default for SchedulerPolicy {
	fn default() -> Self {
		Self::from_config(&WidgetConfig::defaults_for(""))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
	Settle,
	Hide,
	Remove,
	/// Spacing gap ends for the head of the pending queue.
	Admit,
}

#[derive(Debug, Clone, Copy)]
struct TimerKey {
	slot: SlotId,
	kind: TimerKind,
}

/// Slot queue and lifecycle state machine.
#[derive(Debug)]
pub struct Scheduler {
	/// Waiting slots in arrival order.
	pending: VecDeque<ScheduledSlot>,
	/// On-screen slots in admission order.
	active: Vec<ScheduledSlot>,
	timers: Timers<TimerKey>,
	next_id: u64,
	/// Earliest time the next admission may happen.
	next_admission: Duration,
	policy: SchedulerPolicy,
}

impl Default for Scheduler {
	fn default() -> Self {
		Self::new(SchedulerPolicy::default())
	}
}

impl Scheduler {
	pub fn new(policy: SchedulerPolicy) -> Self {
		Self {
			pending: VecDeque::new(),
			active: Vec::new(),
			timers: Timers::new(),
			next_id: 0,
			next_admission: Duration::ZERO,
			policy,
		}
	}

	pub fn policy(&self) -> &SchedulerPolicy {
		&self.policy
	}

	/// Replaces the policy. Slots already on screen keep their deadlines.
	pub fn set_policy(&mut self, policy: SchedulerPolicy) {
		self.policy = policy;
	}

	/// Appends an event to the pending queue.
	///
	/// Returns the discard transition when the queue was full and the
	/// overflow policy dropped a slot (the oldest pending one, or this one).
	pub fn enqueue(&mut self, event: NotificationEvent, now: Duration) -> Option<Transition> {
		let id = SlotId(self.next_id);
		self.next_id = self.next_id.wrapping_add(1);
		let mut slot = ScheduledSlot::new(id, Arc::new(event), now);

		let mut dropped = None;
		if self.pending.len() >= self.policy.max_pending.max(1) {
			match self.policy.overflow {
				Overflow::DropNewest => {
					tracing::debug!(slot = %id, event_id = %slot.event.id, "pending queue full, dropping incoming");
					slot.state = SlotState::Removed;
					return Some(slot.transition(SlotState::Pending, now));
				}
				Overflow::DropOldest => {
					if let Some(oldest) = self.pending.pop_front() {
						tracing::debug!(slot = %oldest.id, event_id = %oldest.event.id, "pending queue full, dropping oldest");
						dropped = Some(self.discard(oldest, now));
					}
				}
			}
		}

		self.pending.push_back(slot);
		dropped
	}

	/// Fires due timers and admits pending slots, returning every transition
	/// in the order it happened.
	pub fn tick(&mut self, now: Duration, gate: Gate) -> Vec<Transition> {
		let mut out = Vec::new();
		loop {
			while let Some((at, handle, key)) = self.timers.pop_due(now) {
				self.fire(at, handle, key, &mut out);
			}
			self.admit(now, gate, &mut out);
			if self.timers.next_deadline().is_none_or(|deadline| deadline > now) {
				break;
			}
		}
		out
	}

	/// Discards every pending slot. Used when eligibility is revoked.
	pub fn revoke_pending(&mut self, now: Duration) -> Vec<Transition> {
		let pending: Vec<_> = self.pending.drain(..).collect();
		if !pending.is_empty() {
			tracing::debug!(count = pending.len(), "eligibility revoked, discarding pending slots");
		}
		pending.into_iter().map(|slot| self.discard(slot, now)).collect()
	}

	/// Drops a slot whose render target disappeared, cancelling its timers.
	pub fn abandon(&mut self, id: SlotId, now: Duration) -> Option<Transition> {
		if let Some(idx) = self.active_index(id) {
			let slot = self.active.remove(idx);
			self.next_admission = self.next_admission.max(now.saturating_add(self.policy.interval));
			return Some(self.discard(slot, now));
		}
		let idx = self.pending.iter().position(|s| s.id == id)?;
		let slot = self.pending.remove(idx)?;
		Some(self.discard(slot, now))
	}

	pub fn slot(&self, id: SlotId) -> Option<&ScheduledSlot> {
		self.active.iter().chain(self.pending.iter()).find(|s| s.id == id)
	}

	/// Waiting slots in arrival order.
	pub fn pending(&self) -> impl Iterator<Item = &ScheduledSlot> {
		self.pending.iter()
	}

	/// On-screen slots in admission order.
	pub fn active(&self) -> &[ScheduledSlot] {
		&self.active
	}

	/// Slots currently in Showing or HoldingFull.
	pub fn visible_count(&self) -> usize {
		self.active.iter().filter(|s| s.state.is_visible()).count()
	}

	/// Earliest timer deadline.
	pub fn next_deadline(&self) -> Option<Duration> {
		self.timers.next_deadline()
	}

	/// Live timers across all slots.
	pub fn timer_count(&self) -> usize {
		self.timers.len()
	}

	pub fn is_idle(&self) -> bool {
		self.pending.is_empty() && self.active.is_empty()
	}

	fn fire(&mut self, at: Duration, handle: TimerHandle, key: TimerKey, out: &mut Vec<Transition>) {
		if key.kind == TimerKind::Admit {
			// Admission itself happens in `admit`; the timer only wakes the tick.
			if let Some(slot) = self.pending.iter_mut().find(|s| s.id == key.slot) {
				slot.timers.retain(|h| *h != handle);
			}
			return;
		}

		let Some(idx) = self.active_index(key.slot) else {
			return;
		};
		self.active[idx].timers.retain(|h| *h != handle);
		let state = self.active[idx].state;
		match key.kind {
			TimerKind::Settle if state == SlotState::Showing => {
				let slot = &mut self.active[idx];
				slot.state = SlotState::HoldingFull;
				out.push(slot.transition(SlotState::Showing, at));
			}
			TimerKind::Hide if state.is_visible() => self.begin_hiding(idx, at, out),
			TimerKind::Remove if state == SlotState::Hiding => self.finish(idx, at, out),
			_ => {}
		}
	}

	fn admit(&mut self, now: Duration, gate: Gate, out: &mut Vec<Transition>) {
		if self.pending.is_empty() || !gate.eligible {
			return;
		}
		let capacity = gate.capacity.max(1);

		while !self.pending.is_empty() {
			if self.active.len() >= capacity {
				self.supersede(now, out);
				return;
			}
			if self.next_admission > now {
				self.arm_admission();
				return;
			}
			let Some(mut slot) = self.pending.pop_front() else {
				break;
			};
			for handle in slot.timers.drain(..) {
				self.timers.cancel(handle);
			}

			slot.lane = Some(self.free_lane());
			slot.state = SlotState::Showing;
			slot.scheduled_show = Some(now);
			slot.shown_at = Some(now);
			let settle = self.timers.schedule(now.saturating_add(SETTLE_GRACE), TimerKey {
				slot: slot.id,
				kind: TimerKind::Settle,
			});
			slot.timers.push(settle);

			let display_duration = self.policy.display_duration;
			if !display_duration.is_zero() {
				let hide_at = now.saturating_add(display_duration);
				slot.expected_hide = Some(hide_at);
				let hide = self.timers.schedule(hide_at, TimerKey {
					slot: slot.id,
					kind: TimerKind::Hide,
				});
				slot.timers.push(hide);
			}

			tracing::trace!(slot = %slot.id, event_id = %slot.event.id, lane = ?slot.lane, "slot admitted");
			out.push(slot.transition(SlotState::Pending, now));
			self.active.push(slot);
		}
	}

	/// Makes sure the head of the queue wakes up when the spacing gap ends.
	fn arm_admission(&mut self) {
		let at = self.next_admission;
		let Some(head) = self.pending.front_mut() else {
			return;
		};
		if head.scheduled_show == Some(at) && !head.timers.is_empty() {
			return;
		}
		for handle in head.timers.drain(..) {
			self.timers.cancel(handle);
		}
		let handle = self.timers.schedule(at, TimerKey {
			slot: head.id,
			kind: TimerKind::Admit,
		});
		head.timers.push(handle);
		head.scheduled_show = Some(at);
	}

	/// Hides the oldest settled sticky slot so a pending replacement can
	/// take its place. At most one slot is superseded at a time.
	fn supersede(&mut self, now: Duration, out: &mut Vec<Transition>) {
		if self.active.iter().any(|s| s.state == SlotState::Hiding) {
			return;
		}
		let sticky = self
			.active
			.iter()
			.enumerate()
			.filter(|(_, s)| s.state == SlotState::HoldingFull && s.expected_hide.is_none())
			.min_by_key(|(_, s)| s.shown_at)
			.map(|(idx, _)| idx);
		if let Some(idx) = sticky {
			tracing::trace!(slot = %self.active[idx].id, "superseding sticky slot");
			self.begin_hiding(idx, now, out);
		}
	}

	fn begin_hiding(&mut self, idx: usize, at: Duration, out: &mut Vec<Transition>) {
		let slot = &mut self.active[idx];
		let from = slot.state;
		for handle in slot.timers.drain(..) {
			self.timers.cancel(handle);
		}
		slot.state = SlotState::Hiding;
		let remove = self.timers.schedule(at.saturating_add(EXIT_WINDOW), TimerKey {
			slot: slot.id,
			kind: TimerKind::Remove,
		});
		slot.timers.push(remove);
		out.push(slot.transition(from, at));
	}

	fn finish(&mut self, idx: usize, at: Duration, out: &mut Vec<Transition>) {
		let mut slot = self.active.remove(idx);
		for handle in slot.timers.drain(..) {
			self.timers.cancel(handle);
		}
		slot.state = SlotState::Removed;
		self.next_admission = self.next_admission.max(at.saturating_add(self.policy.interval));
		out.push(slot.transition(SlotState::Hiding, at));
	}

	fn discard(&mut self, mut slot: ScheduledSlot, now: Duration) -> Transition {
		let from = slot.state;
		for handle in slot.timers.drain(..) {
			self.timers.cancel(handle);
		}
		slot.state = SlotState::Removed;
		slot.transition(from, now)
	}

	fn active_index(&self, id: SlotId) -> Option<usize> {
		self.active.iter().position(|s| s.id == id)
	}

	/// Lowest lane not held by an on-screen slot.
	fn free_lane(&self) -> u16 {
		(0..=u16::MAX).find(|lane| !self.active.iter().any(|s| s.lane == Some(*lane))).unwrap_or(u16::MAX)
	}
}
