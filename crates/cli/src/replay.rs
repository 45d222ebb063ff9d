//! Offline replay of recorded feed payloads on a virtual clock.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::time::Duration;

use nudge_engine::{Engine, Impression, ManualClock, PageEvent, RawEventRecord, SlotState, Transition, Viewport, WidgetConfig};

use crate::surface::TraceSurface;

/// Something fed to the engine at a fixed engine time.
#[derive(Debug, Clone)]
pub enum ReplayInput {
	Batch(Vec<RawEventRecord>),
	Navigate,
}

/// Scripted replay.
#[derive(Debug, Clone)]
pub struct ReplayPlan {
	pub config: WidgetConfig,
	pub viewport: Viewport,
	/// Inputs with the engine time they are applied at.
	pub inputs: Vec<(Duration, ReplayInput)>,
	/// Replay stops at this engine time.
	pub until: Duration,
}

/// One rendered timeline row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
	pub at: Duration,
	pub event_id: String,
	pub from: SlotState,
	pub to: SlotState,
	pub lane: Option<u16>,
}

impl TimelineEntry {
	fn from_transition(transition: &Transition) -> Self {
		Self {
			at: transition.at,
			event_id: transition.event.id.clone(),
			from: transition.from,
			to: transition.to,
			lane: transition.lane,
		}
	}
}

impl std::fmt::Display for TimelineEntry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:>9.3}s  {:<12} {:>12} -> {:<12}", self.at.as_secs_f64(), self.event_id, self.from.as_str(), self.to.as_str())?;
		if let Some(lane) = self.lane {
			write!(f, " lane {lane}")?;
		}
		Ok(())
	}
}

#[derive(Debug, Default)]
pub struct ReplayOutcome {
	pub timeline: Vec<TimelineEntry>,
	pub impressions: Vec<Impression>,
}

/// Runs `plan` to completion, jumping the clock between inputs and engine
/// wakeups.
pub fn replay(plan: ReplayPlan) -> ReplayOutcome {
	let clock = ManualClock::new();
	let (tx, rx) = mpsc::channel();
	let mut engine = Engine::new(plan.config, TraceSurface::default(), tx, clock.clone()).with_viewport(plan.viewport);

	let mut inputs: Vec<_> = plan.inputs;
	inputs.sort_by_key(|(at, _)| *at);
	let mut inputs = VecDeque::from(inputs);
	let mut outcome = ReplayOutcome::default();
	let mut record = |transitions: Vec<Transition>| {
		outcome.timeline.extend(transitions.iter().map(TimelineEntry::from_transition));
	};

	loop {
		let next_input = inputs.front().map(|(at, _)| *at);
		let next = [next_input, engine.next_wakeup()]
			.into_iter()
			.flatten()
			.filter(|at| *at <= plan.until)
			.min();
		let Some(at) = next else {
			break;
		};
		clock.set(at);
		while inputs.front().is_some_and(|(due, _)| *due <= at) {
			let Some((_, input)) = inputs.pop_front() else {
				break;
			};
			match input {
				ReplayInput::Batch(records) => {
					let enqueued = engine.ingest(&records);
					tracing::debug!(at = ?at, enqueued, "replayed batch");
				}
				ReplayInput::Navigate => record(engine.page_event(PageEvent::Navigate)),
			}
		}
		record(engine.tick());
	}
	clock.set(plan.until);
	record(engine.tick());

	drop(engine);
	outcome.impressions = rx.try_iter().collect();
	outcome
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	fn batch(ids: &[&str]) -> ReplayInput {
		let records: Vec<_> = ids
			.iter()
			.map(|id| json!({ "id": id, "type": "signup", "timestamp": "2026-05-01T12:00:00Z" }))
			.collect();
		ReplayInput::Batch(serde_json::from_value(json!(records)).unwrap())
	}

	fn plan(inputs: Vec<(Duration, ReplayInput)>) -> ReplayPlan {
		ReplayPlan {
			config: WidgetConfig::defaults_for("replay"),
			viewport: Viewport::DESKTOP,
			inputs,
			until: Duration::from_secs(60),
		}
	}

	#[test]
	fn replays_polls_in_time_order() {
		let outcome = replay(plan(vec![
			(Duration::from_secs(30), batch(&["b", "a"])),
			(Duration::ZERO, batch(&["a"])),
		]));
		let shown: Vec<_> = outcome
			.timeline
			.iter()
			.filter(|e| e.to == SlotState::Showing)
			.map(|e| (e.event_id.as_str(), e.at))
			.collect();
		assert_eq!(shown, vec![("a", Duration::from_secs(3)), ("b", Duration::from_secs(30))]);
		let ids: Vec<_> = outcome.impressions.iter().map(|i| i.event_id.as_str()).collect();
		assert_eq!(ids, ["a", "b"]);
	}

	#[test]
	fn navigation_drops_the_backlog() {
		let outcome = replay(plan(vec![
			(Duration::ZERO, batch(&["c", "b", "a"])),
			(Duration::from_secs(4), ReplayInput::Navigate),
		]));
		let discarded = outcome.timeline.iter().filter(|e| e.from == SlotState::Pending && e.to == SlotState::Removed).count();
		assert_eq!(discarded, 2);
		assert_eq!(outcome.impressions.len(), 1);
	}

	#[test]
	fn timeline_rows_are_readable() {
		let entry = TimelineEntry {
			at: Duration::from_millis(3100),
			event_id: "a".to_string(),
			from: SlotState::Showing,
			to: SlotState::HoldingFull,
			lane: Some(0),
		};
		let row = entry.to_string();
		assert!(row.contains("3.100s"), "{row}");
		assert!(row.contains("showing -> holding_full"), "{row}");
		assert!(row.ends_with("lane 0"), "{row}");
	}
}
