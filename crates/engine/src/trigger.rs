//! Trigger evaluation.
//!
//! Answers one question: does the page state currently permit showing
//! anything? Which event to show is the scheduler's business, so adding a
//! trigger never touches queue logic.

use std::time::Duration;

use crate::config::Triggers;
use crate::page::PageState;

/// Named page-state condition that may open the display gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
	PageLoad,
	/// Reserved; no evaluator yet.
	Scroll,
	/// Reserved; no evaluator yet.
	Exit,
}

impl Trigger {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::PageLoad => "page_load",
			Self::Scroll => "scroll",
			Self::Exit => "exit",
		}
	}
}

/// Returns the trigger that currently permits display, if any.
///
/// `onPageLoad` opens the gate once `delay` has elapsed since the session
/// started and keeps it open for the rest of the session. `onScroll` and
/// `onExit` are never eligible.
pub fn evaluate(page: &PageState, triggers: &Triggers, delay: Duration, now: Duration) -> Option<Trigger> {
	if triggers.on_page_load && page.since_load(now) >= delay {
		return Some(Trigger::PageLoad);
	}
	None
}

/// Whether a pending notification may enter the scheduler now.
pub fn may_enter(page: &PageState, triggers: &Triggers, delay: Duration, now: Duration) -> bool {
	evaluate(page, triggers, delay, now).is_some()
}

/// Earliest engine time at which [`evaluate`] can start returning a trigger,
/// for drivers that sleep until the next interesting moment.
pub fn opens_at(page: &PageState, triggers: &Triggers, delay: Duration) -> Option<Duration> {
	triggers.on_page_load.then(|| page.session_started.saturating_add(delay))
}
