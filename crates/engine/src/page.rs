//! Host page state as seen by the engine.

use std::time::Duration;

use crate::trigger::Trigger;

/// Viewports narrower than this are treated as mobile.
pub const MOBILE_BREAKPOINT_PX: u32 = 768;

/// Size of the host page's visible area, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
	pub width: u32,
	pub height: u32,
}

impl Viewport {
	pub const DESKTOP: Self = Self { width: 1280, height: 800 };
	pub const MOBILE: Self = Self { width: 390, height: 844 };

	pub const fn new(width: u32, height: u32) -> Self {
		Self { width, height }
	}

	pub const fn is_mobile(&self) -> bool {
		self.width < MOBILE_BREAKPOINT_PX
	}
}

impl Default for Viewport {
	fn default() -> Self {
		Self::DESKTOP
	}
}

/// Page-state transition reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageEvent {
	/// Scroll position sample, as a fraction of the scrollable height.
	Scroll { depth: f32 },
	/// Pointer left the document towards the browser chrome.
	ExitIntent,
	/// Periodic idle tick with no other change.
	IdleTick,
	/// The host navigated; a new page session starts.
	Navigate,
	Resize(Viewport),
}

/// Outcome of applying a [`PageEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageChange {
	Unchanged,
	/// Observable state changed within the same session.
	Updated,
	/// A new session started; eligibility earned in the old one is void.
	NewSession,
}

/// Current page session.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
	/// Incremented on every navigation.
	pub session: u64,
	/// Engine time the current session started (page load).
	pub session_started: Duration,
	/// Deepest scroll fraction seen this session.
	pub scroll_depth: f32,
	pub exit_intent: bool,
	pub viewport: Viewport,
	/// Trigger that opened the gate this session, once it has.
	pub fired: Option<Trigger>,
}

impl PageState {
	/// State right after page load at `now`.
	pub fn loaded(now: Duration, viewport: Viewport) -> Self {
		Self {
			session: 0,
			session_started: now,
			scroll_depth: 0.0,
			exit_intent: false,
			viewport,
			fired: None,
		}
	}

	/// Time since the current session started.
	pub fn since_load(&self, now: Duration) -> Duration {
		now.saturating_sub(self.session_started)
	}

	pub fn apply(&mut self, event: PageEvent, now: Duration) -> PageChange {
		match event {
			PageEvent::Scroll { depth } => {
				let depth = if depth.is_finite() { depth.clamp(0.0, 1.0) } else { 0.0 };
				if depth > self.scroll_depth {
					self.scroll_depth = depth;
					PageChange::Updated
				} else {
					PageChange::Unchanged
				}
			}
			PageEvent::ExitIntent => {
				let changed = !self.exit_intent;
				self.exit_intent = true;
				if changed { PageChange::Updated } else { PageChange::Unchanged }
			}
			PageEvent::IdleTick => PageChange::Unchanged,
			PageEvent::Navigate => {
				*self = Self {
					session: self.session.wrapping_add(1),
					..Self::loaded(now, self.viewport)
				};
				PageChange::NewSession
			}
			PageEvent::Resize(viewport) => {
				if viewport == self.viewport {
					PageChange::Unchanged
				} else {
					self.viewport = viewport;
					PageChange::Updated
				}
			}
		}
	}
}
