//! Presentation: from scheduler transitions to visual state.
//!
//! [`resolve_style`] is a pure function of config, viewport, phase and lane.
//! [`Presenter`] applies the resolved styles to a [`Surface`] as slots move
//! through their lifecycle and produces an [`Impression`] for every
//! notification that completed its exit.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;

use crate::config::WidgetConfig;
use crate::error::RenderTargetMissing;
use crate::impression::Impression;
use crate::page::Viewport;
use crate::scheduler::{SlotId, SlotState, Transition};
use crate::template::RenderedContent;

mod easing;
mod headless;
mod style;

pub use easing::Easing;
pub use headless::{HeadlessElement, HeadlessSurface};
pub use style::{ENTRY_OFFSET_PX, Insets, REDUCED_MOTION_TRANSITION, StyleSet, VisualPhase, ZOOM_ENTRY_SCALE, resolve_style};

/// Host-side element container.
///
/// Any operation may fail with [`RenderTargetMissing`] when the element (or
/// its container) no longer exists.
pub trait Surface {
	/// Creates the element for `slot` with its initial style.
	fn mount(&mut self, slot: SlotId, content: &RenderedContent, style: &StyleSet) -> Result<(), RenderTargetMissing>;

	/// Replaces the style of a mounted element.
	fn restyle(&mut self, slot: SlotId, style: &StyleSet) -> Result<(), RenderTargetMissing>;

	/// Removes a mounted element.
	fn detach(&mut self, slot: SlotId) -> Result<(), RenderTargetMissing>;
}

impl<S: Surface + ?Sized> Surface for Box<S> {
	fn mount(&mut self, slot: SlotId, content: &RenderedContent, style: &StyleSet) -> Result<(), RenderTargetMissing> {
		(**self).mount(slot, content, style)
	}

	fn restyle(&mut self, slot: SlotId, style: &StyleSet) -> Result<(), RenderTargetMissing> {
		(**self).restyle(slot, style)
	}

	fn detach(&mut self, slot: SlotId) -> Result<(), RenderTargetMissing> {
		(**self).detach(slot)
	}
}

#[derive(Debug)]
struct Shown {
	content: RenderedContent,
	displayed_at: DateTime<Utc>,
}

/// Applies transitions to a surface.
#[derive(Debug)]
pub struct Presenter<S> {
	surface: S,
	shown: FxHashMap<SlotId, Shown>,
}

impl<S: Surface> Presenter<S> {
	pub fn new(surface: S) -> Self {
		Self {
			surface,
			shown: FxHashMap::default(),
		}
	}

	pub fn surface(&self) -> &S {
		&self.surface
	}

	pub fn surface_mut(&mut self) -> &mut S {
		&mut self.surface
	}

	/// Number of slots with a live element.
	pub fn mounted(&self) -> usize {
		self.shown.len()
	}

	/// Applies one transition.
	///
	/// Returns the impression when a slot finished its exit. Discards of
	/// never-rendered slots are ignored.
	pub fn present(
		&mut self,
		transition: &Transition,
		config: &WidgetConfig,
		viewport: &Viewport,
		wall: DateTime<Utc>,
	) -> Result<Option<Impression>, RenderTargetMissing> {
		if transition.is_discard() {
			return Ok(None);
		}
		let slot = transition.slot;
		let lane = transition.lane.unwrap_or(0);

		match (transition.from, transition.to) {
			(_, SlotState::Removed) => {
				let shown = self.shown.remove(&slot);
				self.surface.detach(slot)?;
				if transition.from != SlotState::Hiding {
					return Ok(None);
				}
				Ok(shown.map(|shown| Impression::new(config, &transition.event, &shown.content, shown.displayed_at)))
			}
			(_, to) => {
				let Some(phase) = VisualPhase::for_state(to) else {
					return Ok(None);
				};
				let style = resolve_style(config, viewport, phase, lane);
				if phase == VisualPhase::Entering {
					let content = RenderedContent::for_event(config, &transition.event, wall);
					self.surface.mount(slot, &content, &style)?;
					self.shown.insert(slot, Shown {
						content,
						displayed_at: wall,
					});
				} else {
					self.surface.restyle(slot, &style)?;
				}
				Ok(None)
			}
		}
	}

	/// Drops bookkeeping for an abandoned slot, detaching its element if it
	/// still exists.
	pub fn forget(&mut self, slot: SlotId) {
		if self.shown.remove(&slot).is_some() {
			let _ = self.surface.detach(slot);
		}
	}
}
