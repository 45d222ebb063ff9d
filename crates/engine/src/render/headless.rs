//! In-memory [`Surface`] for tests and offline replay.

use std::collections::BTreeMap;
use std::time::Duration;

use super::{StyleSet, Surface};
use crate::error::RenderTargetMissing;
use crate::scheduler::SlotId;
use crate::template::RenderedContent;

/// One mounted element.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessElement {
	pub content: RenderedContent,
	/// Current style.
	pub style: StyleSet,
	/// Every style applied since mounting, oldest first.
	pub history: Vec<StyleSet>,
}

impl HeadlessElement {
	/// Style a browser would paint `elapsed` into the latest restyle.
	///
	/// Freshly mounted elements have nothing to animate from and paint their
	/// mount style as is.
	pub fn frame(&self, elapsed: Duration) -> StyleSet {
		let Some(from) = self.history.iter().rev().nth(1) else {
			return self.style.clone();
		};
		let total = self.style.transition;
		let progress = if total.is_zero() {
			1.0
		} else {
			(elapsed.as_secs_f32() / total.as_secs_f32()).min(1.0)
		};
		self.style.tween_from(from, progress)
	}
}

/// Surface that records mounted elements instead of drawing them.
///
/// [`detach_host`](Self::detach_host) simulates the host container going
/// away: every later operation fails with [`RenderTargetMissing`].
#[derive(Debug)]
pub struct HeadlessSurface {
	elements: BTreeMap<SlotId, HeadlessElement>,
	attached: bool,
	mounted_total: usize,
}

impl Default for HeadlessSurface {
	fn default() -> Self {
		Self::new()
	}
}

impl HeadlessSurface {
	pub fn new() -> Self {
		Self {
			elements: BTreeMap::new(),
			attached: true,
			mounted_total: 0,
		}
	}

	pub fn element(&self, slot: SlotId) -> Option<&HeadlessElement> {
		self.elements.get(&slot)
	}

	/// Mounted elements in slot order.
	pub fn elements(&self) -> impl Iterator<Item = (SlotId, &HeadlessElement)> {
		self.elements.iter().map(|(id, element)| (*id, element))
	}

	pub fn len(&self) -> usize {
		self.elements.len()
	}

	pub fn is_empty(&self) -> bool {
		self.elements.is_empty()
	}

	/// Elements mounted over the surface's lifetime.
	pub fn mounted_total(&self) -> usize {
		self.mounted_total
	}

	/// Drops the host container and everything in it.
	pub fn detach_host(&mut self) {
		self.attached = false;
		self.elements.clear();
	}

	/// Provides a fresh, empty host container.
	pub fn reattach_host(&mut self) {
		self.attached = true;
	}

	fn target(&mut self, slot: SlotId) -> Result<&mut HeadlessElement, RenderTargetMissing> {
		if !self.attached {
			return Err(RenderTargetMissing { slot });
		}
		self.elements.get_mut(&slot).ok_or(RenderTargetMissing { slot })
	}
}

impl Surface for HeadlessSurface {
	fn mount(&mut self, slot: SlotId, content: &RenderedContent, style: &StyleSet) -> Result<(), RenderTargetMissing> {
		if !self.attached {
			return Err(RenderTargetMissing { slot });
		}
		self.mounted_total += 1;
		self.elements.insert(slot, HeadlessElement {
			content: content.clone(),
			style: style.clone(),
			history: vec![style.clone()],
		});
		Ok(())
	}

	fn restyle(&mut self, slot: SlotId, style: &StyleSet) -> Result<(), RenderTargetMissing> {
		let element = self.target(slot)?;
		element.style = style.clone();
		element.history.push(style.clone());
		Ok(())
	}

	fn detach(&mut self, slot: SlotId) -> Result<(), RenderTargetMissing> {
		self.target(slot)?;
		self.elements.remove(&slot);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::WidgetConfig;
	use crate::page::Viewport;
	use crate::render::{VisualPhase, resolve_style};

	fn content() -> RenderedContent {
		RenderedContent {
			title: "Ana".to_string(),
			message: "just signed up".to_string(),
			icon: "👋".to_string(),
		}
	}

	fn style(phase: VisualPhase) -> StyleSet {
		resolve_style(&WidgetConfig::defaults_for("site"), &Viewport::DESKTOP, phase, 0)
	}

	#[test]
	fn records_style_history() {
		let mut surface = HeadlessSurface::new();
		surface.mount(SlotId(1), &content(), &style(VisualPhase::Entering)).unwrap();
		surface.restyle(SlotId(1), &style(VisualPhase::Settled)).unwrap();

		let element = surface.element(SlotId(1)).unwrap();
		assert_eq!(element.history.len(), 2);
		assert_eq!(element.style, style(VisualPhase::Settled));
		assert_eq!(surface.mounted_total(), 1);

		surface.detach(SlotId(1)).unwrap();
		assert!(surface.is_empty());
		assert_eq!(surface.mounted_total(), 1);
	}

	#[test]
	fn frames_ease_from_the_previous_style() {
		let mut surface = HeadlessSurface::new();
		let entering = style(VisualPhase::Entering);
		let settled = style(VisualPhase::Settled);
		surface.mount(SlotId(1), &content(), &entering).unwrap();
		assert_eq!(surface.element(SlotId(1)).unwrap().frame(Duration::ZERO), entering);

		surface.restyle(SlotId(1), &settled).unwrap();
		let element = surface.element(SlotId(1)).unwrap();
		assert_eq!(element.frame(Duration::ZERO).opacity, entering.opacity);
		assert_eq!(element.frame(Duration::ZERO).translate, entering.translate);
		assert_eq!(element.frame(settled.transition), settled);
		assert_eq!(element.frame(settled.transition * 4), settled);

		let halfway = element.frame(settled.transition / 2);
		assert!(halfway.opacity > 0.5 && halfway.opacity < 1.0, "{halfway:?}");
		assert!(halfway.translate.1.abs() < entering.translate.1.abs());
	}

	#[test]
	fn unknown_slot_is_missing() {
		let mut surface = HeadlessSurface::new();
		assert_eq!(surface.restyle(SlotId(3), &style(VisualPhase::Settled)), Err(RenderTargetMissing { slot: SlotId(3) }));
	}

	#[test]
	fn detached_host_rejects_everything_until_reattached() {
		let mut surface = HeadlessSurface::new();
		surface.mount(SlotId(1), &content(), &style(VisualPhase::Entering)).unwrap();
		surface.detach_host();

		assert!(surface.is_empty());
		assert!(surface.mount(SlotId(2), &content(), &style(VisualPhase::Entering)).is_err());
		assert!(surface.detach(SlotId(1)).is_err());

		surface.reattach_host();
		surface.mount(SlotId(2), &content(), &style(VisualPhase::Entering)).unwrap();
		assert_eq!(surface.len(), 1);
		assert_eq!(surface.mounted_total(), 2);
	}
}
