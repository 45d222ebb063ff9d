//! Surface that logs what a browser host would draw.

use nudge_engine::render::HeadlessSurface;
use nudge_engine::template::RenderedContent;
use nudge_engine::{RenderTargetMissing, SlotId, StyleSet, Surface};

/// [`HeadlessSurface`] that traces every mount, restyle and detach.
#[derive(Debug, Default)]
pub struct TraceSurface {
	inner: HeadlessSurface,
}

impl TraceSurface {
	pub fn inner(&self) -> &HeadlessSurface {
		&self.inner
	}
}

impl Surface for TraceSurface {
	fn mount(&mut self, slot: SlotId, content: &RenderedContent, style: &StyleSet) -> Result<(), RenderTargetMissing> {
		tracing::info!(
			%slot,
			icon = %content.icon,
			title = %content.title,
			message = %content.message,
			"notification mounted"
		);
		tracing::debug!(%slot, css = %style.to_css(), "initial style");
		self.inner.mount(slot, content, style)
	}

	fn restyle(&mut self, slot: SlotId, style: &StyleSet) -> Result<(), RenderTargetMissing> {
		tracing::debug!(%slot, opacity = style.opacity, css = %style.to_css(), "notification restyled");
		self.inner.restyle(slot, style)
	}

	fn detach(&mut self, slot: SlotId) -> Result<(), RenderTargetMissing> {
		tracing::info!(%slot, "notification detached");
		self.inner.detach(slot)
	}
}
