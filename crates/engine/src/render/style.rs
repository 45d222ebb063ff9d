//! Pure style resolution.
//!
//! Everything visual about a notification (where it sits, how it enters,
//! how it leaves) is computed here from the widget config, the viewport and
//! the lifecycle phase. Nothing in this module touches a surface.

use std::fmt::Write as _;
use std::time::Duration;

use super::easing::Easing;
use crate::config::{AnimationKind, Corner, WidgetConfig};
use crate::page::Viewport;
use crate::scheduler::SlotState;

/// Distance an entering or exiting notification is displaced from its
/// resting position.
pub const ENTRY_OFFSET_PX: i32 = 20;
/// Starting scale for zoom entries.
pub const ZOOM_ENTRY_SCALE: f32 = 0.9;
/// Transition length when reduced motion is requested.
pub const REDUCED_MOTION_TRANSITION: Duration = Duration::from_millis(10);

/// Visual phase of an on-screen slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualPhase {
	/// Just mounted, still at the entry pose.
	Entering,
	/// At rest, fully visible.
	Settled,
	/// Returning to the entry pose before detachment.
	Exiting,
}

impl VisualPhase {
	/// Phase a slot is drawn in after entering `state`.
	pub const fn for_state(state: SlotState) -> Option<Self> {
		match state {
			SlotState::Showing => Some(Self::Entering),
			SlotState::HoldingFull => Some(Self::Settled),
			SlotState::Hiding => Some(Self::Exiting),
			SlotState::Pending | SlotState::Removed => None,
		}
	}
}

/// Distances from the viewport edges, in pixels. Exactly one of each pair
/// is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Insets {
	pub top: Option<u32>,
	pub bottom: Option<u32>,
	pub left: Option<u32>,
	pub right: Option<u32>,
}

impl Insets {
	fn anchored(corner: Corner, horizontal: u32, vertical: u32) -> Self {
		let (top, bottom) = if corner.is_top() { (Some(vertical), None) } else { (None, Some(vertical)) };
		let (left, right) = if corner.is_left() { (Some(horizontal), None) } else { (None, Some(horizontal)) };
		Self { top, bottom, left, right }
	}
}

/// Complete visual state of one notification element.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSet {
	pub inset: Insets,
	pub max_width: u32,
	pub opacity: f32,
	/// Displacement from the resting position, in pixels.
	pub translate: (i32, i32),
	pub scale: f32,
	/// Duration of the transition into this style.
	pub transition: Duration,
	pub easing: Easing,
	pub animation_class: Option<&'static str>,
}

impl StyleSet {
	/// Renders an inline CSS declaration block, e.g.
	/// `position:fixed;bottom:10px;right:30px;max-width:380px;...`.
	pub fn to_css(&self) -> String {
		let mut css = String::from("position:fixed;");
		let edges = [
			("top", self.inset.top),
			("bottom", self.inset.bottom),
			("left", self.inset.left),
			("right", self.inset.right),
		];
		for (edge, px) in edges {
			if let Some(px) = px {
				let _ = write!(css, "{edge}:{px}px;");
			}
		}
		let (x, y) = self.translate;
		let _ = write!(
			css,
			"max-width:{}px;opacity:{};transform:translate({x}px,{y}px) scale({});transition:all {}ms {};",
			self.max_width,
			self.opacity,
			self.scale,
			self.transition.as_millis(),
			self.easing.css(),
		);
		css
	}

	/// Whether the element is displaced or scaled away from rest.
	pub fn is_displaced(&self) -> bool {
		self.translate != (0, 0) || self.scale != 1.0
	}

	/// Pose `progress` (0.0 to 1.0) of the way through the transition from
	/// `from` into `self`, shaped by this style's easing.
	///
	/// Opacity stays within `[0.0, 1.0]` even when the curve overshoots.
	pub fn tween_from(&self, from: &StyleSet, progress: f32) -> StyleSet {
		let t = self.easing.apply(progress);
		let lerp = |a: f32, b: f32| a + (b - a) * t;
		let lerp_px = |a: i32, b: i32| lerp(a as f32, b as f32).round() as i32;
		StyleSet {
			opacity: lerp(from.opacity, self.opacity).clamp(0.0, 1.0),
			translate: (lerp_px(from.translate.0, self.translate.0), lerp_px(from.translate.1, self.translate.1)),
			scale: lerp(from.scale, self.scale),
			..self.clone()
		}
	}
}

/// Resolves the style of a slot drawn in `phase` on `lane`.
///
/// Lane `n` sits `n * stack_spacing` pixels further from the anchor corner
/// than lane zero. Reduced motion keeps positions and opacity but drops
/// displacement, scaling and animation classes, and shortens the transition.
pub fn resolve_style(config: &WidgetConfig, viewport: &Viewport, phase: VisualPhase, lane: u16) -> StyleSet {
	let mobile = viewport.is_mobile();
	let corner = config.corner_for(mobile);
	let reduced = config.display.reduced_motion;
	let kind = config.animation.kind;

	let stack = u32::from(lane).saturating_mul(config.display.stack_spacing);
	let inset = Insets::anchored(
		corner,
		config.position.offset_x,
		config.position.offset_y.saturating_add(stack),
	);
	let max_width = if mobile { config.display.mobile_max_width } else { config.display.max_width };

	let (entry_translate, entry_scale) = if reduced { ((0, 0), 1.0) } else { entry_pose(kind, corner) };
	let (opacity, translate, scale) = match phase {
		VisualPhase::Entering | VisualPhase::Exiting => (0.0, entry_translate, entry_scale),
		VisualPhase::Settled => (1.0, (0, 0), 1.0),
	};

	let transition = if reduced { REDUCED_MOTION_TRANSITION } else { config.animation.speed.duration() };
	let easing = match (reduced, phase, kind) {
		(true, ..) => Easing::Linear,
		(false, VisualPhase::Exiting, _) => Easing::EaseIn,
		(false, _, AnimationKind::Bounce) => Easing::Overshoot,
		(false, ..) => Easing::EaseOut,
	};
	let animation_class = match phase {
		VisualPhase::Entering | VisualPhase::Settled if !reduced => Some(kind.class_name()),
		_ => None,
	};

	StyleSet {
		inset,
		max_width,
		opacity,
		translate,
		scale,
		transition,
		easing,
		animation_class,
	}
}

/// Displacement and scale an element enters from: slides come in from the
/// anchored side, everything else rises from (or drops to) the anchored edge.
fn entry_pose(kind: AnimationKind, corner: Corner) -> ((i32, i32), f32) {
	match kind {
		AnimationKind::Slide => {
			let x = if corner.is_left() { -ENTRY_OFFSET_PX } else { ENTRY_OFFSET_PX };
			((x, 0), 1.0)
		}
		AnimationKind::Fade | AnimationKind::Bounce | AnimationKind::Zoom => {
			let y = if corner.is_top() { -ENTRY_OFFSET_PX } else { ENTRY_OFFSET_PX };
			let scale = if kind == AnimationKind::Zoom { ZOOM_ENTRY_SCALE } else { 1.0 };
			((0, y), scale)
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::config::{AnimationSpeed, Position};

	fn config() -> WidgetConfig {
		WidgetConfig::defaults_for("site")
	}

	#[test]
	fn bottom_right_insets_follow_offsets() {
		let mut config = config();
		config.position = Position {
			corner: Corner::BottomRight,
			offset_x: 30,
			offset_y: 10,
		};
		let style = resolve_style(&config, &Viewport::DESKTOP, VisualPhase::Settled, 0);
		assert_eq!(style.inset, Insets {
			top: None,
			bottom: Some(10),
			left: None,
			right: Some(30),
		});
		assert!(style.to_css().starts_with("position:fixed;bottom:10px;right:30px;"));
	}

	#[test]
	fn top_left_defaults() {
		let mut config = config();
		config.position.corner = Corner::TopLeft;
		config.display.mobile_position = Corner::TopLeft;
		let css = resolve_style(&config, &Viewport::DESKTOP, VisualPhase::Settled, 0).to_css();
		assert!(css.contains("top:20px;left:20px;"), "{css}");
	}

	#[test]
	fn lanes_stack_away_from_the_anchor() {
		let config = config();
		let lane0 = resolve_style(&config, &Viewport::DESKTOP, VisualPhase::Settled, 0);
		let lane2 = resolve_style(&config, &Viewport::DESKTOP, VisualPhase::Settled, 2);
		assert_eq!(lane0.inset.bottom, Some(20));
		assert_eq!(lane2.inset.bottom, Some(20 + 2 * 90));
		assert_eq!(lane2.inset.left, Some(20));
	}

	#[test]
	fn mobile_uses_its_own_corner_and_width() {
		let mut config = config();
		config.display.mobile_position = Corner::TopRight;
		let style = resolve_style(&config, &Viewport::MOBILE, VisualPhase::Settled, 0);
		assert_eq!(style.inset.top, Some(20));
		assert_eq!(style.inset.right, Some(20));
		assert_eq!(style.max_width, 300);
	}

	#[test]
	fn bounce_tween_overshoots_position_but_not_opacity() {
		let mut config = config();
		config.animation.kind = AnimationKind::Bounce;
		let entering = resolve_style(&config, &Viewport::DESKTOP, VisualPhase::Entering, 0);
		let settled = resolve_style(&config, &Viewport::DESKTOP, VisualPhase::Settled, 0);

		let halfway = settled.tween_from(&entering, 0.5);
		assert_eq!(halfway.opacity, 1.0);
		assert!(halfway.translate.1 < 0, "{halfway:?}");
		assert_eq!(settled.tween_from(&entering, 1.0), settled);
	}

	#[test]
	fn entry_pose_depends_on_animation() {
		let mut config = config();
		let fade = resolve_style(&config, &Viewport::DESKTOP, VisualPhase::Entering, 0);
		assert_eq!((fade.opacity, fade.translate, fade.scale), (0.0, (0, 20), 1.0));
		assert_eq!(fade.animation_class, Some("nudge-anim-fade"));

		config.animation.kind = AnimationKind::Slide;
		config.position.corner = Corner::BottomRight;
		let slide = resolve_style(&config, &Viewport::DESKTOP, VisualPhase::Entering, 0);
		assert_eq!(slide.translate, (20, 0));

		config.animation.kind = AnimationKind::Zoom;
		config.position.corner = Corner::TopLeft;
		let zoom = resolve_style(&config, &Viewport::DESKTOP, VisualPhase::Entering, 0);
		assert_eq!((zoom.translate, zoom.scale), ((0, -20), ZOOM_ENTRY_SCALE));
	}

	#[test]
	fn exit_returns_to_entry_pose() {
		let mut config = config();
		config.animation.kind = AnimationKind::Bounce;
		let entering = resolve_style(&config, &Viewport::DESKTOP, VisualPhase::Entering, 0);
		let exiting = resolve_style(&config, &Viewport::DESKTOP, VisualPhase::Exiting, 0);
		assert_eq!((exiting.opacity, exiting.translate), (entering.opacity, entering.translate));
		assert_eq!(entering.easing, Easing::Overshoot);
		assert_eq!(exiting.easing, Easing::EaseIn);
		assert_eq!(exiting.animation_class, None);
	}

	#[test]
	fn speed_sets_transition_length() {
		let mut config = config();
		config.animation.speed = AnimationSpeed::Slow;
		let style = resolve_style(&config, &Viewport::DESKTOP, VisualPhase::Settled, 0);
		assert_eq!(style.transition, Duration::from_millis(1500));
		assert!(style.to_css().contains("transition:all 1500ms ease-out;"));
	}

	#[test]
	fn reduced_motion_drops_displacement() {
		let mut config = config();
		config.animation.kind = AnimationKind::Zoom;
		config.display.reduced_motion = true;
		for phase in [VisualPhase::Entering, VisualPhase::Settled, VisualPhase::Exiting] {
			let style = resolve_style(&config, &Viewport::DESKTOP, phase, 0);
			assert!(!style.is_displaced(), "{phase:?}");
			assert_eq!(style.transition, REDUCED_MOTION_TRANSITION);
			assert_eq!(style.animation_class, None);
		}
		let entering = resolve_style(&config, &Viewport::DESKTOP, VisualPhase::Entering, 0);
		assert_eq!(entering.opacity, 0.0);
	}
}
