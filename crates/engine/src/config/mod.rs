//! Widget configuration.
//!
//! [`WidgetConfig`] is the normalized, fully defaulted form of a site's
//! visual and behavioural settings. It is produced by [`resolve`] from the raw
//! `design`/`display` payloads the collaborator serves alongside events.
//! Downstream components never branch on a missing field.

use std::time::Duration;

mod resolve;
#[cfg(test)]
mod tests;

pub use resolve::{MAX_TIMING_SECS, RawWidgetConfig, Resolved, resolve};

/// Default inset from the anchor corner, in pixels.
pub const DEFAULT_OFFSET_PX: u32 = 20;
/// Default widget width cap on desktop viewports.
pub const DEFAULT_MAX_WIDTH_PX: u32 = 380;
/// Default widget width cap on mobile viewports.
pub const DEFAULT_MOBILE_MAX_WIDTH_PX: u32 = 300;
/// Default distance between stacked lanes.
pub const DEFAULT_STACK_SPACING_PX: u32 = 90;
/// Default pending queue capacity.
pub const DEFAULT_MAX_PENDING: usize = 50;

/// Screen corner a notification is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Corner {
	TopLeft,
	TopRight,
	#[default]
	BottomLeft,
	BottomRight,
}

impl Corner {
	/// Parses the wire name (`bottom-right`, `bottom_right`, `bottomRight`).
	pub fn parse(value: &str) -> Option<Self> {
		let normalized: String = value.chars().filter(|c| c.is_ascii_alphabetic()).collect::<String>().to_ascii_lowercase();
		match normalized.as_str() {
			"topleft" => Some(Self::TopLeft),
			"topright" => Some(Self::TopRight),
			"bottomleft" => Some(Self::BottomLeft),
			"bottomright" => Some(Self::BottomRight),
			_ => None,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::TopLeft => "top-left",
			Self::TopRight => "top-right",
			Self::BottomLeft => "bottom-left",
			Self::BottomRight => "bottom-right",
		}
	}

	pub const fn is_top(self) -> bool {
		matches!(self, Self::TopLeft | Self::TopRight)
	}

	pub const fn is_left(self) -> bool {
		matches!(self, Self::TopLeft | Self::BottomLeft)
	}
}

/// Entry animation style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationKind {
	/// Fade in while rising from below the resting position (default).
	#[default]
	Fade,
	/// Slide in horizontally from the anchored edge.
	Slide,
	/// Fade in with an overshooting settle.
	Bounce,
	/// Grow from slightly smaller than full size.
	Zoom,
}

impl AnimationKind {
	pub fn parse(value: &str) -> Option<Self> {
		match value.trim().to_ascii_lowercase().as_str() {
			"fade" | "fade-in" | "fadein" => Some(Self::Fade),
			"slide" | "slide-in" | "slidein" => Some(Self::Slide),
			"bounce" => Some(Self::Bounce),
			"zoom" | "scale" => Some(Self::Zoom),
			_ => None,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Fade => "fade",
			Self::Slide => "slide",
			Self::Bounce => "bounce",
			Self::Zoom => "zoom",
		}
	}

	/// Class applied to the element while the entry animation plays.
	pub const fn class_name(self) -> &'static str {
		match self {
			Self::Fade => "nudge-anim-fade",
			Self::Slide => "nudge-anim-slide",
			Self::Bounce => "nudge-anim-bounce",
			Self::Zoom => "nudge-anim-zoom",
		}
	}
}

/// Animation speed bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationSpeed {
	Slow,
	#[default]
	Normal,
	Fast,
}

impl AnimationSpeed {
	pub fn parse(value: &str) -> Option<Self> {
		match value.trim().to_ascii_lowercase().as_str() {
			"slow" => Some(Self::Slow),
			"normal" | "medium" | "default" => Some(Self::Normal),
			"fast" => Some(Self::Fast),
			_ => None,
		}
	}

	/// Transition duration for this speed.
	pub const fn duration(self) -> Duration {
		match self {
			Self::Slow => Duration::from_millis(1500),
			Self::Normal => Duration::from_millis(1000),
			Self::Fast => Duration::from_millis(500),
		}
	}
}

/// Behaviour when the pending queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Overflow {
	/// Discard the oldest pending notification to make room (default).
	#[default]
	DropOldest,
	/// Reject the incoming notification.
	DropNewest,
}

impl Overflow {
	pub fn parse(value: &str) -> Option<Self> {
		match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
			"drop-oldest" | "oldest" => Some(Self::DropOldest),
			"drop-newest" | "newest" => Some(Self::DropNewest),
			_ => None,
		}
	}
}

/// Anchor corner and insets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
	pub corner: Corner,
	/// Horizontal inset from the anchored edge, in pixels.
	pub offset_x: u32,
	/// Vertical inset from the anchored edge, in pixels.
	pub offset_y: u32,
}

impl Default for Position {
	fn default() -> Self {
		Self {
			corner: Corner::default(),
			offset_x: DEFAULT_OFFSET_PX,
			offset_y: DEFAULT_OFFSET_PX,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationConfig {
	pub kind: AnimationKind,
	pub speed: AnimationSpeed,
}

/// Display timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
	/// Wait after page load before the first notification may show.
	pub delay: Duration,
	/// Visible time before auto-hide. Zero keeps a notification until a
	/// replacement is pending.
	pub display_duration: Duration,
	/// Gap between one notification's removal and the next admission.
	pub interval: Duration,
}

impl Default for Timing {
	fn default() -> Self {
		Self {
			delay: Duration::from_secs(3),
			display_duration: Duration::from_secs(5),
			interval: Duration::ZERO,
		}
	}
}

/// Page-state conditions that may open the display gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triggers {
	pub on_page_load: bool,
	/// Reserved; never eligible.
	pub on_scroll: bool,
	/// Reserved; never eligible.
	pub on_exit: bool,
}

impl Default for Triggers {
	fn default() -> Self {
		Self {
			on_page_load: true,
			on_scroll: false,
			on_exit: false,
		}
	}
}

/// Responsive and accessibility overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRules {
	pub mobile_position: Corner,
	pub mobile_max_width: u32,
	pub max_width: u32,
	pub hide_on_mobile: bool,
	pub hide_on_desktop: bool,
	/// Collapse animated chrome; visibility timing is unchanged.
	pub reduced_motion: bool,
	/// Allow more than one concurrent notification on mobile viewports.
	pub stack_on_mobile: bool,
	/// Distance between stacked lanes, in pixels.
	pub stack_spacing: u32,
}

impl DisplayRules {
	/// Defaults for a widget anchored at `corner` on desktop.
	pub fn for_corner(corner: Corner) -> Self {
		Self {
			mobile_position: corner,
			mobile_max_width: DEFAULT_MOBILE_MAX_WIDTH_PX,
			max_width: DEFAULT_MAX_WIDTH_PX,
			hide_on_mobile: false,
			hide_on_desktop: false,
			reduced_motion: false,
			stack_on_mobile: true,
			stack_spacing: DEFAULT_STACK_SPACING_PX,
		}
	}

	/// Whether the widget may appear on a viewport of the given class.
	pub const fn visible_on(&self, mobile: bool) -> bool {
		if mobile { !self.hide_on_mobile } else { !self.hide_on_desktop }
	}
}

impl Default for DisplayRules {
	fn default() -> Self {
		Self::for_corner(Corner::default())
	}
}

/// Queue sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueLimits {
	/// Maximum notifications on screen at once (at least 1).
	pub max_concurrent: usize,
	/// Maximum notifications waiting in `Pending`.
	pub max_pending: usize,
	pub overflow: Overflow,
}

impl Default for QueueLimits {
	fn default() -> Self {
		Self {
			max_concurrent: 1,
			max_pending: DEFAULT_MAX_PENDING,
			overflow: Overflow::default(),
		}
	}
}

/// Normalized per-widget configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
	pub site_id: String,
	pub widget_id: String,
	/// Title template; `{{field}}` placeholders pull from the event.
	pub title: String,
	/// Body template; `{{field}}` placeholders pull from the event.
	pub content: String,
	pub position: Position,
	pub animation: AnimationConfig,
	pub timing: Timing,
	pub triggers: Triggers,
	pub display: DisplayRules,
	pub limits: QueueLimits,
}

impl WidgetConfig {
	/// Default widget for a site.
	pub fn defaults_for(site_id: impl Into<String>) -> Self {
		Self {
			site_id: site_id.into(),
			widget_id: "default".to_string(),
			title: "{{title}}".to_string(),
			content: "{{message}}".to_string(),
			position: Position::default(),
			animation: AnimationConfig::default(),
			timing: Timing::default(),
			triggers: Triggers::default(),
			display: DisplayRules::default(),
			limits: QueueLimits::default(),
		}
	}

	/// Corner used on the given viewport class.
	pub const fn corner_for(&self, mobile: bool) -> Corner {
		if mobile { self.display.mobile_position } else { self.position.corner }
	}

	/// On-screen capacity for the given viewport class.
	pub fn capacity_for(&self, mobile: bool) -> usize {
		if mobile && !self.display.stack_on_mobile {
			1
		} else {
			self.limits.max_concurrent.max(1)
		}
	}
}

/// Fatal configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
	/// A required field is missing from the configuration.
	#[error("missing required field: {0}")]
	MissingField(&'static str),
}

/// Non-fatal problem with an optional field. The field fell back to a default.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
	/// The field had the wrong JSON type.
	WrongType {
		field: String,
		expected: &'static str,
	},
	/// A string field held a value outside its vocabulary.
	UnknownValue { field: String, value: String },
	/// A numeric field was out of range and was clamped.
	Clamped { field: String, value: f64, to: f64 },
}

impl std::fmt::Display for ConfigWarning {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ConfigWarning::WrongType { field, expected } => {
				write!(f, "'{field}' is not a {expected}; using default")
			}
			ConfigWarning::UnknownValue { field, value } => {
				write!(f, "'{field}' has unknown value '{value}'; using default")
			}
			ConfigWarning::Clamped { field, value, to } => {
				write!(f, "'{field}' = {value} is out of range; clamped to {to}")
			}
		}
	}
}
