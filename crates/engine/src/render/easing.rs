//! Timing curves for notification transitions.
//!
//! Each curve maps linear progress (0.0 to 1.0) to eased progress and names
//! the matching CSS `transition-timing-function`.

/// Timing curve applied to a style transition.
///
/// # Example
///
/// ```
/// use nudge_engine::render::Easing;
///
/// assert_eq!(Easing::EaseOut.css(), "ease-out");
/// assert!(Easing::EaseOut.apply(0.5) > 0.5);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
	/// Constant speed. Used when motion is reduced.
	#[default]
	Linear,
	/// Starts slow, accelerates. Used for exits.
	EaseIn,
	/// Starts fast, decelerates. Used for entries.
	EaseOut,
	/// Decelerates past the target and springs back (bounce entries).
	Overshoot,
}

/// Back-ease constant matching `cubic-bezier(0.34, 1.56, 0.64, 1)`.
const OVERSHOOT: f32 = 1.70158;

impl Easing {
	/// Applies the curve to linear progress. Input is clamped to `[0.0, 1.0]`.
	#[inline]
	pub fn apply(self, t: f32) -> f32 {
		let t = t.clamp(0.0, 1.0);
		match self {
			Easing::Linear => t,
			Easing::EaseIn => t * t,
			Easing::EaseOut => 1.0 - (1.0 - t).powi(2),
			Easing::Overshoot => {
				let u = t - 1.0;
				1.0 + (OVERSHOOT + 1.0) * u.powi(3) + OVERSHOOT * u.powi(2)
			}
		}
	}

	/// CSS timing function name.
	pub const fn css(self) -> &'static str {
		match self {
			Easing::Linear => "linear",
			Easing::EaseIn => "ease-in",
			Easing::EaseOut => "ease-out",
			Easing::Overshoot => "cubic-bezier(0.34, 1.56, 0.64, 1)",
		}
	}
}
