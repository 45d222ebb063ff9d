//! Raw payload → [`WidgetConfig`].
//!
//! Only the site id is mandatory. Every other field is read leniently:
//! camelCase or snake_case keys, numbers as JSON numbers or numeric strings,
//! booleans as `true`/`false`, `"true"`/`"false"` or `0`/`1`. Anything
//! unreadable falls back to its default and leaves a [`ConfigWarning`].

use std::time::Duration;

use heck::ToSnakeCase;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{
	AnimationConfig, AnimationKind, AnimationSpeed, ConfigError, ConfigWarning, Corner, DisplayRules, Overflow, Position, QueueLimits, Timing,
	Triggers, WidgetConfig,
};

/// Longest accepted timing value: one year. Larger values are clamped.
pub const MAX_TIMING_SECS: f64 = 365.0 * 24.0 * 60.0 * 60.0;

/// Configuration exactly as served by the collaborator.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawWidgetConfig {
	#[serde(default, alias = "siteId")]
	pub site_id: Option<String>,
	#[serde(default, alias = "widgetId")]
	pub widget_id: Option<String>,
	/// Visual and behavioural settings.
	#[serde(default)]
	pub design: Option<Value>,
	/// Responsive overrides.
	#[serde(default)]
	pub display: Option<Value>,
}

/// Resolution result: the config plus every default that had to be substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
	pub config: WidgetConfig,
	pub warnings: Vec<ConfigWarning>,
}

/// Resolves a raw payload into a fully populated [`WidgetConfig`].
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`] when the site id is absent or blank.
pub fn resolve(raw: &RawWidgetConfig) -> Result<Resolved, ConfigError> {
	let site_id = raw
		.site_id
		.as_deref()
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.ok_or(ConfigError::MissingField("site_id"))?;

	let mut warnings = Vec::new();
	let mut config = WidgetConfig::defaults_for(site_id);
	if let Some(widget_id) = raw.widget_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
		config.widget_id = widget_id.to_string();
	}

	let design = Reader::root("design", raw.design.as_ref(), &mut warnings);
	if let Some(title) = design.string("title", &mut warnings) {
		config.title = title.to_string();
	}
	if let Some(content) = design.string("content", &mut warnings) {
		config.content = content.to_string();
	}
	config.position = read_position(&design, &mut warnings);
	config.animation = read_animation(&design, &mut warnings);
	config.timing = read_timing(&design, &mut warnings);
	config.triggers = read_triggers(&design, &mut warnings);
	config.limits = read_limits(&design, &mut warnings);

	let display = Reader::root("display", raw.display.as_ref(), &mut warnings);
	config.display = read_display(&display, config.position.corner, &mut warnings);

	for warning in &warnings {
		tracing::debug!(site_id = %config.site_id, %warning, "config default substituted");
	}

	Ok(Resolved { config, warnings })
}

/// `position` is either a bare corner string with offsets beside it, or an
/// object carrying the corner and offsets.
fn read_position(design: &Reader<'_>, warnings: &mut Vec<ConfigWarning>) -> Position {
	let mut position = Position::default();
	let nested = match design.get("position") {
		Some(Value::Object(_)) => Some(design.child("position", warnings)),
		Some(Value::String(corner)) => {
			position.corner = parse_or_warn(design.path("position"), corner, Corner::parse, warnings).unwrap_or_default();
			None
		}
		Some(Value::Null) | None => None,
		Some(_) => {
			warnings.push(ConfigWarning::WrongType {
				field: design.path("position"),
				expected: "string or object",
			});
			None
		}
	};

	let source = nested.as_ref().unwrap_or(design);
	if let Some(nested) = &nested
		&& let Some(corner) = nested.string_any(&["corner", "placement", "position"], warnings)
	{
		position.corner = parse_or_warn(nested.path("corner"), corner, Corner::parse, warnings).unwrap_or_default();
	}
	if let Some(x) = source.pixels("offsetX", warnings) {
		position.offset_x = x;
	}
	if let Some(y) = source.pixels("offsetY", warnings) {
		position.offset_y = y;
	}
	position
}

fn read_animation(design: &Reader<'_>, warnings: &mut Vec<ConfigWarning>) -> AnimationConfig {
	let mut animation = AnimationConfig::default();
	let section = match design.get("animation") {
		Some(Value::String(kind)) => {
			animation.kind = parse_or_warn(design.path("animation"), kind, AnimationKind::parse, warnings).unwrap_or_default();
			return animation;
		}
		_ => design.child("animation", warnings),
	};
	if let Some(kind) = section.string("type", warnings) {
		animation.kind = parse_or_warn(section.path("type"), kind, AnimationKind::parse, warnings).unwrap_or_default();
	}
	if let Some(speed) = section.string("speed", warnings) {
		animation.speed = parse_or_warn(section.path("speed"), speed, AnimationSpeed::parse, warnings).unwrap_or_default();
	}
	animation
}

fn read_timing(design: &Reader<'_>, warnings: &mut Vec<ConfigWarning>) -> Timing {
	let section = design.child("timing", warnings);
	let mut timing = Timing::default();
	if let Some(delay) = section.seconds("delay", warnings) {
		timing.delay = delay;
	}
	if let Some(duration) = section.seconds("displayDuration", warnings) {
		timing.display_duration = duration;
	}
	if let Some(interval) = section.seconds("interval", warnings) {
		timing.interval = interval;
	}
	timing
}

fn read_triggers(design: &Reader<'_>, warnings: &mut Vec<ConfigWarning>) -> Triggers {
	let section = design.child("triggers", warnings);
	let defaults = Triggers::default();
	Triggers {
		on_page_load: section.boolean("onPageLoad", warnings).unwrap_or(defaults.on_page_load),
		on_scroll: section.boolean("onScroll", warnings).unwrap_or(defaults.on_scroll),
		on_exit: section.boolean("onExit", warnings).unwrap_or(defaults.on_exit),
	}
}

fn read_limits(design: &Reader<'_>, warnings: &mut Vec<ConfigWarning>) -> QueueLimits {
	let mut limits = QueueLimits::default();
	if let Some(max) = design.count("maxConcurrent", 1, warnings) {
		limits.max_concurrent = max;
	}
	if let Some(max) = design.count("maxPending", 1, warnings) {
		limits.max_pending = max;
	}
	if let Some(overflow) = design.string("overflow", warnings) {
		limits.overflow = parse_or_warn(design.path("overflow"), overflow, Overflow::parse, warnings).unwrap_or_default();
	}
	limits
}

fn read_display(display: &Reader<'_>, desktop_corner: Corner, warnings: &mut Vec<ConfigWarning>) -> DisplayRules {
	let mut rules = DisplayRules::for_corner(desktop_corner);
	if let Some(corner) = display.string("mobilePosition", warnings) {
		rules.mobile_position = parse_or_warn(display.path("mobilePosition"), corner, Corner::parse, warnings).unwrap_or(desktop_corner);
	}
	if let Some(width) = display.pixels("mobileMaxWidth", warnings) {
		rules.mobile_max_width = width;
	}
	if let Some(width) = display.pixels("maxWidth", warnings) {
		rules.max_width = width;
	}
	if let Some(spacing) = display.pixels("stackSpacing", warnings) {
		rules.stack_spacing = spacing;
	}
	rules.hide_on_mobile = display.boolean("hideOnMobile", warnings).unwrap_or(rules.hide_on_mobile);
	rules.hide_on_desktop = display.boolean("hideOnDesktop", warnings).unwrap_or(rules.hide_on_desktop);
	rules.reduced_motion = display.boolean("reducedMotionSupport", warnings).unwrap_or(rules.reduced_motion);
	rules.stack_on_mobile = display.boolean("stackOnMobile", warnings).unwrap_or(rules.stack_on_mobile);
	rules
}

fn parse_or_warn<T>(field: String, value: &str, parse: impl FnOnce(&str) -> Option<T>, warnings: &mut Vec<ConfigWarning>) -> Option<T> {
	let parsed = parse(value);
	if parsed.is_none() {
		warnings.push(ConfigWarning::UnknownValue {
			field,
			value: value.to_string(),
		});
	}
	parsed
}

/// Lenient view over one JSON object section.
struct Reader<'a> {
	prefix: String,
	map: Option<&'a Map<String, Value>>,
}

impl<'a> Reader<'a> {
	fn root(prefix: &str, value: Option<&'a Value>, warnings: &mut Vec<ConfigWarning>) -> Self {
		Self::from_value(prefix.to_string(), value, warnings)
	}

	fn from_value(prefix: String, value: Option<&'a Value>, warnings: &mut Vec<ConfigWarning>) -> Self {
		let map = match value {
			Some(Value::Object(map)) => Some(map),
			Some(Value::Null) | None => None,
			Some(_) => {
				warnings.push(ConfigWarning::WrongType {
					field: prefix.clone(),
					expected: "object",
				});
				None
			}
		};
		Self { prefix, map }
	}

	fn path(&self, key: &str) -> String {
		format!("{}.{key}", self.prefix)
	}

	/// Looks a key up by its camelCase spelling, then its snake_case one.
	fn get(&self, key: &str) -> Option<&'a Value> {
		let map = self.map?;
		map.get(key).or_else(|| map.get(&key.to_snake_case())).filter(|v| !v.is_null())
	}

	fn child(&self, key: &str, warnings: &mut Vec<ConfigWarning>) -> Reader<'a> {
		Self::from_value(self.path(key), self.get(key), warnings)
	}

	fn string(&self, key: &str, warnings: &mut Vec<ConfigWarning>) -> Option<&'a str> {
		match self.get(key)? {
			Value::String(s) => Some(s.as_str()),
			_ => {
				warnings.push(ConfigWarning::WrongType {
					field: self.path(key),
					expected: "string",
				});
				None
			}
		}
	}

	fn string_any(&self, keys: &[&str], warnings: &mut Vec<ConfigWarning>) -> Option<&'a str> {
		let key = keys.iter().find(|k| self.get(k).is_some())?;
		self.string(key, warnings)
	}

	fn number(&self, key: &str, warnings: &mut Vec<ConfigWarning>) -> Option<f64> {
		let value = self.get(key)?;
		let number = match value {
			Value::Number(n) => n.as_f64(),
			Value::String(s) => s.trim().trim_end_matches("px").parse::<f64>().ok(),
			_ => None,
		};
		match number {
			Some(n) if n.is_finite() => Some(n),
			_ => {
				warnings.push(ConfigWarning::WrongType {
					field: self.path(key),
					expected: "number",
				});
				None
			}
		}
	}

	fn boolean(&self, key: &str, warnings: &mut Vec<ConfigWarning>) -> Option<bool> {
		let value = self.get(key)?;
		let flag = match value {
			Value::Bool(b) => Some(*b),
			Value::Number(n) => match n.as_u64() {
				Some(0) => Some(false),
				Some(1) => Some(true),
				_ => None,
			},
			Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
				"true" | "1" | "yes" => Some(true),
				"false" | "0" | "no" => Some(false),
				_ => None,
			},
			_ => None,
		};
		if flag.is_none() {
			warnings.push(ConfigWarning::WrongType {
				field: self.path(key),
				expected: "boolean",
			});
		}
		flag
	}

	/// Non-negative pixel count; negatives clamp to zero.
	fn pixels(&self, key: &str, warnings: &mut Vec<ConfigWarning>) -> Option<u32> {
		let value = self.number(key, warnings)?;
		let clamped = value.clamp(0.0, f64::from(u32::MAX));
		if clamped != value {
			warnings.push(ConfigWarning::Clamped {
				field: self.path(key),
				value,
				to: clamped,
			});
		}
		Some(clamped.round() as u32)
	}

	/// Non-negative seconds; negatives clamp to zero.
	fn seconds(&self, key: &str, warnings: &mut Vec<ConfigWarning>) -> Option<Duration> {
		let value = self.number(key, warnings)?;
		let clamped = value.clamp(0.0, MAX_TIMING_SECS);
		if clamped != value {
			warnings.push(ConfigWarning::Clamped {
				field: self.path(key),
				value,
				to: clamped,
			});
		}
		Some(Duration::from_secs_f64(clamped))
	}

	/// Integer count with a lower bound.
	fn count(&self, key: &str, min: usize, warnings: &mut Vec<ConfigWarning>) -> Option<usize> {
		let value = self.number(key, warnings)?;
		let floor = min as f64;
		if value < floor {
			warnings.push(ConfigWarning::Clamped {
				field: self.path(key),
				value,
				to: floor,
			});
			return Some(min);
		}
		Some(value.floor().min(usize::MAX as f64) as usize)
	}
}
