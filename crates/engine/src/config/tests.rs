use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

fn raw(design: serde_json::Value, display: serde_json::Value) -> RawWidgetConfig {
	RawWidgetConfig {
		site_id: Some("site-1".to_string()),
		widget_id: None,
		design: Some(design),
		display: Some(display),
	}
}

#[test]
fn missing_site_id_is_fatal() {
	let err = resolve(&RawWidgetConfig::default()).unwrap_err();
	assert_eq!(err, ConfigError::MissingField("site_id"));

	let blank = RawWidgetConfig {
		site_id: Some("   ".to_string()),
		..RawWidgetConfig::default()
	};
	assert!(resolve(&blank).is_err());
}

#[test]
fn empty_payload_resolves_to_documented_defaults() {
	let resolved = resolve(&RawWidgetConfig {
		site_id: Some("site-1".to_string()),
		..RawWidgetConfig::default()
	})
	.unwrap();

	assert!(resolved.warnings.is_empty());
	assert_eq!(resolved.config, WidgetConfig::defaults_for("site-1"));

	let config = resolved.config;
	assert_eq!(config.widget_id, "default");
	assert_eq!(config.position.offset_x, 20);
	assert_eq!(config.position.offset_y, 20);
	assert_eq!(config.animation.kind, AnimationKind::Fade);
	assert_eq!(config.animation.speed.duration(), Duration::from_secs(1));
	assert!(config.triggers.on_page_load);
	assert!(!config.triggers.on_scroll);
	assert!(!config.triggers.on_exit);
	assert_eq!(config.limits.max_concurrent, 1);
	assert_eq!(config.display.mobile_position, config.position.corner);
}

#[test]
fn reads_camel_case_design() {
	let resolved = resolve(&raw(
		json!({
			"title": "{{title}}!",
			"content": "{{message}} ({{time_ago}})",
			"position": "bottom-right",
			"offsetX": 30,
			"offsetY": 10,
			"animation": { "type": "slide", "speed": "fast" },
			"timing": { "delay": 1.5, "displayDuration": 8, "interval": 2 },
			"triggers": { "onPageLoad": true, "onScroll": true },
			"maxConcurrent": 3
		}),
		json!({ "mobile_position": "top-left", "hide_on_desktop": true, "reduced_motion_support": true }),
	))
	.unwrap();

	assert!(resolved.warnings.is_empty(), "{:?}", resolved.warnings);
	let config = resolved.config;
	assert_eq!(
		config.position,
		Position {
			corner: Corner::BottomRight,
			offset_x: 30,
			offset_y: 10,
		}
	);
	assert_eq!(config.animation.kind, AnimationKind::Slide);
	assert_eq!(config.animation.speed, AnimationSpeed::Fast);
	assert_eq!(config.timing.delay, Duration::from_millis(1500));
	assert_eq!(config.timing.display_duration, Duration::from_secs(8));
	assert_eq!(config.timing.interval, Duration::from_secs(2));
	assert!(config.triggers.on_scroll);
	assert_eq!(config.limits.max_concurrent, 3);
	assert_eq!(config.display.mobile_position, Corner::TopLeft);
	assert!(config.display.hide_on_desktop);
	assert!(config.display.reduced_motion);
}

#[test]
fn nested_position_object_is_accepted() {
	let config = resolve(&raw(json!({ "position": { "corner": "top_right", "offset_x": "12px", "offset_y": 4 } }), json!(null)))
		.unwrap()
		.config;
	assert_eq!(config.position.corner, Corner::TopRight);
	assert_eq!(config.position.offset_x, 12);
	assert_eq!(config.position.offset_y, 4);
}

#[test]
fn unknown_animation_falls_back_with_warning() {
	let resolved = resolve(&raw(json!({ "animation": { "type": "wobble", "speed": "ludicrous" } }), json!({}))).unwrap();
	assert_eq!(resolved.config.animation, AnimationConfig::default());
	assert_eq!(
		resolved.warnings,
		vec![
			ConfigWarning::UnknownValue {
				field: "design.animation.type".to_string(),
				value: "wobble".to_string(),
			},
			ConfigWarning::UnknownValue {
				field: "design.animation.speed".to_string(),
				value: "ludicrous".to_string(),
			},
		]
	);
}

#[test]
fn negative_values_clamp_to_zero() {
	let resolved = resolve(&raw(json!({ "offsetX": -15, "timing": { "displayDuration": -3 } }), json!({}))).unwrap();
	assert_eq!(resolved.config.position.offset_x, 0);
	assert_eq!(resolved.config.timing.display_duration, Duration::ZERO);
	assert_eq!(resolved.warnings.len(), 2);
}

#[test]
fn oversized_timings_clamp_to_a_year() {
	let resolved = resolve(&raw(json!({ "timing": { "delay": 0, "displayDuration": 1.8446744073709549e19 } }), json!({}))).unwrap();
	let year = Duration::from_secs_f64(MAX_TIMING_SECS);
	assert_eq!(resolved.config.timing.display_duration, year);
	assert_eq!(resolved.config.timing.delay, Duration::ZERO);
	assert!(matches!(
		resolved.warnings.as_slice(),
		[ConfigWarning::Clamped { to, .. }] if *to == MAX_TIMING_SECS
	));
}

#[test]
fn malformed_fields_never_fail_resolution() {
	let resolved = resolve(&raw(
		json!({
			"position": 42,
			"animation": [],
			"timing": "soon",
			"triggers": { "onPageLoad": "maybe" },
			"maxConcurrent": 0
		}),
		json!("compact"),
	))
	.unwrap();

	let config = resolved.config;
	assert_eq!(config.position, Position::default());
	assert_eq!(config.animation, AnimationConfig::default());
	assert_eq!(config.timing, Timing::default());
	assert!(config.triggers.on_page_load);
	assert_eq!(config.limits.max_concurrent, 1);
	assert_eq!(config.display, DisplayRules::default());
	assert_eq!(resolved.warnings.len(), 6);
}

#[test]
fn capacity_collapses_on_mobile_without_stacking() {
	let mut config = WidgetConfig::defaults_for("site-1");
	config.limits.max_concurrent = 3;
	assert_eq!(config.capacity_for(true), 3);
	config.display.stack_on_mobile = false;
	assert_eq!(config.capacity_for(true), 1);
	assert_eq!(config.capacity_for(false), 3);
}

#[test]
fn corner_parses_common_spellings() {
	assert_eq!(Corner::parse("bottom-right"), Some(Corner::BottomRight));
	assert_eq!(Corner::parse("bottomRight"), Some(Corner::BottomRight));
	assert_eq!(Corner::parse("TOP_LEFT"), Some(Corner::TopLeft));
	assert_eq!(Corner::parse("center"), None);
}
