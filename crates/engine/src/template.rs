//! `{{field}}` substitution for widget title and body templates.

use chrono::{DateTime, Utc};
use chrono_humanize::HumanTime;

use crate::config::WidgetConfig;
use crate::event::NotificationEvent;

/// Text shown for one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContent {
	pub title: String,
	pub message: String,
	pub icon: String,
}

impl RenderedContent {
	/// Renders the widget's title and body templates for `event`.
	pub fn for_event(config: &WidgetConfig, event: &NotificationEvent, now: DateTime<Utc>) -> Self {
		Self {
			title: render(&config.title, event, now),
			message: render(&config.content, event, now),
			icon: event.icon.clone(),
		}
	}
}

/// Substitutes every `{{field}}` placeholder in `template`.
///
/// Supported fields: `title`, `message`, `type`, `icon`, `location`, `value`,
/// `currency`, `time_ago`. Unknown or absent fields render as empty text; an
/// unterminated `{{` is kept literally.
pub fn render(template: &str, event: &NotificationEvent, now: DateTime<Utc>) -> String {
	let mut out = String::with_capacity(template.len() + event.message.len());
	let mut rest = template;
	while let Some(open) = rest.find("{{") {
		let Some(close) = rest[open + 2..].find("}}") else {
			break;
		};
		out.push_str(&rest[..open]);
		let name = rest[open + 2..open + 2 + close].trim();
		out.push_str(&field(name, event, now));
		rest = &rest[open + 2 + close + 2..];
	}
	out.push_str(rest);
	out
}

fn field(name: &str, event: &NotificationEvent, now: DateTime<Utc>) -> String {
	match name {
		"title" => event.title.clone(),
		"message" => event.message.clone(),
		"type" => event.kind.as_str().to_string(),
		"icon" => event.icon.clone(),
		"location" => event.location.clone().unwrap_or_default(),
		"value" => event.value.map(format_value).unwrap_or_default(),
		"currency" => event.currency.clone().unwrap_or_default(),
		"time_ago" => HumanTime::from(event.timestamp.signed_duration_since(now)).to_string(),
		_ => String::new(),
	}
}

fn format_value(value: f64) -> String {
	if value.fract() == 0.0 { format!("{value:.0}") } else { format!("{value:.2}") }
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;

	use super::*;
	use crate::event::EventKind;

	fn event() -> NotificationEvent {
		NotificationEvent {
			id: "1".to_string(),
			kind: EventKind::Purchase,
			timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
			title: "Ana".to_string(),
			message: "bought a lamp".to_string(),
			icon: "🛍️".to_string(),
			location: Some("Lisbon".to_string()),
			value: Some(49.0),
			currency: Some("EUR".to_string()),
		}
	}

	#[test]
	fn substitutes_known_fields() {
		let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
		let text = render("{{ title }} from {{location}} {{message}} for {{value}} {{currency}}", &event(), now);
		assert_eq!(text, "Ana from Lisbon bought a lamp for 49 EUR");
	}

	#[test]
	fn unknown_fields_render_empty_and_unterminated_braces_survive() {
		let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
		assert_eq!(render("[{{nope}}]", &event(), now), "[]");
		assert_eq!(render("{{title} oops", &event(), now), "{{title} oops");
	}

	#[test]
	fn time_ago_is_relative_to_now() {
		let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 5, 0).unwrap();
		assert_eq!(render("{{time_ago}}", &event(), now), "5 minutes ago");
	}
}
