//! Impression records and where they go.

use std::sync::mpsc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::WidgetConfig;
use crate::event::NotificationEvent;
use crate::template::RenderedContent;

/// One notification that was fully displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Impression {
	pub event_id: String,
	pub site_id: String,
	pub widget_id: String,
	#[serde(rename = "type")]
	pub kind: String,
	pub title: String,
	pub message: String,
	/// Wall-clock time the notification was mounted.
	pub displayed_at: DateTime<Utc>,
}

impl Impression {
	pub fn new(config: &WidgetConfig, event: &NotificationEvent, content: &RenderedContent, displayed_at: DateTime<Utc>) -> Self {
		Self {
			event_id: event.id.clone(),
			site_id: config.site_id.clone(),
			widget_id: config.widget_id.clone(),
			kind: event.kind.as_str().to_string(),
			title: content.title.clone(),
			message: content.message.clone(),
			displayed_at,
		}
	}
}

/// Receiver of impressions. Reporting is fire-and-forget: a sink must not
/// block and has no way to fail the display.
pub trait ImpressionSink: Send {
	fn report(&self, impression: Impression);
}

/// Discards impressions.
impl ImpressionSink for () {
	fn report(&self, _impression: Impression) {}
}

impl ImpressionSink for mpsc::Sender<Impression> {
	fn report(&self, impression: Impression) {
		if self.send(impression).is_err() {
			tracing::debug!("impression receiver dropped");
		}
	}
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;
	use serde_json::json;

	use super::*;

	#[test]
	fn serializes_with_wire_field_names() {
		let impression = Impression {
			event_id: "e1".to_string(),
			site_id: "s1".to_string(),
			widget_id: "default".to_string(),
			kind: "purchase".to_string(),
			title: "Ana".to_string(),
			message: "bought a lamp".to_string(),
			displayed_at: Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap(),
		};
		assert_eq!(
			serde_json::to_value(&impression).unwrap(),
			json!({
				"event_id": "e1",
				"site_id": "s1",
				"widget_id": "default",
				"type": "purchase",
				"title": "Ana",
				"message": "bought a lamp",
				"displayed_at": "2026-02-03T04:05:06Z",
			})
		);
	}

	#[test]
	fn channel_sink_forwards() {
		let (tx, rx) = mpsc::channel();
		let impression = Impression {
			event_id: "e1".to_string(),
			site_id: "s1".to_string(),
			widget_id: "w".to_string(),
			kind: "signup".to_string(),
			title: String::new(),
			message: String::new(),
			displayed_at: Utc::now(),
		};
		tx.report(impression.clone());
		assert_eq!(rx.try_recv().unwrap(), impression);
	}
}
