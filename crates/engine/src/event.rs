//! Notification events and their wire form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::FeedFetchError;

/// Kind of visitor activity behind a notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
	Purchase,
	Signup,
	Review,
	AddToCart,
	FormSubmit,
	PageView,
	/// Presence ping. Never displayed.
	VisitorActive,
	Other(String),
}

impl EventKind {
	pub fn parse(value: &str) -> Self {
		match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
			"purchase" | "order" => Self::Purchase,
			"signup" | "sign_up" | "registration" => Self::Signup,
			"review" => Self::Review,
			"add_to_cart" | "addtocart" => Self::AddToCart,
			"form_submit" | "formsubmit" => Self::FormSubmit,
			"page_view" | "pageview" => Self::PageView,
			"visitor_active" => Self::VisitorActive,
			other => Self::Other(other.to_string()),
		}
	}

	pub fn as_str(&self) -> &str {
		match self {
			Self::Purchase => "purchase",
			Self::Signup => "signup",
			Self::Review => "review",
			Self::AddToCart => "add_to_cart",
			Self::FormSubmit => "form_submit",
			Self::PageView => "page_view",
			Self::VisitorActive => "visitor_active",
			Self::Other(name) => name,
		}
	}

	/// Title used when the record carries none.
	fn fallback_title(&self) -> &'static str {
		match self {
			Self::Purchase => "New purchase",
			Self::Signup => "New signup",
			Self::Review => "New review",
			Self::AddToCart => "Added to cart",
			Self::FormSubmit => "New submission",
			Self::PageView => "Someone is browsing",
			Self::VisitorActive | Self::Other(_) => "Recent activity",
		}
	}

	/// Icon used when the record carries none.
	fn fallback_icon(&self) -> &'static str {
		match self {
			Self::Purchase => "🛍️",
			Self::Signup => "👋",
			Self::Review => "⭐",
			Self::AddToCart => "🛒",
			Self::FormSubmit => "📝",
			Self::PageView => "👀",
			Self::VisitorActive | Self::Other(_) => "🔔",
		}
	}
}

/// One occurrence that may be shown. Immutable once handed to the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
	pub id: String,
	pub kind: EventKind,
	pub timestamp: DateTime<Utc>,
	pub title: String,
	/// Pre-rendered human text.
	pub message: String,
	pub icon: String,
	pub location: Option<String>,
	pub value: Option<f64>,
	pub currency: Option<String>,
}

impl NotificationEvent {
	/// Builds a displayable event from a raw record.
	///
	/// Returns `None` for presence pings and for records without a usable id
	/// or timestamp.
	pub fn from_record(record: &RawEventRecord) -> Option<Self> {
		let kind = EventKind::parse(record.kind.as_deref().unwrap_or_default());
		if kind == EventKind::VisitorActive {
			return None;
		}
		let id = record.id_string()?;
		let timestamp = record.timestamp.as_deref().and_then(parse_timestamp)?;

		let title = non_blank(record.title.as_deref()).unwrap_or(kind.fallback_title()).to_string();
		let icon = non_blank(record.icon.as_deref()).unwrap_or(kind.fallback_icon()).to_string();
		Some(Self {
			id,
			timestamp,
			title,
			message: record.message.clone().unwrap_or_default(),
			icon,
			location: non_blank(record.location.as_deref()).map(str::to_string),
			value: record.value.filter(|v| v.is_finite()),
			currency: non_blank(record.currency.as_deref()).map(str::to_string),
			kind,
		})
	}
}

/// Event record exactly as served by the collaborator.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawEventRecord {
	/// String or numeric id.
	#[serde(default)]
	pub id: Option<Value>,
	#[serde(default, rename = "type", alias = "event_type", deserialize_with = "lenient_text")]
	pub kind: Option<String>,
	/// RFC 3339 timestamp.
	#[serde(default, alias = "created_at", deserialize_with = "lenient_text")]
	pub timestamp: Option<String>,
	#[serde(default, deserialize_with = "lenient_text")]
	pub title: Option<String>,
	#[serde(default, deserialize_with = "lenient_text")]
	pub message: Option<String>,
	#[serde(default, deserialize_with = "lenient_text")]
	pub icon: Option<String>,
	#[serde(default, deserialize_with = "lenient_text")]
	pub location: Option<String>,
	/// Amount as a JSON number or a numeric string.
	#[serde(default, deserialize_with = "lenient_number")]
	pub value: Option<f64>,
	#[serde(default, deserialize_with = "lenient_text")]
	pub currency: Option<String>,
	/// Widget design payload, repeated on every record.
	#[serde(default)]
	pub design: Option<Value>,
	/// Responsive overrides payload.
	#[serde(default)]
	pub display: Option<Value>,
}

impl RawEventRecord {
	fn id_string(&self) -> Option<String> {
		match self.id.as_ref()? {
			Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
			Value::Number(n) => Some(n.to_string()),
			_ => None,
		}
	}
}

/// Strings pass through, numbers and booleans are stringified, anything else
/// reads as absent.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
	Ok(match Value::deserialize(deserializer)? {
		Value::String(s) => Some(s),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	})
}

/// Numbers pass through, numeric strings are parsed, anything else reads as
/// absent.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
	Ok(match Value::deserialize(deserializer)? {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse::<f64>().ok(),
		_ => None,
	})
}

/// Response body of the events endpoint: a bare list or `{ "events": [...] }`.
///
/// Entries are kept as raw JSON until [`into_records`](Self::into_records),
/// so one undecodable entry costs only itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FeedPayload {
	Bare(Vec<Value>),
	Wrapped { events: Vec<Value> },
}

impl FeedPayload {
	/// Decodes a response body into records, newest first as served.
	pub fn parse(body: &[u8]) -> Result<Vec<RawEventRecord>, FeedFetchError> {
		let payload: FeedPayload = serde_json::from_slice(body)?;
		Ok(payload.into_records())
	}

	/// Decodes each entry, dropping the ones that are not records.
	pub fn into_records(self) -> Vec<RawEventRecord> {
		let (Self::Bare(entries) | Self::Wrapped { events: entries }) = self;
		entries
			.into_iter()
			.filter_map(|entry| match serde_json::from_value::<RawEventRecord>(entry) {
				Ok(record) => Some(record),
				Err(err) => {
					tracing::debug!(%err, "skipping undecodable feed record");
					None
				}
			})
			.collect()
	}
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
	DateTime::parse_from_rfc3339(value.trim()).ok().map(|ts| ts.with_timezone(&Utc))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|s| !s.is_empty())
}
