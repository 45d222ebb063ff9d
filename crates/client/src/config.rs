use std::time::Duration;

use nudge_engine::EmbedTag;
use url::Url;

use crate::error::ClientError;

/// Poll cadence for the recent-events endpoint.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
/// Per-request timeout for both endpoints.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const EVENTS_PATH: &str = "get-recent-events";
const IMPRESSION_PATH: &str = "track-impression";

/// Connection settings for one embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
	/// Base URL; endpoint paths are appended to it.
	pub endpoint: Url,
	pub site_id: String,
	/// Sent as a bearer token when present.
	pub api_key: Option<String>,
	pub poll_interval: Duration,
	pub request_timeout: Duration,
}

impl ClientConfig {
	/// Builds settings for `embed` against `endpoint`.
	pub fn new(endpoint: &str, embed: &EmbedTag) -> Result<Self, ClientError> {
		let invalid = |reason: String| ClientError::InvalidEndpoint {
			url: endpoint.to_string(),
			reason,
		};
		let url = Url::parse(endpoint.trim()).map_err(|e| invalid(e.to_string()))?;
		if !matches!(url.scheme(), "http" | "https") {
			return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
		}
		if url.cannot_be_a_base() {
			return Err(invalid("not a base URL".to_string()));
		}
		Ok(Self {
			endpoint: url,
			site_id: embed.site_id.clone(),
			api_key: Some(embed.api_key.clone()),
			poll_interval: DEFAULT_POLL_INTERVAL,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
		})
	}

	/// `{endpoint}/get-recent-events?site_id=…`
	pub fn events_url(&self) -> Url {
		let mut url = self.join(EVENTS_PATH);
		url.query_pairs_mut().append_pair("site_id", &self.site_id);
		url
	}

	/// `{endpoint}/track-impression`
	pub fn impression_url(&self) -> Url {
		self.join(IMPRESSION_PATH)
	}

	/// Shared HTTP client honouring the request timeout.
	pub fn http_client(&self) -> Result<reqwest::Client, ClientError> {
		let client = reqwest::Client::builder()
			.timeout(self.request_timeout)
			.user_agent(concat!("nudge/", env!("CARGO_PKG_VERSION")))
			.build()?;
		Ok(client)
	}

	fn join(&self, path: &str) -> Url {
		let mut url = self.endpoint.clone();
		url.set_query(None);
		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().push(path);
		}
		url
	}
}
