use async_trait::async_trait;
use nudge_engine::{EventSource, FeedFetchError, FeedPayload, RawEventRecord};
use url::Url;

use crate::config::ClientConfig;

/// Polls `{endpoint}/get-recent-events` for one site.
#[derive(Debug, Clone)]
pub struct HttpEventSource {
	client: reqwest::Client,
	url: Url,
	api_key: Option<String>,
}

impl HttpEventSource {
	pub fn new(client: reqwest::Client, config: &ClientConfig) -> Self {
		Self {
			client,
			url: config.events_url(),
			api_key: config.api_key.clone(),
		}
	}
}

#[async_trait]
impl EventSource for HttpEventSource {
	async fn fetch(&self) -> Result<Vec<RawEventRecord>, FeedFetchError> {
		let mut request = self.client.get(self.url.clone());
		if let Some(key) = &self.api_key {
			request = request.bearer_auth(key);
		}
		let response = request.send().await.map_err(|e| FeedFetchError::Transport(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			return Err(FeedFetchError::Status(status.as_u16()));
		}
		let body = response.bytes().await.map_err(|e| FeedFetchError::Transport(e.to_string()))?;
		let records = FeedPayload::parse(&body)?;
		tracing::trace!(records = records.len(), "feed fetched");
		Ok(records)
	}
}
