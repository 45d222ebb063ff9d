/// Setup failure of the HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
	/// The endpoint is not an absolute `http(s)` URL with a path.
	#[error("invalid endpoint '{url}': {reason}")]
	InvalidEndpoint { url: String, reason: String },
	/// The underlying HTTP client could not be built.
	#[error("failed to build HTTP client: {0}")]
	Http(#[from] reqwest::Error),
}
