//! HTTP source and sink against a minimal in-process server.

use std::time::Duration;

use nudge_client::{ClientConfig, HttpEventSource, HttpImpressionSink};
use nudge_engine::{EmbedTag, EventSource, FeedFetchError, Impression, ImpressionSink};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Serves one canned response and hands back the raw request.
async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	let (tx, rx) = oneshot::channel();
	tokio::spawn(async move {
		let (mut stream, _) = listener.accept().await.unwrap();
		let mut request = Vec::new();
		let mut buf = [0u8; 4096];
		loop {
			let n = stream.read(&mut buf).await.unwrap();
			request.extend_from_slice(&buf[..n]);
			if n == 0 || request_complete(&request) {
				break;
			}
		}
		let response = format!(
			"HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
			body.len()
		);
		stream.write_all(response.as_bytes()).await.unwrap();
		stream.shutdown().await.ok();
		let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
	});
	(format!("http://{addr}/api"), rx)
}

fn request_complete(raw: &[u8]) -> bool {
	let text = String::from_utf8_lossy(raw);
	let Some(head_end) = text.find("\r\n\r\n") else {
		return false;
	};
	let length = text[..head_end]
		.lines()
		.find_map(|line| {
			let (name, value) = line.split_once(':')?;
			name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok()).flatten()
		})
		.unwrap_or(0);
	raw.len() >= head_end + 4 + length
}

fn config(endpoint: &str) -> ClientConfig {
	let embed = EmbedTag::from_attributes(Some("site-1"), Some("secret")).unwrap();
	let mut config = ClientConfig::new(endpoint, &embed).unwrap();
	config.request_timeout = Duration::from_secs(5);
	config
}

#[tokio::test]
async fn fetch_sends_site_id_and_bearer_token() {
	let (endpoint, request) = serve_once(
		"200 OK",
		r#"{"events":[{"id":"e1","type":"purchase","timestamp":"2026-05-01T12:00:00Z"}]}"#,
	)
	.await;
	let config = config(&endpoint);
	let source = HttpEventSource::new(config.http_client().unwrap(), &config);

	let records = source.fetch().await.unwrap();
	assert_eq!(records.len(), 1);

	let request = request.await.unwrap();
	assert!(request.starts_with("GET /api/get-recent-events?site_id=site-1 "), "{request}");
	assert!(request.to_ascii_lowercase().contains("authorization: bearer secret"), "{request}");
}

#[tokio::test]
async fn non_success_status_is_reported() {
	let (endpoint, _request) = serve_once("503 Service Unavailable", "{}").await;
	let config = config(&endpoint);
	let source = HttpEventSource::new(config.http_client().unwrap(), &config);
	assert!(matches!(source.fetch().await, Err(FeedFetchError::Status(503))));
}

#[tokio::test]
async fn malformed_body_is_reported() {
	let (endpoint, _request) = serve_once("200 OK", "<html>").await;
	let config = config(&endpoint);
	let source = HttpEventSource::new(config.http_client().unwrap(), &config);
	assert!(matches!(source.fetch().await, Err(FeedFetchError::Malformed(_))));
}

#[tokio::test]
async fn impressions_are_posted_as_json() {
	let (endpoint, request) = serve_once("204 No Content", "").await;
	let config = config(&endpoint);
	let (sink, task) = HttpImpressionSink::spawn(config.http_client().unwrap(), config.impression_url(), CancellationToken::new());

	sink.report(Impression {
		event_id: "e1".to_string(),
		site_id: "site-1".to_string(),
		widget_id: "default".to_string(),
		kind: "purchase".to_string(),
		title: "Ana".to_string(),
		message: "bought a lamp".to_string(),
		displayed_at: "2026-05-01T12:00:00Z".parse().unwrap(),
	});
	drop(sink);
	task.await.unwrap();

	let request = request.await.unwrap();
	assert!(request.starts_with("POST /api/track-impression "), "{request}");
	let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
	let json: serde_json::Value = serde_json::from_str(body).unwrap();
	assert_eq!(json["type"], "purchase");
	assert_eq!(json["event_id"], "e1");
}
