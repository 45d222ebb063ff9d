//! # nudge-client
//!
//! Network and runtime glue for [`nudge_engine`]:
//!
//! - [`HttpEventSource`] polls the collaborator's recent-events endpoint.
//! - [`HttpImpressionSink`] posts impressions from a background task.
//! - [`spawn_poller`] and [`run_engine`] run one engine on a tokio runtime.
//!
//! The engine itself stays synchronous; this crate only decides when to
//! call it.

mod clock;
mod config;
mod driver;
mod error;
mod sink;
mod source;

pub use clock::TokioClock;
pub use config::{ClientConfig, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT};
pub use driver::{run_engine, spawn_poller};
pub use error::ClientError;
pub use sink::HttpImpressionSink;
pub use source::HttpEventSource;
