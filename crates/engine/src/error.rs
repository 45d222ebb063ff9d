//! Error types raised at component boundaries.
//!
//! None of these escape the engine as a panic: initialization errors stop the
//! engine from starting, everything else is logged and contained.

use crate::scheduler::SlotId;

/// Fatal bootstrap failure. An engine is never constructed when this is raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitError {
	/// The embed tag carried no site identifier.
	#[error("embed is missing a site id")]
	MissingSiteId,
	/// The embed tag carried no API credential.
	#[error("embed is missing an API credential")]
	MissingCredential,
}

/// Failure of one poll cycle. Recoverable: the cycle is skipped and the next
/// poll runs on its normal interval.
#[derive(Debug, thiserror::Error)]
pub enum FeedFetchError {
	/// The collaborator answered with a non-success status.
	#[error("feed responded with status {0}")]
	Status(u16),
	/// The request never produced a response.
	#[error("feed transport error: {0}")]
	Transport(String),
	/// The body was not a recognizable event list.
	#[error("malformed feed payload: {0}")]
	Malformed(#[from] serde_json::Error),
}

/// The visual element backing a slot no longer exists (host page navigated,
/// container removed). The transition is abandoned without retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("render target for slot {slot} is gone")]
pub struct RenderTargetMissing {
	/// Slot whose element disappeared.
	pub slot: SlotId,
}
