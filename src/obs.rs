//! Optional observability helpers for the request pipeline.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `cedarstack_http.client` with the `phase`
//!   (pipeline stage) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `cedarstack_http_refresh_total` counter for every
//!   refresh attempt/reuse/success/failure, labeled by `trigger` + `outcome`, and the
//!   `cedarstack_http_session_terminated_total` counter on session teardown.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// What caused a credential refresh to be considered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshTrigger {
	/// Expiry-buffer check before a request was sent.
	Proactive,
	/// Unauthorized response after a request was sent.
	Reactive,
}
impl RefreshTrigger {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshTrigger::Proactive => "proactive",
			RefreshTrigger::Reactive => "reactive",
		}
	}
}
impl Display for RefreshTrigger {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each refresh consideration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshOutcome {
	/// Entry to the coordinated refresh path.
	Attempt,
	/// Another in-flight refresh already rotated the credential; no network call was made.
	Reused,
	/// Token endpoint exchange completed successfully.
	Success,
	/// Refresh failed and the error was handed to the response path.
	Failure,
}
impl RefreshOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshOutcome::Attempt => "attempt",
			RefreshOutcome::Reused => "reused",
			RefreshOutcome::Success => "success",
			RefreshOutcome::Failure => "failure",
		}
	}
}
impl Display for RefreshOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
