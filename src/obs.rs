//! Optional observability helpers for client flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `keysmith_client.flow` with the `flow`
//!   and `stage` (call site) fields.
//! - Enable `metrics` to increment the `keysmith_client_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Client flow kinds observed by the instrumentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Login-session request (`begin_login`).
	Login,
	/// Authorization polling (`poll_authorization`).
	Authorize,
	/// Refresh-token exchange (`ensure_access_token`).
	Refresh,
	/// Token revocation (`logout`).
	Logout,
	/// Profile and company lookups.
	Profile,
	/// Signing or KDM-upload job submission.
	Submit,
	/// Job status polling.
	PollJob,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Login => "login",
			FlowKind::Authorize => "authorize",
			FlowKind::Refresh => "refresh",
			FlowKind::Logout => "logout",
			FlowKind::Profile => "profile",
			FlowKind::Submit => "submit",
			FlowKind::PollJob => "poll_job",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a client flow helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
