//! Sign-in state machine primitives.

// self
use crate::_prelude::*;

/// Lifecycle states of one client session.
///
/// ```text
/// Unauthenticated -> LoginRequested -> Polling -> Authenticated -> LoggedOut
///                                         |
///                                         +-> Expired (session lapsed before approval)
/// ```
///
/// A denied sign-in attempt returns the session to [`SessionState::Unauthenticated`] so a fresh
/// login can be requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
	/// No usable credentials are held.
	Unauthenticated,
	/// A login session has been requested; the browser URL has been handed to the caller.
	LoginRequested,
	/// At least one authorization poll returned the pending sentinel.
	Polling,
	/// Authorization completed and a token grant is held.
	Authenticated,
	/// The session was terminated locally; credentials are cleared.
	LoggedOut,
	/// The sign-in session lapsed before the user authorized it.
	Expired,
}
impl SessionState {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SessionState::Unauthenticated => "unauthenticated",
			SessionState::LoginRequested => "login_requested",
			SessionState::Polling => "polling",
			SessionState::Authenticated => "authenticated",
			SessionState::LoggedOut => "logged_out",
			SessionState::Expired => "expired",
		}
	}
}
impl Display for SessionState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Transient handle for one in-flight browser sign-in.
///
/// Created by `begin_login`, consumed once authorization completes or the attempt terminates.
/// Never persisted; the service keeps the session valid for roughly fifteen minutes.
#[derive(Clone, Debug)]
pub struct AuthorizationSession {
	/// Session code identifying this sign-in attempt.
	pub code: String,
	/// Session-specific URL polled for authorization completion.
	pub polling_endpoint: Url,
	/// Browser-facing login URL handed to the user.
	pub login_url: Url,
}
