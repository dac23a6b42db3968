//! Browser-driven sign-in: login-session request and authorization polling.
//!
//! `begin_login` opens a short-lived login session and hands back the browser URL; the caller
//! then drives `poll_authorization` until it reports `true`. The service overloads HTTP 202 for
//! both "still waiting" and "approved", so the poll decodes the wire `code` field even on
//! success-looking statuses before deciding which way to go.

// self
use crate::{
	_prelude::*,
	auth::{AuthorizationSession, SessionState},
	client::{self, KeySmithClient},
	error::ConfigError,
	http::{Gateway, GatewayRequest},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	wire::{self, AuthCode},
};

/// Delay recommended between authorization polls. The client never sleeps internally; callers
/// apply this (or their own) backoff between calls.
pub const RECOMMENDED_POLL_INTERVAL: Duration = Duration::seconds(2);

impl<G> KeySmithClient<G>
where
	G: ?Sized + Gateway,
{
	/// Opens a login session and returns the URL the user must visit to sign in.
	///
	/// The session stays valid for roughly fifteen minutes; authorization is completed by
	/// polling [`KeySmithClient::poll_authorization`] until it returns `true`.
	pub async fn begin_login(&mut self) -> Result<Url> {
		const KIND: FlowKind = FlowKind::Login;

		let span = FlowSpan::new(KIND, "begin_login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.request_login_session()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Polls the session-specific endpoint for authorization completion.
	///
	/// Returns `false` while the user has not finished the browser flow (re-poll after
	/// [`RECOMMENDED_POLL_INTERVAL`]); returns `true` once the token grant has been stored. A
	/// denied request surfaces [`Error::AccessDenied`] and a lapsed session
	/// [`Error::SessionExpired`], each terminal for this login attempt.
	pub async fn poll_authorization(&mut self) -> Result<bool> {
		const KIND: FlowKind = FlowKind::Authorize;

		let span = FlowSpan::new(KIND, "poll_authorization");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.poll_login_session()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn request_login_session(&mut self) -> Result<Url> {
		let url = self.endpoint("/oauth2/authorization/request")?;
		let body = client::form_body(&[("client_id", &self.client_id)]);
		let response = self.execute(GatewayRequest::post(url).form(body)).await?;

		if !response.is_ok() {
			return Err(client::service_failure(&response));
		}

		let code = wire::field_str(&response.body, "code")?;
		let polling_endpoint = parse_service_url(&wire::field_str(&response.body, "token_url")?)?;
		let mut login_url =
			parse_service_url(&wire::field_str(&response.body, "authorization_url")?)?;

		login_url.query_pairs_mut().append_pair("code", &code);

		self.pending_login =
			Some(AuthorizationSession { code, polling_endpoint, login_url: login_url.clone() });
		self.state = SessionState::LoginRequested;

		Ok(login_url)
	}

	async fn poll_login_session(&mut self) -> Result<bool> {
		let session = self.pending_login.as_ref().ok_or(ConfigError::NoPendingLogin)?;
		let body = client::form_body(&[
			("client_id", &self.client_id),
			("grant_type", "authorization_code"),
			("code", &session.code),
		]);
		let request = GatewayRequest::post(session.polling_endpoint.clone()).form(body);
		let response = self.execute(request).await?;

		if !response.is_ok() && !response.is_accepted() {
			return Err(match wire::auth_code(&response.body) {
				Some(AuthCode::AccessDenied) => {
					self.pending_login = None;
					self.state = SessionState::Unauthenticated;

					Error::AccessDenied
				},
				Some(AuthCode::SessionExpired) => {
					self.pending_login = None;
					self.state = SessionState::Expired;

					Error::SessionExpired
				},
				_ => client::service_failure(&response),
			});
		}
		if response.is_accepted() && wire::auth_code(&response.body) == Some(AuthCode::Pending) {
			self.state = SessionState::Polling;

			return Ok(false);
		}

		// Extract every field before touching credentials; a decode failure must not leave a
		// partially written grant behind.
		let access_token = wire::field_str(&response.body, "access_token")?;
		let refresh_token = wire::field_str(&response.body, "refresh_token")?;
		let token_type = wire::field_str(&response.body, "token_type")?;

		self.credentials.store_grant(access_token, refresh_token, token_type);
		self.pending_login = None;
		self.state = SessionState::Authenticated;

		Ok(true)
	}
}

/// Parses a URL handed back by the service inside a response body.
fn parse_service_url(value: &str) -> Result<Url> {
	Ok(Url::parse(value)
		.map_err(|source| ConfigError::InvalidEndpoint { path: value.into(), source })?)
}
