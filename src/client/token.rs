//! Token maintenance: defensive refresh, revocation, and best-effort session teardown.

// self
use crate::{
	_prelude::*,
	auth::SessionState,
	client::{self, KeySmithClient},
	error::ConfigError,
	http::{Gateway, GatewayRequest},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	wire,
};

impl<G> KeySmithClient<G>
where
	G: ?Sized + Gateway,
{
	/// Exchanges the refresh token for a fresh access token pair, unconditionally.
	///
	/// The service exposes no introspection endpoint and a company-lookup → signing →
	/// KDM-upload workflow may outlive the ~1 hour access-token validity, so token-sensitive
	/// flows call this immediately before starting. The in-memory access token is cleared
	/// before the exchange; the request therefore carries no `Authorization` header.
	pub async fn ensure_access_token(&mut self) -> Result<()> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "ensure_access_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.exchange_refresh_token()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Revokes the current session's tokens and logs out locally.
	///
	/// Credentials are cleared before the revocation outcome is inspected: when revocation
	/// fails the error still surfaces, but the client is already in a logged-out state and the
	/// caller must sign in again instead of retrying with stale tokens.
	pub async fn logout(&mut self) -> Result<()> {
		const KIND: FlowKind = FlowKind::Logout;

		let span = FlowSpan::new(KIND, "logout");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.revoke_session()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Consumes the client, attempting a best-effort logout when a refresh token is still held.
	///
	/// Network I/O cannot run in `Drop`, so teardown is an explicit call; revocation errors are
	/// suppressed.
	pub async fn close(mut self) {
		if self.credentials.refresh_token().is_some() {
			let _ = self.logout().await;
		}
	}

	async fn exchange_refresh_token(&mut self) -> Result<()> {
		let refresh_token = self
			.credentials
			.refresh_token()
			.ok_or(ConfigError::NotAuthenticated)?
			.to_owned();

		// Cleared before the network call so a mid-exchange observer sees an empty token
		// instead of a stale one.
		self.credentials.clear_access_token();

		let url = self.endpoint("/oauth2/authorization/token")?;
		let body = client::form_body(&[
			("client_id", &self.client_id),
			("grant_type", "refresh_token"),
			("refresh_token", &refresh_token),
		]);
		let response = self.execute(GatewayRequest::post(url).form(body)).await?;

		if !response.is_ok() {
			return Err(Error::TokenExchange {
				message: wire::message(response.status, &response.body),
			});
		}

		let token_type = wire::field_str(&response.body, "token_type")?;
		let access_token = wire::field_str(&response.body, "access_token")?;

		self.credentials.set_access_token(access_token, token_type);

		Ok(())
	}

	async fn revoke_session(&mut self) -> Result<()> {
		// Token-sensitive: revocation must carry a fresh access token.
		self.ensure_access_token().await?;

		let url = self.endpoint("/oauth2/token")?;
		let request = self.privileged(GatewayRequest::delete(url));
		let outcome = self.execute(request).await;

		// Clear-then-report: local state is logged out regardless of how revocation went.
		self.credentials.clear();
		self.pending_login = None;
		self.state = SessionState::LoggedOut;

		let response = outcome?;

		if !response.is_ok() {
			return Err(client::service_failure(&response));
		}

		Ok(())
	}
}
