//! In-memory credential record for one signed-in KeySmith identity.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Refresh/access token pair held by exactly one client instance.
///
/// The access token is only meaningful together with its token type; the two are stored and
/// cleared strictly as a pair so observers never see a token with no scheme (or vice versa).
/// Expiry is not tracked locally: freshness is enforced by re-deriving the access token from the
/// refresh token immediately before token-sensitive calls.
#[derive(Clone, Debug, Default)]
pub struct Credentials {
	refresh_token: Option<TokenSecret>,
	access_token: Option<TokenSecret>,
	token_type: Option<String>,
}
impl Credentials {
	/// Creates an empty credential record.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a record seeded with a refresh token persisted from a previous session.
	pub fn seeded(refresh_token: impl Into<String>) -> Self {
		Self { refresh_token: Some(TokenSecret::new(refresh_token)), ..Self::default() }
	}

	/// Returns the current refresh token, the only field worth persisting across sessions.
	pub fn refresh_token(&self) -> Option<&str> {
		self.refresh_token.as_ref().map(TokenSecret::expose)
	}

	/// Returns whether an access token pair is currently held.
	pub fn has_access_token(&self) -> bool {
		self.access_token.is_some()
	}

	/// Renders the `Authorization` header value, when an access token pair is held.
	pub fn authorization_header(&self) -> Option<String> {
		match (&self.token_type, &self.access_token) {
			(Some(token_type), Some(access)) => Some(format!("{token_type} {}", access.expose())),
			_ => None,
		}
	}

	/// Stores the full grant issued when authorization completes.
	pub(crate) fn store_grant(
		&mut self,
		access_token: impl Into<String>,
		refresh_token: impl Into<String>,
		token_type: impl Into<String>,
	) {
		self.refresh_token = Some(TokenSecret::new(refresh_token));
		self.access_token = Some(TokenSecret::new(access_token));
		self.token_type = Some(token_type.into());
	}

	/// Replaces the access token pair after a refresh exchange.
	pub(crate) fn set_access_token(
		&mut self,
		access_token: impl Into<String>,
		token_type: impl Into<String>,
	) {
		self.access_token = Some(TokenSecret::new(access_token));
		self.token_type = Some(token_type.into());
	}

	/// Drops the access token pair, leaving the refresh token in place.
	pub(crate) fn clear_access_token(&mut self) {
		self.access_token = None;
		self.token_type = None;
	}

	/// Wipes every field; used by logout and construction-time recovery.
	pub(crate) fn clear(&mut self) {
		self.refresh_token = None;
		self.clear_access_token();
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn access_token_and_type_move_as_a_pair() {
		let mut credentials = Credentials::seeded("refresh-1");

		assert!(credentials.authorization_header().is_none());

		credentials.set_access_token("access-1", "Bearer");

		assert_eq!(credentials.authorization_header().as_deref(), Some("Bearer access-1"));

		credentials.clear_access_token();

		assert!(!credentials.has_access_token());
		assert!(credentials.authorization_header().is_none());
		assert_eq!(credentials.refresh_token(), Some("refresh-1"));
	}

	#[test]
	fn clear_wipes_every_field() {
		let mut credentials = Credentials::new();

		credentials.store_grant("access-1", "refresh-1", "Bearer");
		credentials.clear();

		assert_eq!(credentials.refresh_token(), None);
		assert!(!credentials.has_access_token());
	}

	#[test]
	fn debug_output_redacts_token_material() {
		let mut credentials = Credentials::seeded("refresh-1");

		credentials.set_access_token("access-1", "Bearer");

		let rendered = format!("{credentials:?}");

		assert!(!rendered.contains("refresh-1"));
		assert!(!rendered.contains("access-1"));
	}
}
