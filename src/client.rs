//! The KeySmith session object: construction, shared request plumbing, and accessors.
//!
//! One [`KeySmithClient`] mediates exactly one signed-in identity. Credentials and the cached
//! company list are exclusively owned by the instance, so every flow takes `&mut self` and no
//! locking is required; callers wanting a new identity construct a new client.

pub mod jobs;
pub mod login;
pub mod profile;
pub mod token;

pub use jobs::{JobKind, JobStatus};
pub use login::RECOMMENDED_POLL_INTERVAL;
pub use profile::{Company, UserIdentity, select_active_company};

// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestGateway;
use crate::{
	_prelude::*,
	auth::{AuthorizationSession, Credentials, SessionState},
	error::ConfigError,
	http::{Gateway, GatewayRequest, GatewayResponse},
	wire,
};

/// Authenticated client for one KeySmith session.
///
/// Constructed via [`KeySmithClient::connect`] (or [`KeySmithClient::new`] for the default
/// reqwest transport), optionally seeded with a refresh token persisted from a previous run.
/// All waiting is caller-driven: the client never sleeps internally, so login and job polling
/// loops apply their own backoff and deadline policy.
pub struct KeySmithClient<G>
where
	G: ?Sized + Gateway,
{
	/// HTTP gateway executing every outbound call.
	gateway: Arc<G>,
	/// Base URL of the KeySmith service.
	service_url: Url,
	/// Registered OAuth client identifier.
	client_id: String,
	/// Current position in the sign-in state machine.
	state: SessionState,
	/// Token material for the session.
	credentials: Credentials,
	/// In-flight browser sign-in, between `begin_login` and authorization.
	pending_login: Option<AuthorizationSession>,
	/// Company list, memoized for the lifetime of the session.
	companies: Option<Vec<Company>>,
}
impl<G> KeySmithClient<G>
where
	G: Gateway,
{
	/// Connects a client to the service, optionally resuming a persisted session.
	///
	/// A malformed `service_url` fails fast with [`ConfigError::InvalidServiceUrl`]. A supplied
	/// `stored_refresh_token` is validated opportunistically by exchanging it for an access
	/// token; if that exchange fails for any reason the token is discarded and the client comes
	/// up `Unauthenticated` — construction itself never fails due to a stale stored token.
	pub async fn connect(
		gateway: impl Into<Arc<G>>,
		service_url: &str,
		client_id: impl Into<String>,
		stored_refresh_token: Option<&str>,
	) -> Result<Self> {
		let mut service_url = Url::parse(service_url)
			.map_err(|source| ConfigError::InvalidServiceUrl { source })?;

		if service_url.cannot_be_a_base() {
			return Err(ConfigError::InvalidServiceUrl {
				source: url::ParseError::RelativeUrlWithoutBase,
			}
			.into());
		}
		// Endpoint paths append to the service path, so the stored base must end with a slash;
		// otherwise `Url::join` would replace the last segment of a path-bearing base.
		if !service_url.path().ends_with('/') {
			service_url.set_path(&format!("{}/", service_url.path()));
		}

		let mut client = Self {
			gateway: gateway.into(),
			service_url,
			client_id: client_id.into(),
			state: SessionState::Unauthenticated,
			credentials: Credentials::new(),
			pending_login: None,
			companies: None,
		};

		if let Some(refresh_token) = stored_refresh_token {
			client.credentials = Credentials::seeded(refresh_token);

			match client.ensure_access_token().await {
				Ok(()) => client.state = SessionState::Authenticated,
				Err(_) => client.credentials.clear(),
			}
		}

		Ok(client)
	}
}
#[cfg(feature = "reqwest")]
impl KeySmithClient<ReqwestGateway> {
	/// Connects a client backed by the crate's default reqwest gateway.
	pub async fn new(
		service_url: &str,
		client_id: impl Into<String>,
		stored_refresh_token: Option<&str>,
	) -> Result<Self> {
		Self::connect(ReqwestGateway::default(), service_url, client_id, stored_refresh_token)
			.await
	}
}
impl<G> KeySmithClient<G>
where
	G: ?Sized + Gateway,
{
	/// Returns the current sign-in state.
	pub fn state(&self) -> SessionState {
		self.state
	}

	/// Returns the refresh token for caller-side persistence across process runs.
	pub fn refresh_token(&self) -> Option<&str> {
		self.credentials.refresh_token()
	}

	/// Returns whether an access token pair is currently held.
	///
	/// Observably `false` mid-refresh: [`KeySmithClient::ensure_access_token`] clears the pair
	/// before contacting the token endpoint, and a failed exchange leaves it cleared.
	pub fn has_access_token(&self) -> bool {
		self.credentials.has_access_token()
	}

	/// Returns the browser-facing URL that terminates the KeySmith web session.
	pub fn logout_url(&self) -> Result<Url> {
		Ok(self.endpoint("/logout")?)
	}

	/// Resolves an endpoint path against the service URL, preserving any base path the
	/// deployment mounts the service under.
	pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		self.service_url
			.join(path.trim_start_matches('/'))
			.map_err(|source| ConfigError::InvalidEndpoint { path: path.into(), source })
	}

	/// Executes a request through the gateway, mapping transport failures.
	pub(crate) async fn execute(&self, request: GatewayRequest) -> Result<GatewayResponse> {
		Ok(self.gateway.execute(request).await?)
	}

	/// Attaches the `Authorization` header when an access token pair is held.
	pub(crate) fn privileged(&self, request: GatewayRequest) -> GatewayRequest {
		request.authorization(self.credentials.authorization_header())
	}
}

/// Renders a form-encoded body from the provided key/value pairs.
pub(crate) fn form_body(pairs: &[(&str, &str)]) -> String {
	let mut serializer = url::form_urlencoded::Serializer::new(String::new());

	for &(key, value) in pairs {
		serializer.append_pair(key, value);
	}

	serializer.finish()
}

/// Maps a non-success response into the generic service error.
pub(crate) fn service_failure(response: &GatewayResponse) -> Error {
	Error::Service {
		message: wire::message(response.status, &response.body),
		status: response.status,
	}
}
impl<G> Debug for KeySmithClient<G>
where
	G: ?Sized + Gateway,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("KeySmithClient")
			.field("service_url", &self.service_url.as_str())
			.field("client_id", &self.client_id)
			.field("state", &self.state)
			.field("companies_cached", &self.companies.is_some())
			.finish()
	}
}
