//! Transport seam between the client and its HTTP stack.
//!
//! The module exposes [`Gateway`] alongside [`GatewayRequest`] and [`GatewayResponse`] so
//! embedders can integrate custom HTTP clients (or test stubs) without the client caring which
//! stack executes the call. The gateway owns TLS trust configuration; KeySmith deployments that
//! pin a private root install it via [`ReqwestGateway::with_root_certificate`].

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
// self
#[cfg(feature = "reqwest")] use crate::error::ConfigError;
use crate::{_prelude::*, error::TransportError};

/// Form-encoded request bodies (OAuth endpoints).
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
/// XML request bodies and responses (signing and KDM jobs).
pub const CONTENT_TYPE_XML: &str = "application/xml";

/// Boxed future returned by [`Gateway::execute`].
pub type GatewayFuture<'a> =
	Pin<Box<dyn Future<Output = Result<GatewayResponse, TransportError>> + 'a + Send>>;

/// HTTP transport contract implemented by gateways.
///
/// The trait is the client's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so one gateway can back several sequential client sessions, and the
/// returned future must be `Send` so client flows stay executor-agnostic.
pub trait Gateway
where
	Self: 'static + Send + Sync,
{
	/// Executes one request and resolves to the raw status + body pair.
	fn execute(&self, request: GatewayRequest) -> GatewayFuture<'_>;
}

/// HTTP verbs used by the KeySmith endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the verb's canonical rendering.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One outbound request handed to a [`Gateway`].
#[derive(Clone, Debug)]
pub struct GatewayRequest {
	/// HTTP verb.
	pub method: Method,
	/// Fully resolved endpoint URL.
	pub url: Url,
	/// Pre-rendered `Authorization` header value, when the call is privileged.
	pub authorization: Option<String>,
	/// `Content-Type` header for the body, when one is sent.
	pub content_type: Option<&'static str>,
	/// `Accept` header, when the caller expects a specific representation.
	pub accept: Option<&'static str>,
	/// Request body.
	pub body: Option<String>,
}
impl GatewayRequest {
	fn new(method: Method, url: Url) -> Self {
		Self { method, url, authorization: None, content_type: None, accept: None, body: None }
	}

	/// Builds a `GET` request.
	pub fn get(url: Url) -> Self {
		Self::new(Method::Get, url)
	}

	/// Builds a `POST` request.
	pub fn post(url: Url) -> Self {
		Self::new(Method::Post, url)
	}

	/// Builds a `DELETE` request.
	pub fn delete(url: Url) -> Self {
		Self::new(Method::Delete, url)
	}

	/// Attaches a form-encoded body.
	pub fn form(mut self, body: impl Into<String>) -> Self {
		self.content_type = Some(CONTENT_TYPE_FORM);
		self.body = Some(body.into());

		self
	}

	/// Attaches an XML body.
	pub fn xml(mut self, body: impl Into<String>) -> Self {
		self.content_type = Some(CONTENT_TYPE_XML);
		self.body = Some(body.into());

		self
	}

	/// Requests an XML response representation.
	pub fn accept_xml(mut self) -> Self {
		self.accept = Some(CONTENT_TYPE_XML);

		self
	}

	/// Attaches a pre-rendered `Authorization` header value, when one is held.
	pub fn authorization(mut self, header: Option<String>) -> Self {
		self.authorization = header;

		self
	}
}

/// Raw response surfaced by a [`Gateway`].
#[derive(Clone, Debug)]
pub struct GatewayResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body, decoded as text.
	pub body: String,
}
impl GatewayResponse {
	/// Returns whether the status is `200 OK`.
	pub fn is_ok(&self) -> bool {
		self.status == 200
	}

	/// Returns whether the status is `202 Accepted`.
	pub fn is_accepted(&self) -> bool {
		self.status == 202
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestGateway(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestGateway {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a gateway trusting the provided PEM root certificate in addition to the system
	/// store. KeySmith deployments behind a private CA hand their trust anchor in here.
	pub fn with_root_certificate(pem: &[u8]) -> Result<Self, ConfigError> {
		let certificate = reqwest::Certificate::from_pem(pem)?;
		let client = ReqwestClient::builder().add_root_certificate(certificate).build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestGateway {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestGateway {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Gateway for ReqwestGateway {
	fn execute(&self, request: GatewayRequest) -> GatewayFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = match request.method {
				Method::Get => client.get(request.url),
				Method::Post => client.post(request.url),
				Method::Delete => client.delete(request.url),
			};

			if let Some(authorization) = &request.authorization {
				builder = builder.header(AUTHORIZATION, authorization);
			}
			if let Some(content_type) = request.content_type {
				builder = builder.header(CONTENT_TYPE, content_type);
			}
			if let Some(accept) = request.accept {
				builder = builder.header(ACCEPT, accept);
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.text().await.map_err(TransportError::from)?;

			Ok(GatewayResponse { status, body })
		})
	}
}
