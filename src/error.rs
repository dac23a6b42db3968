//! Client-level error types shared across the sign-in, profile, and job flows.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration or usage problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Wire(#[from] crate::wire::WireError),

	/// Refresh-token exchange was rejected; the caller must sign in again.
	#[error("Token exchange failed: {message}.")]
	TokenExchange {
		/// Service- or decoder-supplied reason string.
		message: String,
	},
	/// KeySmith returned a non-success response outside the dedicated variants.
	#[error("KeySmith request failed: {message}.")]
	Service {
		/// Service- or decoder-supplied reason string.
		message: String,
		/// HTTP status code carried by the failing response.
		status: u16,
	},
	/// The sign-in session expired before the user authorized it.
	#[error("KeySmith sign-in session has expired.")]
	SessionExpired,
	/// The user denied the sign-in request.
	#[error("Access to KeySmith was denied by the user.")]
	AccessDenied,
	/// The service refused to enqueue a signing or KDM-upload job.
	#[error("Job submission was rejected: {message}.")]
	SubmissionRejected {
		/// Service- or decoder-supplied reason string.
		message: String,
		/// HTTP status code carried by the failing response.
		status: u16,
	},
	/// The account has no companies attached; the profile must be completed on the KeySmith site.
	#[error("KeySmith account has no companies; edit the profile on the KeySmith site first.")]
	NoCompany,
	/// The active company has not generated a signing certificate yet.
	#[error("Company `{company}` has not generated a signing certificate.")]
	CertificateUnavailable {
		/// Name of the active company.
		company: String,
	},
}

/// Configuration and usage failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Service URL could not be parsed.
	#[error("KeySmith service URL is invalid.")]
	InvalidServiceUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint path could not be joined onto the service URL.
	#[error("Endpoint path `{path}` cannot be joined onto the service URL.")]
	InvalidEndpoint {
		/// Endpoint path that failed to join.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// No sign-in attempt is in progress.
	#[error("No sign-in attempt is in progress; call `begin_login` first.")]
	NoPendingLogin,
	/// A privileged operation was attempted without a refresh token.
	#[error("Client holds no refresh token; complete the sign-in flow first.")]
	NotAuthenticated,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling KeySmith.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling KeySmith.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn config_error_converts_into_client_error() {
		let err: Error = ConfigError::NoPendingLogin.into();

		assert!(matches!(err, Error::Config(ConfigError::NoPendingLogin)));
		assert!(err.to_string().contains("begin_login"));
	}

	#[test]
	fn service_error_renders_message_and_keeps_status() {
		let err = Error::Service { message: "upstream exploded".into(), status: 500 };

		assert!(err.to_string().contains("upstream exploded"));
		assert!(matches!(err, Error::Service { status: 500, .. }));
	}
}
