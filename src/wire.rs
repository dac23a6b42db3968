//! Decoding helpers for KeySmith's JSON response envelopes.
//!
//! KeySmith wraps most payloads in small JSON objects (`code`, `message`, token fields), so the
//! client extracts named fields instead of modeling every envelope as a struct. Failure bodies
//! are funneled through [`message`], and the `AUTH****` status strings that drive the
//! authorization-polling flow are decoded into the closed [`AuthCode`] enumeration so flow code
//! can match on them exhaustively.

// crates.io
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::_prelude::*;

/// Errors raised while decoding KeySmith response bodies.
#[derive(Debug, ThisError)]
pub enum WireError {
	/// Response body was empty where a JSON payload was expected.
	#[error("Response body is empty.")]
	EmptyBody,
	/// Response payload is missing an expected field.
	#[error("Response is missing the `{field}` field.")]
	MissingField {
		/// Name of the absent field.
		field: &'static str,
	},
	/// Response body is not the expected JSON shape.
	#[error("Response body could not be decoded as JSON.")]
	Json {
		/// Structured parsing failure carrying the failing path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Authorization-polling status codes carried in the `code` field.
///
/// The service overloads HTTP 202 for both "still waiting" and "approved", so the wire code is
/// the only reliable discriminator during the polling phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthCode {
	/// `AUTH2021`: the user has not completed the browser flow yet.
	Pending,
	/// `AUTH4041`: the user denied the sign-in request.
	AccessDenied,
	/// `AUTH4044`: the sign-in session lapsed before authorization.
	SessionExpired,
	/// Any code this client does not recognize.
	Other(String),
}
impl AuthCode {
	/// Decodes a wire status string into the closed enumeration.
	pub fn from_wire(code: &str) -> Self {
		match code {
			"AUTH2021" => Self::Pending,
			"AUTH4041" => Self::AccessDenied,
			"AUTH4044" => Self::SessionExpired,
			_ => Self::Other(code.into()),
		}
	}
}

/// Deserializes a full JSON body into `T`, keeping the failing path on error.
pub(crate) fn from_json_str<T>(body: &str) -> Result<T, WireError>
where
	T: DeserializeOwned,
{
	if body.trim().is_empty() {
		return Err(WireError::EmptyBody);
	}

	let mut deserializer = serde_json::Deserializer::from_str(body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| WireError::Json { source })
}

/// Extracts a named string field from a JSON object body.
pub fn field_str(body: &str, field: &'static str) -> Result<String, WireError> {
	let value: Value = from_json_str(body)?;

	match value.get(field) {
		Some(Value::String(s)) => Ok(s.clone()),
		// Numeric and boolean fields are stringified the way the service renders them.
		Some(Value::Bool(b)) => Ok(b.to_string()),
		Some(Value::Number(n)) => Ok(n.to_string()),
		_ => Err(WireError::MissingField { field }),
	}
}

/// Extracts the polling status code from a response body, when one is present.
pub fn auth_code(body: &str) -> Option<AuthCode> {
	field_str(body, "code").ok().map(|code| AuthCode::from_wire(&code))
}

/// Renders a human-readable failure message from a response.
///
/// Prefers the decoded `message` field and falls back to the HTTP status when the body carries
/// no usable payload.
pub fn message(status: u16, body: &str) -> String {
	field_str(body, "message").unwrap_or_else(|_| format!("HTTP status {status}"))
}
