//! Async client for the KeySmith digital-cinema key-management service: browser-driven OAuth
//! sign-in, defensive token refresh, and polled signing/KDM jobs in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod obs;
pub mod wire;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{client::KeySmithClient, http::ReqwestGateway};

	/// Client identifier used by every integration test.
	pub const TEST_CLIENT_ID: &str = "keysmith-test-client";

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = KeySmithClient<ReqwestGateway>;

	/// Builds a reqwest gateway suitable for talking to an `httpmock` server.
	pub fn test_gateway() -> ReqwestGateway {
		ReqwestGateway::default()
	}

	/// Connects a [`KeySmithClient`] to the provided mock service URL, optionally seeding a
	/// stored refresh token.
	pub async fn connect_test_client(
		service_url: &str,
		stored_refresh_token: Option<&str>,
	) -> ReqwestTestClient {
		KeySmithClient::connect(test_gateway(), service_url, TEST_CLIENT_ID, stored_refresh_token)
			.await
			.expect("Test client construction should succeed against the mock service.")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::Duration;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {httpmock as _, keysmith_client as _, tokio as _};
