#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use keysmith_client::{_preludet::*, auth::SessionState, error::ConfigError};

async fn mock_login_request(server: &MockServer) -> httpmock::Mock<'_> {
	let token_url = server.url("/oauth2/authorization/poll");
	let authorization_url = server.url("/login");

	server
		.mock_async(move |when, then| {
			when.method(POST)
				.path("/oauth2/authorization/request")
				.header("content-type", "application/x-www-form-urlencoded")
				.body(format!("client_id={TEST_CLIENT_ID}"));
			then.status(200).header("content-type", "application/json").body(format!(
				"{{\"code\":\"sess-1\",\"token_url\":\"{token_url}\",\"authorization_url\":\"{authorization_url}\"}}",
			));
		})
		.await
}

#[tokio::test]
async fn begin_login_composes_the_browser_url() {
	let server = MockServer::start_async().await;
	let mock = mock_login_request(&server).await;
	let mut client = connect_test_client(&server.base_url(), None).await;
	let login_url =
		client.begin_login().await.expect("Login-session request should succeed.");

	mock.assert_async().await;

	assert_eq!(login_url.as_str(), server.url("/login?code=sess-1"));
	assert_eq!(client.state(), SessionState::LoginRequested);
}

#[tokio::test]
async fn begin_login_surfaces_the_decoded_service_message() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/authorization/request");
			then.status(429)
				.header("content-type", "application/json")
				.body("{\"message\":\"too many login sessions\"}");
		})
		.await;
	let mut client = connect_test_client(&server.base_url(), None).await;
	let err = client
		.begin_login()
		.await
		.expect_err("A non-OK login-session response should surface an error.");

	assert!(matches!(err, Error::Service { status: 429, .. }));
	assert!(err.to_string().contains("too many login sessions"));
	assert_eq!(client.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn poll_before_begin_login_is_a_usage_error() {
	let server = MockServer::start_async().await;
	let mut client = connect_test_client(&server.base_url(), None).await;
	let err = client
		.poll_authorization()
		.await
		.expect_err("Polling without a pending login should fail.");

	assert!(matches!(err, Error::Config(ConfigError::NoPendingLogin)));
}

#[tokio::test]
async fn pending_polls_leave_credentials_untouched() {
	let server = MockServer::start_async().await;
	let _login = mock_login_request(&server).await;
	let poll = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/authorization/poll");
			then.status(202)
				.header("content-type", "application/json")
				.body("{\"code\":\"AUTH2021\",\"message\":\"authorization pending\"}");
		})
		.await;
	let mut client = connect_test_client(&server.base_url(), None).await;

	client.begin_login().await.expect("Login-session request should succeed.");

	for _ in 0..3 {
		let authenticated =
			client.poll_authorization().await.expect("A pending poll should not error.");

		assert!(!authenticated);
		assert_eq!(client.state(), SessionState::Polling);
		assert_eq!(client.refresh_token(), None);
		assert!(!client.has_access_token());
	}

	poll.assert_calls_async(3).await;
}

#[tokio::test]
async fn approval_stores_the_full_grant() {
	let server = MockServer::start_async().await;
	let _login = mock_login_request(&server).await;
	// The service overloads 202 for approval as well; no pending sentinel means success.
	let poll = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/authorization/poll")
				.body(format!("client_id={TEST_CLIENT_ID}&grant_type=authorization_code&code=sess-1"));
			then.status(202).header("content-type", "application/json").body(
				"{\"access_token\":\"access-1\",\"refresh_token\":\"refresh-1\",\"token_type\":\"Bearer\"}",
			);
		})
		.await;
	let mut client = connect_test_client(&server.base_url(), None).await;

	client.begin_login().await.expect("Login-session request should succeed.");

	let authenticated =
		client.poll_authorization().await.expect("An approved poll should succeed.");

	poll.assert_async().await;

	assert!(authenticated);
	assert_eq!(client.state(), SessionState::Authenticated);
	assert_eq!(client.refresh_token(), Some("refresh-1"));
	assert!(client.has_access_token());
}

#[tokio::test]
async fn denied_authorization_terminates_the_attempt() {
	let server = MockServer::start_async().await;
	let _login = mock_login_request(&server).await;
	let _poll = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/authorization/poll");
			then.status(404)
				.header("content-type", "application/json")
				.body("{\"code\":\"AUTH4041\",\"message\":\"user denied access\"}");
		})
		.await;
	let mut client = connect_test_client(&server.base_url(), None).await;

	client.begin_login().await.expect("Login-session request should succeed.");

	let err = client
		.poll_authorization()
		.await
		.expect_err("A denied authorization should surface an error.");

	assert!(matches!(err, Error::AccessDenied));
	assert_eq!(client.state(), SessionState::Unauthenticated);
	assert_eq!(client.refresh_token(), None);
}

#[tokio::test]
async fn lapsed_session_surfaces_session_expired() {
	let server = MockServer::start_async().await;
	let _login = mock_login_request(&server).await;
	let _poll = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/authorization/poll");
			then.status(404)
				.header("content-type", "application/json")
				.body("{\"code\":\"AUTH4044\",\"message\":\"session expired\"}");
		})
		.await;
	let mut client = connect_test_client(&server.base_url(), None).await;

	client.begin_login().await.expect("Login-session request should succeed.");

	let err = client
		.poll_authorization()
		.await
		.expect_err("A lapsed session should surface an error.");

	assert!(matches!(err, Error::SessionExpired));
	assert_eq!(client.state(), SessionState::Expired);
}

#[tokio::test]
async fn unrecognized_polling_failures_fall_back_to_service_error() {
	let server = MockServer::start_async().await;
	let _login = mock_login_request(&server).await;
	let _poll = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/authorization/poll");
			then.status(500)
				.header("content-type", "application/json")
				.body("{\"code\":\"AUTH5001\",\"message\":\"internal error\"}");
		})
		.await;
	let mut client = connect_test_client(&server.base_url(), None).await;

	client.begin_login().await.expect("Login-session request should succeed.");

	let err = client
		.poll_authorization()
		.await
		.expect_err("An unrecognized polling failure should surface an error.");

	assert!(matches!(err, Error::Service { status: 500, .. }));
}
