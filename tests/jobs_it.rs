#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use keysmith_client::{_preludet::*, client::{JobKind, JobStatus}};

async fn mock_token_exchange(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/authorization/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"A1\",\"token_type\":\"Bearer\"}");
		})
		.await
}

#[tokio::test]
async fn signing_submission_returns_the_job_id() {
	let server = MockServer::start_async().await;
	let _exchange = mock_token_exchange(&server).await;
	let submit = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v1/signer/jobs")
				.header("content-type", "application/xml")
				.header("authorization", "Bearer A1")
				.body("<cpl/>");
			then.status(202)
				.header("content-type", "application/json")
				.body("{\"id\":\"job-42\"}");
		})
		.await;
	let mut client = connect_test_client(&server.base_url(), Some("R1")).await;
	let job_id = client.sign("<cpl/>").await.expect("Signing submission should be accepted.");

	submit.assert_async().await;

	assert_eq!(job_id, "job-42");
}

#[tokio::test]
async fn pending_then_complete_poll_cycle() {
	let server = MockServer::start_async().await;
	let _exchange = mock_token_exchange(&server).await;
	let mut client = connect_test_client(&server.base_url(), Some("R1")).await;
	let pending = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/signer/jobs/job-42")
				.header("accept", "application/xml");
			then.status(202);
		})
		.await;
	let status = client
		.poll_job(JobKind::Sign, "job-42")
		.await
		.expect("A pending poll should not error.");

	assert_eq!(status, JobStatus::Pending);

	pending.assert_async().await;
	pending.delete_async().await;

	let _complete = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/signer/jobs/job-42");
			then.status(200).header("content-type", "application/xml").body("<signed/>");
		})
		.await;
	let status = client
		.signed_asset("job-42")
		.await
		.expect("A completed poll should return the signed asset.");

	assert_eq!(status, JobStatus::Complete("<signed/>".into()));
}

#[tokio::test]
async fn kdm_upload_uses_the_dkdm_endpoint() {
	let server = MockServer::start_async().await;
	let _exchange = mock_token_exchange(&server).await;
	let submit = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v1/dkdms")
				.header("content-type", "application/xml")
				.body("<kdm/>");
			then.status(202)
				.header("content-type", "application/json")
				.body("{\"id\":\"kdm-7\"}");
		})
		.await;
	let poll = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/dkdms/kdm-7");
			// DKDMs are not retrievable post-upload; only the signed status matters.
			then.status(200);
		})
		.await;
	let mut client = connect_test_client(&server.base_url(), Some("R1")).await;
	let kdm_id =
		client.upload_kdm("<kdm/>").await.expect("KDM upload should be accepted.");

	submit.assert_async().await;

	assert_eq!(kdm_id, "kdm-7");

	let status = client
		.poll_job(JobKind::UploadKdm, &kdm_id)
		.await
		.expect("A completed KDM poll should succeed.");

	poll.assert_async().await;

	assert_eq!(status, JobStatus::Complete(String::new()));
}

#[tokio::test]
async fn http_200_does_not_count_as_acceptance() {
	let server = MockServer::start_async().await;
	let _exchange = mock_token_exchange(&server).await;
	let _submit = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/signer/jobs");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":\"job-43\"}");
		})
		.await;
	let mut client = connect_test_client(&server.base_url(), Some("R1")).await;
	let err = client
		.sign("<pkl/>")
		.await
		.expect_err("Only HTTP 202 proves the job was enqueued.");

	assert!(matches!(err, Error::SubmissionRejected { status: 200, .. }));
}

#[tokio::test]
async fn rejected_submission_carries_the_decoded_message() {
	let server = MockServer::start_async().await;
	let _exchange = mock_token_exchange(&server).await;
	let _submit = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/dkdms");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"message\":\"malformed KDM document\"}");
		})
		.await;
	let mut client = connect_test_client(&server.base_url(), Some("R1")).await;
	let err = client
		.upload_kdm("<not-a-kdm/>")
		.await
		.expect_err("A rejected submission should surface an error.");

	assert!(matches!(err, Error::SubmissionRejected { status: 400, .. }));
	assert!(err.to_string().contains("malformed KDM document"));
}

#[tokio::test]
async fn unexpected_poll_status_is_a_service_error() {
	let server = MockServer::start_async().await;
	let _exchange = mock_token_exchange(&server).await;
	let _poll = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/signer/jobs/job-gone");
			then.status(410)
				.header("content-type", "application/json")
				.body("{\"message\":\"job purged\"}");
		})
		.await;
	let mut client = connect_test_client(&server.base_url(), Some("R1")).await;
	let err = client
		.poll_job(JobKind::Sign, "job-gone")
		.await
		.expect_err("An unexpected poll status should surface an error.");

	assert!(matches!(err, Error::Service { status: 410, .. }));
	assert!(err.to_string().contains("job purged"));
}
