//! Generic submit-then-poll protocol for asynchronous server-side jobs.
//!
//! Asset signing and KDM upload share one contract: POST an XML payload, receive a job id on
//! HTTP 202, then GET the job resource until 200 signals completion. Only the endpoint differs
//! per kind, so both are driven through [`KeySmithClient::submit_job`] and
//! [`KeySmithClient::poll_job`].

// self
use crate::{
	_prelude::*,
	client::{self, KeySmithClient},
	http::{Gateway, GatewayRequest},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	wire,
};

/// The two asynchronous job kinds the service runs for a client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobKind {
	/// XML asset (CPL or PKL) signing.
	Sign,
	/// Encrypted key-delivery-message upload.
	UploadKdm,
}
impl JobKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			JobKind::Sign => "sign",
			JobKind::UploadKdm => "upload_kdm",
		}
	}

	/// Submission endpoint path for this kind.
	pub const fn submit_path(self) -> &'static str {
		match self {
			JobKind::Sign => "/v1/signer/jobs",
			JobKind::UploadKdm => "/v1/dkdms",
		}
	}

	/// Job-resource path for a submitted job.
	pub fn job_path(self, job_id: &str) -> String {
		format!("{}/{job_id}", self.submit_path())
	}
}
impl Display for JobKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Poll outcome for a submitted job.
///
/// The protocol defines no in-band failed state; a job that cannot be enqueued is rejected at
/// submission time instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobStatus {
	/// The job has not completed; re-poll after a caller-chosen backoff.
	Pending,
	/// The job finished; the body carries the signed asset, or is empty for KDM uploads since
	/// DKDMs are not retrievable once uploaded.
	Complete(String),
}
impl JobStatus {
	/// Returns whether the job reached its terminal state.
	pub fn is_complete(&self) -> bool {
		matches!(self, Self::Complete(_))
	}
}

impl<G> KeySmithClient<G>
where
	G: ?Sized + Gateway,
{
	/// Submits an XML payload to the kind-specific endpoint and returns the server-assigned
	/// job id.
	///
	/// Only HTTP 202 counts as acceptance (a 200 does not prove the job was enqueued); any
	/// other status surfaces [`Error::SubmissionRejected`] with the decoded message.
	pub async fn submit_job(
		&mut self,
		kind: JobKind,
		payload_xml: impl Into<String>,
	) -> Result<String> {
		const KIND: FlowKind = FlowKind::Submit;

		let span = FlowSpan::new(KIND, "submit_job");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.submit_payload(kind, payload_xml.into())).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Polls a submitted job once, without sleeping.
	///
	/// Callers loop with their own backoff and deadline policy;
	/// [`RECOMMENDED_POLL_INTERVAL`](crate::client::RECOMMENDED_POLL_INTERVAL) is a reasonable
	/// delay between attempts.
	pub async fn poll_job(&mut self, kind: JobKind, job_id: &str) -> Result<JobStatus> {
		const KIND: FlowKind = FlowKind::PollJob;

		let span = FlowSpan::new(KIND, "poll_job");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.poll_resource(kind, job_id)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Submits a CPL or PKL for signing; shorthand for [`KeySmithClient::submit_job`] with
	/// [`JobKind::Sign`].
	pub async fn sign(&mut self, asset_xml: impl Into<String>) -> Result<String> {
		self.submit_job(JobKind::Sign, asset_xml).await
	}

	/// Uploads an unsigned KDM; shorthand for [`KeySmithClient::submit_job`] with
	/// [`JobKind::UploadKdm`].
	pub async fn upload_kdm(&mut self, kdm_xml: impl Into<String>) -> Result<String> {
		self.submit_job(JobKind::UploadKdm, kdm_xml).await
	}

	/// Polls a signing job; shorthand for [`KeySmithClient::poll_job`] with [`JobKind::Sign`].
	pub async fn signed_asset(&mut self, asset_id: &str) -> Result<JobStatus> {
		self.poll_job(JobKind::Sign, asset_id).await
	}

	async fn submit_payload(&mut self, kind: JobKind, payload_xml: String) -> Result<String> {
		let url = self.endpoint(kind.submit_path())?;
		let request = self.privileged(GatewayRequest::post(url).xml(payload_xml));
		let response = self.execute(request).await?;

		if !response.is_accepted() {
			return Err(Error::SubmissionRejected {
				message: wire::message(response.status, &response.body),
				status: response.status,
			});
		}

		Ok(wire::field_str(&response.body, "id")?)
	}

	async fn poll_resource(&mut self, kind: JobKind, job_id: &str) -> Result<JobStatus> {
		let url = self.endpoint(&kind.job_path(job_id))?;
		let request = self.privileged(GatewayRequest::get(url).accept_xml());
		let response = self.execute(request).await?;

		if response.is_ok() {
			return Ok(JobStatus::Complete(response.body));
		}
		if response.is_accepted() {
			return Ok(JobStatus::Pending);
		}

		Err(client::service_failure(&response))
	}
}
