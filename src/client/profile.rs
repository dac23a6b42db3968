//! Identity and company lookups, memoized for the lifetime of the session.

// self
use crate::{
	_prelude::*,
	client::{self, KeySmithClient},
	http::{Gateway, GatewayRequest},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	wire,
};

/// A company the signed-in user belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
	/// Server-assigned company identifier.
	pub id: i64,
	/// Display name.
	pub name: String,
	/// Role of the user within the company.
	pub role: String,
	/// Whether the user joined the company on invitation.
	#[serde(deserialize_with = "lenient_bool")]
	pub joined_on_invite: bool,
	/// Whether the company has generated a signing certificate.
	#[serde(deserialize_with = "lenient_bool")]
	pub certificate_generated: bool,
	/// Concatenated PEM chain (leaf, intermediate, root), empty until generated. A record
	/// without the field decodes as empty rather than failing; `certificate_generated` is the
	/// authoritative signal.
	#[serde(default)]
	pub certificate: String,
}

/// The signed-in user's identity as reported by the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserIdentity {
	/// Email address of the account.
	pub email: String,
	/// Name of the active company.
	pub company: String,
}

/// Selects the active company from the fetched sequence.
///
/// Policy: the first entry is active. The service orders the list and this client exposes no
/// selection step; replacing this function is the single hook for an explicit-selection policy.
pub fn select_active_company(companies: &[Company]) -> Option<&Company> {
	companies.first()
}

impl<G> KeySmithClient<G>
where
	G: ?Sized + Gateway,
{
	/// Fetches the signed-in user's email address and active company name.
	pub async fn identity(&mut self) -> Result<UserIdentity> {
		const KIND: FlowKind = FlowKind::Profile;

		let span = FlowSpan::new(KIND, "identity");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.fetch_identity()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Returns the user's companies, fetched once per session and memoized after that.
	pub async fn companies(&mut self) -> Result<&[Company]> {
		const KIND: FlowKind = FlowKind::Profile;

		let span = FlowSpan::new(KIND, "companies");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.load_companies()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Returns the active company's certificate chain: leaf, intermediate, and root PEM
	/// certificates concatenated together.
	///
	/// Token-sensitive: the access token is refreshed first, and the resulting ~1 hour window
	/// is expected to cover the certificate → CPL signing → KDM upload → PKL signing sequence.
	pub async fn certificate_chain(&mut self) -> Result<String> {
		const KIND: FlowKind = FlowKind::Profile;

		let span = FlowSpan::new(KIND, "certificate_chain");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.fetch_certificate_chain()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn fetch_identity(&mut self) -> Result<UserIdentity> {
		let url = self.endpoint("/v1/users/me")?;
		let request = self.privileged(GatewayRequest::get(url));
		let response = self.execute(request).await?;

		if !response.is_ok() {
			return Err(client::service_failure(&response));
		}

		let email = wire::field_str(&response.body, "email")?;
		let companies = self.load_companies().await?;
		let company =
			select_active_company(companies).map(|active| active.name.clone()).ok_or(Error::NoCompany)?;

		Ok(UserIdentity { email, company })
	}

	async fn load_companies(&mut self) -> Result<&[Company]> {
		if self.companies.is_none() {
			let url = self.endpoint("/v1/users/me/companies")?;
			let request = self.privileged(GatewayRequest::get(url));
			let response = self.execute(request).await?;

			if !response.is_ok() {
				return Err(client::service_failure(&response));
			}

			let companies: Vec<Company> = wire::from_json_str(&response.body)?;

			if companies.is_empty() {
				return Err(Error::NoCompany);
			}

			self.companies = Some(companies);
		}

		Ok(self.companies.as_deref().unwrap_or_default())
	}

	async fn fetch_certificate_chain(&mut self) -> Result<String> {
		self.ensure_access_token().await?;
		self.load_companies().await?;

		let active = select_active_company(self.companies.as_deref().unwrap_or_default())
			.ok_or(Error::NoCompany)?;

		// Business-rule check on cached data; no network call happens past this point.
		if !active.certificate_generated {
			return Err(Error::CertificateUnavailable { company: active.name.clone() });
		}

		Ok(active.certificate.clone())
	}
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
	D: serde::Deserializer<'de>,
{
	// The service has emitted both JSON booleans and "true"/"false" strings for these flags.
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum BoolOrString {
		Bool(bool),
		String(String),
	}

	match BoolOrString::deserialize(deserializer)? {
		BoolOrString::Bool(flag) => Ok(flag),
		BoolOrString::String(s) => Ok(s.eq_ignore_ascii_case("true")),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn companies_decode_with_boolean_or_string_flags() {
		let body = r#"[
			{"id":1,"name":"Studio A","role":"admin","joinedOnInvite":false,"certificateGenerated":true,"certificate":"-----BEGIN CERTIFICATE-----"},
			{"id":2,"name":"Studio B","role":"member","joinedOnInvite":"true","certificateGenerated":"false"}
		]"#;
		let companies: Vec<Company> =
			crate::wire::from_json_str(body).expect("Company fixture should decode successfully.");

		assert_eq!(companies.len(), 2);
		assert!(!companies[0].joined_on_invite);
		assert!(companies[0].certificate_generated);
		assert!(companies[1].joined_on_invite);
		assert!(!companies[1].certificate_generated);
		assert!(companies[1].certificate.is_empty());
	}

	#[test]
	fn active_company_is_the_first_entry() {
		let companies: Vec<Company> = crate::wire::from_json_str(
			r#"[
				{"id":7,"name":"First","role":"admin","joinedOnInvite":false,"certificateGenerated":false},
				{"id":8,"name":"Second","role":"member","joinedOnInvite":false,"certificateGenerated":true}
			]"#,
		)
		.expect("Company fixture should decode successfully.");

		assert_eq!(
			select_active_company(&companies).map(|company| company.name.as_str()),
			Some("First"),
		);
		assert_eq!(select_active_company(&[]), None);
	}
}
