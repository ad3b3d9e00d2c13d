//! Immutable credential value, freshness helpers, and builder.

// self
use crate::{_prelude::*, auth::secret::TokenSecret};

/// Freshness of a credential at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialStatus {
	/// Access token is valid and outside the expiry buffer.
	Fresh,
	/// Access token is still valid but will expire within the buffer window.
	Expiring,
	/// Access token has passed its expiry instant.
	Expired,
}

/// Errors produced by [`CredentialBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CredentialBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
}

/// Immutable credential issued by the CedarStack identity backend.
///
/// The credential is owned by a [`CredentialProvider`](crate::provider::CredentialProvider);
/// the HTTP client only reads snapshots and asks the provider to rotate them.
#[derive(Serialize, Deserialize, Clone)]
pub struct Credential {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token secret, if the backend issued one.
	pub refresh_token: Option<TokenSecret>,
	/// ID token secret, if the backend issued one.
	pub id_token: Option<TokenSecret>,
	/// Issued-at instant recorded from the backend response.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from issued_at plus expires_in or absolute expiry.
	pub expires_at: OffsetDateTime,
}
impl Credential {
	/// Returns a builder for constructing credential values.
	pub fn builder() -> CredentialBuilder {
		CredentialBuilder::new()
	}

	/// Computes the freshness status at a given instant with the provided buffer window.
	pub fn status_at(&self, instant: OffsetDateTime, buffer: Duration) -> CredentialStatus {
		if instant >= self.expires_at {
			return CredentialStatus::Expired;
		}
		if self.expires_at - instant <= buffer {
			return CredentialStatus::Expiring;
		}

		CredentialStatus::Fresh
	}

	/// Returns `true` if the credential is expired or within the buffer window at `instant`.
	pub fn needs_refresh_at(&self, instant: OffsetDateTime, buffer: Duration) -> bool {
		!matches!(self.status_at(instant, buffer), CredentialStatus::Fresh)
	}

	/// Returns `true` if the credential has passed its expiry instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant, Duration::ZERO), CredentialStatus::Expired)
	}

	/// Returns `true` if a refresh token is held alongside the access token.
	pub fn is_refreshable(&self) -> bool {
		self.refresh_token.is_some()
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`Credential`].
#[derive(Clone, Debug, Default)]
pub struct CredentialBuilder {
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	id_token: Option<TokenSecret>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl CredentialBuilder {
	fn new() -> Self {
		Self::default()
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the ID token value.
	pub fn id_token(mut self, token: impl Into<String>) -> Self {
		self.id_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces a [`Credential`].
	pub fn build(self) -> Result<Credential, CredentialBuilderError> {
		let access_token = self.access_token.ok_or(CredentialBuilderError::MissingAccessToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) => issued_at + delta,
			(None, None) => return Err(CredentialBuilderError::MissingExpiry),
		};

		Ok(Credential {
			access_token,
			refresh_token: self.refresh_token,
			id_token: self.id_token,
			issued_at,
			expires_at,
		})
	}
}
