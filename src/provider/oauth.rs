//! Reqwest-backed [`CredentialProvider`] that exchanges refresh tokens against the
//! CedarStack identity backend.
//!
//! The exchange is a standard OAuth 2.0 `grant_type=refresh_token` POST. Successful
//! responses rotate the held [`Credential`] atomically before any waiter resumes; failed
//! responses leave the held credential untouched and surface a classified error. When the
//! endpoint omits a replacement refresh or ID token, the previous secret is carried over so
//! a partial rotation never drops the session's ability to refresh again.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	error::{ConfigError, RefreshError},
	provider::{CredentialProvider, ProviderFuture},
};

/// Credential provider backed by an OAuth 2.0 token endpoint.
pub struct OAuthCredentialProvider {
	http: ReqwestClient,
	token_endpoint: Url,
	client_id: String,
	client_secret: Option<String>,
	state: RwLock<Option<Credential>>,
}
impl OAuthCredentialProvider {
	/// Creates a provider for the given token endpoint and public client identifier.
	pub fn new(token_endpoint: Url, client_id: impl Into<String>) -> Self {
		Self {
			http: ReqwestClient::default(),
			token_endpoint,
			client_id: client_id.into(),
			client_secret: None,
			state: RwLock::new(None),
		}
	}

	/// Replaces the transport used for token-endpoint calls.
	pub fn with_http_client(mut self, client: ReqwestClient) -> Self {
		self.http = client;

		self
	}

	/// Sets or replaces the confidential client secret sent with each exchange.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	async fn exchange(&self, refresh_token: String) -> Result<Credential> {
		let mut form = vec![
			("grant_type", "refresh_token".to_owned()),
			("client_id", self.client_id.clone()),
			("refresh_token", refresh_token),
		];

		if let Some(secret) = &self.client_secret {
			form.push(("client_secret", secret.clone()));
		}

		let response = self
			.http
			.post(self.token_endpoint.clone())
			.form(&form)
			.send()
			.await
			.map_err(Error::from)?;
		let status = response.status().as_u16();
		let body = response.text().await.map_err(Error::from)?;

		if !(200..300).contains(&status) {
			return Err(classify_error_body(&body, status).into());
		}

		let mut deserializer = serde_json::Deserializer::from_str(&body);
		let payload: TokenEndpointResponse = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| RefreshError::ResponseParse { source, status: Some(status) })?;

		self.rotate(payload)
	}

	/// Applies a successful token response on top of the previously held credential.
	fn rotate(&self, payload: TokenEndpointResponse) -> Result<Credential> {
		let expires_in = payload.expires_in.ok_or(ConfigError::MissingExpiresIn)?;

		if expires_in <= 0 {
			return Err(ConfigError::InvalidExpiresIn.into());
		}

		let mut guard = self.state.write();
		let mut builder = Credential::builder()
			.access_token(payload.access_token)
			.issued_at(OffsetDateTime::now_utc())
			.expires_in(Duration::seconds(expires_in));
		let carried_refresh = payload.refresh_token.or_else(|| {
			guard.as_ref().and_then(|c| c.refresh_token.as_ref().map(|s| s.expose().to_owned()))
		});
		let carried_id = payload.id_token.or_else(|| {
			guard.as_ref().and_then(|c| c.id_token.as_ref().map(|s| s.expose().to_owned()))
		});

		if let Some(secret) = carried_refresh {
			builder = builder.refresh_token(secret);
		}
		if let Some(secret) = carried_id {
			builder = builder.id_token(secret);
		}

		let credential = builder.build().map_err(ConfigError::from)?;

		*guard = Some(credential.clone());

		Ok(credential)
	}
}
impl CredentialProvider for OAuthCredentialProvider {
	fn current(&self) -> Option<Credential> {
		self.state.read().clone()
	}

	fn refresh(&self) -> ProviderFuture<'_, Credential> {
		let refresh_token = {
			let guard = self.state.read();

			match guard.as_ref() {
				Some(credential) => credential
					.refresh_token
					.as_ref()
					.map(|secret| secret.expose().to_owned())
					.ok_or(ConfigError::MissingRefreshToken),
				None => Err(ConfigError::MissingCredential),
			}
		};

		Box::pin(async move { self.exchange(refresh_token?).await })
	}

	fn install(&self, credential: Credential) {
		*self.state.write() = Some(credential);
	}

	fn clear(&self) -> bool {
		self.state.write().take().is_some()
	}
}
impl Debug for OAuthCredentialProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthCredentialProvider")
			.field("token_endpoint", &self.token_endpoint.as_str())
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("credential_held", &self.state.read().is_some())
			.finish()
	}
}

/// Fields read from a successful token-endpoint response. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
	access_token: String,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	id_token: Option<String>,
	#[serde(default)]
	expires_in: Option<i64>,
}

/// Error body published by OAuth token endpoints on non-2xx responses.
#[derive(Debug, Deserialize)]
struct TokenEndpointError {
	error: String,
	#[serde(default)]
	error_description: Option<String>,
}

fn classify_error_body(body: &str, status: u16) -> RefreshError {
	match serde_json::from_str::<TokenEndpointError>(body) {
		Ok(payload) => {
			let reason = payload.error_description.unwrap_or(payload.error);

			RefreshError::Rejected { reason, status: Some(status) }
		},
		Err(_) => RefreshError::Endpoint {
			message: format!("status {status} with a non-OAuth error body"),
			status: Some(status),
		},
	}
}
