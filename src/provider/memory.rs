//! In-memory [`CredentialProvider`] without a refresh mechanism, for demos and tests.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	error::ConfigError,
	provider::{CredentialProvider, ProviderFuture},
};

/// Holds a credential in process memory and fails every refresh attempt.
///
/// Useful for tests that need a held-but-unrefreshable credential and for tooling that is
/// handed a long-lived token out of band.
#[derive(Debug, Default)]
pub struct MemoryCredentialProvider(RwLock<Option<Credential>>);
impl MemoryCredentialProvider {
	/// Creates a provider pre-seeded with the given credential.
	pub fn with_credential(credential: Credential) -> Self {
		Self(RwLock::new(Some(credential)))
	}
}
impl CredentialProvider for MemoryCredentialProvider {
	fn current(&self) -> Option<Credential> {
		self.0.read().clone()
	}

	fn refresh(&self) -> ProviderFuture<'_, Credential> {
		let held = self.0.read().is_some();

		Box::pin(async move {
			let err = if held {
				ConfigError::MissingRefreshToken
			} else {
				ConfigError::MissingCredential
			};

			Err(err.into())
		})
	}

	fn install(&self, credential: Credential) {
		*self.0.write() = Some(credential);
	}

	fn clear(&self) -> bool {
		self.0.write().take().is_some()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn refresh_always_fails_and_leaves_state_untouched() {
		let now = OffsetDateTime::now_utc();
		let credential = Credential::builder()
			.access_token("held")
			.issued_at(now)
			.expires_in(Duration::minutes(1))
			.build()
			.expect("Credential fixture should build for memory provider test.");
		let provider = MemoryCredentialProvider::with_credential(credential);
		let err = provider
			.refresh()
			.await
			.expect_err("Memory provider refresh should always fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingRefreshToken)));
		assert!(provider.current().is_some());

		assert!(provider.clear(), "First clear should report the removed credential.");
		assert!(!provider.clear(), "Second clear should report nothing left to remove.");

		let err = provider
			.refresh()
			.await
			.expect_err("Memory provider refresh should fail without a credential.");

		assert!(matches!(err, Error::Config(ConfigError::MissingCredential)));
	}
}
