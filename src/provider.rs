//! Credential source contracts consumed by the HTTP client.

pub mod memory;
pub mod oauth;

pub use memory::MemoryCredentialProvider;
pub use oauth::OAuthCredentialProvider;

// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenSecret},
};

/// Boxed future returned by provider operations.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Primary credential source contract.
///
/// The provider owns the [`Credential`] exclusively. The HTTP client reads snapshots via
/// [`current`](CredentialProvider::current) and asks for rotation via
/// [`refresh`](CredentialProvider::refresh); it never mutates the credential itself. A
/// successful refresh must atomically replace the held credential before the returned future
/// resolves, so every waiter released afterwards observes the rotated token. A failed refresh
/// must leave the held credential untouched.
pub trait CredentialProvider
where
	Self: Send + Sync,
{
	/// Returns a snapshot of the currently held credential, if any.
	fn current(&self) -> Option<Credential>;

	/// Exchanges the held refresh token for a new credential and installs it.
	fn refresh(&self) -> ProviderFuture<'_, Credential>;

	/// Installs a credential obtained out of band (e.g., after an interactive login).
	fn install(&self, credential: Credential);

	/// Clears all held credential state, returning whether a credential was actually removed.
	/// Local side effect only; no logout call is made.
	///
	/// The removal check and the removal itself must be one atomic step, so that racing
	/// callers cannot both observe the held-to-cleared transition.
	fn clear(&self) -> bool;

	/// Returns the currently held access token, if any.
	fn access_token(&self) -> Option<TokenSecret> {
		self.current().map(|credential| credential.access_token)
	}

	/// Returns the currently held refresh token, if any.
	fn refresh_token(&self) -> Option<TokenSecret> {
		self.current().and_then(|credential| credential.refresh_token)
	}

	/// Returns the expiry instant of the currently held credential, if any.
	fn expiry(&self) -> Option<OffsetDateTime> {
		self.current().map(|credential| credential.expires_at)
	}
}

/// Optional secondary credential source (e.g., a platform SSO session).
///
/// The secondary source owns its token independently of the primary provider. Its refresh
/// failures are recoverable: the HTTP client logs them and proceeds without blocking the
/// request. The primary provider's token always takes precedence when both hold one.
pub trait SecondaryCredentialSource
where
	Self: Send + Sync,
{
	/// Returns the source's current access token, if any.
	fn current_access_token(&self) -> Option<TokenSecret>;

	/// Refreshes or validates the source's token, treating `leeway` as the acceptable
	/// remaining lifetime below which the token should be renewed.
	fn refresh(&self, leeway: Duration) -> ProviderFuture<'_, ()>;
}
