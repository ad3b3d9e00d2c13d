//! Authenticated HTTP client for the CedarStack API—bearer attachment, single-flight token
//! refresh, bounded retry, and session teardown in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod obs;
pub mod provider;
pub mod session;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	// std
	use std::sync::atomic::{AtomicUsize, Ordering};

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::Credential,
		client::AuthHttpClient,
		provider::{CredentialProvider, oauth::OAuthCredentialProvider},
		session::SessionObserver,
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_client() -> ReqwestClient {
		ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.")
	}

	/// Constructs an [`OAuthCredentialProvider`] pointed at a mock token endpoint.
	pub fn test_oauth_provider(token_endpoint: Url) -> Arc<OAuthCredentialProvider> {
		Arc::new(
			OAuthCredentialProvider::new(token_endpoint, "cedarstack-web")
				.with_http_client(test_reqwest_client()),
		)
	}

	/// Seeds a provider with a credential issued five minutes ago and expiring after `expires_in`.
	pub fn seed_credential(
		provider: &dyn CredentialProvider,
		access: &str,
		refresh: Option<&str>,
		expires_in: Duration,
	) {
		let issued = OffsetDateTime::now_utc() - Duration::minutes(5);
		let mut builder = Credential::builder()
			.access_token(access.to_owned())
			.issued_at(issued)
			.expires_at(issued + expires_in);

		if let Some(secret) = refresh {
			builder = builder.refresh_token(secret.to_owned());
		}

		provider.install(builder.build().expect("Credential fixture should build successfully."));
	}

	/// Constructs an [`AuthHttpClient`] over the provided provider using the insecure test
	/// transport and a [`CountingSessionObserver`] for termination assertions.
	pub fn build_test_client(
		provider: Arc<dyn CredentialProvider>,
	) -> (AuthHttpClient, Arc<CountingSessionObserver>) {
		let observer = Arc::new(CountingSessionObserver::default());
		let client = AuthHttpClient::builder(provider)
			.with_http_client(test_reqwest_client())
			.with_session_observer(observer.clone())
			.build();

		(client, observer)
	}

	/// Session observer that counts termination notifications.
	#[derive(Debug, Default)]
	pub struct CountingSessionObserver(AtomicUsize);
	impl CountingSessionObserver {
		/// Returns the number of terminations observed so far.
		pub fn terminations(&self) -> usize {
			self.0.load(Ordering::SeqCst)
		}
	}
	impl SessionObserver for CountingSessionObserver {
		fn session_terminated(&self) {
			self.0.fetch_add(1, Ordering::SeqCst);
		}
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

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {cedarstack_http as _, futures_util as _, httpmock as _, tokio as _};
