//! Client-level error types shared across the credential provider and HTTP pipeline.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// The HTTP pipeline itself never invents failures: callers receive either an ordinary
/// [`reqwest::Response`] (any status, including a final 401) or the final attempt's transport
/// error wrapped in [`Error::Transport`]. The remaining variants surface from explicit
/// credential-provider calls such as [`refresh`](crate::provider::CredentialProvider::refresh).
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint failure during a credential refresh.
	#[error(transparent)]
	Refresh(#[from] RefreshError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Configuration and validation failures raised before any request leaves the process.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Outgoing request could not be assembled.
	#[error("Request could not be assembled.")]
	RequestBuild {
		/// Underlying builder failure.
		#[source]
		source: BoxError,
	},
	/// No refresh token is held, so a refresh cannot be attempted.
	#[error("Held credential is missing a refresh token.")]
	MissingRefreshToken,
	/// No credential is held at all.
	#[error("No credential is currently held.")]
	MissingCredential,
	/// Credential builder validation failed.
	#[error("Unable to build credential.")]
	CredentialBuild(#[from] crate::auth::CredentialBuilderError),
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned a non-positive or out-of-range `expires_in`.
	#[error("The expires_in value must be a positive number of seconds.")]
	InvalidExpiresIn,
}
impl ConfigError {
	/// Wraps a request builder failure inside [`ConfigError`].
	pub fn request_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::RequestBuild { source: Box::new(src) }
	}
}

/// Failures reported by the token endpoint during `grant_type=refresh_token` exchanges.
#[derive(Debug, ThisError)]
pub enum RefreshError {
	/// Endpoint rejected the refresh token (e.g., `invalid_grant`); re-authentication required.
	#[error("Token endpoint rejected the refresh token: {reason}.")]
	Rejected {
		/// OAuth error code or description supplied by the endpoint.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Endpoint returned an unexpected non-2xx response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	Endpoint {
		/// Summary of the unexpected response.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// An in-flight exchange for the same credential already failed; waiters inherit that
	/// failure instead of repeating the endpoint call.
	#[error("Refresh already failed for the held credential.")]
	AlreadyFailed,
	/// Endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while sending the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
impl From<ReqwestError> for Error {
	fn from(e: ReqwestError) -> Self {
		TransportError::from(e).into()
	}
}
