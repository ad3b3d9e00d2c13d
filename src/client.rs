//! Authenticated request pipeline: bearer attachment, single-flight refresh, bounded retry,
//! and session teardown.
//!
//! [`AuthHttpClient`] wraps a [`ReqwestClient`] so every request carries valid credentials.
//! Before a request goes out, the held credential is refreshed when it is expired or inside
//! the expiry buffer (proactive path). After an unauthorized response, exactly one refresh
//! and one retry are attempted (reactive path); a second rejection or an irrecoverable
//! refresh terminates the session. Concurrent requests that discover a stale credential
//! serialize on one refresh gate, so any number of them produces a single token-endpoint
//! call.
//!
//! The client adds no failure shapes of its own: callers receive the final attempt's
//! [`Response`] (any status, including a surviving 401) or its transport error. Whether a
//! silent refresh-and-retry happened in between is not observable.

mod metrics;

pub use metrics::ClientMetrics;

// crates.io
use reqwest::{
	Method, Request, RequestBuilder, Response, StatusCode,
	header::{AUTHORIZATION, HeaderValue},
};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ConfigError, RefreshError},
	obs::{self, RefreshOutcome, RefreshSpan, RefreshTrigger},
	provider::{CredentialProvider, SecondaryCredentialSource},
	session::{SessionNotifier, SessionObserver},
};

/// Authenticated HTTP client for the CedarStack API.
///
/// Construct one per process via [`AuthHttpClient::builder`] and clone it wherever requests
/// are issued; clones share the same transport, refresh gate, observers, and counters, so the
/// pipeline runs exactly once per request no matter how many handles exist.
#[derive(Clone, Debug)]
pub struct AuthHttpClient {
	inner: Arc<ClientInner>,
}
struct ClientInner {
	http: ReqwestClient,
	provider: Arc<dyn CredentialProvider>,
	secondary: Option<Arc<dyn SecondaryCredentialSource>>,
	notifier: SessionNotifier,
	expiry_buffer: Duration,
	secondary_leeway: Duration,
	refresh_gate: AsyncMutex<RefreshGateState>,
	metrics: ClientMetrics,
}

/// State shared under the refresh gate so queued waiters inherit the in-flight outcome.
#[derive(Debug, Default)]
struct RefreshGateState {
	/// Access token of the credential whose last exchange failed. While the provider still
	/// holds this token, waiters settle with the recorded failure instead of repeating the
	/// endpoint call; any rotation or fresh install makes the marker inert.
	failed_token: Option<String>,
}
impl AuthHttpClient {
	/// Default window before expiry inside which a credential is refreshed proactively.
	pub const DEFAULT_EXPIRY_BUFFER: Duration = Duration::seconds(10);
	/// Default leeway handed to the secondary source's refresh operation.
	pub const DEFAULT_SECONDARY_LEEWAY: Duration = Duration::seconds(30);

	/// Returns a builder over the provided primary credential provider.
	pub fn builder(provider: Arc<dyn CredentialProvider>) -> AuthHttpClientBuilder {
		AuthHttpClientBuilder::new(provider)
	}

	/// Returns the underlying transport for requests that must bypass the pipeline.
	pub fn http(&self) -> &ReqwestClient {
		&self.inner.http
	}

	/// Returns the pipeline's in-process counters.
	pub fn metrics(&self) -> &ClientMetrics {
		&self.inner.metrics
	}

	/// Registers an additional session observer after construction.
	pub fn register_session_observer(&self, observer: Arc<dyn SessionObserver>) {
		self.inner.notifier.register(observer);
	}

	/// Starts building a request against the shared transport.
	///
	/// Finish with [`send`](AuthHttpClient::send) so the authenticated pipeline applies.
	pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
		self.inner.http.request(method, url)
	}

	/// Issues a GET request through the authenticated pipeline.
	pub async fn get(&self, url: Url) -> Result<Response> {
		self.send(self.request(Method::GET, url)).await
	}

	/// Builds and executes a request through the authenticated pipeline.
	pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
		let request = builder.build().map_err(ConfigError::request_build)?;

		self.execute(request).await
	}

	/// Executes a prepared request through the authenticated pipeline.
	pub async fn execute(&self, mut request: Request) -> Result<Response> {
		// Streaming bodies cannot be cloned; such requests simply lose the retry step.
		let retry = request.try_clone();
		let bearer = self.prepare_bearer().await;
		let had_credential = self.inner.provider.current().is_some();

		if let Some(token) = &bearer {
			attach_bearer(&mut request, token)?;
		}

		let response = self.inner.http.execute(request).await.map_err(Error::from)?;

		if response.status() != StatusCode::UNAUTHORIZED {
			return Ok(response);
		}

		self.recover_unauthorized(response, retry, bearer, had_credential).await
	}

	/// Request path: proactive refresh, secondary fallback, then the token to attach.
	///
	/// Primary-provider proactive failures are tolerated here; the request goes out with
	/// whatever token is held and the response path arbitrates. Secondary-source failures
	/// are likewise logged and swallowed.
	async fn prepare_bearer(&self) -> Option<TokenSecret> {
		let now = OffsetDateTime::now_utc();

		match self.inner.provider.current() {
			Some(credential) =>
				if credential.needs_refresh_at(now, self.inner.expiry_buffer)
					&& credential.is_refreshable()
				{
					if let Err(err) =
						self.coordinated_refresh(RefreshTrigger::Proactive, None).await
					{
						obs::warn_refresh_failed("primary", &err);
					}
				},
			None =>
				if let Some(secondary) = &self.inner.secondary {
					if let Err(err) = secondary.refresh(self.inner.secondary_leeway).await {
						obs::warn_refresh_failed("secondary", &err);
					}
				},
		}

		self.inner
			.provider
			.access_token()
			.or_else(|| self.inner.secondary.as_ref().and_then(|s| s.current_access_token()))
	}

	/// Response path for a 401: one coordinated refresh, one retry, then teardown rules.
	async fn recover_unauthorized(
		&self,
		response: Response,
		retry: Option<Request>,
		sent_bearer: Option<TokenSecret>,
		had_credential: bool,
	) -> Result<Response> {
		// A request that was always unauthenticated never triggers refresh or teardown;
		// forcing logout here would loop during startup before any login happened.
		if sent_bearer.is_none() && !had_credential {
			return Ok(response);
		}

		let rejected = sent_bearer.as_ref().map(|token| token.expose().to_owned());

		if self.coordinated_refresh(RefreshTrigger::Reactive, rejected.as_deref()).await.is_err() {
			if had_credential {
				self.terminate_session();
			}

			return Ok(response);
		}

		let Some(mut retry_request) = retry else {
			// The rotated credential still benefits subsequent requests.
			return Ok(response);
		};
		let Some(token) = self.inner.provider.access_token() else {
			if had_credential {
				self.terminate_session();
			}

			return Ok(response);
		};

		attach_bearer(&mut retry_request, &token)?;
		self.inner.metrics.record_retry();

		let retried = self.inner.http.execute(retry_request).await.map_err(Error::from)?;

		// Already retried once; a second rejection is terminal.
		if retried.status() == StatusCode::UNAUTHORIZED {
			self.terminate_session();
		}

		Ok(retried)
	}

	/// Single-flight refresh shared by the proactive and reactive paths.
	///
	/// The gate is acquired before any awaitable refresh work begins, so two requests can
	/// never both observe "no refresh in flight." Whoever enters second re-checks the
	/// provider's state and inherits the outcome a concurrent flight already settled:
	/// proactive waiters reuse a credential that left the buffer window, reactive waiters
	/// reuse one whose access token differs from the value the server rejected, and waiters
	/// behind a failed exchange of the still-held token fail without another endpoint call.
	/// One expired-credential condition therefore produces exactly one token-endpoint call,
	/// whichever way the flight resolves.
	async fn coordinated_refresh(
		&self,
		trigger: RefreshTrigger,
		rejected: Option<&str>,
	) -> Result<()> {
		let span = RefreshSpan::new(trigger, "coordinated_refresh");

		obs::record_refresh_outcome(trigger, RefreshOutcome::Attempt);
		self.inner.metrics.record_refresh_attempt();

		span.instrument(async move {
			let mut flight = self.inner.refresh_gate.lock().await;
			let held = self.inner.provider.current();

			if let Some(current) = &held {
				let rotated_already = match rejected {
					Some(stale) => current.access_token.expose() != stale,
					None => !current
						.needs_refresh_at(OffsetDateTime::now_utc(), self.inner.expiry_buffer),
				};

				if rotated_already {
					self.inner.metrics.record_refresh_reuse();
					obs::record_refresh_outcome(trigger, RefreshOutcome::Reused);

					return Ok(());
				}
				if flight.failed_token.as_deref() == Some(current.access_token.expose()) {
					self.inner.metrics.record_refresh_failure();
					obs::record_refresh_outcome(trigger, RefreshOutcome::Failure);

					return Err(RefreshError::AlreadyFailed.into());
				}
			}

			match self.inner.provider.refresh().await {
				Ok(_) => {
					flight.failed_token = None;
					self.inner.metrics.record_refresh_success();
					obs::record_refresh_outcome(trigger, RefreshOutcome::Success);

					Ok(())
				},
				Err(err) => {
					flight.failed_token =
						held.map(|credential| credential.access_token.expose().to_owned());
					self.inner.metrics.record_refresh_failure();
					obs::record_refresh_outcome(trigger, RefreshOutcome::Failure);

					Err(err)
				},
			}
		})
		.await
	}

	/// Clears held credential state and fans out the termination signal. Local side effect
	/// only; no logout endpoint is called.
	fn terminate_session(&self) {
		// Only the task whose clear actually removes the credential emits the signal, so
		// racing failures cannot notify twice.
		if !self.inner.provider.clear() {
			return;
		}

		self.inner.metrics.record_termination();
		obs::record_session_termination();
		self.inner.notifier.notify();
	}
}
impl Debug for ClientInner {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientInner")
			.field("secondary_set", &self.secondary.is_some())
			.field("expiry_buffer", &self.expiry_buffer)
			.field("secondary_leeway", &self.secondary_leeway)
			.finish()
	}
}

fn attach_bearer(request: &mut Request, token: &TokenSecret) -> Result<()> {
	let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
		.map_err(ConfigError::request_build)?;

	value.set_sensitive(true);
	request.headers_mut().insert(AUTHORIZATION, value);

	Ok(())
}

/// Builder for [`AuthHttpClient`].
pub struct AuthHttpClientBuilder {
	provider: Arc<dyn CredentialProvider>,
	http: Option<ReqwestClient>,
	secondary: Option<Arc<dyn SecondaryCredentialSource>>,
	observers: Vec<Arc<dyn SessionObserver>>,
	expiry_buffer: Duration,
	secondary_leeway: Duration,
}
impl AuthHttpClientBuilder {
	fn new(provider: Arc<dyn CredentialProvider>) -> Self {
		Self {
			provider,
			http: None,
			secondary: None,
			observers: Vec::new(),
			expiry_buffer: AuthHttpClient::DEFAULT_EXPIRY_BUFFER,
			secondary_leeway: AuthHttpClient::DEFAULT_SECONDARY_LEEWAY,
		}
	}

	/// Replaces the underlying transport (timeouts and TLS settings belong to it).
	pub fn with_http_client(mut self, client: ReqwestClient) -> Self {
		self.http = Some(client);

		self
	}

	/// Attaches an optional secondary credential source consulted when the primary holds
	/// no token.
	pub fn with_secondary_source(mut self, source: Arc<dyn SecondaryCredentialSource>) -> Self {
		self.secondary = Some(source);

		self
	}

	/// Registers a session observer notified on termination.
	pub fn with_session_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
		self.observers.push(observer);

		self
	}

	/// Overrides the proactive expiry buffer (defaults to 10 seconds).
	pub fn with_expiry_buffer(mut self, buffer: Duration) -> Self {
		self.expiry_buffer = if buffer.is_negative() { Duration::ZERO } else { buffer };

		self
	}

	/// Overrides the leeway handed to the secondary source (defaults to 30 seconds).
	pub fn with_secondary_leeway(mut self, leeway: Duration) -> Self {
		self.secondary_leeway = if leeway.is_negative() { Duration::ZERO } else { leeway };

		self
	}

	/// Consumes the builder and produces the shared client.
	pub fn build(self) -> AuthHttpClient {
		let notifier = SessionNotifier::default();

		for observer in self.observers {
			notifier.register(observer);
		}

		AuthHttpClient {
			inner: Arc::new(ClientInner {
				http: self.http.unwrap_or_default(),
				provider: self.provider,
				secondary: self.secondary,
				notifier,
				expiry_buffer: self.expiry_buffer,
				secondary_leeway: self.secondary_leeway,
				refresh_gate: AsyncMutex::new(RefreshGateState::default()),
				metrics: ClientMetrics::default(),
			}),
		}
	}
}
