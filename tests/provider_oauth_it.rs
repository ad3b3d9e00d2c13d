// crates.io
use httpmock::prelude::*;
// self
use cedarstack_http::{
	_preludet::*,
	error::{ConfigError, RefreshError},
	provider::CredentialProvider,
};

fn token_endpoint(server: &MockServer) -> Url {
	Url::parse(&server.url("/oauth/token")).expect("Mock token endpoint URL should parse.")
}

#[tokio::test]
async fn refresh_rotates_the_held_credential() {
	let server = MockServer::start_async().await;
	let provider = test_oauth_provider(token_endpoint(&server));

	seed_credential(&*provider, "access-old", Some("refresh-old"), Duration::seconds(30));

	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"access-rotated\",\"refresh_token\":\"refresh-rotated\",\"id_token\":\"id-rotated\",\"token_type\":\"bearer\",\"expires_in\":1800}",
				);
		})
		.await;
	let credential =
		provider.refresh().await.expect("Refresh against the mock endpoint should succeed.");

	token_mock.assert_async().await;

	assert_eq!(credential.access_token.expose(), "access-rotated");
	assert_eq!(credential.refresh_token.as_ref().map(|s| s.expose()), Some("refresh-rotated"));
	assert_eq!(credential.id_token.as_ref().map(|s| s.expose()), Some("id-rotated"));

	let held = provider.current().expect("Rotated credential should be installed.");

	assert_eq!(held.access_token.expose(), "access-rotated");
}

#[tokio::test]
async fn refresh_keeps_previous_refresh_token_when_response_omits_it() {
	let server = MockServer::start_async().await;
	let provider = test_oauth_provider(token_endpoint(&server));

	seed_credential(&*provider, "access-old", Some("refresh-sticky"), Duration::seconds(30));

	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"access-rotated\",\"token_type\":\"bearer\",\"expires_in\":900}",
				);
		})
		.await;
	let credential =
		provider.refresh().await.expect("Refresh without a rotated secret should succeed.");

	token_mock.assert_async().await;

	assert_eq!(credential.refresh_token.as_ref().map(|s| s.expose()), Some("refresh-sticky"));
}

#[tokio::test]
async fn rejected_refresh_leaves_state_untouched() {
	let server = MockServer::start_async().await;
	let provider = test_oauth_provider(token_endpoint(&server));

	seed_credential(&*provider, "access-old", Some("refresh-revoked"), Duration::seconds(30));

	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(400)
				.header("content-type", "application/json")
				.body(
					"{\"error\":\"invalid_grant\",\"error_description\":\"refresh token revoked\"}",
				);
		})
		.await;
	let err = provider
		.refresh()
		.await
		.expect_err("A rejected refresh token should surface as an error.");

	token_mock.assert_async().await;

	assert!(matches!(
		err,
		Error::Refresh(RefreshError::Rejected { status: Some(400), .. }),
	));

	let held = provider.current().expect("Failed refresh must leave the credential in place.");

	assert_eq!(held.access_token.expose(), "access-old");
}

#[tokio::test]
async fn malformed_endpoint_body_maps_to_parse_error() {
	let server = MockServer::start_async().await;
	let provider = test_oauth_provider(token_endpoint(&server));

	seed_credential(&*provider, "access-old", Some("refresh-old"), Duration::seconds(30));

	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body("{\"access_token\":42}");
		})
		.await;
	let err = provider.refresh().await.expect_err("Malformed JSON should fail the refresh.");

	token_mock.assert_async().await;

	assert!(matches!(err, Error::Refresh(RefreshError::ResponseParse { .. })));
}

#[tokio::test]
async fn refresh_without_a_refresh_token_fails_locally() {
	let server = MockServer::start_async().await;
	let provider = test_oauth_provider(token_endpoint(&server));

	seed_credential(&*provider, "access-only", None, Duration::seconds(30));

	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200);
		})
		.await;
	let err = provider
		.refresh()
		.await
		.expect_err("Refresh without a held refresh token should fail before any network call.");

	assert!(matches!(err, Error::Config(ConfigError::MissingRefreshToken)));

	token_mock.assert_calls_async(0).await;
}
