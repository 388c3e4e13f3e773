//! Shared helpers for the integration tests.
#![allow(dead_code)]

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use emporia_gateway::{Credentials, EmporiaClient};

pub const SEED_BEARER: &str = "seed-bearer";
pub const SEED_REFRESH: &str = "seed-refresh";
pub const NEW_BEARER: &str = "refreshed-bearer";

/// Build a client whose api, c-api, and Cognito endpoints all point at
/// mock servers.
pub fn test_client(api: &MockServer, c_api: &MockServer, cognito: &MockServer) -> EmporiaClient {
    EmporiaClient::builder()
        .username("user@example.com")
        .password("hunter2")
        .client_id("test-client-id")
        .user_pool_id("us-east-2_TestPool1")
        .api_host(api.uri())
        .c_api_host(c_api.uri())
        .cognito_url(cognito.uri())
        .build()
        .expect("test client should build")
}

/// Seed credentials that are still comfortably inside their lifetime.
pub async fn seed_fresh(client: &EmporiaClient) {
    client
        .auth()
        .set_credentials(Credentials {
            bearer_token: SEED_BEARER.into(),
            refresh_token: SEED_REFRESH.into(),
            expires_at: chrono::Utc::now().timestamp() + 3600,
        })
        .await;
}

/// Seed credentials that are already past expiry.
pub async fn seed_expired(client: &EmporiaClient) {
    client
        .auth()
        .set_credentials(Credentials {
            bearer_token: SEED_BEARER.into(),
            refresh_token: SEED_REFRESH.into(),
            expires_at: chrono::Utc::now().timestamp() - 10,
        })
        .await;
}

/// Mount a successful `REFRESH_TOKEN_AUTH` exchange handing out
/// [`NEW_BEARER`], expected exactly `expected_calls` times.
pub async fn mount_refresh_ok(cognito: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-target", "AWSCognitoIdentityProviderService.InitiateAuth"))
        .and(body_partial_json(json!({"AuthFlow": "REFRESH_TOKEN_AUTH"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AuthenticationResult": {
                "IdToken": NEW_BEARER,
                "ExpiresIn": 3600
            }
        })))
        .expect(expected_calls)
        .mount(cognito)
        .await;
}

/// Mount a Cognito endpoint that must never be called.
pub async fn mount_cognito_untouched(cognito: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(cognito)
        .await;
}
