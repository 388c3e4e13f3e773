//! Authentication lifecycle tests against a mocked Cognito endpoint.

mod common;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{
    mount_cognito_untouched, mount_refresh_ok, seed_expired, seed_fresh, test_client, NEW_BEARER,
    SEED_REFRESH,
};

#[tokio::test]
async fn refresh_flow_replaces_bearer_and_keeps_refresh_token() {
    let api = MockServer::start().await;
    let c_api = MockServer::start().await;
    let cognito = MockServer::start().await;

    mount_refresh_ok(&cognito, 1).await;

    let client = test_client(&api, &c_api, &cognito);
    seed_expired(&client).await;

    client.auth().ensure_fresh().await.unwrap();

    let creds = client.auth().credentials().await.unwrap();
    assert_eq!(creds.bearer_token, NEW_BEARER);
    // The refresh flow does not rotate the refresh token.
    assert_eq!(creds.refresh_token, SEED_REFRESH);
    assert!(!creds.is_expired());

    // Freshly refreshed credentials pass the guard without another exchange;
    // the expect(1) on the mock enforces it.
    client.auth().ensure_fresh().await.unwrap();
}

#[tokio::test]
async fn fresh_credentials_skip_the_identity_provider() {
    let api = MockServer::start().await;
    let c_api = MockServer::start().await;
    let cognito = MockServer::start().await;

    mount_cognito_untouched(&cognito).await;

    let client = test_client(&api, &c_api, &cognito);
    seed_fresh(&client).await;

    client.auth().ensure_fresh().await.unwrap();
}

#[tokio::test]
async fn rejected_refresh_falls_back_to_password_login() {
    let api = MockServer::start().await;
    let c_api = MockServer::start().await;
    let cognito = MockServer::start().await;

    // Refresh token rejected by the identity provider.
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"AuthFlow": "REFRESH_TOKEN_AUTH"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "NotAuthorizedException",
            "message": "Refresh Token has been revoked"
        })))
        .expect(1)
        .mount(&cognito)
        .await;

    // Key-exchange login: challenge, then tokens.
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"AuthFlow": "USER_SRP_AUTH"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ChallengeName": "PASSWORD_VERIFIER",
            "ChallengeParameters": {
                "USER_ID_FOR_SRP": "user-uuid-1234",
                "SALT": "a1b2c3d4e5f6",
                "SRP_B": "1a2b3c4d5e6f7a8b9c0d",
                "SECRET_BLOCK": "c2VjcmV0LWJsb2Nr"
            }
        })))
        .expect(1)
        .mount(&cognito)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header(
            "x-amz-target",
            "AWSCognitoIdentityProviderService.RespondToAuthChallenge",
        ))
        .and(body_partial_json(json!({
            "ChallengeName": "PASSWORD_VERIFIER",
            "ChallengeResponses": {"USERNAME": "user-uuid-1234"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AuthenticationResult": {
                "IdToken": "srp-bearer",
                "RefreshToken": "rotated-refresh",
                "ExpiresIn": 3600
            }
        })))
        .expect(1)
        .mount(&cognito)
        .await;

    let client = test_client(&api, &c_api, &cognito);
    seed_expired(&client).await;

    client.auth().ensure_fresh().await.unwrap();

    let creds = client.auth().credentials().await.unwrap();
    assert_eq!(creds.bearer_token, "srp-bearer");
    assert_eq!(creds.refresh_token, "rotated-refresh");
}

#[tokio::test]
async fn failed_authentication_clears_credentials() {
    let api = MockServer::start().await;
    let c_api = MockServer::start().await;
    let cognito = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"AuthFlow": "REFRESH_TOKEN_AUTH"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "NotAuthorizedException",
            "message": "Refresh Token has been revoked"
        })))
        .mount(&cognito)
        .await;

    // The fallback login fails outright.
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"AuthFlow": "USER_SRP_AUTH"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "InvalidParameterException",
            "message": "Missing required parameter"
        })))
        .mount(&cognito)
        .await;

    let client = test_client(&api, &c_api, &cognito);
    seed_expired(&client).await;

    let err = client.auth().ensure_fresh().await.unwrap_err();
    assert!(matches!(err, emporia_gateway::Error::AuthenticationFailed(_)));
    assert!(client.auth().credentials().await.is_none());
}

#[tokio::test]
async fn first_call_without_credentials_logs_in() {
    let api = MockServer::start().await;
    let c_api = MockServer::start().await;
    let cognito = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"AuthFlow": "USER_SRP_AUTH"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ChallengeName": "PASSWORD_VERIFIER",
            "ChallengeParameters": {
                "USER_ID_FOR_SRP": "user-uuid-1234",
                "SALT": "0beef0",
                "SRP_B": "7f8e9d0c1b2a",
                "SECRET_BLOCK": "YmxvY2s="
            }
        })))
        .expect(1)
        .mount(&cognito)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header(
            "x-amz-target",
            "AWSCognitoIdentityProviderService.RespondToAuthChallenge",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AuthenticationResult": {
                "IdToken": "first-bearer",
                "RefreshToken": "first-refresh",
                "ExpiresIn": 3600
            }
        })))
        .expect(1)
        .mount(&cognito)
        .await;

    Mock::given(method("GET"))
        .and(path("/customers/devices"))
        .and(header("authtoken", "first-bearer"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"devices": [{"deviceGid": 1}]})),
        )
        .expect(1)
        .mount(&api)
        .await;

    let client = test_client(&api, &c_api, &cognito);

    let devices = client.devices().await.unwrap();
    assert_eq!(devices.devices[0].device_gid, 1);
}
