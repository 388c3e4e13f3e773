//! Cognito Identity Provider wire calls.
//!
//! Only the two flows the Emporia API actually uses: `REFRESH_TOKEN_AUTH`
//! and `USER_SRP_AUTH` with its `PASSWORD_VERIFIER` challenge.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::auth::AuthTokens;

use super::srp::{srp_timestamp, SrpClient};

const TARGET_INITIATE_AUTH: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const TARGET_RESPOND_TO_CHALLENGE: &str =
    "AWSCognitoIdentityProviderService.RespondToAuthChallenge";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
    challenge_parameters: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    #[serde(default)]
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
struct CognitoErrorBody {
    #[serde(rename = "__type", default)]
    type_name: String,
    #[serde(default)]
    message: Option<String>,
}

/// Exchange a refresh token for a new bearer token.
///
/// The refresh token is not rotated by this flow.
pub(crate) async fn refresh_auth(
    client: &reqwest::Client,
    cognito_url: &str,
    client_id: &str,
    refresh_token: &str,
) -> Result<AuthTokens> {
    if refresh_token.is_empty() {
        return Err(Error::MissingCredential("refresh_token".into()));
    }

    info!("Refreshing bearer token via Cognito...");
    let payload = serde_json::json!({
        "AuthFlow": "REFRESH_TOKEN_AUTH",
        "ClientId": client_id,
        "AuthParameters": { "REFRESH_TOKEN": refresh_token },
    });

    let response = post_target(client, cognito_url, TARGET_INITIATE_AUTH, &payload).await?;
    let response = check_status(response, AuthFlowKind::Refresh).await?;
    let tokens = extract_tokens(response).await?;

    debug!("Bearer token refreshed");
    Ok(tokens)
}

/// Full password key-exchange login.
///
/// Returns both a new bearer token and a new refresh token.
pub(crate) async fn srp_auth(
    client: &reqwest::Client,
    cognito_url: &str,
    client_id: &str,
    user_pool_id: &str,
    username: &str,
    password: &str,
) -> Result<AuthTokens> {
    if username.is_empty() || password.is_empty() {
        return Err(Error::MissingCredential("username/password".into()));
    }

    info!("Authenticating via SRP key exchange...");
    let srp = SrpClient::new(user_pool_id)?;

    let initiate = serde_json::json!({
        "AuthFlow": "USER_SRP_AUTH",
        "ClientId": client_id,
        "AuthParameters": { "USERNAME": username, "SRP_A": srp.a_hex() },
    });
    let response = post_target(client, cognito_url, TARGET_INITIATE_AUTH, &initiate).await?;
    let response = check_status(response, AuthFlowKind::Srp).await?;

    let body: AuthResponse = response
        .json()
        .await
        .map_err(|e| Error::Decode(format!("InitiateAuth response: {}", e)))?;

    match body.challenge_name.as_deref() {
        Some("PASSWORD_VERIFIER") => {}
        other => {
            return Err(Error::Decode(format!(
                "unexpected auth challenge: {:?}",
                other
            )))
        }
    }
    let params = body
        .challenge_parameters
        .ok_or_else(|| Error::Decode("InitiateAuth response missing challenge parameters".into()))?;
    let param = |key: &str| -> Result<&String> {
        params
            .get(key)
            .ok_or_else(|| Error::Decode(format!("challenge missing {}", key)))
    };

    let user_id = param("USER_ID_FOR_SRP")?;
    let salt = param("SALT")?;
    let srp_b = param("SRP_B")?;
    let secret_block = param("SECRET_BLOCK")?;

    let timestamp = srp_timestamp(chrono::Utc::now());
    let signature =
        srp.password_claim_signature(user_id, password, srp_b, salt, secret_block, &timestamp)?;

    let respond = serde_json::json!({
        "ChallengeName": "PASSWORD_VERIFIER",
        "ClientId": client_id,
        "ChallengeResponses": {
            "USERNAME": user_id,
            "PASSWORD_CLAIM_SECRET_BLOCK": secret_block,
            "PASSWORD_CLAIM_SIGNATURE": signature,
            "TIMESTAMP": timestamp,
        },
    });
    let response =
        post_target(client, cognito_url, TARGET_RESPOND_TO_CHALLENGE, &respond).await?;
    let response = check_status(response, AuthFlowKind::Srp).await?;
    let tokens = extract_tokens(response).await?;

    debug!("SRP authentication succeeded");
    Ok(tokens)
}

async fn post_target(
    client: &reqwest::Client,
    cognito_url: &str,
    target: &str,
    payload: &serde_json::Value,
) -> Result<reqwest::Response> {
    let body = serde_json::to_vec(payload)
        .map_err(|e| Error::Decode(format!("auth request body: {}", e)))?;
    client
        .post(cognito_url)
        .header(reqwest::header::CONTENT_TYPE, AMZ_JSON)
        .header("x-amz-target", target)
        .body(body)
        .send()
        .await
        .map_err(Error::from_transport)
}

#[derive(Clone, Copy)]
enum AuthFlowKind {
    Refresh,
    Srp,
}

/// Classify a non-2xx identity-provider response.
///
/// A rejected refresh token must stay distinguishable from a bad password,
/// since it decides the fallback to the full login flow.
async fn check_status(
    response: reqwest::Response,
    flow: AuthFlowKind,
) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let parsed: CognitoErrorBody = serde_json::from_str(&body).unwrap_or(CognitoErrorBody {
        type_name: String::new(),
        message: None,
    });
    let reason = match (&parsed.type_name, &parsed.message) {
        (t, Some(m)) if !t.is_empty() => format!("{}: {}", t, m),
        (t, None) if !t.is_empty() => t.clone(),
        _ => format!("HTTP {}: {}", status, body),
    };

    match flow {
        AuthFlowKind::Refresh if parsed.type_name == "NotAuthorizedException" => {
            Err(Error::RefreshRejected(reason))
        }
        _ => Err(Error::AuthenticationFailed(reason)),
    }
}

async fn extract_tokens(response: reqwest::Response) -> Result<AuthTokens> {
    let body: AuthResponse = response
        .json()
        .await
        .map_err(|e| Error::Decode(format!("auth response: {}", e)))?;
    let result = body
        .authentication_result
        .ok_or_else(|| Error::Decode("auth response missing AuthenticationResult".into()))?;
    if result.id_token.is_empty() {
        return Err(Error::Decode("auth response missing IdToken".into()));
    }
    Ok(AuthTokens {
        id_token: result.id_token,
        refresh_token: result.refresh_token,
        expires_in: result.expires_in,
    })
}
