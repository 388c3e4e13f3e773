//! Credential types.

use serde::{Deserialize, Serialize};

use crate::config::EXPIRY_SAFETY_MARGIN;

/// The session's credential snapshot.
///
/// Replaced wholesale on each successful (re-)authentication, never
/// partially mutated. The bearer token and expiry are always set together;
/// absence of credentials is modeled as `Option<Credentials>` in the auth
/// manager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Short-lived bearer token (Cognito `IdToken`), presented on each call.
    pub bearer_token: String,
    /// Longer-lived refresh token, exchangeable for a new bearer token.
    pub refresh_token: String,
    /// Unix timestamp after which the bearer token is considered expired.
    /// Already includes the safety margin.
    pub expires_at: i64,
}

impl Credentials {
    /// Build credentials from a fresh authentication result.
    ///
    /// `expires_at = now + expires_in - safety_margin`.
    pub fn from_tokens(bearer_token: String, refresh_token: String, expires_in: i64) -> Self {
        let expires_at =
            chrono::Utc::now().timestamp() + expires_in - EXPIRY_SAFETY_MARGIN.as_secs() as i64;
        Self {
            bearer_token,
            refresh_token,
            expires_at,
        }
    }

    /// Check whether the bearer token has passed its (margin-adjusted) expiry.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() >= self.expires_at
    }
}

/// Transient result of either Cognito auth flow. Consumed immediately to
/// build [`Credentials`], never retained.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    /// New bearer token.
    pub id_token: String,
    /// New refresh token. The refresh flow does not rotate it, so this is
    /// only present after the full password key-exchange flow.
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}
