//! Credential lifecycle manager.
//!
//! Owns the session's single `Credentials` value: the expiry guard, the
//! refresh/login orchestration, and thread-safe snapshot access.

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::cognito_url;
use crate::error::{Error, Result};
use crate::models::auth::Credentials;

use super::cognito;

/// Identity-provider parameters for both auth flows.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Account username (email).
    pub username: String,
    /// Account password, used only by the SRP flow.
    pub password: String,
    /// Cognito app client id.
    pub client_id: String,
    /// Cognito user pool id, `{region}_{name}`.
    pub user_pool_id: String,
    /// Cognito endpoint URL.
    pub cognito_url: String,
}

impl AuthConfig {
    /// Build a config with the Cognito endpoint derived from the region.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        client_id: impl Into<String>,
        user_pool_id: impl Into<String>,
        region: &str,
    ) -> Result<Self> {
        Ok(Self {
            username: username.into(),
            password: password.into(),
            client_id: client_id.into(),
            user_pool_id: user_pool_id.into(),
            cognito_url: cognito_url(region)?,
        })
    }
}

/// Manages the Emporia credential lifecycle.
///
/// Thread-safe: the `RwLock` makes this shareable across tasks. This is the
/// single writer of `Credentials`; requesters read snapshots and trigger
/// writes only through [`ensure_fresh`](Self::ensure_fresh) or
/// [`authenticate`](Self::authenticate).
pub struct EmporiaAuthManager {
    credentials: RwLock<Option<Credentials>>,
    client: reqwest::Client,
    config: AuthConfig,
}

impl EmporiaAuthManager {
    /// Create a manager with no credentials held.
    pub fn new(config: AuthConfig) -> Self {
        Self {
            credentials: RwLock::new(None),
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Set the HTTP client used for auth calls (custom TLS config, testing).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Get a snapshot of the current credentials.
    pub async fn credentials(&self) -> Option<Credentials> {
        self.credentials.read().await.clone()
    }

    /// Seed credentials directly (e.g. resuming with a known refresh token).
    pub async fn set_credentials(&self, credentials: Credentials) {
        let mut guard = self.credentials.write().await;
        *guard = Some(credentials);
    }

    /// Current bearer token, without any freshness check.
    ///
    /// Callers run [`ensure_fresh`](Self::ensure_fresh) first.
    pub async fn bearer_token(&self) -> Result<String> {
        self.credentials
            .read()
            .await
            .as_ref()
            .map(|c| c.bearer_token.clone())
            .ok_or(Error::NotAuthenticated)
    }

    /// Pre-flight expiry guard.
    ///
    /// Authenticates synchronously when credentials are absent or past
    /// expiry; a no-op otherwise. Concurrent callers coalesce on the write
    /// lock and re-check before authenticating, so at most one of them
    /// performs the exchange.
    pub async fn ensure_fresh(&self) -> Result<()> {
        {
            let creds = self.credentials.read().await;
            if let Some(c) = creds.as_ref() {
                if !c.is_expired() {
                    return Ok(());
                }
            }
        }

        let mut guard = self.credentials.write().await;
        // Another task may have re-authenticated while we waited for the lock.
        if let Some(c) = guard.as_ref() {
            if !c.is_expired() {
                return Ok(());
            }
        }
        debug!("Credentials absent or expired, authenticating");
        self.authenticate_locked(&mut guard).await
    }

    /// Force a full (re-)authentication, e.g. after a 401.
    ///
    /// Runs unconditionally: the server's verdict overrides the local
    /// expiry estimate. Safe to call redundantly from concurrent contexts;
    /// each call replaces the credentials wholesale.
    pub async fn authenticate(&self) -> Result<()> {
        let mut guard = self.credentials.write().await;
        self.authenticate_locked(&mut guard).await
    }

    async fn authenticate_locked(&self, guard: &mut Option<Credentials>) -> Result<()> {
        let held_refresh = guard.as_ref().map(|c| c.refresh_token.clone());

        let outcome = match held_refresh {
            Some(refresh_token) => {
                match cognito::refresh_auth(
                    &self.client,
                    &self.config.cognito_url,
                    &self.config.client_id,
                    &refresh_token,
                )
                .await
                {
                    Ok(tokens) => Ok(Credentials::from_tokens(
                        tokens.id_token,
                        // The refresh flow does not rotate the refresh token.
                        refresh_token,
                        tokens.expires_in,
                    )),
                    Err(Error::RefreshRejected(reason)) => {
                        warn!(%reason, "Refresh token rejected, falling back to password login");
                        self.login().await
                    }
                    Err(e) => Err(e),
                }
            }
            None => self.login().await,
        };

        match outcome {
            Ok(credentials) => {
                info!(expires_at = credentials.expires_at, "Authenticated");
                *guard = Some(credentials);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Authentication failed, clearing credentials");
                *guard = None;
                Err(e)
            }
        }
    }

    async fn login(&self) -> Result<Credentials> {
        let tokens = cognito::srp_auth(
            &self.client,
            &self.config.cognito_url,
            &self.config.client_id,
            &self.config.user_pool_id,
            &self.config.username,
            &self.config.password,
        )
        .await?;
        let refresh_token = tokens
            .refresh_token
            .ok_or_else(|| Error::Decode("login response missing RefreshToken".into()))?;
        Ok(Credentials::from_tokens(
            tokens.id_token,
            refresh_token,
            tokens.expires_in,
        ))
    }
}

impl std::fmt::Debug for EmporiaAuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmporiaAuthManager")
            .field("username", &self.config.username)
            .field("user_pool_id", &self.config.user_pool_id)
            .finish()
    }
}
