//! Authenticated request executor.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::auth::EmporiaAuthManager;
use crate::config::{CONNECT_TIMEOUT, REQUEST_TIMEOUT};
use crate::error::{Error, Result};
use crate::transport::headers;

/// HTTP client for authenticated Emporia API calls.
///
/// Every call runs the expiry guard first, then retries exactly once after
/// a synchronous re-authentication if the server answers 401. Callers must
/// not assume idempotent retries beyond that single refresh-and-retry.
pub struct EmporiaHttpClient {
    client: reqwest::Client,
    auth: Arc<EmporiaAuthManager>,
}

impl EmporiaHttpClient {
    /// Create a client with the default finite-timeout configuration.
    pub fn new(auth: Arc<EmporiaAuthManager>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self { client, auth }
    }

    /// Create with a custom reqwest client.
    pub fn with_client(client: reqwest::Client, auth: Arc<EmporiaAuthManager>) -> Self {
        Self { client, auth }
    }

    /// Perform one authenticated request.
    ///
    /// 1. Run the expiry guard; authentication errors surface immediately
    ///    with no HTTP attempt.
    /// 2. Send with the bearer token in both token headers.
    /// 3. On 401, re-authenticate once unconditionally (the server is
    ///    authoritative), rebuild headers, retry exactly once.
    /// 4. A second 401 is a terminal [`Error::Unauthorized`]; any other
    ///    non-2xx is a terminal [`Error::Api`]. Transport errors are never
    ///    retried here.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        self.auth.ensure_fresh().await?;

        let mut response = self.send(method.clone(), url, query, body).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(url, "401 Unauthorized, re-authenticating and retrying once");
            self.auth.authenticate().await?;
            response = self.send(method, url, query, body).await?;

            if response.status() == StatusCode::UNAUTHORIZED {
                let message = response.text().await.unwrap_or_default();
                return Err(Error::Unauthorized { message });
            }
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, message });
        }

        Ok(response)
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let bearer = self.auth.bearer_token().await?;
        let mut builder = self
            .client
            .request(method, url)
            .headers(headers::api_headers(&bearer));
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder.send().await.map_err(Error::from_transport)
    }

    /// `GET` a JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.request(Method::GET, url, query, None).await?;
        decode(response).await
    }

    /// `PUT` a JSON body and decode the JSON response.
    pub async fn put_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let response = self.request(Method::PUT, url, &[], Some(body)).await?;
        decode(response).await
    }

    /// `PATCH` a JSON body and decode the JSON response.
    pub async fn patch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let response = self.request(Method::PATCH, url, &[], Some(body)).await?;
        decode(response).await
    }

    /// The shared auth manager.
    pub fn auth(&self) -> &Arc<EmporiaAuthManager> {
        &self.auth
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| Error::Decode(format!("response body: {}", e)))
}

impl std::fmt::Debug for EmporiaHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmporiaHttpClient")
            .field("auth", &self.auth)
            .finish()
    }
}
