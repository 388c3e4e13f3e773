//! High-level client facade and builder.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Method;
use tokio_util::sync::CancellationToken;

use crate::api;
use crate::auth::{AuthConfig, EmporiaAuthManager};
use crate::config::Endpoints;
use crate::error::{Error, Result};
use crate::models::device::{
    ChartUsage, DeviceList, DeviceStatusDetail, DevicesStatus, EvCharger, LocationProperties,
};
use crate::models::stream::StreamEvent;
use crate::stream::{HttpStreamTransport, StreamClient};
use crate::transport::http::EmporiaHttpClient;

/// Client for the Emporia Vue cloud API.
///
/// Cheap to clone; all clones share one auth manager, so any clone's
/// re-authentication benefits the rest.
///
/// Construct via [`EmporiaClient::builder`].
#[derive(Debug, Clone)]
pub struct EmporiaClient {
    auth: Arc<EmporiaAuthManager>,
    http: Arc<EmporiaHttpClient>,
    endpoints: Arc<Endpoints>,
}

impl EmporiaClient {
    pub fn builder() -> EmporiaClientBuilder {
        EmporiaClientBuilder::default()
    }

    /// The shared auth manager, for credential seeding or inspection.
    pub fn auth(&self) -> &Arc<EmporiaAuthManager> {
        &self.auth
    }

    /// List all devices on the account.
    pub async fn devices(&self) -> Result<DeviceList> {
        api::devices::list(&self.http, &self.endpoints).await
    }

    /// Legacy device status (carries the EV charger list).
    pub async fn devices_status(&self) -> Result<DevicesStatus> {
        api::devices::status(&self.http, &self.endpoints).await
    }

    /// Detailed device status from the c-api host.
    pub async fn devices_status_detail(&self) -> Result<DeviceStatusDetail> {
        api::devices::status_detail(&self.http, &self.endpoints).await
    }

    /// The EV chargers on the account.
    pub async fn ev_chargers(&self) -> Result<Vec<EvCharger>> {
        api::charger::list(&self.http, &self.endpoints).await
    }

    /// One EV charger by device GID.
    pub async fn ev_charger(&self, device_gid: u64) -> Result<EvCharger> {
        api::charger::get(&self.http, &self.endpoints, device_gid).await
    }

    /// Turn an EV charger on or off. No-op if already in the requested state.
    pub async fn set_ev_charger(&self, device_gid: u64, on: bool) -> Result<EvCharger> {
        api::charger::set_on(&self.http, &self.endpoints, device_gid, on).await
    }

    /// Location properties (rates) for every device that carries them.
    pub async fn location_properties(&self) -> Result<Vec<LocationProperties>> {
        api::rates::location_properties(&self.http, &self.endpoints).await
    }

    /// Set the usage rate on every device; returns how many were updated.
    pub async fn set_usage_rate(&self, new_rate: f64) -> Result<usize> {
        api::rates::set_usage_rate(&self.http, &self.endpoints, new_rate).await
    }

    /// Per-interval usage samples for one device over a window.
    pub async fn chart_usage(
        &self,
        device_gid: u64,
        channel: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        scale: &str,
        energy_unit: &str,
    ) -> Result<ChartUsage> {
        api::usage::chart_usage(
            &self.http,
            &self.endpoints,
            device_gid,
            channel,
            start,
            end,
            scale,
            energy_unit,
        )
        .await
    }

    /// Peak demand for the current month.
    pub async fn current_month_peak_demand(
        &self,
        device_gid: u64,
        channel: &str,
        energy_unit: &str,
    ) -> Result<serde_json::Value> {
        api::usage::current_month_peak_demand(
            &self.http,
            &self.endpoints,
            device_gid,
            channel,
            energy_unit,
        )
        .await
    }

    /// Aggregate usage for several devices at one instant.
    pub async fn devices_usages(
        &self,
        device_gids: &[u64],
        instant: DateTime<Utc>,
        scale: &str,
        energy_unit: &str,
    ) -> Result<serde_json::Value> {
        api::usage::devices_usages(
            &self.http,
            &self.endpoints,
            device_gids,
            instant,
            scale,
            energy_unit,
        )
        .await
    }

    /// App preferences, decoded from the endpoint's base64 wrapping.
    pub async fn app_preferences(&self) -> Result<serde_json::Value> {
        api::preferences::app_preferences(&self.http, &self.endpoints).await
    }

    /// Escape hatch: an authenticated request to an arbitrary URL with the
    /// usual expiry guard and single 401 retry.
    pub async fn authenticated_request(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        self.http.request(method, url, query, body).await
    }

    /// Consume the device-status event stream until `cancel` fires.
    ///
    /// `handler` receives each `DEVICE_STATUS` event; reconnects and
    /// re-authentication are handled internally. Returns `Ok(())` on
    /// cancellation.
    pub async fn stream_device_status<F>(
        &self,
        handler: F,
        cancel: CancellationToken,
    ) -> Result<()>
    where
        F: FnMut(StreamEvent) + Send,
    {
        let transport = HttpStreamTransport::new(self.endpoints.stream_url());
        StreamClient::new(Arc::clone(&self.auth), transport)
            .run(handler, cancel)
            .await
    }
}

/// Builder for [`EmporiaClient`].
#[derive(Debug, Default)]
pub struct EmporiaClientBuilder {
    username: Option<String>,
    password: Option<String>,
    client_id: Option<String>,
    user_pool_id: Option<String>,
    region: Option<String>,
    api_host: Option<String>,
    c_api_host: Option<String>,
    cognito_url: Option<String>,
    reqwest_client: Option<reqwest::Client>,
}

impl EmporiaClientBuilder {
    /// Account username (email). Required.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Account password. Required.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Cognito app client id. Required.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Cognito user pool id (`{region}_{name}`). Required.
    pub fn user_pool_id(mut self, user_pool_id: impl Into<String>) -> Self {
        self.user_pool_id = Some(user_pool_id.into());
        self
    }

    /// AWS region. Defaults to the region prefix of the user pool id.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Override the legacy api host (testing).
    pub fn api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = Some(host.into());
        self
    }

    /// Override the c-api host (testing).
    pub fn c_api_host(mut self, host: impl Into<String>) -> Self {
        self.c_api_host = Some(host.into());
        self
    }

    /// Override the Cognito endpoint URL (testing).
    pub fn cognito_url(mut self, url: impl Into<String>) -> Self {
        self.cognito_url = Some(url.into());
        self
    }

    /// Use a custom reqwest client for API and auth calls.
    pub fn reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.reqwest_client = Some(client);
        self
    }

    pub fn build(self) -> Result<EmporiaClient> {
        let username = self.username.ok_or_else(|| missing("username"))?;
        let password = self.password.ok_or_else(|| missing("password"))?;
        let client_id = self.client_id.ok_or_else(|| missing("client_id"))?;
        let user_pool_id = self.user_pool_id.ok_or_else(|| missing("user_pool_id"))?;

        let region = match self.region {
            Some(region) => region,
            // Pool ids are "{region}_{name}".
            None => user_pool_id
                .split('_')
                .next()
                .filter(|r| !r.is_empty())
                .ok_or_else(|| {
                    Error::Config(format!("Cannot derive region from pool id '{}'", user_pool_id))
                })?
                .to_string(),
        };

        let mut auth_config =
            AuthConfig::new(username, password, client_id, user_pool_id, &region)?;
        if let Some(url) = self.cognito_url {
            auth_config.cognito_url = url;
        }

        let mut auth = EmporiaAuthManager::new(auth_config);
        if let Some(client) = self.reqwest_client.clone() {
            auth = auth.with_client(client);
        }
        let auth = Arc::new(auth);

        let http = match self.reqwest_client {
            Some(client) => EmporiaHttpClient::with_client(client, Arc::clone(&auth)),
            None => EmporiaHttpClient::new(Arc::clone(&auth)),
        };

        let mut endpoints = Endpoints::default();
        if let Some(host) = self.api_host {
            endpoints.api = host;
        }
        if let Some(host) = self.c_api_host {
            endpoints.c_api = host;
        }

        Ok(EmporiaClient {
            auth,
            http: Arc::new(http),
            endpoints: Arc::new(endpoints),
        })
    }
}

fn missing(field: &str) -> Error {
    Error::MissingCredential(field.to_string())
}
