//! Configuration constants and URL builders for the Emporia Vue cloud API.

use std::time::Duration;

/// Default AWS region for the Emporia Cognito user pool.
pub const DEFAULT_REGION: &str = "us-east-2";

/// Legacy API host (devices, chargers, AppAPI).
pub const API_HOST: &str = "https://api.emporiaenergy.com";

/// Newer c-api host (chart usage, detailed status, event stream).
pub const C_API_HOST: &str = "https://c-api.emporiaenergy.com";

/// Cognito Identity Provider host template. `{region}` is replaced at runtime.
pub const COGNITO_HOST_TEMPLATE: &str = "https://cognito-idp.{region}.amazonaws.com";

/// Safety margin subtracted from token lifetime to absorb clock skew and
/// in-flight latency.
pub const EXPIRY_SAFETY_MARGIN: Duration = Duration::from_secs(30);

/// Timeout for ordinary authenticated requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect timeout for HTTP requests.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fixed delay between stream reconnect attempts.
pub const STREAM_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// The single event discriminator acted upon by the stream handler contract.
pub const DEVICE_STATUS_EVENT: &str = "DEVICE_STATUS";

/// Validate that a region string matches the expected AWS region format.
///
/// Valid format: `xx-xxxx-N` (e.g., `us-east-2`, `eu-west-1`).
pub(crate) fn validate_region(region: &str) -> Result<(), crate::error::Error> {
    use std::sync::LazyLock;
    static REGION_RE: LazyLock<regex_lite::Regex> =
        LazyLock::new(|| regex_lite::Regex::new(r"^[a-z]{2}-[a-z]+-\d+$").unwrap());
    if REGION_RE.is_match(region) {
        Ok(())
    } else {
        Err(crate::error::Error::Config(format!(
            "Invalid AWS region format: '{}' (expected pattern like 'us-east-2')",
            region
        )))
    }
}

/// Returns the Cognito Identity Provider URL for the given region.
pub fn cognito_url(region: &str) -> Result<String, crate::error::Error> {
    validate_region(region)?;
    Ok(COGNITO_HOST_TEMPLATE.replace("{region}", region))
}

/// Base URLs for the API hosts, overridable for testing.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Legacy API host.
    pub api: String,
    /// c-api host.
    pub c_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api: API_HOST.to_string(),
            c_api: C_API_HOST.to_string(),
        }
    }
}

impl Endpoints {
    /// `GET` device list (with locationProperties).
    pub fn devices_url(&self) -> String {
        format!("{}/customers/devices", self.api)
    }

    /// `GET` legacy device status (evChargers).
    pub fn devices_status_url(&self) -> String {
        format!("{}/customers/devices/status", self.api)
    }

    /// `PUT` EV charger state.
    pub fn charger_url(&self) -> String {
        format!("{}/devices/evcharger", self.api)
    }

    /// `PATCH` per-device location properties (rates).
    pub fn location_properties_url(&self, device_gid: u64) -> String {
        format!("{}/devices/{}/locationProperties", self.api, device_gid)
    }

    /// `GET` AppAPI dispatch endpoint (peak demand).
    pub fn app_api_url(&self) -> String {
        format!("{}/AppAPI", self.api)
    }

    /// `GET` chart usage (c-api).
    pub fn chart_usage_url(&self) -> String {
        format!("{}/v1/migrated/app-api/chart-usage", self.c_api)
    }

    /// `GET` devices usages (c-api).
    pub fn devices_usages_url(&self) -> String {
        format!("{}/v1/customers/devices/usages", self.c_api)
    }

    /// `GET` app preferences (c-api).
    pub fn app_preferences_url(&self) -> String {
        format!("{}/v1/customers/app-preferences", self.c_api)
    }

    /// `GET` detailed device status (c-api).
    pub fn status_detail_url(&self) -> String {
        format!("{}/v1/customers/devices/status", self.c_api)
    }

    /// `GET` the persistent device-status event stream.
    pub fn stream_url(&self) -> String {
        format!(
            "{}/v1/customers/stream?event_types={}",
            self.c_api, DEVICE_STATUS_EVENT
        )
    }
}
