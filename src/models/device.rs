//! Device, charger, and usage types.
//!
//! Wire formats of individual business endpoints are deliberately thin:
//! unrecognized fields are preserved in `extra` so objects can be sent back
//! unchanged on PUT/PATCH round-trips.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response from `GET /customers/devices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceList {
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single device entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_gid: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_properties: Option<LocationProperties>,
    /// Nested sub-devices (e.g. expansion modules).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<Device>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-device location properties, carrying the usage rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationProperties {
    pub device_gid: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_cent_per_kw_hour: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// EV charger entry from the legacy status endpoint. Sent back wholesale on
/// `PUT /devices/evcharger` with `chargerOn` toggled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvCharger {
    pub device_gid: u64,
    pub charger_on: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response from the legacy `GET /customers/devices/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicesStatus {
    #[serde(default)]
    pub ev_chargers: Vec<EvCharger>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Detailed status from the c-api endpoint (also the payload shape of
/// `DEVICE_STATUS` stream events). Note: snake_case on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceStatusDetail {
    #[serde(default)]
    pub devices_connected: Vec<Value>,
    #[serde(default)]
    pub evses: Vec<Value>,
    #[serde(default)]
    pub batteries: Vec<Value>,
    #[serde(default)]
    pub outlets: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response from the c-api chart-usage endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_usage_instant: Option<String>,
    #[serde(default)]
    pub usage_list: Vec<Option<f64>>,
}
