//! Device listing and status queries.

use crate::config::Endpoints;
use crate::error::Result;
use crate::models::device::{DeviceList, DeviceStatusDetail, DevicesStatus};
use crate::transport::http::EmporiaHttpClient;

/// List all devices on the account, including their location properties.
pub async fn list(http: &EmporiaHttpClient, endpoints: &Endpoints) -> Result<DeviceList> {
    http.get_json(&endpoints.devices_url(), &[]).await
}

/// Legacy status snapshot from the api host (carries `evChargers`).
pub async fn status(http: &EmporiaHttpClient, endpoints: &Endpoints) -> Result<DevicesStatus> {
    http.get_json(&endpoints.devices_status_url(), &[]).await
}

/// Detailed status snapshot from the c-api host, with connection state,
/// EVSEs, batteries, and outlets. Same payload shape as `DEVICE_STATUS`
/// stream events.
pub async fn status_detail(
    http: &EmporiaHttpClient,
    endpoints: &Endpoints,
) -> Result<DeviceStatusDetail> {
    http.get_json(&endpoints.status_detail_url(), &[]).await
}
