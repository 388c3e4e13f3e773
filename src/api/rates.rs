//! Electricity rate (location properties) reads and updates.

use tracing::{debug, info, warn};

use crate::config::Endpoints;
use crate::error::{Error, Result};
use crate::models::device::LocationProperties;
use crate::transport::http::EmporiaHttpClient;

use super::devices;

/// Location properties of every top-level device that carries them.
pub async fn location_properties(
    http: &EmporiaHttpClient,
    endpoints: &Endpoints,
) -> Result<Vec<LocationProperties>> {
    let list = devices::list(http, endpoints).await?;
    Ok(list
        .devices
        .into_iter()
        .filter_map(|d| d.location_properties)
        .collect())
}

/// Set `usageCentPerKwHour` on every device to `new_rate`.
///
/// Devices already at the requested rate are skipped. Each remaining device
/// gets its own PATCH carrying the full properties object with only the
/// rate changed; a failure on one device is logged and does not stop the
/// others. Returns how many devices were actually updated.
pub async fn set_usage_rate(
    http: &EmporiaHttpClient,
    endpoints: &Endpoints,
    new_rate: f64,
) -> Result<usize> {
    let properties = location_properties(http, endpoints).await?;
    if properties.is_empty() {
        warn!("No devices with location properties to update");
        return Ok(0);
    }

    let mut updated = 0;
    for mut props in properties {
        if props.usage_cent_per_kw_hour == Some(new_rate) {
            debug!(device_gid = props.device_gid, "Rate already current, skipping");
            continue;
        }

        let device_gid = props.device_gid;
        props.usage_cent_per_kw_hour = Some(new_rate);
        let body = serde_json::to_value(&props)
            .map_err(|e| Error::Decode(format!("location properties body: {}", e)))?;

        let url = endpoints.location_properties_url(device_gid);
        match http
            .patch_json::<serde_json::Value>(&url, &body)
            .await
        {
            Ok(_) => {
                info!(device_gid, new_rate, "Updated usage rate");
                updated += 1;
            }
            Err(e) => {
                warn!(device_gid, error = %e, "Failed to update usage rate");
            }
        }
    }

    Ok(updated)
}
