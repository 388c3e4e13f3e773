//! EV charger queries and control.

use tracing::{debug, info};

use crate::config::Endpoints;
use crate::error::{Error, Result};
use crate::models::device::EvCharger;
use crate::transport::http::EmporiaHttpClient;

use super::devices;

/// List the EV chargers currently reported on the account.
pub async fn list(http: &EmporiaHttpClient, endpoints: &Endpoints) -> Result<Vec<EvCharger>> {
    let status = devices::status(http, endpoints).await?;
    Ok(status.ev_chargers)
}

/// Fetch one EV charger by its device GID.
pub async fn get(
    http: &EmporiaHttpClient,
    endpoints: &Endpoints,
    device_gid: u64,
) -> Result<EvCharger> {
    list(http, endpoints)
        .await?
        .into_iter()
        .find(|c| c.device_gid == device_gid)
        .ok_or_else(|| Error::Api {
            status: 404,
            message: format!("No EV charger with deviceGid {}", device_gid),
        })
}

/// Turn a charger on or off.
///
/// Reads the current charger object first and skips the write entirely if
/// the state already matches. Otherwise the whole object is sent back with
/// only `chargerOn` flipped, preserving every other field the server gave
/// us. Returns the charger state after the call.
pub async fn set_on(
    http: &EmporiaHttpClient,
    endpoints: &Endpoints,
    device_gid: u64,
    on: bool,
) -> Result<EvCharger> {
    let mut charger = get(http, endpoints, device_gid).await?;

    if charger.charger_on == on {
        debug!(device_gid, on, "Charger already in requested state");
        return Ok(charger);
    }

    charger.charger_on = on;
    let body = serde_json::to_value(&charger)
        .map_err(|e| Error::Decode(format!("charger body: {}", e)))?;

    let updated: EvCharger = http.put_json(&endpoints.charger_url(), &body).await?;
    info!(device_gid, on, "Charger state updated");
    Ok(updated)
}
