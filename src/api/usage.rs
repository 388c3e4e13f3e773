//! Energy usage queries.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::Endpoints;
use crate::error::Result;
use crate::models::device::ChartUsage;
use crate::transport::http::EmporiaHttpClient;

/// Format an instant the way the usage endpoints expect: RFC 3339 with
/// millisecond precision and a literal `Z` suffix.
pub(crate) fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Per-interval usage samples for one device over a time window.
///
/// `channel` is a comma-separated channel list such as `"1,2,3"`; `scale`
/// is an interval code such as `"1S"`; `energy_unit` is one of the server's
/// unit names, e.g. `"KilowattHours"` or `"AmpHours"`.
#[allow(clippy::too_many_arguments)]
pub async fn chart_usage(
    http: &EmporiaHttpClient,
    endpoints: &Endpoints,
    device_gid: u64,
    channel: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    scale: &str,
    energy_unit: &str,
) -> Result<ChartUsage> {
    let query = [
        ("deviceGid", device_gid.to_string()),
        ("channel", channel.to_string()),
        ("start", format_instant(start)),
        ("end", format_instant(end)),
        ("scale", scale.to_string()),
        ("energyUnit", energy_unit.to_string()),
    ];
    http.get_json(&endpoints.chart_usage_url(), &query).await
}

/// The account's peak demand for the current month, via the AppAPI
/// dispatch endpoint.
pub async fn current_month_peak_demand(
    http: &EmporiaHttpClient,
    endpoints: &Endpoints,
    device_gid: u64,
    channel: &str,
    energy_unit: &str,
) -> Result<serde_json::Value> {
    let query = [
        ("apiMethod", "getCurrentMonthPeakDemand".to_string()),
        ("deviceGid", device_gid.to_string()),
        ("channel", channel.to_string()),
        ("energyUnit", energy_unit.to_string()),
    ];
    http.get_json(&endpoints.app_api_url(), &query).await
}

/// Aggregate usage for several devices at one instant.
///
/// `scale` is a period name such as `"MONTH"`; `energy_unit` uses the
/// c-api spellings, e.g. `"DOLLARS"`.
pub async fn devices_usages(
    http: &EmporiaHttpClient,
    endpoints: &Endpoints,
    device_gids: &[u64],
    instant: DateTime<Utc>,
    scale: &str,
    energy_unit: &str,
) -> Result<serde_json::Value> {
    let gids = device_gids
        .iter()
        .map(|g| g.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let query = [
        ("device_gids", gids),
        ("instant", format_instant(instant)),
        ("scale", scale.to_string()),
        ("energy_unit", energy_unit.to_string()),
    ];
    http.get_json(&endpoints.devices_usages_url(), &query).await
}
