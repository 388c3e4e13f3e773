//! App preferences retrieval and decoding.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use tracing::warn;

use crate::config::Endpoints;
use crate::error::Result;
use crate::transport::http::EmporiaHttpClient;

/// Fetch the account's app preferences.
///
/// The endpoint is inconsistent about its encoding, so all observed shapes
/// are handled: a `{"preferences": "<base64 JSON>"}` wrapper, a bare
/// base64-encoded JSON string, or plain JSON.
pub async fn app_preferences(
    http: &EmporiaHttpClient,
    endpoints: &Endpoints,
) -> Result<Value> {
    let raw: Value = http
        .get_json(&endpoints.app_preferences_url(), &[])
        .await?;
    Ok(decode_preferences(raw))
}

fn decode_preferences(raw: Value) -> Value {
    match &raw {
        Value::Object(map) => {
            if let Some(Value::String(encoded)) = map.get("preferences") {
                if !encoded.is_empty() {
                    if let Some(decoded) = decode_base64_json(encoded) {
                        return decoded;
                    }
                    warn!("Failed to decode preferences field, returning raw response");
                }
            }
            raw
        }
        Value::String(encoded) => match decode_base64_json(encoded) {
            Some(decoded) => decoded,
            None => {
                warn!("Failed to decode preferences string, returning raw response");
                raw
            }
        },
        _ => raw,
    }
}

fn decode_base64_json(encoded: &str) -> Option<Value> {
    let bytes = BASE64.decode(encoded.trim()).ok()?;
    serde_json::from_slice(&bytes).ok()
}
