//! Event stream types.

use serde::Deserialize;
use serde_json::Value;

use crate::config::DEVICE_STATUS_EVENT;
use crate::models::device::DeviceStatusDetail;

/// One decoded frame from the device event stream.
///
/// Handed to the caller-supplied handler immediately after decoding; not
/// buffered beyond the frame boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamEvent {
    /// Discriminator tag, e.g. `DEVICE_STATUS`.
    pub event_type: String,
    /// Structured payload. Shape depends on the event type.
    #[serde(default)]
    pub data: Value,
}

impl StreamEvent {
    /// Whether this is the one event type the handler contract acts upon.
    #[must_use]
    pub fn is_device_status(&self) -> bool {
        self.event_type == DEVICE_STATUS_EVENT
    }

    /// Decode the payload as detailed device status.
    pub fn device_status(&self) -> crate::error::Result<DeviceStatusDetail> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| crate::error::Error::Decode(format!("DEVICE_STATUS payload: {}", e)))
    }
}
