//! Line framing and frame decoding for the device event stream.
//!
//! The stream delivers newline-terminated lines; recognized lines carry the
//! `data:` field prefix followed by a JSON payload with an `event_type`
//! discriminator. Bytes arrive on arbitrary chunk boundaries, so complete
//! lines are split off incrementally and partial lines stay buffered.

use tracing::warn;

use crate::models::stream::StreamEvent;

/// Accumulates raw transport bytes until full lines are available.
///
/// Owned by one connection attempt; discarded and recreated on reconnect.
/// Buffers bytes, not text: a multi-byte UTF-8 character split across a
/// chunk boundary must stay intact until its line completes.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain all complete, non-empty lines.
    pub fn extend(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim();
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        }
        lines
    }

    /// The incomplete trailing line, if any.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }
}

/// Decode one complete line into an event.
///
/// Lines without the `data:` prefix are ignored. Decode failures are logged
/// and skipped; they never terminate the connection.
pub fn decode_frame(line: &str) -> Option<StreamEvent> {
    let payload = line.strip_prefix("data:")?.trim();

    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, "Failed to parse stream frame, skipping line");
            None
        }
    }
}
