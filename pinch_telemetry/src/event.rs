//! The wire record and its framing.
//!
//! Records travel as newline-delimited JSON: one UTF-8 object per line, no
//! length prefix.  `serde_json` never emits a raw newline inside a document,
//! so a line reader on the far end recovers each record.

use serde::{Deserialize, Serialize};

use pinch_gesture::{Finger, HandSide, PinchResult};

use crate::error::TelemetryError;

/// Frame terminator.
pub const DELIMITER: u8 = b'\n';

/// One qualifying pinch, as sent to the remote consumer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinchEvent {
    pub hand:        HandSide,
    pub finger:      Finger,
    pub is_pinching: bool,
    pub distance:    f32,
    pub confidence:  f32,
}

impl PinchEvent {
    pub fn new(hand: HandSide, finger: Finger, result: &PinchResult) -> Self {
        PinchEvent {
            hand,
            finger,
            is_pinching: result.is_pinching,
            distance:    result.distance,
            confidence:  result.confidence,
        }
    }

    /// Serialized record followed by [`DELIMITER`].
    pub fn to_frame(&self) -> Result<Vec<u8>, TelemetryError> {
        let mut buf = serde_json::to_vec(self)?;
        buf.push(DELIMITER);
        Ok(buf)
    }
}

/// Split a received byte stream into records, ignoring blank lines.
///
/// A trailing partial line (no terminator yet) is left out.
pub fn decode_frames(bytes: &[u8]) -> Result<Vec<PinchEvent>, TelemetryError> {
    let complete = match bytes.iter().rposition(|&b| b == DELIMITER) {
        Some(end) => &bytes[..end],
        None      => return Ok(Vec::new()),
    };
    complete
        .split(|&b| b == DELIMITER)
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .map(|line| serde_json::from_slice(line).map_err(TelemetryError::from))
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
