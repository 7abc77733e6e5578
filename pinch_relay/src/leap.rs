//! LeapMotion hand source (feature = "leap").
//!
//! Converts LeapC tracking frames into 21-point hand observations.  Leap
//! reports joints in millimetres relative to the device; landmarks are made
//! palm-relative and scaled by [`MM_PER_UNIT`] so that a closed pinch lands
//! well under the default 0.1 threshold.

use leaprs::*;
use tracing::{debug, trace, warn};

use pinch_gesture::{HandObservation, Landmark, LANDMARK_COUNT};

use crate::source::{Frame, HandSource, SourceError, TrackedFrame};

/// Millimetres per normalized landmark unit.
pub const MM_PER_UNIT: f32 = 250.0;

/// Poll timeout per LeapC message, in milliseconds.
const POLL_MS: u32 = 100;

/// Consecutive failed polls (about 5 s) before the silence is worth a warning.
const SILENT_POLLS: u32 = 50;

/// Counts failed polls in a row.  An idle poll times out routinely, so only
/// a long silence is reported.
#[derive(Debug, Default)]
struct PollFailures {
    consecutive: u32,
}

impl PollFailures {
    /// Record a failure; true exactly when the run reaches [`SILENT_POLLS`].
    fn failed(&mut self) -> bool {
        self.consecutive = self.consecutive.saturating_add(1);
        self.consecutive == SILENT_POLLS
    }

    fn succeeded(&mut self) {
        self.consecutive = 0;
    }
}

pub struct LeapHandSource {
    connection: Connection,
    next_index: u64,
    failures:   PollFailures,
}

impl LeapHandSource {
    pub fn open() -> Result<Self, SourceError> {
        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| SourceError::Device(format!("create LeapC connection: {:?}", e)))?;
        connection.open()
            .map_err(|e| SourceError::Device(format!("open LeapMotion device: {:?}", e)))?;
        debug!("LeapC connection open");
        Ok(LeapHandSource { connection, next_index: 0, failures: PollFailures::default() })
    }
}

impl HandSource for LeapHandSource {
    fn next_frame(&mut self) -> Result<Option<TrackedFrame>, SourceError> {
        loop {
            let msg = match self.connection.poll(POLL_MS) {
                Ok(m)  => m,
                Err(e) => {
                    if self.failures.failed() {
                        warn!(error = ?e, polls = SILENT_POLLS, "no LeapC messages; is the device connected?");
                    } else {
                        trace!(error = ?e, "LeapC poll failed");
                    }
                    continue;
                }
            };
            self.failures.succeeded();

            if let Event::Tracking(frame) = msg.event() {
                let hands = frame.hands().map(|h| observation(&h)).collect();
                let index = self.next_index;
                self.next_index += 1;
                return Ok(Some(TrackedFrame {
                    frame: Frame { index, timestamp_ms: None },
                    hands,
                }));
            }
        }
    }
}

/// Map Leap bones onto the wrist / CMC-MCP-PIP-DIP-TIP landmark layout.
fn observation(hand: &Hand) -> HandObservation {
    let palm = hand.palm().position();
    let to_landmark = |x: f32, y: f32, z: f32| {
        // Leap y points up; image y points down.
        Landmark::new(
            (x - palm.x) / MM_PER_UNIT + 0.5,
            (palm.y - y) / MM_PER_UNIT + 0.5,
            (z - palm.z) / MM_PER_UNIT,
        )
    };

    let digits: Vec<_> = hand.digits().collect();
    let mut landmarks = Vec::with_capacity(LANDMARK_COUNT);

    let wrist = match digits.get(2) {
        Some(middle) => {
            let j = middle.metacarpal().prev_joint();
            to_landmark(j.x, j.y, j.z)
        }
        None => to_landmark(palm.x, palm.y, palm.z),
    };
    landmarks.push(wrist);

    for digit in &digits {
        for j in [
            digit.proximal().prev_joint(),
            digit.intermediate().prev_joint(),
            digit.distal().prev_joint(),
            digit.distal().next_joint(),
        ] {
            landmarks.push(to_landmark(j.x, j.y, j.z));
        }
    }

    let handedness = if hand.hand_type() == HandType::Left { 0.0 } else { 1.0 };
    if landmarks.len() == LANDMARK_COUNT {
        HandObservation::new(handedness, landmarks)
    } else {
        HandObservation::without_landmarks(handedness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_polls_warn_once_per_silent_run() {
        let mut f = PollFailures::default();
        let warnings = (0..SILENT_POLLS * 3).filter(|_| f.failed()).count();
        assert_eq!(warnings, 1);

        f.succeeded();
        assert!((1..SILENT_POLLS).all(|_| !f.failed()));
        assert!(f.failed());
    }
}
