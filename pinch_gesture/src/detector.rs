//! The per-finger pinch classifier.
//!
//! Each call to [`PinchDetector::detect_pinch`] measures the thumb-tip to
//! finger-tip distance for the four tracked fingers, pushes it into that
//! finger's [`HistoryBuffer`], and, once the buffer is full, reports the
//! current decision together with a stability score:
//!
//! ```text
//! confidence = 1 / (1 + std(window))
//! ```
//!
//! The score rewards a steady gesture, not a physically correct one.  Fingers
//! still in warm-up are simply absent from the result map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::hand::{Finger, HandObservation, THUMB_TIP};
use crate::history::HistoryBuffer;

/// Confidence above which a pinch is considered stable enough to act on.
pub const STABLE_CONFIDENCE: f32 = 0.8;

// ════════════════════════════════════════════════════════════════════════════
// DetectorConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("pinch threshold must be a finite value >= 0, got {0}")]
    InvalidThreshold(f32),

    #[error("confidence window must hold at least one sample")]
    EmptyWindow,
}

/// Tuning for [`PinchDetector`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Distances strictly below this count as a pinch.
    pub threshold: f32,
    /// Number of samples per finger used for the confidence estimate.
    pub window: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig { threshold: 0.1, window: 30 }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if self.window == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Results
// ════════════════════════════════════════════════════════════════════════════

/// Decision for one finger on one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PinchResult {
    pub distance:      f32,
    pub is_pinching:   bool,
    /// 1 / (1 + std_distance), in (0, 1].
    pub confidence:    f32,
    pub mean_distance: f32,
    pub std_distance:  f32,
}

impl PinchResult {
    /// A pinch that is both closed and held steadily.
    pub fn is_stable_pinch(&self) -> bool {
        self.is_pinching && self.confidence > STABLE_CONFIDENCE
    }
}

/// Results keyed by finger, iterated index → pinky.
pub type PinchResults = BTreeMap<Finger, PinchResult>;

/// Suggested threshold correction derived from a stable pinch.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CalibrationRecord {
    /// `mean_distance / threshold`; below 1.0 means the user pinches tighter
    /// than the configured threshold.
    pub correction_factor: f32,
    pub confidence:        f32,
}

// ════════════════════════════════════════════════════════════════════════════
// PinchDetector
// ════════════════════════════════════════════════════════════════════════════

/// Stateful pinch classifier for one hand.
///
/// Histories survive frames in which the hand is missing, so a short
/// occlusion does not restart warm-up.  Feed each physical hand its own
/// detector; samples from different hands must not share histories.
#[derive(Clone, Debug)]
pub struct PinchDetector {
    config:    DetectorConfig,
    histories: [HistoryBuffer; Finger::COUNT],
}

impl PinchDetector {
    pub fn new(config: DetectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(PinchDetector {
            config,
            histories: std::array::from_fn(|_| HistoryBuffer::new(config.window)),
        })
    }

    pub fn threshold(&self) -> f32   { self.config.threshold }
    pub fn window(&self)    -> usize { self.config.window }
    pub fn config(&self)    -> &DetectorConfig { &self.config }

    pub fn history(&self, finger: Finger) -> &HistoryBuffer {
        &self.histories[finger.slot()]
    }

    /// Forget all samples; every finger re-enters warm-up.
    pub fn reset(&mut self) {
        for h in &mut self.histories {
            h.clear();
        }
    }

    /// Thumb-tip to `tip_index` distance, or `None` when there is no data.
    pub fn distance(&self, hand: Option<&HandObservation>, tip_index: usize) -> Option<f32> {
        let hand  = hand?;
        let thumb = hand.landmark(THUMB_TIP)?;
        let tip   = hand.landmark(tip_index)?;
        Some(thumb.distance(tip))
    }

    /// Classify all four fingers for this frame.
    ///
    /// Returns `None` only for a missing hand.  Otherwise the map holds the
    /// fingers whose history has reached the configured window, which may be
    /// none of them.
    pub fn detect_pinch(&mut self, hand: Option<&HandObservation>) -> Option<PinchResults> {
        let hand = hand?;
        let mut results = PinchResults::new();

        for finger in Finger::ALL {
            let Some(distance) = self.distance(Some(hand), finger.tip_index()) else {
                continue;
            };
            let history = &mut self.histories[finger.slot()];
            history.push(distance);

            if !history.is_full() {
                continue;
            }
            let (Some(mean_distance), Some(std_distance)) = (history.mean(), history.std_dev()) else {
                continue;
            };
            let result = PinchResult {
                distance,
                is_pinching: distance < self.config.threshold,
                confidence: 1.0 / (1.0 + std_distance),
                mean_distance,
                std_distance,
            };
            trace!(
                finger = finger.name(),
                distance,
                confidence = result.confidence,
                pinching = result.is_pinching,
                "pinch sample"
            );
            results.insert(finger, result);
        }

        Some(results)
    }

    /// Correction factors for every finger holding a stable pinch.
    pub fn calibration_data(
        &self,
        results: &PinchResults,
    ) -> Option<BTreeMap<Finger, CalibrationRecord>> {
        let records: BTreeMap<Finger, CalibrationRecord> = results.iter()
            .filter(|(_, r)| r.is_stable_pinch())
            .map(|(&finger, r)| {
                (finger, CalibrationRecord {
                    correction_factor: r.mean_distance / self.config.threshold,
                    confidence:        r.confidence,
                })
            })
            .collect();

        if records.is_empty() { None } else { Some(records) }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
