//! # pinch_gesture
//!
//! Thumb pinch detection over 21-point hand landmarks, with a rolling
//! stability score per finger.
//!
//! ## Pipeline
//!
//! | Step | Type |
//! |---|---|
//! | One tracked hand per frame | [`HandObservation`] |
//! | Thumb-tip ↔ finger-tip distance, per finger | [`PinchDetector::distance`] |
//! | Rolling window of recent distances | [`HistoryBuffer`] |
//! | Decision + confidence once warmed up | [`PinchResult`] |
//! | Threshold correction for stable pinches | [`CalibrationRecord`] |
//!
//! ## Quick start
//!
//! ```rust
//! use pinch_gesture::{DetectorConfig, Finger, HandObservation, Landmark, PinchDetector};
//!
//! let mut detector = PinchDetector::new(DetectorConfig { threshold: 0.1, window: 3 }).unwrap();
//! let mut landmarks = vec![Landmark::default(); 21];
//! landmarks[8] = Landmark::new(0.05, 0.0, 0.0);   // index tip near the thumb
//! let hand = HandObservation::new(0.9, landmarks);
//!
//! for _ in 0..3 {
//!     detector.detect_pinch(Some(&hand));
//! }
//! let results = detector.detect_pinch(Some(&hand)).unwrap();
//! assert!(results[&Finger::Index].is_pinching);
//! ```

pub mod hand;
pub mod history;
pub mod detector;

pub use hand::{Finger, HandObservation, HandSide, Landmark, LANDMARK_COUNT, THUMB_TIP};
pub use history::HistoryBuffer;
pub use detector::{
    CalibrationRecord, ConfigError, DetectorConfig, PinchDetector, PinchResult, PinchResults,
    STABLE_CONFIDENCE,
};
