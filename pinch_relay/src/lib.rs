//! # pinch_relay
//!
//! Reads tracked hands frame by frame, detects thumb-to-finger pinches and
//! relays confident pinches to a TCP consumer as newline-delimited JSON.
//!
//! ## Per-frame pipeline
//!
//! | Step | Component | Result |
//! |---|---|---|
//! | 1 | [`HandSource`](source::HandSource) | frame + hand observations, or end of input |
//! | 2 | [`PinchDetector`](pinch_gesture::PinchDetector), one per hand side | per-finger [`PinchResult`](pinch_gesture::PinchResult) |
//! | 3 | [`TelemetryClient`](pinch_telemetry::TelemetryClient) | pinches with confidence above `min_confidence` queued for send |
//! | 4 | [`Renderer`](render::Renderer) | frame drawn; quit requested? |
//!
//! ## Hand sources
//!
//! * JSON lines replay ([`ReplaySource`](source::ReplaySource)), one frame per line.
//! * Scripted hand ([`SyntheticSource`](source::SyntheticSource)) that pinches
//!   on a fixed period.
//! * `leap`: a LeapMotion controller via LeapC.
//!
//! ## Feature flags
//!
//! * (default): headless; frames are logged at debug level.
//! * `viewer`: landmark window (minifb), `Q` or `Escape` quits.
//! * `leap`: hardware hand tracking.

pub mod config;
pub mod source;
pub mod render;
pub mod orchestrator;

#[cfg(feature = "viewer")]
pub mod viewer;

#[cfg(feature = "leap")]
pub mod leap;

pub use config::{ConfigError, RelayConfig};
pub use orchestrator::{Orchestrator, RunSummary, StopReason};
pub use render::{HandPinches, HeadlessRenderer, Renderer};
pub use source::{Frame, HandSource, IterSource, ReplaySource, SourceError, SyntheticSource, TrackedFrame};
