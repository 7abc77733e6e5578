//! The per-frame loop tying a hand source, the pinch detectors, the
//! telemetry client and a renderer together.
//!
//! `Orchestrator` owns all four.  `run` consumes it, so the telemetry actor is
//! shut down and the source and renderer are dropped on every exit path:
//! end of input, user quit or a source error.

use std::collections::BTreeMap;

use tracing::{debug, error, info};

use pinch_gesture::{HandObservation, HandSide, PinchDetector};
use pinch_telemetry::{PinchEvent, TelemetryClient, TelemetryStatus};

use crate::config::{ConfigError, RelayConfig};
use crate::render::{HandPinches, Renderer};
use crate::source::HandSource;

// ════════════════════════════════════════════════════════════════════════════
// RunSummary
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndOfInput,
    Quit,
    SourceError,
}

/// What one `run` did, logged at the end and returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub frames:      u64,
    pub hands_seen:  u64,
    /// Pinch records handed to the telemetry client.
    pub events_sent: u64,
    pub stop:        StopReason,
}

// ════════════════════════════════════════════════════════════════════════════
// Orchestrator
// ════════════════════════════════════════════════════════════════════════════

pub struct Orchestrator<S, R> {
    config:    RelayConfig,
    source:    S,
    renderer:  R,
    telemetry: TelemetryClient,
    // One detector per hand side so two hands never share a history.
    detectors: BTreeMap<HandSide, PinchDetector>,

    // ── counters ─────────────────────────────────────────────────────────
    frames:      u64,
    hands_seen:  u64,
    events_sent: u64,
}

impl<S: HandSource, R: Renderer> Orchestrator<S, R> {
    pub fn new(
        config:    RelayConfig,
        source:    S,
        renderer:  R,
        telemetry: TelemetryClient,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut detectors = BTreeMap::new();
        for side in [HandSide::Left, HandSide::Right] {
            detectors.insert(side, PinchDetector::new(config.detector)?);
        }
        Ok(Orchestrator {
            config,
            source,
            renderer,
            telemetry,
            detectors,
            frames:      0,
            hands_seen:  0,
            events_sent: 0,
        })
    }

    pub fn telemetry(&self) -> &TelemetryClient {
        &self.telemetry
    }

    /// Run detection on one frame's hands and queue qualifying pinches.
    ///
    /// Returns the per-hand results for the renderer.  Empty when pinch
    /// detection is disabled or no hands are present.
    pub fn process_hands(&mut self, hands: &[HandObservation]) -> Vec<HandPinches> {
        self.hands_seen += hands.len() as u64;
        if !self.config.pinch_enabled || hands.is_empty() {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(hands.len());
        let mut handled: Vec<HandSide> = Vec::with_capacity(2);
        for hand in hands {
            let side = hand.side();
            if handled.contains(&side) {
                debug!(hand = side.label(), "second hand with the same side in one frame; skipped");
                continue;
            }
            handled.push(side);
            let Some(detector) = self.detectors.get_mut(&side) else { continue };
            let Some(results) = detector.detect_pinch(Some(hand)) else { continue };

            for (&finger, r) in &results {
                if r.is_pinching && r.confidence > self.config.min_confidence {
                    if self.telemetry.send(PinchEvent::new(side, finger, r)) {
                        self.events_sent += 1;
                    }
                }
            }

            if let Some(cal) = detector.calibration_data(&results) {
                for (finger, rec) in &cal {
                    debug!(
                        hand = side.label(),
                        finger = finger.name(),
                        correction = rec.correction_factor,
                        confidence = rec.confidence,
                        "calibration suggestion"
                    );
                }
            }

            out.push(HandPinches { side, results });
        }
        out
    }

    /// Drive the loop until input ends, the renderer asks to quit, or the
    /// source fails.
    pub fn run(mut self) -> RunSummary {
        info!(
            pinch = self.config.pinch_enabled,
            threshold = self.config.detector.threshold,
            window = self.config.detector.window,
            "frame loop started"
        );

        let stop = loop {
            let tracked = match self.source.next_frame() {
                Ok(Some(t)) => t,
                Ok(None)    => break StopReason::EndOfInput,
                Err(e) => {
                    error!(error = %e, "hand source failed");
                    break StopReason::SourceError;
                }
            };
            self.frames += 1;

            let pinches = self.process_hands(&tracked.hands);
            self.renderer.draw(&tracked.frame, &tracked.hands, &pinches);
            self.log_status();

            if self.renderer.poll_quit() {
                break StopReason::Quit;
            }
        };

        self.telemetry.shutdown();
        self.log_status();

        let summary = RunSummary {
            frames:      self.frames,
            hands_seen:  self.hands_seen,
            events_sent: self.events_sent,
            stop,
        };
        info!(
            frames = summary.frames,
            hands = summary.hands_seen,
            events = summary.events_sent,
            stop = ?summary.stop,
            "frame loop finished"
        );
        summary
    }

    fn log_status(&self) {
        for status in self.telemetry.drain_status() {
            match status {
                TelemetryStatus::Sent { .. } | TelemetryStatus::Dropped => {}
                other => debug!(status = ?other, "telemetry"),
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::{Duration, Instant};

    use pinch_gesture::{Finger, Landmark, LANDMARK_COUNT, THUMB_TIP};
    use pinch_telemetry::{
        decode_frames, ConnectionState, Connector, Link, TelemetryConfig, TelemetryError,
    };

    use crate::source::{Frame, IterSource, SyntheticSource};

    // ── helpers ───────────────────────────────────────────────────────────

    #[derive(Clone, Default)]
    struct Recorder {
        written: Arc<Mutex<Vec<u8>>>,
    }

    struct RecorderLink(Arc<Mutex<Vec<u8>>>);

    impl Write for RecorderLink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    impl Connector for Recorder {
        fn connect(&mut self, _addr: &str, _timeout: Duration) -> Result<Link, TelemetryError> {
            Ok(Box::new(RecorderLink(Arc::clone(&self.written))))
        }
    }

    impl Recorder {
        fn events(&self) -> Vec<PinchEvent> {
            decode_frames(&self.written.lock().unwrap()).unwrap()
        }
    }

    fn connected_client(rec: &Recorder) -> TelemetryClient {
        let client = TelemetryClient::new(TelemetryConfig::default(), Box::new(rec.clone()));
        client.connect();
        let deadline = Instant::now() + Duration::from_secs(5);
        while client.state() != ConnectionState::Connected {
            assert!(Instant::now() < deadline, "recorder never connected");
            thread::sleep(Duration::from_millis(5));
        }
        client
    }

    /// Renderer that records what it saw and quits after `quit_after` frames.
    #[derive(Default)]
    struct Script {
        drawn:      Arc<Mutex<Vec<(u64, usize, usize)>>>,
        quit_after: Option<u64>,
    }

    impl Renderer for Script {
        fn draw(&mut self, frame: &Frame, hands: &[HandObservation], pinches: &[HandPinches]) {
            self.drawn.lock().unwrap().push((frame.index, hands.len(), pinches.len()));
        }
        fn poll_quit(&mut self) -> bool {
            let n = self.drawn.lock().unwrap().len() as u64;
            self.quit_after.is_some_and(|q| n >= q)
        }
    }

    /// Thumb tip at the origin; each finger tip `d[i]` away along x.
    fn hand(handedness: f32, d: [f32; 4]) -> HandObservation {
        let mut lms = vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        lms[THUMB_TIP] = Landmark::new(0.0, 0.0, 0.0);
        for (finger, dist) in Finger::ALL.iter().zip(d) {
            lms[finger.tip_index()] = Landmark::new(dist, 0.0, 0.0);
        }
        HandObservation::new(handedness, lms)
    }

    fn config(window: usize) -> RelayConfig {
        let mut cfg = RelayConfig::default();
        cfg.detector.window = window;
        cfg
    }

    // ── tests ─────────────────────────────────────────────────────────────

    #[test]
    fn steady_index_pinch_is_sent_once_window_fills() {
        let rec = Recorder::default();
        let frames = vec![vec![hand(0.9, [0.05, 0.5, 0.5, 0.5])]; 5];
        let orch = Orchestrator::new(
            config(3), IterSource::new(frames), Script::default(), connected_client(&rec),
        ).unwrap();

        let summary = orch.run();
        assert_eq!(summary.frames, 5);
        assert_eq!(summary.hands_seen, 5);
        assert_eq!(summary.stop, StopReason::EndOfInput);
        // Frames 3..5 have a full window: three index pinches.
        assert_eq!(summary.events_sent, 3);

        let events = rec.events();
        assert_eq!(events.len(), 3);
        for ev in &events {
            assert_eq!(ev.hand, HandSide::Right);
            assert_eq!(ev.finger, Finger::Index);
            assert!(ev.is_pinching);
            assert!((ev.distance - 0.05).abs() < 1e-6);
            assert!((ev.confidence - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn low_confidence_pinches_are_not_sent() {
        let rec = Recorder::default();
        let mut cfg = config(2);
        cfg.min_confidence = 0.99;
        // Alternating index distances: std 0.02 gives confidence ~0.980.
        let frames = vec![
            vec![hand(0.9, [0.05, 0.5, 0.5, 0.5])],
            vec![hand(0.9, [0.09, 0.5, 0.5, 0.5])],
            vec![hand(0.9, [0.05, 0.5, 0.5, 0.5])],
        ];
        let orch = Orchestrator::new(
            cfg, IterSource::new(frames), Script::default(), connected_client(&rec),
        ).unwrap();

        let summary = orch.run();
        assert_eq!(summary.events_sent, 0);
        assert!(rec.events().is_empty());
    }

    #[test]
    fn hands_use_separate_detectors() {
        let rec = Recorder::default();
        let both = vec![
            hand(0.1, [0.5, 0.05, 0.5, 0.5]),
            hand(0.9, [0.5, 0.5, 0.5, 0.05]),
        ];
        let orch = Orchestrator::new(
            config(2), IterSource::new(vec![both.clone(), both]),
            Script::default(), connected_client(&rec),
        ).unwrap();
        orch.run();

        let mut got: Vec<(HandSide, Finger)> = rec.events().iter().map(|e| (e.hand, e.finger)).collect();
        got.sort();
        assert_eq!(got, vec![(HandSide::Left, Finger::Middle), (HandSide::Right, Finger::Pinky)]);
    }

    #[test]
    fn duplicate_side_in_one_frame_feeds_the_detector_once() {
        let rec = Recorder::default();
        let mut orch = Orchestrator::new(
            config(3), IterSource::new(Vec::<Vec<HandObservation>>::new()),
            Script::default(), connected_client(&rec),
        ).unwrap();

        let twins = [hand(0.9, [0.05, 0.5, 0.5, 0.5]), hand(0.8, [0.5, 0.05, 0.5, 0.5])];
        let out = orch.process_hands(&twins);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].side, HandSide::Right);
        assert_eq!(orch.hands_seen, 2);

        let right = &orch.detectors[&HandSide::Right];
        assert_eq!(right.history(Finger::Index).len(), 1);
        let first = right.history(Finger::Index).iter().next().unwrap();
        assert!((first - 0.05).abs() < 1e-6);
        assert_eq!(right.history(Finger::Middle).len(), 1);
    }

    #[test]
    fn disabled_pinch_mode_still_draws() {
        let rec = Recorder::default();
        let mut cfg = config(1);
        cfg.pinch_enabled = false;
        let renderer = Script::default();
        let drawn = Arc::clone(&renderer.drawn);
        let orch = Orchestrator::new(
            cfg, IterSource::new(vec![vec![hand(0.9, [0.01; 4])]; 3]),
            renderer, connected_client(&rec),
        ).unwrap();

        let summary = orch.run();
        assert_eq!(summary.events_sent, 0);
        assert_eq!(*drawn.lock().unwrap(), vec![(0, 1, 0), (1, 1, 0), (2, 1, 0)]);
    }

    #[test]
    fn empty_frames_skip_detection() {
        let rec = Recorder::default();
        let mut orch = Orchestrator::new(
            config(1), IterSource::new(Vec::<Vec<HandObservation>>::new()),
            Script::default(), connected_client(&rec),
        ).unwrap();
        assert!(orch.process_hands(&[]).is_empty());
        assert_eq!(orch.hands_seen, 0);
    }

    #[test]
    fn quit_stops_an_endless_source() {
        let rec = Recorder::default();
        let renderer = Script { quit_after: Some(4), ..Script::default() };
        let orch = Orchestrator::new(
            config(2), SyntheticSource::new(0.9, 10), renderer, connected_client(&rec),
        ).unwrap();

        let summary = orch.run();
        assert_eq!(summary.stop, StopReason::Quit);
        assert_eq!(summary.frames, 4);
        // Frames 1..3 pinch with a full window of two identical samples.
        assert_eq!(summary.events_sent, 3);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let rec = Recorder::default();
        let result = Orchestrator::new(
            config(0), IterSource::new(Vec::<Vec<HandObservation>>::new()),
            Script::default(), connected_client(&rec),
        );
        assert!(matches!(result, Err(ConfigError::Detector(_))));
    }
}
