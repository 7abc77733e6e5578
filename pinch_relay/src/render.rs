//! Output side of the frame loop: drawing and the quit signal.
//!
//! The orchestrator hands every frame, its hands and their pinch results to
//! a [`Renderer`] and then asks whether the user wants to quit.  The headless
//! renderer only logs; the `viewer` feature adds a window.

use tracing::debug;

use pinch_gesture::{HandObservation, HandSide, PinchResults};

use crate::source::Frame;

/// Pinch results for one hand on one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct HandPinches {
    pub side:    HandSide,
    pub results: PinchResults,
}

pub trait Renderer {
    fn draw(&mut self, frame: &Frame, hands: &[HandObservation], pinches: &[HandPinches]);

    /// True when the loop should stop.
    fn poll_quit(&mut self) -> bool;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn draw(&mut self, frame: &Frame, hands: &[HandObservation], pinches: &[HandPinches]) {
        (**self).draw(frame, hands, pinches)
    }
    fn poll_quit(&mut self) -> bool {
        (**self).poll_quit()
    }
}

/// Logs a one-line summary per frame at debug level; never quits.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: u64,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        HeadlessRenderer::default()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }
}

impl Renderer for HeadlessRenderer {
    fn draw(&mut self, frame: &Frame, hands: &[HandObservation], pinches: &[HandPinches]) {
        self.frames += 1;
        let pinching: Vec<String> = pinches.iter()
            .flat_map(|hp| {
                hp.results.iter()
                    .filter(|(_, r)| r.is_pinching)
                    .map(move |(finger, r)| format!("{}/{}({:.2})", hp.side, finger, r.confidence))
            })
            .collect();
        debug!(
            frame = frame.index,
            hands = hands.len(),
            pinching = %pinching.join(" "),
            "frame"
        );
    }

    fn poll_quit(&mut self) -> bool {
        false
    }
}
