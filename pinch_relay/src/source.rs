//! Hand sources: where per-frame hand observations come from.
//!
//! The orchestrator pulls frames through [`HandSource::next_frame`] and does
//! not care whether they come from a recorded session, the built-in
//! synthetic hand, or real hardware (`leap` feature).  `Ok(None)` means the
//! input is exhausted.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use pinch_gesture::hand::{INDEX_TIP, THUMB_TIP};
use pinch_gesture::{HandObservation, Landmark, LANDMARK_COUNT};

// ════════════════════════════════════════════════════════════════════════════
// Frame / TrackedFrame
// ════════════════════════════════════════════════════════════════════════════

/// Per-frame metadata.  Pixel data stays with the tracker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    /// Zero-based position in the input.
    pub index: u64,
    /// Capture time, when the source knows it.
    pub timestamp_ms: Option<u64>,
}

/// One frame together with every hand tracked in it.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedFrame {
    pub frame: Frame,
    pub hands: Vec<HandObservation>,
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: invalid frame record: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("tracking device error: {0}")]
    Device(String),
}

// ════════════════════════════════════════════════════════════════════════════
// HandSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Pull-based supplier of tracked frames.
pub trait HandSource {
    fn next_frame(&mut self) -> Result<Option<TrackedFrame>, SourceError>;
}

impl<S: HandSource + ?Sized> HandSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<TrackedFrame>, SourceError> {
        (**self).next_frame()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ReplaySource — JSON lines
// ════════════════════════════════════════════════════════════════════════════

/// One line of a replay file: `{"timestamp_ms":..,"hands":[..]}`, a bare
/// array of hands, or a single hand object.
#[derive(Deserialize)]
#[serde(untagged)]
enum FrameRecord {
    Hands(Vec<HandObservation>),
    Frame(FrameDoc),
    Hand(HandObservation),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FrameDoc {
    #[serde(default)]
    timestamp_ms: Option<u64>,
    #[serde(default)]
    hands: Vec<HandObservation>,
}

/// Replays hand observations recorded as JSON lines, one frame per line.
/// Blank lines and lines starting with `#` are skipped.
pub struct ReplaySource<R> {
    reader:      R,
    buf:         String,
    line_no:     usize,
    next_index:  u64,
    interval:    Option<Duration>,
}

impl ReplaySource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Ok(ReplaySource::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        ReplaySource {
            reader,
            buf:        String::new(),
            line_no:    0,
            next_index: 0,
            interval:   None,
        }
    }

    /// Sleep this long before handing out each frame, to mimic a live feed.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }
}

impl<R: BufRead> HandSource for ReplaySource<R> {
    fn next_frame(&mut self) -> Result<Option<TrackedFrame>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let line = self.buf.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let record: FrameRecord = serde_json::from_str(line)
                .map_err(|source| SourceError::Parse { line: self.line_no, source })?;
            let (timestamp_ms, hands) = match record {
                FrameRecord::Hands(hands) => (None, hands),
                FrameRecord::Frame(doc)   => (doc.timestamp_ms, doc.hands),
                FrameRecord::Hand(hand)   => (None, vec![hand]),
            };

            if let Some(interval) = self.interval {
                thread::sleep(interval);
            }
            let frame = Frame { index: self.next_index, timestamp_ms };
            self.next_index += 1;
            return Ok(Some(TrackedFrame { frame, hands }));
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SyntheticSource — a scripted hand, no hardware needed
// ════════════════════════════════════════════════════════════════════════════

/// Open right hand, palm toward the camera, in normalized image coordinates.
const OPEN_HAND: [[f32; 3]; LANDMARK_COUNT] = [
    [0.50, 0.85,  0.00],                                                    // wrist
    [0.42, 0.80, -0.01], [0.36, 0.72, -0.02], [0.32, 0.65, -0.03], [0.29, 0.58, -0.04], // thumb
    [0.44, 0.60,  0.00], [0.43, 0.50, -0.01], [0.42, 0.43, -0.02], [0.41, 0.37, -0.03], // index
    [0.50, 0.58,  0.00], [0.50, 0.47, -0.01], [0.50, 0.39, -0.02], [0.50, 0.32, -0.03], // middle
    [0.56, 0.60,  0.00], [0.57, 0.50, -0.01], [0.58, 0.43, -0.02], [0.58, 0.37, -0.03], // ring
    [0.61, 0.64,  0.00], [0.63, 0.57, -0.01], [0.64, 0.52, -0.02], [0.65, 0.47, -0.03], // pinky
];

/// Gap between thumb and index tips while the synthetic hand pinches.
const SYNTHETIC_PINCH_GAP: f32 = 0.02;

/// A single hand that alternates between an index pinch (first half of each
/// period) and an open hand (second half).
pub struct SyntheticSource {
    handedness: f32,
    period:     u64,
    limit:      Option<u64>,
    interval:   Option<Duration>,
    next_index: u64,
}

impl SyntheticSource {
    pub fn new(handedness: f32, period: u64) -> Self {
        SyntheticSource {
            handedness,
            period: period.max(2),
            limit: None,
            interval: None,
            next_index: 0,
        }
    }

    /// Stop after `frames` frames.
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn is_pinch_frame(&self, index: u64) -> bool {
        index % self.period < self.period / 2
    }

    /// The hand as seen on frame `index`.
    pub fn hand_at(&self, index: u64) -> HandObservation {
        let mirror = self.handedness < 0.5;
        let mut lms: Vec<Landmark> = OPEN_HAND.iter()
            .map(|&[x, y, z]| Landmark::new(if mirror { 1.0 - x } else { x }, y, z))
            .collect();

        if self.is_pinch_frame(index) {
            let thumb = lms[THUMB_TIP];
            let dx = if mirror { -SYNTHETIC_PINCH_GAP } else { SYNTHETIC_PINCH_GAP };
            lms[INDEX_TIP] = Landmark::new(thumb.x + dx, thumb.y, thumb.z);
        }
        HandObservation::new(self.handedness, lms)
    }
}

impl HandSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Option<TrackedFrame>, SourceError> {
        if self.limit.is_some_and(|limit| self.next_index >= limit) {
            return Ok(None);
        }
        if let Some(interval) = self.interval {
            thread::sleep(interval);
        }
        let index = self.next_index;
        self.next_index += 1;
        Ok(Some(TrackedFrame {
            frame: Frame { index, timestamp_ms: None },
            hands: vec![self.hand_at(index)],
        }))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// IterSource — adapt any iterator of hand lists
// ════════════════════════════════════════════════════════════════════════════

/// Frames taken from an iterator, one `Vec<HandObservation>` per frame.
pub struct IterSource<I> {
    frames:     I,
    next_index: u64,
}

impl<I: Iterator<Item = Vec<HandObservation>>> IterSource<I> {
    pub fn new<T: IntoIterator<IntoIter = I, Item = Vec<HandObservation>>>(frames: T) -> Self {
        IterSource { frames: frames.into_iter(), next_index: 0 }
    }
}

impl<I: Iterator<Item = Vec<HandObservation>>> HandSource for IterSource<I> {
    fn next_frame(&mut self) -> Result<Option<TrackedFrame>, SourceError> {
        Ok(self.frames.next().map(|hands| {
            let frame = Frame { index: self.next_index, timestamp_ms: None };
            self.next_index += 1;
            TrackedFrame { frame, hands }
        }))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
