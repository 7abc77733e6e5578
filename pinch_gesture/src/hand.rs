//! Hand observations as delivered by the landmark tracker.
//!
//! A [`HandObservation`] is one tracked hand in one frame: a handedness score
//! plus the 21 normalized landmarks of the standard hand topology (wrist,
//! four joints per finger).  The tracker may run palm detection without the
//! landmark model, in which case `landmarks` is `None`.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

/// Number of landmarks in a full hand observation.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP:   usize = 16;
pub const PINKY_TIP:  usize = 20;

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// A normalized 3D hand keypoint.
///
/// Deserializes from either `[x, y, z]` or `{"x": .., "y": .., "z": ..}`;
/// a missing `z` in the object form defaults to `0.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "LandmarkRepr")]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkRepr {
    Triple([f32; 3]),
    Named {
        x: f32,
        y: f32,
        #[serde(default)]
        z: f32,
    },
}

impl From<LandmarkRepr> for Landmark {
    fn from(repr: LandmarkRepr) -> Self {
        match repr {
            LandmarkRepr::Triple([x, y, z])   => Landmark { x, y, z },
            LandmarkRepr::Named { x, y, z }   => Landmark { x, y, z },
        }
    }
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    /// Euclidean distance to `other` in normalized landmark space.
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx*dx + dy*dy + dz*dz).sqrt()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Finger / HandSide
// ════════════════════════════════════════════════════════════════════════════

/// The four fingers tracked for thumb pinches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const COUNT: usize = 4;
    pub const ALL: [Finger; Finger::COUNT] =
        [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    pub fn name(self) -> &'static str {
        match self {
            Finger::Index  => "index",
            Finger::Middle => "middle",
            Finger::Ring   => "ring",
            Finger::Pinky  => "pinky",
        }
    }

    /// Landmark index of this finger's tip.
    pub fn tip_index(self) -> usize {
        match self {
            Finger::Index  => INDEX_TIP,
            Finger::Middle => MIDDLE_TIP,
            Finger::Ring   => RING_TIP,
            Finger::Pinky  => PINKY_TIP,
        }
    }

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Finger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which hand an observation belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    /// Scores below 0.5 are left hands, everything else is right.
    pub fn from_handedness(score: f32) -> Self {
        if score < 0.5 { HandSide::Left } else { HandSide::Right }
    }

    pub fn label(self) -> &'static str {
        match self {
            HandSide::Left  => "left",
            HandSide::Right => "right",
        }
    }
}

impl std::fmt::Display for HandSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandObservation
// ════════════════════════════════════════════════════════════════════════════

/// One tracked hand in one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    /// Likelihood that this is a right hand, 0.0–1.0.
    pub handedness: f32,
    /// Normalized landmarks, or `None` when the landmark model did not run.
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

impl HandObservation {
    pub fn new(handedness: f32, landmarks: Vec<Landmark>) -> Self {
        HandObservation { handedness, landmarks: Some(landmarks) }
    }

    /// A palm-only observation with no landmark data.
    pub fn without_landmarks(handedness: f32) -> Self {
        HandObservation { handedness, landmarks: None }
    }

    pub fn side(&self) -> HandSide {
        HandSide::from_handedness(self.handedness)
    }

    /// Landmark at `idx`, if landmarks are present and the index is in range.
    pub fn landmark(&self, idx: usize) -> Option<&Landmark> {
        self.landmarks.as_ref()?.get(idx)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
