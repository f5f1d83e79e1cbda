//! Hand landmark types.
//!
//! Coordinates are normalized to the image: `x` and `y` lie in `[0, 1]` for
//! points inside the frame, with the origin at the top-left corner.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of keypoints in the standard hand skeleton.
pub const HAND_LANDMARK_COUNT: usize = 21;

/// A single detected keypoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Relative depth, if the detector reports it. Unused by classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: None }
    }

    /// Position in pixel coordinates for an image of the given size.
    ///
    /// Each axis is clamped to one frame size beyond either edge, so points far
    /// outside the image (or reported in pixels rather than normalized units)
    /// stay near the frame.
    pub fn to_pixel(&self, width: u32, height: u32) -> (i32, i32) {
        (scale_axis(self.x, width), scale_axis(self.y, height))
    }
}

fn scale_axis(value: f32, extent: u32) -> i32 {
    let extent = extent as f32;
    (value * extent).round().clamp(-extent, 2.0 * extent) as i32
}

/// Keypoint set for one detected hand, in detector order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Hand {
    pub landmarks: Vec<Landmark>,
}

impl Hand {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Iterate over skeleton edges as landmark pairs, skipping edges whose
    /// endpoints are missing from this set.
    pub fn connections(&self) -> impl Iterator<Item = (&Landmark, &Landmark)> + '_ {
        HAND_CONNECTIONS.iter().filter_map(|(a, b)| {
            Some((
                self.landmarks.get(*a as usize)?,
                self.landmarks.get(*b as usize)?,
            ))
        })
    }
}

/// Names for the hand landmarks.
///
/// - **CMC**: carpometacarpal joint, the lowest joint of the thumb.
/// - **MCP**: metacarpophalangeal joint, the knuckles near the palm.
/// - **PIP** / **DIP**: proximal and distal interphalangeal joints.
/// - **Tip**: the tip of the finger, above the DIP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Skeleton edges drawn over detected hands.
pub const HAND_CONNECTIONS: &[(LandmarkIdx, LandmarkIdx)] = {
    use LandmarkIdx::*;
    &[
        // Palm
        (Wrist, ThumbCmc),
        (Wrist, IndexFingerMcp),
        (IndexFingerMcp, MiddleFingerMcp),
        (MiddleFingerMcp, RingFingerMcp),
        (RingFingerMcp, PinkyMcp),
        (Wrist, PinkyMcp),
        // Thumb
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        // Index
        (IndexFingerMcp, IndexFingerPip),
        (IndexFingerPip, IndexFingerDip),
        (IndexFingerDip, IndexFingerTip),
        // Middle
        (MiddleFingerMcp, MiddleFingerPip),
        (MiddleFingerPip, MiddleFingerDip),
        (MiddleFingerDip, MiddleFingerTip),
        // Ring
        (RingFingerMcp, RingFingerPip),
        (RingFingerPip, RingFingerDip),
        (RingFingerDip, RingFingerTip),
        // Pinky
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ]
};
