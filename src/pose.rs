//! Pose frame input types.
//!
//! A frame is a slice of MediaPipe Pose landmarks (33 per full frame) in
//! normalized image coordinates. Frames arrive from an external pose
//! detector; this crate never runs inference itself.

use serde::{Deserialize, Serialize};

// ============================================================================
// LANDMARK INDICES (MediaPipe Pose - 33 total)
// ============================================================================

pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// Landmarks in a full MediaPipe Pose frame.
pub const POSE_LANDMARK_COUNT: usize = 33;

// ============================================================================
// LANDMARK DATA STRUCTURE
// ============================================================================

/// A single pose landmark (normalized coordinates).
///
/// `x`/`y` are in 0-1 image space, `z` is relative depth, and `visibility`
/// is the detector's 0-1 confidence that the point is actually in frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default)]
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }
}

/// Landmark at `index`, or `None` for frames shorter than a full pose.
pub fn landmark(frame: &[Landmark], index: usize) -> Option<Landmark> {
    frame.get(index).copied()
}

/// Visibility at `index`. Missing landmarks read as 0.0 so visibility
/// gates treat a short frame the same as an occluded point.
pub fn visibility(frame: &[Landmark], index: usize) -> f32 {
    frame.get(index).map(|lm| lm.visibility).unwrap_or(0.0)
}
