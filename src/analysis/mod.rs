// Analysis module - frame pipeline for angle extraction and rep detection
//
// This module orchestrates the per-frame analysis pipeline, turning raw
// pose landmarks into the smoothed joint angles consumed by the rep state
// machines and the exercise classifier.
//
// Architecture:
// - FrameAnalyzer: gates channels on landmark visibility, measures the
//   joint angle, and feeds the per-channel smoother
// - Pipeline: FrameAnalyzer → RepCounter → ExerciseClassifier
// - Output: FrameResult published by the engine to subscribers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::{EngineConfig, VisibilityConfig};
use crate::pose::{self, Landmark};

pub mod angles;
pub mod classifier;
pub mod rep_counter;
pub mod smoothing;

pub use angles::{joint_angle, torso_tilt_deg};
pub use classifier::{ExerciseClassifier, PoseFeatures};
pub use rep_counter::{CueId, RepCounter, RepStage, RepUpdate};
pub use smoothing::SignalSmoother;

/// Exercises the engine can track
///
/// Serialized as the lowercase names used in persisted records and on the
/// CLI; `display_name` carries the human-facing labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    Bicep,
    Squat,
    Pushup,
    LatPulldown,
}

impl ExerciseKind {
    pub const COUNT: usize = 4;
    pub const ALL: [ExerciseKind; Self::COUNT] = [
        ExerciseKind::Bicep,
        ExerciseKind::Squat,
        ExerciseKind::Pushup,
        ExerciseKind::LatPulldown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::Bicep => "bicep",
            ExerciseKind::Squat => "squat",
            ExerciseKind::Pushup => "pushup",
            ExerciseKind::LatPulldown => "latpulldown",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ExerciseKind::Bicep => "Bicep Curl",
            ExerciseKind::Squat => "Squat",
            ExerciseKind::Pushup => "Push-up",
            ExerciseKind::LatPulldown => "Lat Pulldown",
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bicep" => Ok(ExerciseKind::Bicep),
            "squat" => Ok(ExerciseKind::Squat),
            "pushup" => Ok(ExerciseKind::Pushup),
            "latpulldown" => Ok(ExerciseKind::LatPulldown),
            other => Err(format!(
                "unknown exercise '{}', expected one of: bicep, squat, pushup, latpulldown",
                other
            )),
        }
    }
}

/// Tracked joint-angle signal channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AngleChannel {
    LeftElbow,
    RightElbow,
    LeftKnee,
    RightKnee,
}

impl AngleChannel {
    pub const COUNT: usize = 4;
    pub const ALL: [AngleChannel; Self::COUNT] = [
        AngleChannel::LeftElbow,
        AngleChannel::RightElbow,
        AngleChannel::LeftKnee,
        AngleChannel::RightKnee,
    ];

    /// Landmark triple (outer, vertex, outer) measured for this channel
    pub fn points(&self) -> (usize, usize, usize) {
        match self {
            AngleChannel::LeftElbow => (pose::LEFT_SHOULDER, pose::LEFT_ELBOW, pose::LEFT_WRIST),
            AngleChannel::RightElbow => {
                (pose::RIGHT_SHOULDER, pose::RIGHT_ELBOW, pose::RIGHT_WRIST)
            }
            AngleChannel::LeftKnee => (pose::LEFT_HIP, pose::LEFT_KNEE, pose::LEFT_ANKLE),
            AngleChannel::RightKnee => (pose::RIGHT_HIP, pose::RIGHT_KNEE, pose::RIGHT_ANKLE),
        }
    }

    pub fn is_knee(&self) -> bool {
        matches!(self, AngleChannel::LeftKnee | AngleChannel::RightKnee)
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Latest smoothed angle per channel
///
/// `None` means the channel has produced no sample since the last reset.
/// Once a channel has a value it keeps the most recent one through gated
/// frames, so a short occlusion does not zero the signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAngles {
    pub left_elbow: Option<u32>,
    pub right_elbow: Option<u32>,
    pub left_knee: Option<u32>,
    pub right_knee: Option<u32>,
}

impl ChannelAngles {
    pub fn get(&self, channel: AngleChannel) -> Option<u32> {
        match channel {
            AngleChannel::LeftElbow => self.left_elbow,
            AngleChannel::RightElbow => self.right_elbow,
            AngleChannel::LeftKnee => self.left_knee,
            AngleChannel::RightKnee => self.right_knee,
        }
    }

    /// Mean of the available elbow sides
    pub fn elbow_avg(&self) -> Option<f32> {
        side_mean(self.left_elbow, self.right_elbow)
    }

    /// Mean of the available knee sides
    pub fn knee_avg(&self) -> Option<f32> {
        side_mean(self.left_knee, self.right_knee)
    }
}

fn side_mean(left: Option<u32>, right: Option<u32>) -> Option<f32> {
    match (left, right) {
        (Some(l), Some(r)) => Some((l + r) as f32 / 2.0),
        (Some(l), None) => Some(l as f32),
        (None, Some(r)) => Some(r as f32),
        (None, None) => None,
    }
}

/// Classification result for one frame
///
/// The candidate is the best-scoring exercise; the engine compares the
/// score against the user's suggestion confidence bar before surfacing it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub candidate: ExerciseKind,
    /// Accumulated vote score, clamped to 0.0-1.0
    pub score: f32,
}

/// FrameAnalyzer turns raw landmarks into smoothed channel angles
///
/// Each channel is gated on the visibility of all three of its landmarks;
/// a gated channel receives no sample that frame and its smoothed value
/// carries over unchanged.
#[derive(Debug, Clone)]
pub struct FrameAnalyzer {
    visibility: VisibilityConfig,
    smoother: SignalSmoother,
}

impl FrameAnalyzer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            visibility: config.visibility.clone(),
            smoother: SignalSmoother::new(&config.smoothing),
        }
    }

    /// Process one frame and return the smoothed angles for all channels.
    pub fn analyze(&mut self, frame: &[Landmark]) -> ChannelAngles {
        for channel in AngleChannel::ALL {
            let gate = if channel.is_knee() {
                self.visibility.knee_min
            } else {
                self.visibility.elbow_min
            };
            let (outer_a, vertex, outer_b) = channel.points();
            let visible = pose::visibility(frame, outer_a) > gate
                && pose::visibility(frame, vertex) > gate
                && pose::visibility(frame, outer_b) > gate;
            if !visible {
                continue;
            }
            if let Some((a, b, c)) = landmark_triple(frame, outer_a, vertex, outer_b) {
                let raw = angles::joint_angle(a, b, c);
                self.smoother.update(channel, raw);
            }
        }
        self.smoother.snapshot()
    }

    /// Latest smoothed value for one channel.
    pub fn latest(&self, channel: AngleChannel) -> Option<u32> {
        self.smoother.latest(channel)
    }

    /// Drop all smoothing state; every channel reads as absent again.
    pub fn clear(&mut self) {
        self.smoother.clear();
    }
}

fn landmark_triple(
    frame: &[Landmark],
    a: usize,
    b: usize,
    c: usize,
) -> Option<(Landmark, Landmark, Landmark)> {
    Some((
        pose::landmark(frame, a)?,
        pose::landmark(frame, b)?,
        pose::landmark(frame, c)?,
    ))
}
