//! Rep counting state machines
//!
//! Each exercise is a two-stage machine over one smoothed angle signal.
//! A repetition is counted exactly once, on the transition into the stage
//! that completes the movement. Coaching cues are sticky: a cue emitted on
//! a transition names the next movement and persists until the following
//! transition replaces it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analysis::{ChannelAngles, ExerciseKind};
use crate::calibration::ThresholdSet;

/// Movement stage within a repetition
///
/// `Uninitialized` holds until the signal first crosses a stage boundary,
/// so a session never counts a rep before seeing a full transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepStage {
    Uninitialized,
    Down,
    Up,
}

/// Coaching cue shown to the user
///
/// Serialized as the exact display strings the UI renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CueId {
    #[serde(rename = "Get Ready")]
    GetReady,
    #[serde(rename = "Curl Up!")]
    CurlUp,
    #[serde(rename = "Lower Down")]
    LowerDown,
    #[serde(rename = "Stand Up!")]
    StandUp,
    #[serde(rename = "Squat Down!")]
    SquatDown,
    #[serde(rename = "Push Up")]
    PushUp,
    #[serde(rename = "Lower Chest")]
    LowerChest,
    #[serde(rename = "Release Up")]
    ReleaseUp,
    #[serde(rename = "Pull Down")]
    PullDown,
}

impl CueId {
    pub fn as_str(&self) -> &'static str {
        match self {
            CueId::GetReady => "Get Ready",
            CueId::CurlUp => "Curl Up!",
            CueId::LowerDown => "Lower Down",
            CueId::StandUp => "Stand Up!",
            CueId::SquatDown => "Squat Down!",
            CueId::PushUp => "Push Up",
            CueId::LowerChest => "Lower Chest",
            CueId::ReleaseUp => "Release Up",
            CueId::PullDown => "Pull Down",
        }
    }
}

impl fmt::Display for CueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of feeding one frame of smoothed angles into the machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepUpdate {
    pub stage: RepStage,
    pub reps: u32,
    pub cue: CueId,
    /// True only on the frame whose transition completed a repetition
    pub rep_counted: bool,
}

/// Two-stage rep counter for one exercise
///
/// The machine only ever moves on threshold crossings of its exercise's
/// signal. Frames where the signal is absent leave stage, count, and cue
/// untouched.
#[derive(Debug, Clone)]
pub struct RepCounter {
    exercise: ExerciseKind,
    stage: RepStage,
    reps: u32,
    cue: CueId,
}

impl RepCounter {
    /// Elbow angle at the top of a pushup (arms locked out)
    const PUSHUP_LOCKOUT_MIN: f32 = 160.0;
    /// Elbow angle at the bottom of a pushup
    const PUSHUP_BOTTOM_MAX: f32 = 90.0;
    /// Elbow angle with the bar released overhead
    const LATPULL_RELEASE_MIN: f32 = 150.0;
    /// Elbow angle with the bar pulled to the chest
    const LATPULL_CONTRACTED_MAX: f32 = 80.0;

    pub fn new(exercise: ExerciseKind) -> Self {
        Self {
            exercise,
            stage: RepStage::Uninitialized,
            reps: 0,
            cue: CueId::GetReady,
        }
    }

    pub fn exercise(&self) -> ExerciseKind {
        self.exercise
    }

    pub fn stage(&self) -> RepStage {
        self.stage
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn cue(&self) -> CueId {
        self.cue
    }

    /// Advance the machine with the current smoothed angles.
    pub fn observe(&mut self, angles: &ChannelAngles, thresholds: &ThresholdSet) -> RepUpdate {
        let counted = match self.exercise {
            ExerciseKind::Bicep => self.observe_bicep(angles, thresholds),
            ExerciseKind::Squat => self.observe_squat(angles, thresholds),
            ExerciseKind::Pushup => self.observe_pushup(angles),
            ExerciseKind::LatPulldown => self.observe_latpulldown(angles),
        };
        RepUpdate {
            stage: self.stage,
            reps: self.reps,
            cue: self.cue,
            rep_counted: counted,
        }
    }

    /// Curl: down is the extended arm (large angle), a rep completes on the
    /// curl into the up stage. Uses whichever elbow sides are available.
    fn observe_bicep(&mut self, angles: &ChannelAngles, thresholds: &ThresholdSet) -> bool {
        let Some(value) = angles.elbow_avg() else {
            return false;
        };
        if value > thresholds.elbow_down as f32 {
            self.stage = RepStage::Down;
            self.cue = CueId::CurlUp;
        } else if value < thresholds.elbow_up as f32 && self.stage == RepStage::Down {
            self.stage = RepStage::Up;
            self.reps += 1;
            self.cue = CueId::LowerDown;
            return true;
        }
        false
    }

    /// Squat: a rep completes on standing back up past the stand threshold.
    fn observe_squat(&mut self, angles: &ChannelAngles, thresholds: &ThresholdSet) -> bool {
        // Half-sum, not an adaptive mean: a never-seen side counts as zero
        // and drags the signal down until both knees have been observed.
        let value = (angles.left_knee.unwrap_or(0) + angles.right_knee.unwrap_or(0)) as f32 / 2.0;
        if value == 0.0 {
            return false;
        }
        if value > thresholds.knee_stand as f32 {
            let counted = self.stage == RepStage::Down;
            if counted {
                self.reps += 1;
            }
            self.stage = RepStage::Up;
            self.cue = CueId::SquatDown;
            return counted;
        } else if value < thresholds.knee_squat as f32 {
            self.stage = RepStage::Down;
            self.cue = CueId::StandUp;
        }
        false
    }

    /// Pushup: fixed elbow bands, rep completes on the press to lockout.
    fn observe_pushup(&mut self, angles: &ChannelAngles) -> bool {
        let value =
            (angles.left_elbow.unwrap_or(0) + angles.right_elbow.unwrap_or(0)) as f32 / 2.0;
        if value == 0.0 {
            return false;
        }
        if value > Self::PUSHUP_LOCKOUT_MIN {
            let counted = self.stage == RepStage::Down;
            if counted {
                self.reps += 1;
            }
            self.stage = RepStage::Up;
            self.cue = CueId::LowerChest;
            return counted;
        } else if value < Self::PUSHUP_BOTTOM_MAX {
            self.stage = RepStage::Down;
            self.cue = CueId::PushUp;
        }
        false
    }

    /// Lat pulldown: fixed elbow bands, rep completes on the release overhead.
    fn observe_latpulldown(&mut self, angles: &ChannelAngles) -> bool {
        let value =
            (angles.left_elbow.unwrap_or(0) + angles.right_elbow.unwrap_or(0)) as f32 / 2.0;
        if value == 0.0 {
            return false;
        }
        if value > Self::LATPULL_RELEASE_MIN {
            let counted = self.stage == RepStage::Down;
            if counted {
                self.reps += 1;
            }
            self.stage = RepStage::Up;
            self.cue = CueId::PullDown;
            return counted;
        } else if value < Self::LATPULL_CONTRACTED_MAX {
            self.stage = RepStage::Down;
            self.cue = CueId::ReleaseUp;
        }
        false
    }
}
