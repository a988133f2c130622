// Classifier - heuristic rule-based exercise detection
//
// This module implements a weighted-vote classifier that guesses which
// exercise the user is currently performing from a single frame's pose
// summary. Votes accumulate per exercise:
//
// - Knee depth votes for squat (deep bend scores highest)
// - Elbow flexion votes for bicep curl, or pushup when the torso is flat
// - Torso posture adds a flat-body or upright-body vote
// - A bent right-side joint adds a small confirming bonus
//
// The best total becomes the candidate. The engine decides separately
// whether the score clears the user's suggestion confidence bar; the
// classifier itself never switches the active exercise.

use crate::analysis::{ChannelAngles, ClassificationResult, ExerciseKind};
use crate::config::ClassifierConfig;

/// Per-frame pose summary feeding the classifier
///
/// Averages adapt to visibility: a side that has never been observed is
/// simply left out rather than dragging the mean down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseFeatures {
    /// Mean of the available smoothed elbow angles
    pub elbow_avg: Option<f32>,
    /// Mean of the available smoothed knee angles
    pub knee_avg: Option<f32>,
    /// Torso tilt in degrees; near 0 is horizontal, near 90 upright
    pub torso_tilt: f32,
    /// Latest smoothed right elbow angle
    pub right_elbow: Option<u32>,
    /// Latest smoothed right knee angle
    pub right_knee: Option<u32>,
}

impl PoseFeatures {
    pub fn from_angles(angles: &ChannelAngles, torso_tilt: f32) -> Self {
        Self {
            elbow_avg: angles.elbow_avg(),
            knee_avg: angles.knee_avg(),
            torso_tilt,
            right_elbow: angles.right_elbow,
            right_knee: angles.right_knee,
        }
    }
}

/// ExerciseClassifier scores each supported exercise for one frame
///
/// Breakpoints and vote weights come from [`ClassifierConfig`]; the stock
/// values favor precision on squats and bicep curls, with pushup and lat
/// pulldown recognized by posture and extension respectively.
pub struct ExerciseClassifier {
    config: ClassifierConfig,
}

impl ExerciseClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Score all exercises and return the best candidate.
    ///
    /// Scores are clamped to 1.0. Ties resolve to the earliest entry in
    /// [`ExerciseKind::ALL`], which keeps repeated frames stable.
    pub fn classify(&self, features: &PoseFeatures) -> ClassificationResult {
        let c = &self.config;
        let mut scores = [0.0f32; ExerciseKind::COUNT];
        let mut add = |kind: ExerciseKind, weight: f32| {
            scores[kind as usize] += weight;
        };

        if let Some(knee) = features.knee_avg {
            if knee < c.deep_knee_max {
                add(ExerciseKind::Squat, c.deep_knee_score);
            } else if knee < c.bent_knee_max {
                add(ExerciseKind::Squat, c.bent_knee_score);
            } else {
                add(ExerciseKind::Squat, c.straight_knee_score);
            }
        }

        if let Some(elbow) = features.elbow_avg {
            if elbow < c.flexed_elbow_max {
                // Full flex reads as a pushup bottom when the body is flat
                if features.torso_tilt < c.pushup_tilt_max {
                    add(ExerciseKind::Pushup, c.flexed_elbow_score);
                } else {
                    add(ExerciseKind::Bicep, c.flexed_elbow_score);
                }
            } else if elbow < c.curled_elbow_max {
                add(ExerciseKind::Bicep, c.curled_elbow_score);
            } else {
                add(ExerciseKind::LatPulldown, c.extended_elbow_score);
            }
        }

        if features.torso_tilt < c.flat_torso_tilt_max {
            add(ExerciseKind::Pushup, c.flat_torso_score);
        } else {
            add(ExerciseKind::Bicep, c.upright_torso_score);
        }

        if let Some(right_elbow) = features.right_elbow {
            if (right_elbow as f32) < c.flexed_elbow_max {
                add(ExerciseKind::Bicep, c.right_side_bonus);
            }
        }
        if let Some(right_knee) = features.right_knee {
            if (right_knee as f32) < c.deep_knee_max {
                add(ExerciseKind::Squat, c.right_side_bonus);
            }
        }

        let mut candidate = ExerciseKind::ALL[0];
        let mut best = scores[candidate as usize];
        for kind in ExerciseKind::ALL {
            if scores[kind as usize] > best {
                candidate = kind;
                best = scores[kind as usize];
            }
        }

        ClassificationResult {
            candidate,
            score: best.min(1.0),
        }
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
