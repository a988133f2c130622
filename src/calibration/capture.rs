// Threshold capture - live calibration from the smoothed angle signals
//
// A capture samples the user's current position and writes one threshold
// field. Low captures sample the bottom of the movement, high captures the
// top. The active exercise decides whether the elbow or knee channels are
// read. A capture that cannot produce a valid value is rejected as a whole;
// the threshold set is never left partially updated.

use crate::analysis::ExerciseKind;
use crate::calibration::state::{ThresholdField, ThresholdSet};
use crate::error::CalibrationError;
use std::fmt;

/// Joint family a capture reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFamily {
    Elbow,
    Knee,
}

impl CaptureFamily {
    /// Family calibrated while a given exercise is active
    pub fn for_exercise(kind: ExerciseKind) -> Self {
        match kind {
            ExerciseKind::Squat => CaptureFamily::Knee,
            ExerciseKind::Bicep | ExerciseKind::Pushup | ExerciseKind::LatPulldown => {
                CaptureFamily::Elbow
            }
        }
    }
}

impl fmt::Display for CaptureFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureFamily::Elbow => f.write_str("elbow"),
            CaptureFamily::Knee => f.write_str("knee"),
        }
    }
}

/// Which end of the movement a capture samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePosition {
    /// Bottom of the movement: extended arm or deep squat
    Low,
    /// Top of the movement: curled arm or standing tall
    High,
}

/// A successfully applied capture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOutcome {
    pub field: ThresholdField,
    pub value: u32,
}

/// Elbow-up captures never go below this floor; a near-zero top-of-curl
/// reading would make the up stage unreachable.
const ELBOW_UP_FLOOR: u32 = 10;

/// Apply one capture to the threshold set.
///
/// `left`/`right` are the latest smoothed angles for the family's two
/// sides; an occluded side is `None`. Low captures take the smaller of the
/// available sides, high captures the larger.
///
/// # Returns
/// * `Ok(CaptureOutcome)` - The field written and its new value
/// * `Err(CalibrationError)` - No visible side, value out of range, or the
///   value would invert the ordering against its paired field. The
///   threshold set is unchanged on any error.
pub fn apply_capture(
    thresholds: &mut ThresholdSet,
    family: CaptureFamily,
    position: CapturePosition,
    left: Option<u32>,
    right: Option<u32>,
) -> Result<CaptureOutcome, CalibrationError> {
    let available = [left, right].into_iter().flatten();
    let sampled = match position {
        CapturePosition::Low => available.min(),
        CapturePosition::High => available.max(),
    };
    let Some(sampled) = sampled else {
        return Err(CalibrationError::NoVisibleSignal { family });
    };

    let field = match (family, position) {
        (CaptureFamily::Elbow, CapturePosition::Low) => ThresholdField::ElbowDown,
        (CaptureFamily::Elbow, CapturePosition::High) => ThresholdField::ElbowUp,
        (CaptureFamily::Knee, CapturePosition::Low) => ThresholdField::KneeSquat,
        (CaptureFamily::Knee, CapturePosition::High) => ThresholdField::KneeStand,
    };

    let value = if field == ThresholdField::ElbowUp {
        sampled.max(ELBOW_UP_FLOOR)
    } else {
        sampled
    };
    if value == 0 || value > 180 {
        return Err(CalibrationError::OutOfRange { field, value });
    }

    let (paired, ordered) = match field {
        ThresholdField::ElbowDown => (ThresholdField::ElbowUp, value > thresholds.elbow_up),
        ThresholdField::ElbowUp => (ThresholdField::ElbowDown, value < thresholds.elbow_down),
        ThresholdField::KneeSquat => (ThresholdField::KneeStand, value < thresholds.knee_stand),
        ThresholdField::KneeStand => (ThresholdField::KneeSquat, value > thresholds.knee_squat),
    };
    if !ordered {
        return Err(CalibrationError::OrderingViolation {
            field,
            value,
            paired,
            limit: thresholds.angle(paired),
        });
    }

    thresholds.set_angle(field, value);
    Ok(CaptureOutcome { field, value })
}
