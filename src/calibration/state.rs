// ThresholdSet - per-user angle thresholds for rep detection
//
// This module stores the angle thresholds that drive the bicep and squat
// state machines plus the confidence bar for surfacing classifier
// suggestions. Thresholds are either the stock defaults or values captured
// live from the user's own range of motion.
//
// The serialized field names match the persisted key-value records written
// by earlier releases, so existing saved thresholds keep loading.

use crate::error::CalibrationError;
use std::fmt;

/// Threshold fields that calibration captures can write
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ThresholdField {
    ElbowUp,
    ElbowDown,
    KneeSquat,
    KneeStand,
}

impl ThresholdField {
    pub const ALL: [ThresholdField; 4] = [
        ThresholdField::ElbowUp,
        ThresholdField::ElbowDown,
        ThresholdField::KneeSquat,
        ThresholdField::KneeStand,
    ];

    /// Serialized field name, matching the persisted JSON records
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdField::ElbowUp => "elbowUp",
            ThresholdField::ElbowDown => "elbowDown",
            ThresholdField::KneeSquat => "kneeSquat",
            ThresholdField::KneeStand => "kneeStand",
        }
    }
}

impl fmt::Display for ThresholdField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ThresholdSet stores angle thresholds for the rep state machines
///
/// The invariant `elbow_up < elbow_down` and `knee_squat < knee_stand`
/// holds for every set the engine accepts; captures that would break it
/// are rejected before any field is written.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ThresholdSet {
    /// Elbow angle at the top of a curl (degrees)
    #[serde(rename = "elbowUp", default = "default_elbow_up")]
    pub elbow_up: u32,
    /// Elbow angle with the arm extended (degrees)
    #[serde(rename = "elbowDown", default = "default_elbow_down")]
    pub elbow_down: u32,
    /// Knee angle at the bottom of a squat (degrees)
    #[serde(rename = "kneeSquat", default = "default_knee_squat")]
    pub knee_squat: u32,
    /// Knee angle when standing (degrees)
    #[serde(rename = "kneeStand", default = "default_knee_stand")]
    pub knee_stand: u32,
    /// Minimum classifier score before a suggestion is surfaced
    #[serde(rename = "suggestConf", default = "default_suggest_conf")]
    pub suggest_confidence: f32,
}

/// Default field values for serde deserialization
///
/// A partial persisted record merges over these, field by field.
fn default_elbow_up() -> u32 {
    30
}

fn default_elbow_down() -> u32 {
    160
}

fn default_knee_squat() -> u32 {
    100
}

fn default_knee_stand() -> u32 {
    160
}

fn default_suggest_conf() -> f32 {
    0.4
}

impl ThresholdSet {
    /// Key-value storage key for the persisted threshold record
    pub const STORAGE_KEY: &'static str = "tvl_thresholds";

    /// Create the stock threshold set
    pub fn new_default() -> Self {
        Self {
            elbow_up: default_elbow_up(),
            elbow_down: default_elbow_down(),
            knee_squat: default_knee_squat(),
            knee_stand: default_knee_stand(),
            suggest_confidence: default_suggest_conf(),
        }
    }

    /// Read one angle field
    pub fn angle(&self, field: ThresholdField) -> u32 {
        match field {
            ThresholdField::ElbowUp => self.elbow_up,
            ThresholdField::ElbowDown => self.elbow_down,
            ThresholdField::KneeSquat => self.knee_squat,
            ThresholdField::KneeStand => self.knee_stand,
        }
    }

    /// Write one angle field
    pub fn set_angle(&mut self, field: ThresholdField, value: u32) {
        match field {
            ThresholdField::ElbowUp => self.elbow_up = value,
            ThresholdField::ElbowDown => self.elbow_down = value,
            ThresholdField::KneeSquat => self.knee_squat = value,
            ThresholdField::KneeStand => self.knee_stand = value,
        }
    }

    /// Check range and ordering of all angle fields
    ///
    /// # Returns
    /// * `Ok(())` - All angles in 1-180 and both orderings hold
    /// * `Err(CalibrationError)` - First violation found
    pub fn validate(&self) -> Result<(), CalibrationError> {
        for field in ThresholdField::ALL {
            let value = self.angle(field);
            if value == 0 || value > 180 {
                return Err(CalibrationError::OutOfRange { field, value });
            }
        }
        if self.elbow_up >= self.elbow_down {
            return Err(CalibrationError::OrderingViolation {
                field: ThresholdField::ElbowUp,
                value: self.elbow_up,
                paired: ThresholdField::ElbowDown,
                limit: self.elbow_down,
            });
        }
        if self.knee_squat >= self.knee_stand {
            return Err(CalibrationError::OrderingViolation {
                field: ThresholdField::KneeSquat,
                value: self.knee_squat,
                paired: ThresholdField::KneeStand,
                limit: self.knee_stand,
            });
        }
        Ok(())
    }
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self::new_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CalibrationErrorCodes, ErrorCode};

    #[test]
    fn test_default_thresholds() {
        let thresholds = ThresholdSet::new_default();
        assert_eq!(thresholds.elbow_up, 30);
        assert_eq!(thresholds.elbow_down, 160);
        assert_eq!(thresholds.knee_squat, 100);
        assert_eq!(thresholds.knee_stand, 160);
        assert_eq!(thresholds.suggest_confidence, 0.4);
        assert!(thresholds.validate().is_ok());
    }

    #[test]
    fn test_serializes_with_legacy_field_names() {
        let json = serde_json::to_string(&ThresholdSet::new_default()).unwrap();
        assert!(json.contains("\"elbowUp\":30"));
        assert!(json.contains("\"kneeSquat\":100"));
        assert!(json.contains("\"suggestConf\":0.4"));
    }

    #[test]
    fn test_partial_record_merges_over_defaults() {
        let thresholds: ThresholdSet = serde_json::from_str(r#"{"elbowDown":150}"#).unwrap();
        assert_eq!(thresholds.elbow_down, 150);
        assert_eq!(thresholds.elbow_up, 30);
        assert_eq!(thresholds.knee_stand, 160);
    }

    #[test]
    fn test_validate_rejects_inverted_elbow_ordering() {
        let thresholds = ThresholdSet {
            elbow_up: 170,
            ..ThresholdSet::new_default()
        };
        let err = thresholds.validate().unwrap_err();
        assert_eq!(err.code(), CalibrationErrorCodes::ORDERING_VIOLATION);
    }

    #[test]
    fn test_validate_rejects_inverted_knee_ordering() {
        let thresholds = ThresholdSet {
            knee_squat: 165,
            ..ThresholdSet::new_default()
        };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_angles() {
        let zero = ThresholdSet {
            elbow_up: 0,
            ..ThresholdSet::new_default()
        };
        assert_eq!(
            zero.validate().unwrap_err().code(),
            CalibrationErrorCodes::OUT_OF_RANGE
        );

        let oversized = ThresholdSet {
            knee_stand: 200,
            ..ThresholdSet::new_default()
        };
        assert!(oversized.validate().is_err());
    }

    #[test]
    fn test_field_accessors_roundtrip() {
        let mut thresholds = ThresholdSet::new_default();
        for field in ThresholdField::ALL {
            thresholds.set_angle(field, 77);
            assert_eq!(thresholds.angle(field), 77);
        }
    }
}
