// Calibration module - user threshold capture and storage
//
// This module provides two main components:
// 1. ThresholdSet: Stores angle thresholds for the rep state machines
// 2. apply_capture: Writes one threshold field from the live smoothed angles
//
// The calibration workflow:
// 1. Hold the bottom of the movement, capture low (elbowDown / kneeSquat)
// 2. Hold the top of the movement, capture high (elbowUp / kneeStand)
// 3. Every accepted capture is persisted through the storage collaborator

pub mod capture;
pub mod state;

pub use capture::{apply_capture, CaptureFamily, CaptureOutcome, CapturePosition};
pub use state::{ThresholdField, ThresholdSet};
