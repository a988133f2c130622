// Calibration error types and constants

use crate::calibration::{CaptureFamily, ThresholdField};
use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Calibration error code constants
///
/// These constants provide a single source of truth for error codes
/// shared with embedding hosts.
///
/// Error code range: 2001-2003
pub struct CalibrationErrorCodes {}

impl CalibrationErrorCodes {
    /// No smoothed signal available on either side for the capture family
    pub const NO_VISIBLE_SIGNAL: i32 = 2001;

    /// Captured value would break threshold ordering
    pub const ORDERING_VIOLATION: i32 = 2002;

    /// Captured value outside the valid angle range
    pub const OUT_OF_RANGE: i32 = 2003;
}

/// Log a calibration error with structured context
///
/// This function logs calibration errors with structured fields including:
/// - error_code: Numeric error code for programmatic handling
/// - component: The component where the error occurred
/// - message: Human-readable error message
/// - context: Additional contextual information
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_calibration_error(err: &CalibrationError, context: &str) {
    error!(
        "Calibration error in {}: code={}, component=ThresholdCapture, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Calibration-related errors
///
/// These errors cover threshold capture operations: reading the live
/// smoothed angles, validating the captured value, and updating the
/// active threshold set.
///
/// Error code range: 2001-2003
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// No smoothed signal available on either side for the capture family
    NoVisibleSignal { family: CaptureFamily },

    /// Captured value would break threshold ordering against its pair
    OrderingViolation {
        field: ThresholdField,
        value: u32,
        paired: ThresholdField,
        limit: u32,
    },

    /// Captured value outside the valid angle range
    OutOfRange { field: ThresholdField, value: u32 },
}

impl ErrorCode for CalibrationError {
    fn code(&self) -> i32 {
        match self {
            CalibrationError::NoVisibleSignal { .. } => CalibrationErrorCodes::NO_VISIBLE_SIGNAL,
            CalibrationError::OrderingViolation { .. } => {
                CalibrationErrorCodes::ORDERING_VIOLATION
            }
            CalibrationError::OutOfRange { .. } => CalibrationErrorCodes::OUT_OF_RANGE,
        }
    }

    fn message(&self) -> String {
        match self {
            CalibrationError::NoVisibleSignal { family } => {
                format!("No visible {} signal to capture", family)
            }
            CalibrationError::OrderingViolation {
                field,
                value,
                paired,
                limit,
            } => {
                format!(
                    "Captured {} = {} deg conflicts with {} = {} deg",
                    field, value, paired, limit
                )
            }
            CalibrationError::OutOfRange { field, value } => {
                format!("Captured {} = {} deg outside valid range 1-180 deg", field, value)
            }
        }
    }
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CalibrationError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for CalibrationError {}
