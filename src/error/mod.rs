// Error types for the rep trainer engine
//
// This module defines custom error types for engine, calibration, and storage
// operations, providing structured error handling with stable numeric codes
// suitable for embedding hosts.

mod calibration;
mod engine;
mod storage;

pub use calibration::{log_calibration_error, CalibrationError, CalibrationErrorCodes};
pub use engine::{log_engine_error, EngineError, EngineErrorCodes};
pub use storage::{log_storage_error, StorageError, StorageErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the engine surface.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
