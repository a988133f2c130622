// Storage error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Storage error code constants
///
/// Error code range: 3001-3002
pub struct StorageErrorCodes {}

impl StorageErrorCodes {
    /// Underlying I/O operation failed
    pub const IO: i32 = 3001;

    /// In-memory store lock was poisoned
    pub const LOCK_POISONED: i32 = 3002;
}

/// Log a storage error with structured context
pub fn log_storage_error(err: &StorageError, context: &str) {
    error!(
        "Storage error in {}: code={}, component=ThresholdStorage, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors from the injected key-value storage collaborator
///
/// Storage failures never abort the pipeline; the engine logs them and
/// keeps the in-memory state authoritative.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Underlying I/O operation failed
    Io { details: String },

    /// In-memory store lock was poisoned
    LockPoisoned { component: String },
}

impl ErrorCode for StorageError {
    fn code(&self) -> i32 {
        match self {
            StorageError::Io { .. } => StorageErrorCodes::IO,
            StorageError::LockPoisoned { .. } => StorageErrorCodes::LOCK_POISONED,
        }
    }

    fn message(&self) -> String {
        match self {
            StorageError::Io { details } => format!("Storage I/O failed: {}", details),
            StorageError::LockPoisoned { component } => {
                format!("Storage lock poisoned in {}", component)
            }
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StorageError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io {
            details: err.to_string(),
        }
    }
}
