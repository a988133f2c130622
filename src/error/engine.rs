// Engine error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Engine error code constants
///
/// Error code range: 1001
pub struct EngineErrorCodes {}

impl EngineErrorCodes {
    /// The pipeline mutex was poisoned by a panicking caller
    pub const PIPELINE_POISONED: i32 = 1001;
}

/// Log an engine error with structured context
pub fn log_engine_error(err: &EngineError, context: &str) {
    error!(
        "Engine error in {}: code={}, component=MotionEngine, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Engine-level errors
///
/// Frame processing and the between-frame actions share one pipeline
/// lock; every engine operation can observe it poisoned after a panic
/// elsewhere, so they all return this error type.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The pipeline mutex was poisoned by a panicking caller
    PipelinePoisoned { component: String },
}

impl ErrorCode for EngineError {
    fn code(&self) -> i32 {
        match self {
            EngineError::PipelinePoisoned { .. } => EngineErrorCodes::PIPELINE_POISONED,
        }
    }

    fn message(&self) -> String {
        match self {
            EngineError::PipelinePoisoned { component } => {
                format!("Engine pipeline lock poisoned in {}", component)
            }
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EngineError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for EngineError {}
