// Rep Trainer Core - Rust Motion Analysis Engine
// Frame-driven pose analysis with rep counting and exercise detection

// Module declarations
pub mod analysis;
pub mod calibration;
pub mod config;
pub mod engine;
pub mod error;
pub mod fixtures;
pub mod managers;
pub mod pose;
pub mod session;
pub mod storage;

// Re-exports for convenience
pub use engine::{EngineEvent, EngineEventKind, FrameResult, MotionEngine};
pub use session::SessionRecord;
