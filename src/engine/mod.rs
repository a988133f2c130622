//! Engine module housing the reusable motion-analysis core.
//!
//! This module exposes the `MotionEngine` orchestration layer (`core`).
//! Fixture replay and the CLI adapters build on top of it.

pub mod core;

pub use core::{EngineEvent, EngineEventKind, FrameResult, MotionEngine};
