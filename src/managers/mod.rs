// Managers Module
//
// Focused manager classes extracted from MotionEngine to apply Single Responsibility Principle.
//
// Each manager handles one specific concern:
// - BroadcastChannelManager: Tokio broadcast channel management

pub mod broadcast_manager;

pub use broadcast_manager::BroadcastChannelManager;
