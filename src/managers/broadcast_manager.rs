// BroadcastChannelManager: Centralized tokio broadcast channel management
// Single Responsibility: Broadcast channel lifecycle and subscription

use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

use crate::analysis::ClassificationResult;
use crate::engine::FrameResult;

/// Manages all tokio broadcast channels
///
/// Single Responsibility: Broadcast channel lifecycle and subscription
///
/// This manager centralizes all broadcast channel creation, storage, and
/// subscription handling. It provides a clean interface for:
/// - Initializing broadcast channels with appropriate buffer sizes
/// - Subscribing to broadcast channels for multiple consumers
/// - Managing channel lifecycle (creation, cleanup)
///
/// # Channel Types
/// - Frame Results: Per-frame analysis output (angles, stage, reps, cue)
/// - Suggestions: Exercise suggestions surfaced by auto-detection
pub struct BroadcastChannelManager {
    frame_results: Arc<Mutex<Option<broadcast::Sender<FrameResult>>>>,
    suggestions: Arc<Mutex<Option<broadcast::Sender<ClassificationResult>>>>,
}

impl BroadcastChannelManager {
    /// Create a new BroadcastChannelManager with all channels uninitialized
    ///
    /// Channels must be explicitly initialized via init_* methods before use.
    pub fn new() -> Self {
        Self {
            frame_results: Arc::new(Mutex::new(None)),
            suggestions: Arc::new(Mutex::new(None)),
        }
    }

    // ========================================================================
    // FRAME RESULTS CHANNEL
    // ========================================================================

    /// Initialize frame results broadcast channel
    ///
    /// Returns sender for the engine to publish per-frame analysis output.
    /// Creates a broadcast channel with 100-message buffer to handle burst traffic.
    ///
    /// # Returns
    /// `broadcast::Sender<FrameResult>` - Sender for publishing results
    ///
    /// # Notes
    /// - Buffer size: 100 messages (a few seconds of frames at camera rates)
    /// - Multiple subscribers supported via broadcast pattern
    /// - Old messages dropped if buffer fills (lagged subscribers)
    pub fn init_frame_results(&self) -> broadcast::Sender<FrameResult> {
        let (tx, _) = broadcast::channel(100);
        *self.frame_results.lock().unwrap() = Some(tx.clone());
        tx
    }

    /// Subscribe to frame results
    ///
    /// Returns a receiver for consuming frame results. Each subscriber
    /// receives independent copies of all messages via the broadcast channel.
    ///
    /// # Returns
    /// `Option<broadcast::Receiver<FrameResult>>` - Receiver or None if not initialized
    ///
    /// # Notes
    /// - Returns None if init_frame_results() not called yet
    /// - Each subscriber gets independent receiver
    /// - Subscribers must keep up with message rate or will lag
    pub fn subscribe_frame_results(&self) -> Option<broadcast::Receiver<FrameResult>> {
        self.frame_results
            .lock()
            .unwrap()
            .as_ref()
            .map(|tx| tx.subscribe())
    }

    // ========================================================================
    // SUGGESTIONS CHANNEL
    // ========================================================================

    /// Initialize suggestions broadcast channel
    ///
    /// Returns sender for the engine to publish auto-detection suggestions.
    /// Creates a broadcast channel with 50-message buffer (suggestions are
    /// rare relative to frames).
    ///
    /// # Returns
    /// `broadcast::Sender<ClassificationResult>` - Sender for publishing suggestions
    ///
    /// # Notes
    /// - Buffer size: 50 messages
    /// - A suggestion carries the candidate exercise and its score
    pub fn init_suggestions(&self) -> broadcast::Sender<ClassificationResult> {
        let (tx, _) = broadcast::channel(50);
        *self.suggestions.lock().unwrap() = Some(tx.clone());
        tx
    }

    /// Subscribe to suggestions
    ///
    /// Returns a receiver for consuming auto-detection suggestions.
    ///
    /// # Returns
    /// `Option<broadcast::Receiver<ClassificationResult>>` - Receiver or None if not initialized
    ///
    /// # Notes
    /// - Returns None if init_suggestions() not called yet
    /// - Suggestions only flow while auto-detection is enabled
    pub fn subscribe_suggestions(&self) -> Option<broadcast::Receiver<ClassificationResult>> {
        self.suggestions
            .lock()
            .unwrap()
            .as_ref()
            .map(|tx| tx.subscribe())
    }
}

impl Default for BroadcastChannelManager {
    fn default() -> Self {
        Self::new()
    }
}
