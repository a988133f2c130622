use std::time::Instant;

use futures::Stream;
use tokio::runtime::Builder;
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::analysis::ClassificationResult;
use crate::config::EngineConfig;

use super::{EngineEvent, FrameResult, MotionEngine};

impl MotionEngine {
    // ========================================================================
    // STREAM SUBSCRIPTIONS
    // ========================================================================

    pub fn subscribe_frame_results(&self) -> mpsc::UnboundedReceiver<FrameResult> {
        let (tx, rx) = mpsc::unbounded_channel();

        if let Some(mut broadcast_rx) = self.broadcasts.subscribe_frame_results() {
            std::thread::spawn(move || {
                let rt = Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("Failed to create Tokio runtime");
                rt.block_on(async move {
                    while let Ok(result) = broadcast_rx.recv().await {
                        if tx.send(result).is_err() {
                            break;
                        }
                    }
                });
            });
        }

        rx
    }

    pub fn subscribe_suggestions(&self) -> mpsc::UnboundedReceiver<ClassificationResult> {
        let (tx, rx) = mpsc::unbounded_channel();

        if let Some(mut broadcast_rx) = self.broadcasts.subscribe_suggestions() {
            std::thread::spawn(move || {
                let rt = Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("Failed to create Tokio runtime");
                rt.block_on(async move {
                    while let Ok(suggestion) = broadcast_rx.recv().await {
                        if tx.send(suggestion).is_err() {
                            break;
                        }
                    }
                });
            });
        }

        rx
    }

    pub fn subscribe_events(&self) -> mpsc::UnboundedReceiver<EngineEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut broadcast_rx = self.events_tx.subscribe();

        std::thread::spawn(move || {
            let rt = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to create Tokio runtime");
            rt.block_on(async move {
                while let Ok(event) = broadcast_rx.recv().await {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
            });
        });

        rx
    }

    pub fn events_receiver(&self) -> broadcast::Receiver<EngineEvent> {
        self.events_tx.subscribe()
    }

    // ========================================================================
    // ASYNC STREAM ADAPTERS
    // ========================================================================

    pub async fn frame_results_stream(&self) -> impl Stream<Item = FrameResult> + Unpin {
        UnboundedReceiverStream::new(self.subscribe_frame_results())
    }

    pub async fn suggestions_stream(&self) -> impl Stream<Item = ClassificationResult> + Unpin {
        UnboundedReceiverStream::new(self.subscribe_suggestions())
    }

    pub async fn events_stream(&self) -> impl Stream<Item = EngineEvent> + Unpin {
        UnboundedReceiverStream::new(self.subscribe_events())
    }

    // ========================================================================
    // TOOLING HELPERS
    // ========================================================================

    /// Milliseconds elapsed since the engine was created (used for telemetry).
    pub fn uptime_ms(&self) -> u64 {
        Instant::now()
            .saturating_duration_since(self.start_instant)
            .as_millis() as u64
    }

    /// Snapshot the current engine configuration (tooling helper).
    pub fn config_snapshot(&self) -> EngineConfig {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .unwrap_or_else(|err| err.into_inner().clone())
    }
}
