//! MotionEngine: reusable motion-analysis orchestration layer.
//!
//! This struct owns the frame pipeline (angle extraction, rep counting,
//! exercise classification, session accumulation), the threshold store,
//! and the event channels shared across CLI and fixture replay entry
//! points. Frames are processed one at a time; control actions applied
//! between frames take effect atomically before the next frame.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::analysis::{
    torso_tilt_deg, AngleChannel, ChannelAngles, ClassificationResult, CueId, ExerciseClassifier,
    ExerciseKind, FrameAnalyzer, PoseFeatures, RepCounter, RepStage,
};
use crate::calibration::{
    apply_capture, CaptureFamily, CapturePosition, ThresholdField, ThresholdSet,
};
use crate::config::EngineConfig;
use crate::error::{log_calibration_error, log_storage_error, EngineError};
use crate::managers::BroadcastChannelManager;
use crate::pose::Landmark;
use crate::session::{SessionAccumulator, SessionRecord};
use crate::storage::{MemoryStorage, ThresholdStorage};

#[path = "core_subscriptions.rs"]
mod core_subscriptions;

/// Per-frame analysis output.
///
/// Published on the frame results channel after every processed frame and
/// returned to the caller for synchronous consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    pub angles: ChannelAngles,
    pub stage: RepStage,
    pub rep_count: u32,
    pub cue: CueId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<ClassificationResult>,
}

/// Telemetry event emitted by the engine core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineEvent {
    pub timestamp_ms: u64,
    pub kind: EngineEventKind,
    pub detail: Option<String>,
}

/// Types of telemetry events supported by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EngineEventKind {
    SessionStarted { exercise: ExerciseKind },
    SessionEnded { exercise: ExerciseKind, reps: u32 },
    ExerciseChanged { exercise: ExerciseKind },
    AutoDetectChanged { enabled: bool },
    RepCounted { exercise: ExerciseKind, count: u32 },
    ThresholdCaptured { field: ThresholdField, value: u32 },
    CaptureRejected,
    ThresholdsReset,
    Warning,
}

/// Mutable analysis state advanced one frame at a time.
///
/// Everything a frame touches lives behind one lock, so control actions
/// between frames observe and mutate a consistent snapshot.
struct Pipeline {
    thresholds: ThresholdSet,
    analyzer: FrameAnalyzer,
    counter: RepCounter,
    classifier: ExerciseClassifier,
    auto_detect: bool,
    pending_suggestion: Option<ClassificationResult>,
    session: SessionAccumulator,
    frame_count: u64,
}

/// MotionEngine orchestrates the frame pipeline and shared channels.
pub struct MotionEngine {
    config: Arc<RwLock<EngineConfig>>,
    storage: Arc<dyn ThresholdStorage>,
    pipeline: Mutex<Pipeline>,
    pub(crate) broadcasts: BroadcastChannelManager,
    frame_results_tx: broadcast::Sender<FrameResult>,
    suggestions_tx: broadcast::Sender<ClassificationResult>,
    events_tx: broadcast::Sender<EngineEvent>,
    start_instant: Instant,
}

impl MotionEngine {
    /// Create a new MotionEngine with default config and in-memory storage.
    pub fn new() -> Self {
        Self::with_storage(EngineConfig::load(), Arc::new(MemoryStorage::new()))
    }

    /// Create a MotionEngine backed by the given threshold storage.
    ///
    /// Thresholds persisted under [`ThresholdSet::STORAGE_KEY`] are loaded
    /// and validated; any failure falls back to defaults.
    pub fn with_storage(config: EngineConfig, storage: Arc<dyn ThresholdStorage>) -> Self {
        let thresholds = Self::load_thresholds(storage.as_ref());
        let analyzer = FrameAnalyzer::new(&config);
        let counter = RepCounter::new(ExerciseKind::Bicep);
        let classifier = ExerciseClassifier::new(config.classifier.clone());

        let broadcasts = BroadcastChannelManager::new();
        let frame_results_tx = broadcasts.init_frame_results();
        let suggestions_tx = broadcasts.init_suggestions();
        let (events_tx, _) = broadcast::channel(128);

        let pipeline = Pipeline {
            thresholds,
            analyzer,
            counter,
            classifier,
            auto_detect: false,
            pending_suggestion: None,
            session: SessionAccumulator::begin(Utc::now()),
            frame_count: 0,
        };

        Self {
            config: Arc::new(RwLock::new(config)),
            storage,
            pipeline: Mutex::new(pipeline),
            broadcasts,
            frame_results_tx,
            suggestions_tx,
            events_tx,
            start_instant: Instant::now(),
        }
    }

    fn load_thresholds(storage: &dyn ThresholdStorage) -> ThresholdSet {
        let raw = match storage.load(ThresholdSet::STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return ThresholdSet::new_default(),
            Err(err) => {
                log_storage_error(&err, "load thresholds");
                return ThresholdSet::new_default();
            }
        };

        match serde_json::from_str::<ThresholdSet>(&raw) {
            Ok(set) => match set.validate() {
                Ok(()) => {
                    log::info!("[MotionEngine] Loaded thresholds from storage");
                    set
                }
                Err(err) => {
                    log::warn!(
                        "[MotionEngine] Persisted thresholds invalid: {}. Using defaults.",
                        err
                    );
                    ThresholdSet::new_default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[MotionEngine] Failed to parse persisted thresholds: {}. Using defaults.",
                    err
                );
                ThresholdSet::new_default()
            }
        }
    }

    fn pipeline(&self) -> Result<MutexGuard<'_, Pipeline>, EngineError> {
        self.pipeline
            .lock()
            .map_err(|_| EngineError::PipelinePoisoned {
                component: "pipeline".to_string(),
            })
    }

    /// Persist the threshold set, logging rather than failing on storage errors.
    fn persist_thresholds(&self, thresholds: &ThresholdSet) {
        let serialized = match serde_json::to_string(thresholds) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("[MotionEngine] Failed to serialize thresholds: {}", err);
                return;
            }
        };

        if let Err(err) = self.storage.save(ThresholdSet::STORAGE_KEY, &serialized) {
            log_storage_error(&err, "save thresholds");
        }
    }

    fn emit_event(&self, kind: EngineEventKind, detail: Option<String>) {
        let timestamp_ms = Instant::now()
            .saturating_duration_since(self.start_instant)
            .as_millis() as u64;
        let _ = self.events_tx.send(EngineEvent {
            timestamp_ms,
            kind,
            detail,
        });
    }

    // ========================================================================
    // FRAME PROCESSING
    // ========================================================================

    /// Process one frame of pose landmarks.
    ///
    /// Runs angle extraction, smoothing, rep counting, and (when auto
    /// detection is on) exercise classification. The result is returned
    /// and also published on the frame results channel.
    ///
    /// Frames shorter than the full landmark list are handled like frames
    /// with invisible landmarks: affected channels keep their last value.
    pub fn process_frame(&self, frame: &[Landmark]) -> Result<FrameResult, EngineError> {
        let mut guard = self.pipeline()?;
        let pipeline = &mut *guard;
        pipeline.frame_count += 1;

        let angles = pipeline.analyzer.analyze(frame);
        let update = pipeline.counter.observe(&angles, &pipeline.thresholds);

        if update.rep_counted {
            self.emit_event(
                EngineEventKind::RepCounted {
                    exercise: pipeline.counter.exercise(),
                    count: update.reps,
                },
                None,
            );
        }

        let mut suggestion = None;
        if pipeline.auto_detect {
            if let Some(tilt) = torso_tilt_deg(frame) {
                let features = PoseFeatures::from_angles(&angles, tilt);
                let result = pipeline.classifier.classify(&features);
                pipeline.session.observe_confidence(result.score);

                if result.score > pipeline.thresholds.suggest_confidence
                    && result.candidate != pipeline.counter.exercise()
                {
                    pipeline.pending_suggestion = Some(result);
                    suggestion = Some(result);
                    let _ = self.suggestions_tx.send(result);
                }
            }
        }

        if pipeline.frame_count % 30 == 0 {
            tracing::debug!(
                "[MotionEngine] Frame {}: stage={:?}, reps={}, angles={:?}",
                pipeline.frame_count,
                update.stage,
                update.reps,
                angles
            );
        }

        let result = FrameResult {
            angles,
            stage: update.stage,
            rep_count: update.reps,
            cue: update.cue,
            suggestion,
        };
        let _ = self.frame_results_tx.send(result.clone());
        Ok(result)
    }

    // ========================================================================
    // EXERCISE CONTROL
    // ========================================================================

    /// Switch the active exercise, resetting rep state and smoothing buffers.
    ///
    /// Selecting the already-active exercise is a no-op.
    pub fn set_exercise(&self, exercise: ExerciseKind) -> Result<(), EngineError> {
        let mut guard = self.pipeline()?;
        if guard.counter.exercise() == exercise {
            return Ok(());
        }

        guard.counter = RepCounter::new(exercise);
        guard.analyzer.clear();
        guard.pending_suggestion = None;
        drop(guard);

        log::info!("[MotionEngine] Exercise changed to {}", exercise);
        self.emit_event(EngineEventKind::ExerciseChanged { exercise }, None);
        Ok(())
    }

    /// Enable or disable exercise auto-detection.
    ///
    /// Disabling discards any pending suggestion.
    pub fn set_auto_detect(&self, enabled: bool) -> Result<(), EngineError> {
        let mut guard = self.pipeline()?;
        if guard.auto_detect == enabled {
            return Ok(());
        }

        guard.auto_detect = enabled;
        if !enabled {
            guard.pending_suggestion = None;
        }
        drop(guard);

        log::info!("[MotionEngine] Auto-detect {}", if enabled { "enabled" } else { "disabled" });
        self.emit_event(EngineEventKind::AutoDetectChanged { enabled }, None);
        Ok(())
    }

    /// Accept the most recent auto-detection suggestion, if one is pending.
    ///
    /// # Returns
    /// * `Ok(true)` - Switched to the suggested exercise
    /// * `Ok(false)` - No suggestion was pending
    pub fn accept_suggestion(&self) -> Result<bool, EngineError> {
        let suggestion = {
            let mut guard = self.pipeline()?;
            guard.pending_suggestion.take()
        };

        match suggestion {
            Some(suggestion) => {
                log::info!(
                    "[MotionEngine] Accepted suggestion: {} (score {:.2})",
                    suggestion.candidate,
                    suggestion.score
                );
                self.set_exercise(suggestion.candidate)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ========================================================================
    // THRESHOLD CAPTURE
    // ========================================================================

    /// Capture the current low position for the active exercise family.
    ///
    /// Low means the bottom of the movement: the extended hang of a curl
    /// or the deep squat. The smaller of the visible left/right angles is
    /// taken.
    ///
    /// # Returns
    /// * `Ok(true)` - Threshold updated and persisted
    /// * `Ok(false)` - Capture rejected (no visible signal, out of range,
    ///   or ordering conflict); thresholds unchanged
    pub fn capture_low(&self) -> Result<bool, EngineError> {
        self.capture(CapturePosition::Low)
    }

    /// Capture the current high position for the active exercise family.
    ///
    /// High means the top of the movement: the curled arm or standing
    /// tall. The larger of the visible left/right angles is taken.
    pub fn capture_high(&self) -> Result<bool, EngineError> {
        self.capture(CapturePosition::High)
    }

    fn capture(&self, position: CapturePosition) -> Result<bool, EngineError> {
        let mut guard = self.pipeline()?;
        let pipeline = &mut *guard;

        let family = CaptureFamily::for_exercise(pipeline.counter.exercise());
        let (left, right) = match family {
            CaptureFamily::Elbow => (
                pipeline.analyzer.latest(AngleChannel::LeftElbow),
                pipeline.analyzer.latest(AngleChannel::RightElbow),
            ),
            CaptureFamily::Knee => (
                pipeline.analyzer.latest(AngleChannel::LeftKnee),
                pipeline.analyzer.latest(AngleChannel::RightKnee),
            ),
        };

        match apply_capture(&mut pipeline.thresholds, family, position, left, right) {
            Ok(outcome) => {
                let snapshot = pipeline.thresholds.clone();
                drop(guard);
                log::info!(
                    "[MotionEngine] Captured {} = {} deg",
                    outcome.field,
                    outcome.value
                );
                self.persist_thresholds(&snapshot);
                self.emit_event(
                    EngineEventKind::ThresholdCaptured {
                        field: outcome.field,
                        value: outcome.value,
                    },
                    None,
                );
                Ok(true)
            }
            Err(err) => {
                drop(guard);
                log_calibration_error(&err, "capture");
                self.emit_event(EngineEventKind::CaptureRejected, Some(err.to_string()));
                Ok(false)
            }
        }
    }

    /// Restore default thresholds and clear the persisted record.
    pub fn reset_thresholds(&self) -> Result<(), EngineError> {
        let mut guard = self.pipeline()?;
        guard.thresholds = ThresholdSet::new_default();
        drop(guard);

        if let Err(err) = self.storage.remove(ThresholdSet::STORAGE_KEY) {
            log_storage_error(&err, "remove thresholds");
        }

        log::info!("[MotionEngine] Thresholds reset to defaults");
        self.emit_event(EngineEventKind::ThresholdsReset, None);
        Ok(())
    }

    // ========================================================================
    // SESSION CONTROL
    // ========================================================================

    /// Start a fresh session for the given exercise.
    ///
    /// Resets rep state, smoothing buffers, pending suggestions, and the
    /// session accumulator. Thresholds are kept.
    pub fn start_session(&self, exercise: ExerciseKind) -> Result<(), EngineError> {
        let mut guard = self.pipeline()?;
        let pipeline = &mut *guard;
        pipeline.counter = RepCounter::new(exercise);
        pipeline.analyzer.clear();
        pipeline.pending_suggestion = None;
        pipeline.session = SessionAccumulator::begin(Utc::now());
        pipeline.frame_count = 0;
        drop(guard);

        log::info!("[MotionEngine] Session started: {}", exercise);
        self.emit_event(EngineEventKind::SessionStarted { exercise }, None);
        Ok(())
    }

    /// End the current session and return its immutable record.
    ///
    /// A fresh session for the same exercise begins immediately, so the
    /// engine always has an active session.
    pub fn end_session(&self) -> Result<SessionRecord, EngineError> {
        let mut guard = self.pipeline()?;
        let pipeline = &mut *guard;
        let exercise = pipeline.counter.exercise();
        let reps = pipeline.counter.reps();
        let record = pipeline.session.finalize(exercise, reps, Utc::now());

        pipeline.counter = RepCounter::new(exercise);
        pipeline.analyzer.clear();
        pipeline.pending_suggestion = None;
        pipeline.session = SessionAccumulator::begin(Utc::now());
        pipeline.frame_count = 0;
        drop(guard);

        log::info!(
            "[MotionEngine] Session ended: {} reps of {} ({}% confidence)",
            record.reps,
            record.exercise,
            record.confidence_percent
        );
        self.emit_event(
            EngineEventKind::SessionEnded {
                exercise: record.exercise,
                reps: record.reps,
            },
            None,
        );
        Ok(record)
    }

    // ========================================================================
    // INTROSPECTION
    // ========================================================================

    /// Current threshold set (clone of the live values).
    pub fn thresholds(&self) -> Result<ThresholdSet, EngineError> {
        Ok(self.pipeline()?.thresholds.clone())
    }

    /// Exercise the rep counter is currently tracking.
    pub fn active_exercise(&self) -> Result<ExerciseKind, EngineError> {
        Ok(self.pipeline()?.counter.exercise())
    }

    /// Whether exercise auto-detection is enabled.
    pub fn auto_detect_enabled(&self) -> Result<bool, EngineError> {
        Ok(self.pipeline()?.auto_detect)
    }
}

// ========================================================================
// TEST HELPERS
// ========================================================================


impl Default for MotionEngine {
    fn default() -> Self {
        Self::new()
    }
}
