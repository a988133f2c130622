//! Integration tests for the MotionEngine frame pipeline
//!
//! These tests validate the full frame-processing lifecycle across the Rust
//! layer, including:
//! - Rep counting through smoothed angle crossings
//! - Exercise switching and state resets
//! - Auto-detection suggestions and acceptance
//! - Session records and confidence accumulation
//! - Telemetry events
//!
//! Frames are built geometrically so every angle flows through the real
//! landmark math rather than being injected directly.

use std::sync::Arc;

use rep_trainer::analysis::{CueId, ExerciseKind, RepStage};
use rep_trainer::config::EngineConfig;
use rep_trainer::engine::{EngineEventKind, FrameResult, MotionEngine};
use rep_trainer::pose::{self, Landmark};
use rep_trainer::storage::MemoryStorage;

/// Build a 33-landmark frame with the requested joint angles.
///
/// Each joint vertex hangs below its anchor landmark and the outer landmark
/// is rotated off the anchor ray by the requested angle, so the geometry
/// path reads back exactly the given value. `upright` positions the
/// shoulders above the hips; otherwise the torso lies horizontal with the
/// shoulders toward +x (plank orientation).
fn build_frame(
    left_elbow: f32,
    right_elbow: f32,
    left_knee: f32,
    right_knee: f32,
    upright: bool,
) -> Vec<Landmark> {
    let mut frame = vec![Landmark::new(0.5, 0.5, 0.0, 0.9); pose::POSE_LANDMARK_COUNT];

    if upright {
        place(&mut frame, pose::LEFT_SHOULDER, 0.45, 0.30);
        place(&mut frame, pose::RIGHT_SHOULDER, 0.55, 0.30);
        place(&mut frame, pose::LEFT_HIP, 0.46, 0.55);
        place(&mut frame, pose::RIGHT_HIP, 0.54, 0.55);
    } else {
        place(&mut frame, pose::LEFT_SHOULDER, 0.75, 0.48);
        place(&mut frame, pose::RIGHT_SHOULDER, 0.75, 0.52);
        place(&mut frame, pose::LEFT_HIP, 0.50, 0.48);
        place(&mut frame, pose::RIGHT_HIP, 0.50, 0.52);
    }

    set_joint(
        &mut frame,
        pose::LEFT_SHOULDER,
        pose::LEFT_ELBOW,
        pose::LEFT_WRIST,
        left_elbow,
    );
    set_joint(
        &mut frame,
        pose::RIGHT_SHOULDER,
        pose::RIGHT_ELBOW,
        pose::RIGHT_WRIST,
        right_elbow,
    );
    set_joint(
        &mut frame,
        pose::LEFT_HIP,
        pose::LEFT_KNEE,
        pose::LEFT_ANKLE,
        left_knee,
    );
    set_joint(
        &mut frame,
        pose::RIGHT_HIP,
        pose::RIGHT_KNEE,
        pose::RIGHT_ANKLE,
        right_knee,
    );

    frame
}

fn place(frame: &mut [Landmark], index: usize, x: f32, y: f32) {
    frame[index] = Landmark::new(x, y, 0.0, 0.95);
}

fn set_joint(frame: &mut [Landmark], anchor: usize, vertex: usize, outer: usize, angle_deg: f32) {
    let anchor_pos = frame[anchor];
    let vx = anchor_pos.x;
    let vy = anchor_pos.y + 0.20;
    place(frame, vertex, vx, vy);

    let ray = (angle_deg - 90.0).to_radians();
    place(frame, outer, vx + 0.18 * ray.cos(), vy + 0.18 * ray.sin());
}

/// Upright frame with identical left/right angles per joint family.
fn upright_frame(elbow_deg: f32, knee_deg: f32) -> Vec<Landmark> {
    build_frame(elbow_deg, elbow_deg, knee_deg, knee_deg, true)
}

/// Horizontal-torso frame (plank orientation).
fn prone_frame(elbow_deg: f32, knee_deg: f32) -> Vec<Landmark> {
    build_frame(elbow_deg, elbow_deg, knee_deg, knee_deg, false)
}

fn test_engine() -> MotionEngine {
    MotionEngine::with_storage(EngineConfig::default(), Arc::new(MemoryStorage::new()))
}

/// Feed the same frame `count` times and return the last result.
fn feed(engine: &MotionEngine, frame: &[Landmark], count: usize) -> FrameResult {
    let mut last = None;
    for _ in 0..count {
        last = Some(engine.process_frame(frame).expect("process_frame"));
    }
    last.expect("at least one frame")
}

#[test]
fn test_engine_creation() {
    let engine = test_engine();
    assert_eq!(engine.active_exercise().unwrap(), ExerciseKind::Bicep);
    assert!(!engine.auto_detect_enabled().unwrap());
}

#[test]
fn test_empty_frame_yields_no_signal() {
    let engine = test_engine();
    let result = engine.process_frame(&[]).expect("process_frame");

    assert_eq!(result.stage, RepStage::Uninitialized);
    assert_eq!(result.cue, CueId::GetReady);
    assert_eq!(result.rep_count, 0);
    assert_eq!(result.angles.left_elbow, None);
    assert_eq!(result.angles.right_knee, None);
}

#[test]
fn test_bicep_rep_cycle() {
    let engine = test_engine();

    // Extended arms: smoothed elbow crosses the down threshold immediately
    let down = feed(&engine, &upright_frame(170.0, 170.0), 5);
    assert_eq!(down.stage, RepStage::Down, "extended arm should read down");
    assert_eq!(down.cue, CueId::CurlUp);
    assert_eq!(down.rep_count, 0);

    // Full curl: the 5-sample window needs 5 frames to flush the old values
    let up = feed(&engine, &upright_frame(20.0, 170.0), 5);
    assert_eq!(up.stage, RepStage::Up, "curled arm should read up");
    assert_eq!(up.cue, CueId::LowerDown);
    assert_eq!(up.rep_count, 1, "down-to-up transition counts one rep");

    // Back to extended: stage flips but the count holds
    let again = feed(&engine, &upright_frame(170.0, 170.0), 5);
    assert_eq!(again.stage, RepStage::Down);
    assert_eq!(again.cue, CueId::CurlUp);
    assert_eq!(again.rep_count, 1);
}

#[test]
fn test_bicep_rep_increments_on_single_frame() {
    let engine = test_engine();
    feed(&engine, &upright_frame(170.0, 170.0), 5);

    let frame = upright_frame(20.0, 170.0);
    let mut increments = 0;
    let mut previous = 0;
    for _ in 0..8 {
        let result = engine.process_frame(&frame).expect("process_frame");
        if result.rep_count > previous {
            increments += 1;
        }
        previous = result.rep_count;
    }
    assert_eq!(increments, 1, "holding the up position must not re-count");
    assert_eq!(previous, 1);
}

#[test]
fn test_squat_rep_cycle() {
    let engine = test_engine();
    engine.set_exercise(ExerciseKind::Squat).unwrap();

    // Standing tall: knees over the stand threshold, no rep from uninitialized
    let standing = feed(&engine, &upright_frame(170.0, 170.0), 7);
    assert_eq!(standing.stage, RepStage::Up);
    assert_eq!(standing.cue, CueId::SquatDown);
    assert_eq!(standing.rep_count, 0);

    // Deep squat: the 7-sample knee window needs 7 frames to flush
    let bottom = feed(&engine, &upright_frame(170.0, 90.0), 7);
    assert_eq!(bottom.stage, RepStage::Down);
    assert_eq!(bottom.cue, CueId::StandUp);
    assert_eq!(bottom.rep_count, 0);

    // Stand back up: rep counted on the up transition
    let top = feed(&engine, &upright_frame(170.0, 170.0), 7);
    assert_eq!(top.stage, RepStage::Up);
    assert_eq!(top.cue, CueId::SquatDown);
    assert_eq!(top.rep_count, 1);
}

#[test]
fn test_set_exercise_resets_rep_state() {
    let engine = test_engine();

    // Complete one bicep rep
    feed(&engine, &upright_frame(170.0, 170.0), 5);
    let result = feed(&engine, &upright_frame(20.0, 170.0), 5);
    assert_eq!(result.rep_count, 1);

    engine.set_exercise(ExerciseKind::Squat).unwrap();
    assert_eq!(engine.active_exercise().unwrap(), ExerciseKind::Squat);

    let fresh = engine
        .process_frame(&upright_frame(130.0, 130.0))
        .expect("process_frame");
    assert_eq!(fresh.rep_count, 0, "switching exercises must reset the count");
    assert_eq!(fresh.stage, RepStage::Uninitialized);
    assert_eq!(fresh.cue, CueId::GetReady);
}

#[test]
fn test_set_exercise_same_keeps_state() {
    let engine = test_engine();

    feed(&engine, &upright_frame(170.0, 170.0), 5);
    let before = feed(&engine, &upright_frame(20.0, 170.0), 5);
    assert_eq!(before.rep_count, 1);

    engine.set_exercise(ExerciseKind::Bicep).unwrap();

    let after = engine
        .process_frame(&upright_frame(20.0, 170.0))
        .expect("process_frame");
    assert_eq!(after.rep_count, 1, "re-selecting the active exercise is a no-op");
    assert_eq!(after.stage, RepStage::Up);
}

#[test]
fn test_auto_detect_surfaces_squat_suggestion() {
    let engine = test_engine();
    engine.set_auto_detect(true).unwrap();

    // Deep knees and extended elbows while bicep is active
    let result = engine
        .process_frame(&upright_frame(170.0, 80.0))
        .expect("process_frame");

    let suggestion = result.suggestion.expect("expected a suggestion");
    assert_eq!(suggestion.candidate, ExerciseKind::Squat);
    assert!(
        suggestion.score > 0.9,
        "deep knee should score high, got {}",
        suggestion.score
    );
}

#[test]
fn test_low_scores_do_not_surface_suggestions() {
    let engine = test_engine();
    engine.set_auto_detect(true).unwrap();

    // Nearly-extended elbows and straight knees: best candidate stays at 0.2
    let result = engine
        .process_frame(&upright_frame(150.0, 170.0))
        .expect("process_frame");

    assert!(result.suggestion.is_none());
    assert!(!engine.accept_suggestion().unwrap());
}

#[test]
fn test_suggestion_suppressed_for_active_exercise() {
    let engine = test_engine();
    engine.set_exercise(ExerciseKind::Squat).unwrap();
    engine.set_auto_detect(true).unwrap();

    let result = engine
        .process_frame(&upright_frame(170.0, 80.0))
        .expect("process_frame");

    assert!(
        result.suggestion.is_none(),
        "the already-active exercise must not be suggested"
    );
}

#[test]
fn test_auto_detect_disabled_suppresses_suggestions() {
    let engine = test_engine();

    let result = engine
        .process_frame(&upright_frame(170.0, 80.0))
        .expect("process_frame");
    assert!(result.suggestion.is_none());
}

#[test]
fn test_accept_suggestion_switches_exercise() {
    let engine = test_engine();
    engine.set_auto_detect(true).unwrap();

    engine
        .process_frame(&upright_frame(170.0, 80.0))
        .expect("process_frame");

    assert!(engine.accept_suggestion().unwrap());
    assert_eq!(engine.active_exercise().unwrap(), ExerciseKind::Squat);

    // The pending slot is consumed on acceptance
    assert!(!engine.accept_suggestion().unwrap());
}

#[test]
fn test_disabling_auto_detect_discards_pending_suggestion() {
    let engine = test_engine();
    engine.set_auto_detect(true).unwrap();

    engine
        .process_frame(&upright_frame(170.0, 80.0))
        .expect("process_frame");

    engine.set_auto_detect(false).unwrap();
    assert!(!engine.accept_suggestion().unwrap());
    assert_eq!(engine.active_exercise().unwrap(), ExerciseKind::Bicep);
}

#[test]
fn test_pushup_classification_in_plank() {
    let engine = test_engine();
    engine.set_auto_detect(true).unwrap();

    // Bent elbows with a horizontal torso reads as a push-up
    let result = engine
        .process_frame(&prone_frame(90.0, 170.0))
        .expect("process_frame");

    let suggestion = result.suggestion.expect("expected a suggestion");
    assert_eq!(suggestion.candidate, ExerciseKind::Pushup);
    assert!(suggestion.score <= 1.0, "scores are capped at 1.0");
}

#[test]
fn test_session_record_without_classifier_samples() {
    let engine = test_engine();
    engine.start_session(ExerciseKind::Bicep).unwrap();

    feed(&engine, &upright_frame(170.0, 170.0), 5);
    feed(&engine, &upright_frame(20.0, 170.0), 5);

    let record = engine.end_session().expect("end_session");
    assert_eq!(record.exercise, ExerciseKind::Bicep);
    assert_eq!(record.reps, 1);
    assert_eq!(
        record.confidence_percent, 85,
        "sessions without classifier samples report the default confidence"
    );
}

#[test]
fn test_session_confidence_tracks_classifier_scores() {
    let engine = test_engine();
    engine.start_session(ExerciseKind::Squat).unwrap();
    engine.set_auto_detect(true).unwrap();

    // Every frame scores squat at 0.95 (deep knee + right-side agreement)
    feed(&engine, &upright_frame(170.0, 80.0), 10);

    let record = engine.end_session().expect("end_session");
    assert_eq!(record.exercise, ExerciseKind::Squat);
    assert_eq!(record.confidence_percent, 95);
}

#[test]
fn test_end_session_resets_for_next_session() {
    let engine = test_engine();
    engine.start_session(ExerciseKind::Bicep).unwrap();

    feed(&engine, &upright_frame(170.0, 170.0), 5);
    feed(&engine, &upright_frame(20.0, 170.0), 5);
    let record = engine.end_session().expect("end_session");
    assert_eq!(record.reps, 1);

    // A fresh session for the same exercise starts immediately
    let result = engine
        .process_frame(&upright_frame(20.0, 170.0))
        .expect("process_frame");
    assert_eq!(result.rep_count, 0);
    assert_eq!(engine.active_exercise().unwrap(), ExerciseKind::Bicep);
}

#[test]
fn test_exercise_change_emits_event() {
    let engine = test_engine();
    let mut events = engine.events_receiver();

    engine.set_exercise(ExerciseKind::LatPulldown).unwrap();

    let event = events.try_recv().expect("expected an event");
    assert!(matches!(
        event.kind,
        EngineEventKind::ExerciseChanged {
            exercise: ExerciseKind::LatPulldown
        }
    ));
}

#[test]
fn test_rep_count_emits_event() {
    let engine = test_engine();
    let mut events = engine.events_receiver();

    feed(&engine, &upright_frame(170.0, 170.0), 5);
    feed(&engine, &upright_frame(20.0, 170.0), 5);

    let mut saw_rep = false;
    while let Ok(event) = events.try_recv() {
        if matches!(
            event.kind,
            EngineEventKind::RepCounted {
                exercise: ExerciseKind::Bicep,
                count: 1
            }
        ) {
            saw_rep = true;
        }
    }
    assert!(saw_rep, "expected a RepCounted event for the bicep rep");
}

#[test]
fn test_session_events_emitted() {
    let engine = test_engine();
    let mut events = engine.events_receiver();

    engine.start_session(ExerciseKind::Squat).unwrap();
    let record = engine.end_session().expect("end_session");
    assert_eq!(record.reps, 0);

    let mut saw_start = false;
    let mut saw_end = false;
    while let Ok(event) = events.try_recv() {
        match event.kind {
            EngineEventKind::SessionStarted {
                exercise: ExerciseKind::Squat,
            } => saw_start = true,
            EngineEventKind::SessionEnded {
                exercise: ExerciseKind::Squat,
                reps: 0,
            } => saw_end = true,
            _ => {}
        }
    }
    assert!(saw_start, "expected SessionStarted");
    assert!(saw_end, "expected SessionEnded");
}

#[test]
fn test_frame_results_are_forwarded_to_subscribers() {
    let engine = test_engine();
    let mut rx = engine.subscribe_frame_results();

    let sent = engine
        .process_frame(&upright_frame(170.0, 170.0))
        .expect("process_frame");
    let received = rx.blocking_recv().expect("expected a forwarded frame result");

    assert_eq!(received, sent);
}

#[test]
fn test_suggestions_are_forwarded_to_subscribers() {
    let engine = test_engine();
    engine.set_auto_detect(true).unwrap();
    let mut rx = engine.subscribe_suggestions();

    engine
        .process_frame(&upright_frame(170.0, 80.0))
        .expect("process_frame");
    let suggestion = rx.blocking_recv().expect("expected a forwarded suggestion");

    assert_eq!(suggestion.candidate, ExerciseKind::Squat);
}

#[tokio::test]
async fn test_frame_results_stream_yields_results() {
    use futures::StreamExt;

    let engine = test_engine();
    let mut stream = engine.frame_results_stream().await;

    let sent = engine
        .process_frame(&upright_frame(170.0, 170.0))
        .expect("process_frame");
    let received = stream.next().await.expect("stream should yield a result");

    assert_eq!(received, sent);
}
