//! Workout session accumulation.
//!
//! A session spans from one start to the next end action. The accumulator
//! tracks the start instant and averages the classifier scores observed
//! along the way; rep counts stay in the rep counter and are read at
//! finalization. A finalized record is immutable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::ExerciseKind;

/// Confidence percent reported when a session observed no classifier
/// scores at all. Carried over from earlier releases, which always
/// stamped this fixed value.
const DEFAULT_CONFIDENCE_PERCENT: u32 = 85;

/// Finished workout session record
///
/// `date` is the session end instant and serializes as an RFC 3339
/// timestamp, so records sort lexicographically by time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub date: DateTime<Utc>,
    pub exercise: ExerciseKind,
    pub reps: u32,
    #[serde(rename = "confidencePercent")]
    pub confidence_percent: u32,
}

/// Running state for the session in progress
#[derive(Debug, Clone)]
pub struct SessionAccumulator {
    started_at: DateTime<Utc>,
    confidence_sum: f64,
    confidence_samples: u64,
}

impl SessionAccumulator {
    pub fn begin(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            confidence_sum: 0.0,
            confidence_samples: 0,
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Record one classifier score for the session average.
    pub fn observe_confidence(&mut self, score: f32) {
        self.confidence_sum += f64::from(score.clamp(0.0, 1.0));
        self.confidence_samples += 1;
    }

    /// Build the immutable record for a session ending now.
    pub fn finalize(&self, exercise: ExerciseKind, reps: u32, ended_at: DateTime<Utc>) -> SessionRecord {
        let confidence_percent = if self.confidence_samples == 0 {
            DEFAULT_CONFIDENCE_PERCENT
        } else {
            let mean = self.confidence_sum / self.confidence_samples as f64;
            (mean * 100.0).round() as u32
        };
        SessionRecord {
            date: ended_at,
            exercise,
            reps,
            confidence_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, secs).unwrap()
    }

    #[test]
    fn test_finalize_without_scores_uses_default_confidence() {
        let accumulator = SessionAccumulator::begin(instant(0));
        let record = accumulator.finalize(ExerciseKind::Bicep, 12, instant(30));

        assert_eq!(record.exercise, ExerciseKind::Bicep);
        assert_eq!(record.reps, 12);
        assert_eq!(record.confidence_percent, DEFAULT_CONFIDENCE_PERCENT);
        assert_eq!(record.date, instant(30));
    }

    #[test]
    fn test_confidence_percent_averages_scores() {
        let mut accumulator = SessionAccumulator::begin(instant(0));
        accumulator.observe_confidence(0.4);
        accumulator.observe_confidence(0.6);

        let record = accumulator.finalize(ExerciseKind::Squat, 5, instant(45));
        assert_eq!(record.confidence_percent, 50);
    }

    #[test]
    fn test_confidence_scores_are_clamped() {
        let mut accumulator = SessionAccumulator::begin(instant(0));
        accumulator.observe_confidence(1.7);

        let record = accumulator.finalize(ExerciseKind::Squat, 1, instant(10));
        assert_eq!(record.confidence_percent, 100);
    }

    #[test]
    fn test_record_serializes_date_as_rfc3339() {
        let record = SessionRecord {
            date: instant(5),
            exercise: ExerciseKind::LatPulldown,
            reps: 8,
            confidence_percent: 85,
        };
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains("2025-03-14T09:26:05"));
        assert!(json.contains("\"exercise\":\"latpulldown\""));
        assert!(json.contains("\"confidencePercent\":85"));

        let parsed: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_started_at_is_preserved() {
        let accumulator = SessionAccumulator::begin(instant(2));
        assert_eq!(accumulator.started_at(), instant(2));
    }
}
