//! Fixture utilities for the deterministic CLI harness.
//!
//! This module discovers fixture assets, loads recorded landmark frames,
//! parses optional expectation JSON, and replays the frames through a
//! fresh `MotionEngine`. It is intentionally desktop-focused to support
//! CI and QA workflows.
//!
//! Fixture files are JSON Lines: one object per line holding the landmark
//! list for a single frame, in capture order.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::{CueId, ExerciseKind, RepStage};
use crate::config::EngineConfig;
use crate::engine::{FrameResult, MotionEngine};
use crate::pose::Landmark;
use crate::session::SessionRecord;
use crate::storage::MemoryStorage;

/// Default location for fixture JSONL/expectation assets.
pub const DEFAULT_FIXTURE_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures");

/// Metadata describing an available fixture.
#[derive(Clone, Debug)]
pub struct FixtureMetadata {
    pub name: String,
    pub frames_path: PathBuf,
    pub expect_path: Option<PathBuf>,
}

/// Loaded fixture data with decoded landmark frames.
pub struct FixtureData {
    pub metadata: FixtureMetadata,
    pub frames: Vec<Vec<Landmark>>,
    pub expectations: Option<FixtureExpectations>,
}

/// JSON expectation schema for fixture verification.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureExpectations {
    pub fixture: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub exercise: ExerciseKind,
    pub reps: u32,
    pub final_stage: RepStage,
}

impl FixtureExpectations {
    pub fn verify(&self, actual: &ReplaySummary) -> std::result::Result<(), ExpectationDiff> {
        let mut failures = Vec::new();

        if actual.exercise != self.exercise {
            failures.push(ExpectationFailure::new(
                "exercise",
                self.exercise,
                actual.exercise,
            ));
        }
        if actual.reps != self.reps {
            failures.push(ExpectationFailure::new("reps", self.reps, actual.reps));
        }
        if actual.final_stage != self.final_stage {
            failures.push(ExpectationFailure::new(
                "final_stage",
                format!("{:?}", self.final_stage),
                format!("{:?}", actual.final_stage),
            ));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ExpectationDiff { failures })
        }
    }
}

/// Outcome of comparing actual results with expectations.
#[derive(Debug)]
pub struct ExpectationDiff {
    pub failures: Vec<ExpectationFailure>,
}

impl ExpectationDiff {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "failures": self.failures.iter().map(|failure| {
                serde_json::json!({
                    "field": failure.field,
                    "expected": failure.expected,
                    "actual": failure.actual,
                })
            }).collect::<Vec<_>>()
        })
    }
}

/// Detailed diff entry for a single mismatched field.
#[derive(Debug)]
pub struct ExpectationFailure {
    pub field: &'static str,
    pub expected: String,
    pub actual: String,
}

impl ExpectationFailure {
    fn new(field: &'static str, expected: impl ToString, actual: impl ToString) -> Self {
        Self {
            field,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Per-exercise count of surfaced auto-detection suggestions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SuggestionTally {
    pub bicep: u32,
    pub squat: u32,
    pub pushup: u32,
    pub latpulldown: u32,
}

impl SuggestionTally {
    pub fn record(&mut self, kind: ExerciseKind) {
        match kind {
            ExerciseKind::Bicep => self.bicep += 1,
            ExerciseKind::Squat => self.squat += 1,
            ExerciseKind::Pushup => self.pushup += 1,
            ExerciseKind::LatPulldown => self.latpulldown += 1,
        }
    }

    pub fn count_for(&self, kind: ExerciseKind) -> u32 {
        match kind {
            ExerciseKind::Bicep => self.bicep,
            ExerciseKind::Squat => self.squat,
            ExerciseKind::Pushup => self.pushup,
            ExerciseKind::LatPulldown => self.latpulldown,
        }
    }

    pub fn total(&self) -> u32 {
        self.bicep + self.squat + self.pushup + self.latpulldown
    }
}

/// Aggregated outcome of replaying one fixture.
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub fixture: String,
    pub exercise: ExerciseKind,
    pub frames: u32,
    pub reps: u32,
    pub final_stage: RepStage,
    pub final_cue: CueId,
    pub suggestions: SuggestionTally,
    pub session: SessionRecord,
}

impl ReplaySummary {
    pub fn from_frames(
        fixture: &str,
        exercise: ExerciseKind,
        frames: &[FrameResult],
        session: SessionRecord,
    ) -> Self {
        let mut suggestions = SuggestionTally::default();
        for result in frames {
            if let Some(suggestion) = result.suggestion {
                suggestions.record(suggestion.candidate);
            }
        }

        let last = frames.last();
        Self {
            fixture: fixture.to_string(),
            exercise,
            frames: frames.len() as u32,
            reps: last.map(|result| result.rep_count).unwrap_or(0),
            final_stage: last
                .map(|result| result.stage)
                .unwrap_or(RepStage::Uninitialized),
            final_cue: last.map(|result| result.cue).unwrap_or(CueId::GetReady),
            suggestions,
            session,
        }
    }
}

/// Catalog responsible for discovering fixtures on disk.
pub struct FixtureCatalog {
    root: PathBuf,
}

impl FixtureCatalog {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List all fixtures by their metadata.
    pub fn discover(&self) -> Result<Vec<FixtureMetadata>> {
        let mut fixtures = Vec::new();
        if !self.root.exists() {
            return Ok(fixtures);
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) == Some("jsonl") {
                    let expect = path.with_extension("expect.json");
                    fixtures.push(FixtureMetadata {
                        name: path
                            .file_stem()
                            .and_then(|s| s.to_str())
                            .unwrap_or_default()
                            .to_string(),
                        frames_path: path.clone(),
                        expect_path: expect.exists().then_some(expect),
                    });
                }
            }
        }

        fixtures.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(fixtures)
    }

    /// Load fixture frames + expectations for provided name or path.
    pub fn load(&self, fixture: &str, override_expect: Option<PathBuf>) -> Result<FixtureData> {
        let frames_path = self.resolve_fixture_path(fixture)?;
        let metadata = self.metadata_for_path(&frames_path)?;
        let frames = read_frames(&frames_path)?;

        let expectation_path = override_expect.or(metadata.expect_path.clone());
        let expectations = match expectation_path {
            Some(path) => {
                let json = fs::read_to_string(&path)
                    .with_context(|| format!("reading expectation {}", path.display()))?;
                Some(
                    serde_json::from_str(&json)
                        .with_context(|| format!("parsing {}", path.display()))?,
                )
            }
            None => None,
        };

        Ok(FixtureData {
            metadata,
            frames,
            expectations,
        })
    }

    fn resolve_fixture_path(&self, fixture: &str) -> Result<PathBuf> {
        let as_path = Path::new(fixture);
        if as_path.exists() {
            return Ok(as_path.to_path_buf());
        }

        let candidate = self.root.join(format!("{fixture}.jsonl"));
        if candidate.exists() {
            Ok(candidate)
        } else {
            Err(anyhow!(
                "Fixture '{fixture}' not found in {}",
                self.root.display()
            ))
        }
    }

    fn metadata_for_path(&self, frames_path: &Path) -> Result<FixtureMetadata> {
        let name = frames_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("Invalid fixture name for {}", frames_path.display()))?
            .to_string();
        let expect_path = frames_path.with_extension("expect.json");
        Ok(FixtureMetadata {
            name,
            frames_path: frames_path.to_path_buf(),
            expect_path: expect_path.exists().then_some(expect_path),
        })
    }
}

impl Default for FixtureCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_FIXTURE_ROOT)
    }
}

/// Replays fixtures by feeding recorded frames through a fresh engine.
pub struct FixtureProcessor {
    config: EngineConfig,
    exercise: ExerciseKind,
    auto_detect: bool,
}

impl FixtureProcessor {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            exercise: ExerciseKind::Bicep,
            auto_detect: true,
        }
    }

    pub fn with_exercise(mut self, exercise: ExerciseKind) -> Self {
        self.exercise = exercise;
        self
    }

    pub fn with_auto_detect(mut self, enabled: bool) -> Self {
        self.auto_detect = enabled;
        self
    }

    /// Replay the fixture and aggregate the outcome.
    pub fn run(&self, data: &FixtureData) -> Result<ReplaySummary> {
        let (frames, session) = self.drive(data)?;
        Ok(ReplaySummary::from_frames(
            &data.metadata.name,
            self.exercise,
            &frames,
            session,
        ))
    }

    /// Replay the fixture and return every per-frame result.
    pub fn run_frames(&self, data: &FixtureData) -> Result<Vec<FrameResult>> {
        Ok(self.drive(data)?.0)
    }

    fn drive(&self, data: &FixtureData) -> Result<(Vec<FrameResult>, SessionRecord)> {
        let engine =
            MotionEngine::with_storage(self.config.clone(), Arc::new(MemoryStorage::new()));
        engine.start_session(self.exercise)?;
        engine.set_auto_detect(self.auto_detect)?;

        let mut frames = Vec::with_capacity(data.frames.len());
        for frame in &data.frames {
            frames.push(engine.process_frame(frame)?);
        }

        let session = engine.end_session()?;
        Ok((frames, session))
    }
}

/// One line of a fixture file: the landmark list for a single frame.
#[derive(Debug, Clone, Deserialize)]
struct FrameRecord {
    landmarks: Vec<Landmark>,
}

fn read_frames(path: &Path) -> Result<Vec<Vec<Landmark>>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let mut frames = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record: FrameRecord = serde_json::from_str(trimmed)
            .with_context(|| format!("parsing {} line {}", path.display(), idx + 1))?;
        frames.push(record.landmarks);
    }

    Ok(frames)
}
