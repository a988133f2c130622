//! Configuration management for dynamic parameter tuning
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling fast iteration without recompilation. Key parameters for
//! angle smoothing, visibility gating, and exercise classification can
//! be adjusted via the config file for rapid experimentation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub smoothing: SmoothingConfig,
    pub visibility: VisibilityConfig,
    pub classifier: ClassifierConfig,
}

/// Rolling-window angle smoothing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Window size in frames for elbow channels
    pub elbow_window: usize,
    /// Window size in frames for knee channels
    pub knee_window: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            elbow_window: 5,
            // Knees get a wider window; leg landmarks jitter more than arms
            knee_window: 7,
        }
    }
}

/// Per-channel landmark visibility gates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityConfig {
    /// Minimum visibility for all three elbow-channel landmarks
    pub elbow_min: f32,
    /// Minimum visibility for all three knee-channel landmarks
    pub knee_min: f32,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            elbow_min: 0.5,
            knee_min: 0.6,
        }
    }
}

/// Heuristic exercise classifier breakpoints and score weights
///
/// Angles and tilts are in degrees. Scores accumulate per exercise and
/// the best total becomes the candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Knee angle below this reads as a deep squat position
    pub deep_knee_max: f32,
    /// Knee angle below this (but not deep) reads as a partial bend
    pub bent_knee_max: f32,
    pub deep_knee_score: f32,
    pub bent_knee_score: f32,
    pub straight_knee_score: f32,
    /// Elbow angle below this reads as a full flex
    pub flexed_elbow_max: f32,
    /// Elbow angle below this (but not flexed) reads as a partial curl
    pub curled_elbow_max: f32,
    pub flexed_elbow_score: f32,
    pub curled_elbow_score: f32,
    pub extended_elbow_score: f32,
    /// Torso tilt below this turns a full elbow flex into a pushup vote
    pub pushup_tilt_max: f32,
    /// Torso tilt below this earns the flat-posture bonus
    pub flat_torso_tilt_max: f32,
    pub flat_torso_score: f32,
    pub upright_torso_score: f32,
    /// Small extra vote when the right-side joint confirms the movement
    pub right_side_bonus: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            deep_knee_max: 120.0,
            bent_knee_max: 140.0,
            deep_knee_score: 0.9,
            bent_knee_score: 0.4,
            straight_knee_score: 0.1,
            flexed_elbow_max: 100.0,
            curled_elbow_max: 140.0,
            flexed_elbow_score: 0.9,
            curled_elbow_score: 0.3,
            extended_elbow_score: 0.2,
            pushup_tilt_max: 45.0,
            flat_torso_tilt_max: 40.0,
            flat_torso_score: 0.3,
            upright_torso_score: 0.1,
            right_side_bonus: 0.05,
        }
    }
}

impl Default for EngineConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            smoothing: SmoothingConfig::default(),
            visibility: VisibilityConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// * `Ok(EngineConfig)` - Loaded configuration
    /// * `Err` - If file doesn't exist or JSON is invalid, returns default config
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default assets location
    pub fn load() -> Self {
        Self::load_from_file("assets/engine_config.json")
    }
}
