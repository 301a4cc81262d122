//! Session settings
//!
//! Loaded from a JSON file by the runner. Every field has a default, so a
//! partial file (or none at all) is fine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, MIN_PLACEMENT_DISTANCE_FROM_CORE, PLACEMENT_MARGIN};

/// Errors from loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(&'static str),
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for the gameplay and particle RNG streams
    pub seed: u64,

    // === Arena ===
    pub arena_width: f64,
    pub arena_height: f64,

    // === Economy ===
    /// Funds on first start and after every restart
    pub starting_money: f64,
    /// Warriors placed on a ring around the core at start
    pub starting_warriors: u32,
    pub starting_ring_radius: f64,

    // === Timing ===
    /// Frame time is clamped to this before the speed multiplier.
    /// `None` feeds wall-clock time through unclamped.
    pub max_frame_dt_ms: Option<f64>,

    // === Visual Effects ===
    /// Particle effects (hit sparks, splashes, reward sparkles)
    pub particles: bool,
    /// Oldest particles are evicted beyond this
    pub max_particles: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x00c0_5e1e,
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            starting_money: 250.0,
            starting_warriors: 3,
            starting_ring_radius: 80.0,
            max_frame_dt_ms: Some(100.0),
            particles: true,
            max_particles: 500,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json_pretty(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Effective particle cap (zero when particles are off)
    pub fn particle_budget(&self) -> usize {
        if self.particles { self.max_particles } else { 0 }
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let min_side = 2.0 * (MIN_PLACEMENT_DISTANCE_FROM_CORE + PLACEMENT_MARGIN);
        if !(self.arena_width.is_finite() && self.arena_height.is_finite()) {
            return Err(SettingsError::Invalid("arena size must be finite"));
        }
        if self.arena_width < min_side || self.arena_height < min_side {
            return Err(SettingsError::Invalid("arena is too small to place units"));
        }
        if !self.starting_money.is_finite() || self.starting_money < 0.0 {
            return Err(SettingsError::Invalid("starting_money must be non-negative"));
        }
        if self.max_frame_dt_ms.is_some_and(|dt| !(dt.is_finite() && dt > 0.0)) {
            return Err(SettingsError::Invalid("max_frame_dt_ms must be positive"));
        }
        Ok(())
    }
}
