//! Trainer configuration
//!
//! The threshold and timing values are tuning constants, not derived ones.
//! Every field may be omitted from a configuration file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{GhostError, GhostResult, PoseCycle};

/// Trainer configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Score a tick must exceed to count as matching
    pub similarity_threshold: f32,
    /// Continuous matching time required to complete a stage
    pub hold_ms: u64,
    /// Pause between a completed stage and the next one
    pub cooldown_ms: u64,
    /// Overlay height never exceeds this multiple of the canvas height
    pub max_overlay_height_factor: f32,
    /// Overlay alpha while matching
    pub active_alpha: f32,
    /// Overlay alpha for the next-stage preview during cooldown
    pub preview_alpha: f32,
    /// Pose types the operator cycles through
    pub pose_cycle: PoseCycle,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            similarity_threshold: 0.85,
            hold_ms: 500,
            cooldown_ms: 2000,
            max_overlay_height_factor: 2.5,
            active_alpha: 0.4,
            preview_alpha: 0.2,
            pose_cycle: PoseCycle::default(),
        }
    }
}

impl TrainerConfig {
    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> GhostResult<Self> {
        let config: TrainerConfig = serde_json::from_str(json)
            .map_err(|e| GhostError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> GhostResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> GhostResult<()> {
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return Err(GhostError::InvalidConfig(format!(
                "similarity_threshold {} outside [-1, 1]",
                self.similarity_threshold
            )));
        }
        for (name, alpha) in [
            ("active_alpha", self.active_alpha),
            ("preview_alpha", self.preview_alpha),
        ] {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(GhostError::InvalidConfig(format!(
                    "{name} {alpha} outside [0, 1]"
                )));
            }
        }
        let factor = self.max_overlay_height_factor;
        if factor.is_nan() || factor <= 0.0 {
            return Err(GhostError::InvalidConfig(format!(
                "max_overlay_height_factor {factor} must be positive"
            )));
        }
        Ok(())
    }
}
