//! Error types for the trainer

use thiserror::Error;

use crate::{PoseType, Stage};

/// Core trainer errors
///
/// Per-tick conditions (no person in frame, degenerate torso) are not errors;
/// they are carried as values by the scorer and the aligner.
#[derive(Error, Debug)]
pub enum GhostError {
    // Lookup errors
    #[error("Invalid pose: {0}")]
    InvalidPoseType(String),

    #[error("Invalid stage: {0}")]
    InvalidStage(i64),

    #[error("Invalid type: {0}")]
    InvalidAssetKind(String),

    // Asset errors
    #[error("Assets unavailable for {pose} stage {stage}: {reason}")]
    AssetUnavailable {
        pose: PoseType,
        stage: Stage,
        reason: String,
    },

    #[error("Malformed asset: {0}")]
    MalformedAsset(String),

    // Session errors
    #[error("Trainer is not active")]
    NotActive,

    // Replay errors
    #[error("Malformed recording at line {line}: {reason}")]
    MalformedRecording { line: usize, reason: String },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for trainer operations
pub type GhostResult<T> = Result<T, GhostError>;
