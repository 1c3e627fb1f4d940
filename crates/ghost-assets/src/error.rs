//! Asset loading errors

use ghost_core::GhostError;
use thiserror::Error;

/// Failure to obtain or decode one asset part
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Malformed asset: {0}")]
    Malformed(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AssetError> for GhostError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::Io(e) => GhostError::Io(e),
            other => GhostError::MalformedAsset(other.to_string()),
        }
    }
}
