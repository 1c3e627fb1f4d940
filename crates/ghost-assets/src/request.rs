//! Asset lookup contract
//!
//! Request: `(pose, type ∈ {meta, target}, stage ∈ 0..=3)`.
//! Response: an HTTP-style status plus a JSON body. Failures carry
//! `{"error": "..."}`.

use std::fmt;
use std::str::FromStr;

use ghost_core::{GhostError, GhostResult, PoseType, Stage};
use serde::Serialize;

/// Kind of JSON asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// `[torsoRatio, hipAnchorX, hipAnchorY]`
    Meta,
    /// 33 `[x, y]` pairs
    Target,
}

impl AssetKind {
    pub fn name(self) -> &'static str {
        match self {
            AssetKind::Meta => "meta",
            AssetKind::Target => "target",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssetKind {
    type Err = GhostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meta" => Ok(AssetKind::Meta),
            "target" => Ok(AssetKind::Target),
            other => Err(GhostError::InvalidAssetKind(other.to_string())),
        }
    }
}

/// A validated lookup request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetRequest {
    pub pose: PoseType,
    pub kind: AssetKind,
    pub stage: Stage,
}

impl AssetRequest {
    pub fn new(pose: PoseType, kind: AssetKind, stage: Stage) -> Self {
        Self { pose, kind, stage }
    }

    pub fn meta(pose: PoseType, stage: Stage) -> Self {
        Self::new(pose, AssetKind::Meta, stage)
    }

    pub fn target(pose: PoseType, stage: Stage) -> Self {
        Self::new(pose, AssetKind::Target, stage)
    }

    /// Validate raw query parameters
    ///
    /// Checked in order: pose, type, stage. A stage that is not a number
    /// reads as 0.
    pub fn from_query(pose: &str, kind: &str, stage: &str) -> GhostResult<Self> {
        let pose: PoseType = pose.parse()?;
        let kind: AssetKind = kind.parse()?;
        let index = parse_leading_int(stage);
        let stage = u8::try_from(index)
            .ok()
            .and_then(Stage::new)
            .ok_or(GhostError::InvalidStage(index))?;
        Ok(Self { pose, kind, stage })
    }
}

impl fmt::Display for AssetRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}_{}", self.pose, self.kind, self.stage)
    }
}

/// Leading integer of a query value: optional sign then digits, else 0
fn parse_leading_int(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<i64>()
        .map(|v| sign * v)
        .unwrap_or(if end == 0 { 0 } else { i64::MAX })
}

/// Response of the lookup API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl AssetResponse {
    pub const OK: u16 = 200;
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_FOUND: u16 = 404;
    pub const INTERNAL_ERROR: u16 = 500;

    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status: Self::OK,
            body,
        }
    }

    /// Error response with a `{"error": message}` body
    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::to_vec(&ErrorBody { error: message })
            .unwrap_or_else(|_| b"{}".to_vec());
        Self { status, body }
    }

    pub fn not_found() -> Self {
        Self::error(Self::NOT_FOUND, "File not found")
    }

    /// 400 response for a rejected query
    pub fn rejected(err: &GhostError) -> Self {
        let message = match err {
            GhostError::InvalidPoseType(_) => "Invalid pose",
            GhostError::InvalidAssetKind(_) => "Invalid type",
            GhostError::InvalidStage(_) => "Invalid stage",
            _ => "Invalid request",
        };
        Self::error(Self::BAD_REQUEST, message)
    }

    pub fn is_success(&self) -> bool {
        self.status == Self::OK
    }
}
