//! Pose types and stages
//!
//! The set of trainable techniques is closed: three pose types, each a
//! sequence of four stages. Both are modelled so that out-of-range values
//! cannot be constructed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::GhostError;

/// A trainable technique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoseType {
    Serve,
    DriveForehand,
    DriveBackhand,
}

impl PoseType {
    /// All pose types in their default training order
    pub const ALL: [PoseType; 3] = [
        PoseType::Serve,
        PoseType::DriveForehand,
        PoseType::DriveBackhand,
    ];

    /// Identifier used by the asset lookup API and asset directories
    pub fn name(self) -> &'static str {
        match self {
            PoseType::Serve => "Serve",
            PoseType::DriveForehand => "DriveForehand",
            PoseType::DriveBackhand => "DriveBackhand",
        }
    }

    /// Human readable name
    pub fn display_name(self) -> &'static str {
        match self {
            PoseType::Serve => "Serve",
            PoseType::DriveForehand => "Forehand Drive",
            PoseType::DriveBackhand => "Backhand Drive",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PoseType::Serve => "Practice your serve technique with ghost trainer",
            PoseType::DriveForehand => "Master your forehand drive with real-time feedback",
            PoseType::DriveBackhand => "Perfect your backhand drive technique",
        }
    }
}

impl fmt::Display for PoseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PoseType {
    type Err = GhostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PoseType::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| GhostError::InvalidPoseType(s.to_string()))
    }
}

/// One of the four sequential sub-positions of a pose type (0..=3)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stage(u8);

impl Stage {
    /// Number of stages per pose type
    pub const COUNT: usize = 4;

    pub const FIRST: Stage = Stage(0);
    pub const LAST: Stage = Stage(Self::COUNT as u8 - 1);

    pub const ALL: [Stage; Self::COUNT] = [Stage(0), Stage(1), Stage(2), Stage(3)];

    /// Create a stage, `None` if out of range
    pub fn new(index: u8) -> Option<Self> {
        (usize::from(index) < Self::COUNT).then_some(Stage(index))
    }

    #[inline]
    pub fn index(self) -> u8 {
        self.0
    }

    /// Following stage, `None` after the last one
    pub fn next(self) -> Option<Stage> {
        Stage::new(self.0 + 1)
    }

    /// 1-based step number shown to the player
    pub fn step_number(self) -> u8 {
        self.0 + 1
    }
}

impl TryFrom<u8> for Stage {
    type Error = GhostError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Stage::new(value).ok_or(GhostError::InvalidStage(i64::from(value)))
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> Self {
        stage.0
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stage({})", self.0)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered, non-empty cycle of pose types the operator steps through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PoseType>", into = "Vec<PoseType>")]
pub struct PoseCycle(Vec<PoseType>);

impl PoseCycle {
    pub fn new(poses: Vec<PoseType>) -> Result<Self, GhostError> {
        if poses.is_empty() {
            return Err(GhostError::InvalidConfig("pose cycle is empty".into()));
        }
        Ok(Self(poses))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pose at a cycle position; positions wrap around
    pub fn get(&self, index: usize) -> PoseType {
        self.0[index % self.0.len()]
    }

    /// Position following `index`, wrapping to the start
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.0.len()
    }

    pub fn poses(&self) -> &[PoseType] {
        &self.0
    }
}

impl Default for PoseCycle {
    fn default() -> Self {
        Self(PoseType::ALL.to_vec())
    }
}

impl TryFrom<Vec<PoseType>> for PoseCycle {
    type Error = GhostError;

    fn try_from(value: Vec<PoseType>) -> Result<Self, Self::Error> {
        PoseCycle::new(value)
    }
}

impl From<PoseCycle> for Vec<PoseType> {
    fn from(cycle: PoseCycle) -> Self {
        cycle.0
    }
}
