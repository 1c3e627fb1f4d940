//! Session state

use ghost_core::{PoseCycle, PoseType, Stage, Timestamp};
use serde::Serialize;

/// Where the session is in the current pose type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Scoring live frames against `stage`
    /// `anchor` is the last moment the score was at or below threshold.
    Matching { stage: Stage, anchor: Timestamp },
    /// Paused after a completed stage; `stage` is the one that comes next
    Cooldown { stage: Stage, entered_at: Timestamp },
    /// Every stage held; waits for an operator action
    Complete,
}

/// Phase without its timers, for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Matching,
    Cooldown,
    Complete,
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Matching { .. } => PhaseKind::Matching,
            Phase::Cooldown { .. } => PhaseKind::Cooldown,
            Phase::Complete => PhaseKind::Complete,
        }
    }
}

/// The trainer's mutable state, owned by the detection loop
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pose_index: usize,
    pose: PoseType,
    pub(crate) phase: Phase,
    pub(crate) last_score: Option<f32>,
}

impl SessionState {
    /// Fresh session at stage 0 of the first pose type in the cycle
    pub fn start(cycle: &PoseCycle, now: Timestamp) -> Self {
        Self::at_pose(cycle, 0, now)
    }

    /// Fresh session at stage 0 of the pose at `pose_index`
    pub fn at_pose(cycle: &PoseCycle, pose_index: usize, now: Timestamp) -> Self {
        let pose_index = pose_index % cycle.len();
        SessionState {
            pose_index,
            pose: cycle.get(pose_index),
            phase: Phase::Matching {
                stage: Stage::FIRST,
                anchor: now,
            },
            last_score: None,
        }
    }

    pub fn pose_index(&self) -> usize {
        self.pose_index
    }

    pub fn pose(&self) -> PoseType {
        self.pose
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Stage being matched, or coming up after the cooldown
    /// `None` once the pose type is complete.
    pub fn stage(&self) -> Option<Stage> {
        match self.phase {
            Phase::Matching { stage, .. } | Phase::Cooldown { stage, .. } => Some(stage),
            Phase::Complete => None,
        }
    }

    /// Number of completed stages: 0..=4, 4 meaning complete
    pub fn stage_number(&self) -> u8 {
        match self.phase {
            Phase::Matching { stage, .. } | Phase::Cooldown { stage, .. } => stage.index(),
            Phase::Complete => Stage::COUNT as u8,
        }
    }

    pub fn match_anchor(&self) -> Option<Timestamp> {
        match self.phase {
            Phase::Matching { anchor, .. } => Some(anchor),
            _ => None,
        }
    }

    pub fn cooldown_anchor(&self) -> Option<Timestamp> {
        match self.phase {
            Phase::Cooldown { entered_at, .. } => Some(entered_at),
            _ => None,
        }
    }

    /// Most recent numeric score, cleared by ticks that produced none
    pub fn last_score(&self) -> Option<f32> {
        self.last_score
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_state() {
        let state = SessionState::start(&PoseCycle::default(), Timestamp::from_millis(40));

        assert_eq!(state.pose(), PoseType::Serve);
        assert_eq!(state.stage(), Some(Stage::FIRST));
        assert_eq!(state.stage_number(), 0);
        assert_eq!(state.match_anchor(), Some(Timestamp::from_millis(40)));
        assert_eq!(state.cooldown_anchor(), None);
        assert_eq!(state.phase().kind(), PhaseKind::Matching);
    }

    #[test]
    fn test_complete_reports_stage_four() {
        let mut state = SessionState::start(&PoseCycle::default(), Timestamp::ZERO);
        state.phase = Phase::Complete;

        assert_eq!(state.stage_number(), 4);
        assert_eq!(state.stage(), None);
        assert!(state.is_complete());
    }

    #[test]
    fn test_pose_index_wraps() {
        let state = SessionState::at_pose(&PoseCycle::default(), 4, Timestamp::ZERO);
        assert_eq!(state.pose_index(), 1);
        assert_eq!(state.pose(), PoseType::DriveForehand);
    }
}
