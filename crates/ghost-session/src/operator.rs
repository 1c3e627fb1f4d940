//! Operator actions

use ghost_core::{PoseCycle, Timestamp};

use crate::{Phase, SessionState};

/// Operator controls available while a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorAction {
    /// Advance to the next pose type in the cycle, stage 0
    NextPose,
    /// Restart the current stage sequence
    ResetStage,
    /// End the session
    Stop,
}

impl SessionState {
    /// Stage 0 of the next pose type in the cycle
    pub fn next_pose(&self, cycle: &PoseCycle, now: Timestamp) -> SessionState {
        SessionState::at_pose(cycle, cycle.next_index(self.pose_index()), now)
    }

    /// Back to matching with cleared timers
    ///
    /// During a cooldown the pending stage is kept and the pause is
    /// skipped. Otherwise the pose type starts over at stage 0.
    pub fn reset_stage(&self, cycle: &PoseCycle, now: Timestamp) -> SessionState {
        let mut state = SessionState::at_pose(cycle, self.pose_index(), now);
        if let Phase::Cooldown { stage, .. } = self.phase {
            state.phase = Phase::Matching { stage, anchor: now };
        }
        state
    }
}

/// Apply an operator action; `None` once the session is stopped
pub fn apply(
    state: &SessionState,
    action: OperatorAction,
    cycle: &PoseCycle,
    now: Timestamp,
) -> Option<SessionState> {
    match action {
        OperatorAction::NextPose => Some(state.next_pose(cycle, now)),
        OperatorAction::ResetStage => Some(state.reset_stage(cycle, now)),
        OperatorAction::Stop => None,
    }
}
