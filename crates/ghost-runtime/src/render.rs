//! Render instructions
//!
//! One instruction per evaluated frame. The UI layer draws it as is; nothing
//! in here is recomputed downstream.

use ghost_core::{PoseType, Stage, Timestamp};
use ghost_session::{PhaseKind, SessionEvent, SessionState, StepOutcome};
use ghost_visual::OverlayDraw;
use serde::Serialize;

/// Score line of the display
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreDisplay {
    /// Rounded percentage, and whether it is above the threshold
    Score { percent: i32, matching: bool },
    NoPerson,
    /// Current stage has no loaded target
    AssetsUnavailable,
    /// Nothing scored this tick (cooldown or complete)
    Hidden,
}

impl ScoreDisplay {
    pub fn text(&self) -> Option<String> {
        match self {
            ScoreDisplay::Score { percent, .. } => Some(format!("SCORE: {percent}%")),
            ScoreDisplay::NoPerson => Some("SCORE: Please stand in frame".to_string()),
            ScoreDisplay::AssetsUnavailable => Some("Loading assets...".to_string()),
            ScoreDisplay::Hidden => None,
        }
    }
}

/// Cooldown message contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub seconds: u64,
    pub next_step: u8,
}

impl Countdown {
    pub fn text(&self) -> String {
        format!("GET READY FOR STEP {}... {}", self.next_step, self.seconds)
    }
}

/// Full-screen message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Banner {
    /// Shown on the tick a stage is held
    Perfect { step: u8 },
    /// Shown while the pose type is complete
    Complete { pose: PoseType },
}

impl Banner {
    pub fn text(&self) -> String {
        match self {
            Banner::Perfect { .. } => "PERFECT!".to_string(),
            Banner::Complete { pose } => format!("{} COMPLETE!", pose.name().to_uppercase()),
        }
    }
}

/// Everything the UI shows for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderInstruction {
    /// Video frame this was evaluated from
    pub sequence: u64,
    pub t_ms: i64,
    pub pose: PoseType,
    pub pose_name: &'static str,
    pub phase: PhaseKind,
    /// Completed stages, 0..=4
    pub stage: u8,
    /// "Step n/4"
    pub step_label: String,
    pub score: ScoreDisplay,
    /// Hold progress bar, 0..=1
    pub progress: f32,
    pub cooldown: Option<Countdown>,
    pub overlay: Option<OverlayDraw>,
    pub banner: Option<Banner>,
}

impl RenderInstruction {
    /// Describe the session after a tick
    pub fn build(
        sequence: u64,
        now: Timestamp,
        state: &SessionState,
        outcome: &StepOutcome,
        score: ScoreDisplay,
        overlay: Option<OverlayDraw>,
    ) -> Self {
        let banner = match outcome.event {
            Some(SessionEvent::StageCompleted { stage, .. }) => Some(Banner::Perfect {
                step: stage.step_number(),
            }),
            _ if state.is_complete() => Some(Banner::Complete { pose: state.pose() }),
            _ => None,
        };

        RenderInstruction {
            sequence,
            t_ms: now.as_millis(),
            pose: state.pose(),
            pose_name: state.pose().display_name(),
            phase: state.phase().kind(),
            stage: state.stage_number(),
            step_label: step_label(state),
            score,
            progress: outcome.hold_progress,
            cooldown: outcome.cooldown.map(|c| Countdown {
                seconds: c.remaining_secs,
                next_step: c.next_step,
            }),
            overlay,
            banner,
        }
    }
}

/// Stage indicator, capped at the last step once complete
fn step_label(state: &SessionState) -> String {
    let step = state.stage().map_or(Stage::COUNT as u8, Stage::step_number);
    format!("Step {}/{}", step, Stage::COUNT)
}
