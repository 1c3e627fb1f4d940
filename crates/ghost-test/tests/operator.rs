//! Operator controls and trainer lifecycle

use std::time::Duration;

use ghost_core::{GhostError, PoseType, Stage};
use ghost_runtime::Banner;
use ghost_session::{OperatorAction, Phase};
use ghost_test::{fixtures, TrainerSimulator};

fn stage(i: u8) -> Stage {
    Stage::new(i).unwrap()
}

fn started() -> TrainerSimulator {
    let mut sim = TrainerSimulator::standard();
    sim.start().unwrap();
    sim
}

#[test]
fn test_reset_during_cooldown_keeps_pending_stage() {
    let mut sim = started();
    sim.clear_stage().unwrap();
    sim.hold(&fixtures::stage_frame(stage(1)), Duration::from_millis(600));
    assert!(matches!(
        sim.state().unwrap().phase(),
        Phase::Cooldown { stage: s, .. } if s == stage(2)
    ));

    sim.trainer_mut().act(OperatorAction::ResetStage).unwrap();
    let now = sim.now();
    assert_eq!(
        sim.state().unwrap().phase(),
        Phase::Matching {
            stage: stage(2),
            anchor: now
        }
    );

    // No cooldown left to sit out: the pending stage is matchable right away
    let out = sim.hold(&fixtures::stage_frame(stage(2)), Duration::from_millis(600));
    assert_eq!(out.last().unwrap().banner, Some(Banner::Perfect { step: 3 }));
}

#[test]
fn test_reset_while_matching_restarts_pose() {
    let mut sim = started();
    sim.clear_stage().unwrap();
    sim.hold(&fixtures::stage_frame(stage(1)), Duration::from_millis(300));

    sim.trainer_mut().reset_stage().unwrap();
    let state = sim.state().unwrap();
    assert_eq!(state.stage(), Some(Stage::FIRST));
    assert_eq!(state.match_anchor(), Some(sim.now()));
    assert_eq!(state.pose(), PoseType::Serve);
}

#[test]
fn test_reset_after_completion() {
    let mut sim = started();
    for _ in 0..4 {
        sim.clear_stage().unwrap();
    }
    assert!(sim.state().unwrap().is_complete());

    sim.trainer_mut().act(OperatorAction::ResetStage).unwrap();
    assert_eq!(sim.state().unwrap().stage(), Some(Stage::FIRST));

    let out = sim.frame(Some(fixtures::stage_frame(Stage::FIRST))).unwrap();
    assert_eq!(out.step_label, "Step 1/4");
}

#[test]
fn test_next_pose_cycles() {
    let mut sim = started();
    sim.clear_stage().unwrap();

    let mut seen = Vec::new();
    for _ in 0..3 {
        sim.trainer_mut().act(OperatorAction::NextPose).unwrap();
        let state = sim.state().unwrap();
        assert_eq!(state.stage(), Some(Stage::FIRST));
        seen.push(state.pose());
    }
    assert_eq!(
        seen,
        vec![PoseType::DriveForehand, PoseType::DriveBackhand, PoseType::Serve]
    );

    let loaded = sim.trainer().store().get(PoseType::DriveBackhand).unwrap();
    assert!(loaded.is_complete());
}

#[test]
fn test_next_pose_mid_hold_starts_fresh() {
    let mut sim = started();
    sim.hold(&fixtures::stage_frame(Stage::FIRST), Duration::from_millis(400));

    sim.trainer_mut().next_pose().unwrap();
    let out = sim.frame(Some(fixtures::stage_frame(Stage::FIRST))).unwrap();

    assert_eq!(out.pose, PoseType::DriveForehand);
    assert_eq!(out.banner, None);
    assert!((out.progress - 0.2).abs() < 1e-5);
}

#[test]
fn test_actions_ignored_when_stopped() {
    let mut sim = TrainerSimulator::standard();

    for action in [OperatorAction::NextPose, OperatorAction::ResetStage, OperatorAction::Stop] {
        let err = sim.trainer_mut().act(action).unwrap_err();
        assert!(matches!(err, GhostError::NotActive), "{action:?}: {err}");
    }
    assert!(sim.state().is_none());
    assert!(sim.frame(Some(fixtures::stage_frame(Stage::FIRST))).is_none());
    assert_eq!(sim.trainer().stats().ticks, 0);
}

#[test]
fn test_stop_is_idempotent() {
    let mut sim = started();
    let subscription = sim.trainer().subscription().unwrap();
    sim.frame(Some(fixtures::stage_frame(Stage::FIRST))).unwrap();

    assert!(sim.trainer_mut().stop());
    assert!(!sim.trainer_mut().stop());
    assert!(!subscription.is_active());
    assert!(sim.frame(Some(fixtures::stage_frame(Stage::FIRST))).is_none());
    assert!(sim.state().is_none());
    assert_eq!(sim.trainer().stats().ticks, 1);
}

#[test]
fn test_start_toggles() {
    let mut sim = started();
    sim.clear_stage().unwrap();

    assert!(sim.start().is_none());
    assert!(!sim.trainer().is_active());

    let resumed = sim.start();
    assert!(resumed.is_some());
    let state = sim.state().unwrap();
    assert_eq!(state.pose(), PoseType::Serve);
    assert_eq!(state.stage(), Some(Stage::FIRST));
}

#[test]
fn test_cancelled_subscription_stops_trainer() {
    let mut sim = started();
    let subscription = sim.trainer().subscription().unwrap();
    assert!(subscription.cancel());

    assert!(sim.frame(Some(fixtures::stage_frame(Stage::FIRST))).is_none());
    assert!(sim.state().is_none());
    assert!(!subscription.cancel());
}
