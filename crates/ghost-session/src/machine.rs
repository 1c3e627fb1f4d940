//! Stage progression
//!
//! `step` is the only place the session changes phase on its own. It is a
//! pure function of the state, the tick and the rules.
//!
//! Within a stage the hold is measured from the last tick that did not
//! match. A tick that scored at or below the threshold, found nobody in
//! frame, or had no target to score against moves that anchor to the tick's
//! time. The stage completes on the first matching tick more than one hold
//! after the anchor.

use std::time::Duration;

use ghost_core::{PoseType, Stage, Timestamp, TrainerConfig};
use serde::Serialize;
use tracing::info;

use crate::{Phase, SessionState};

/// Thresholds and timings used by `step`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchRules {
    /// A score must be strictly greater to count as matching
    pub threshold: f32,
    /// A matching run must last strictly longer than this
    pub hold: Duration,
    pub cooldown: Duration,
}

impl Default for MatchRules {
    fn default() -> Self {
        MatchRules::from(&TrainerConfig::default())
    }
}

impl From<&TrainerConfig> for MatchRules {
    fn from(config: &TrainerConfig) -> Self {
        MatchRules {
            threshold: config.similarity_threshold,
            hold: config.hold(),
            cooldown: config.cooldown(),
        }
    }
}

/// What the detection tick saw
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    /// Similarity against the current stage's target
    Scored(f32),
    /// No complete set of landmarks in the frame
    NoPerson,
    /// The current stage's assets are not loaded
    AssetsUnavailable,
    /// Nothing was scored (cooldown or complete)
    NotScored,
}

impl Observation {
    pub fn score(&self) -> Option<f32> {
        match self {
            Observation::Scored(s) => Some(*s),
            _ => None,
        }
    }
}

/// One detection tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub now: Timestamp,
    pub observation: Observation,
}

impl Tick {
    pub fn new(now: Timestamp, observation: Observation) -> Self {
        Tick { now, observation }
    }

    pub fn scored(now: Timestamp, score: f32) -> Self {
        Tick::new(now, Observation::Scored(score))
    }
}

/// Transition caused by a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// `stage` was held; `next` is `None` when it was the last one
    StageCompleted {
        pose: PoseType,
        stage: Stage,
        next: Option<Stage>,
    },
    /// Cooldown over, matching `stage`
    CooldownFinished { pose: PoseType, stage: Stage },
}

impl SessionEvent {
    pub fn completes_pose(&self) -> bool {
        matches!(self, SessionEvent::StageCompleted { next: None, .. })
    }
}

/// Countdown shown while cooling down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CooldownStatus {
    pub remaining: Duration,
    /// Whole seconds left, rounded up
    pub remaining_secs: u64,
    /// 1-based number of the stage that follows
    pub next_step: u8,
}

/// Result of a tick, beyond the new state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepOutcome {
    /// Score of this tick, if one was computed while matching
    pub score: Option<f32>,
    /// The score exceeded the threshold
    pub matching: bool,
    /// Fraction of the hold accumulated, 0..=1
    pub hold_progress: f32,
    pub cooldown: Option<CooldownStatus>,
    pub event: Option<SessionEvent>,
}

/// Fold one tick into the session
pub fn step(state: SessionState, tick: &Tick, rules: &MatchRules) -> (SessionState, StepOutcome) {
    let mut state = state;
    let mut outcome = StepOutcome::default();
    let now = tick.now;

    match state.phase {
        Phase::Matching { stage, anchor } => {
            let score = tick.observation.score();
            state.last_score = score;
            outcome.score = score;

            match score {
                Some(s) if s > rules.threshold => {
                    outcome.matching = true;
                    let held = now.since(anchor);
                    if held > rules.hold {
                        let next = stage.next();
                        state.phase = match next {
                            Some(next) => Phase::Cooldown {
                                stage: next,
                                entered_at: now,
                            },
                            None => Phase::Complete,
                        };
                        outcome.hold_progress = 1.0;
                        outcome.event = Some(SessionEvent::StageCompleted {
                            pose: state.pose(),
                            stage,
                            next,
                        });
                        info!(
                            pose = %state.pose(),
                            stage = %stage,
                            held_ms = held.as_millis() as u64,
                            complete = next.is_none(),
                            "stage completed"
                        );
                    } else {
                        outcome.hold_progress = progress(held, rules.hold);
                    }
                }
                _ => {
                    state.phase = Phase::Matching { stage, anchor: now };
                }
            }
        }
        Phase::Cooldown { stage, entered_at } => {
            state.last_score = None;
            let elapsed = now.since(entered_at);
            if elapsed >= rules.cooldown {
                state.phase = Phase::Matching { stage, anchor: now };
                outcome.event = Some(SessionEvent::CooldownFinished {
                    pose: state.pose(),
                    stage,
                });
                info!(pose = %state.pose(), stage = %stage, "cooldown finished");
            } else {
                let remaining = rules.cooldown - elapsed;
                outcome.cooldown = Some(CooldownStatus {
                    remaining,
                    remaining_secs: ceil_secs(remaining),
                    next_step: stage.step_number(),
                });
            }
        }
        Phase::Complete => {
            state.last_score = None;
        }
    }

    (state, outcome)
}

fn progress(held: Duration, hold: Duration) -> f32 {
    if hold.is_zero() {
        return 1.0;
    }
    (held.as_secs_f64() / hold.as_secs_f64()).clamp(0.0, 1.0) as f32
}

fn ceil_secs(duration: Duration) -> u64 {
    let millis = duration.as_millis() as u64;
    millis.div_ceil(1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghost_core::PoseCycle;
    use proptest::prelude::*;

    fn t(ms: i64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    fn stage(i: u8) -> Stage {
        Stage::new(i).unwrap()
    }

    fn fresh() -> SessionState {
        SessionState::start(&PoseCycle::default(), t(0))
    }

    /// Feed `(ms, observation)` ticks, collecting the outcomes
    fn run(
        mut state: SessionState,
        ticks: &[(i64, Observation)],
    ) -> (SessionState, Vec<StepOutcome>) {
        let rules = MatchRules::default();
        let mut outcomes = Vec::new();
        for (ms, obs) in ticks {
            let (next, outcome) = step(state, &Tick::new(t(*ms), *obs), &rules);
            state = next;
            outcomes.push(outcome);
        }
        (state, outcomes)
    }

    fn scored(ms: i64, s: f32) -> (i64, Observation) {
        (ms, Observation::Scored(s))
    }

    #[test]
    fn test_hold_completes_stage() {
        let ticks: Vec<_> = (0..=7).map(|i| scored(i * 100, 0.9)).collect();
        let (state, outcomes) = run(fresh(), &ticks);

        // Anchored at start; 500ms is passed on the seventh tick
        assert!(outcomes[4].event.is_none());
        assert!((outcomes[4].hold_progress - 0.8).abs() < 1e-6);
        assert!(outcomes[5].event.is_none());
        assert!((outcomes[5].hold_progress - 1.0).abs() < 1e-6);
        assert!(matches!(
            outcomes[6].event,
            Some(SessionEvent::StageCompleted { stage: s, next: Some(n), .. })
                if s == Stage::FIRST && n == stage(1)
        ));
        assert_eq!(state.phase(), Phase::Cooldown { stage: stage(1), entered_at: t(600) });
        assert_eq!(state.stage_number(), 1);
    }

    #[test]
    fn test_hold_of_exactly_hold_time_does_not_complete() {
        let (state, outcomes) = run(fresh(), &[scored(0, 0.9), scored(500, 0.9)]);
        assert!(outcomes[1].event.is_none());
        assert_eq!(state.stage_number(), 0);
        assert_eq!(state.match_anchor(), Some(t(0)));

        let (state, outcomes) = run(state, &[scored(501, 0.9)]);
        assert!(outcomes[0].event.is_some());
        assert_eq!(state.stage_number(), 1);
    }

    #[test]
    fn test_drop_at_threshold_resets_hold() {
        let ticks = [
            scored(0, 0.9),
            scored(100, 0.9),
            scored(200, 0.85),
            scored(300, 0.9),
            scored(600, 0.9),
        ];
        let (state, outcomes) = run(fresh(), &ticks);

        assert!(outcomes.iter().all(|o| o.event.is_none()));
        assert!(!outcomes[2].matching);
        assert_eq!(state.match_anchor(), Some(t(200)));
        assert!((outcomes[4].hold_progress - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_no_person_resets_hold() {
        let ticks = [
            scored(0, 0.95),
            scored(300, 0.95),
            (400, Observation::NoPerson),
            scored(600, 0.95),
            scored(800, 0.95),
        ];
        let (state, outcomes) = run(fresh(), &ticks);

        assert!(outcomes.iter().all(|o| o.event.is_none()));
        assert_eq!(outcomes[2].score, None);
        assert_eq!(state.last_score(), Some(0.95));
        assert_eq!(state.match_anchor(), Some(t(400)));
    }

    #[test]
    fn test_unavailable_assets_never_advance() {
        let ticks: Vec<_> = (0..30)
            .map(|i| (i * 100, Observation::AssetsUnavailable))
            .collect();
        let (state, outcomes) = run(fresh(), &ticks);

        assert!(outcomes.iter().all(|o| o.event.is_none() && o.score.is_none()));
        assert_eq!(state.stage_number(), 0);
    }

    #[test]
    fn test_cooldown_exit_is_exact() {
        let mut state = fresh();
        state.phase = Phase::Cooldown {
            stage: stage(1),
            entered_at: t(1000),
        };

        let (state, outcomes) = run(
            state,
            &[
                scored(1000, 0.99),
                scored(1001, 0.99),
                scored(2999, 0.99),
                scored(3000, 0.99),
            ],
        );

        let countdown: Vec<_> = outcomes[..3]
            .iter()
            .map(|o| o.cooldown.unwrap().remaining_secs)
            .collect();
        assert_eq!(countdown, vec![2, 2, 1]);
        assert_eq!(outcomes[0].cooldown.unwrap().next_step, 2);
        assert!(outcomes[..3].iter().all(|o| o.score.is_none()));

        assert!(matches!(
            outcomes[3].event,
            Some(SessionEvent::CooldownFinished { stage: s, .. }) if s == stage(1)
        ));
        // The exit tick does not score
        assert_eq!(outcomes[3].score, None);
        assert_eq!(state.phase(), Phase::Matching { stage: stage(1), anchor: t(3000) });
    }

    #[test]
    fn test_last_stage_completes_pose() {
        let mut state = fresh();
        state.phase = Phase::Matching {
            stage: Stage::LAST,
            anchor: t(0),
        };

        let (state, outcomes) = run(state, &[scored(500, 0.9), scored(600, 0.9)]);

        assert!(outcomes[0].event.is_none());
        let event = outcomes[1].event.unwrap();
        assert!(event.completes_pose());
        assert!(state.is_complete());
        assert_eq!(state.stage_number(), 4);
    }

    #[test]
    fn test_complete_is_terminal() {
        let mut state = fresh();
        state.phase = Phase::Complete;

        let ticks: Vec<_> = (0..50).map(|i| scored(i * 100, 1.0)).collect();
        let (state, outcomes) = run(state, &ticks);

        assert!(state.is_complete());
        assert!(outcomes.iter().all(|o| *o == StepOutcome::default()));
    }

    #[test]
    fn test_full_pose_timeline() {
        // 100ms ticks with a perfect score throughout
        let ticks: Vec<_> = (0..=120).map(|i| scored(i * 100, 1.0)).collect();
        let (state, outcomes) = run(fresh(), &ticks);

        let completed: Vec<_> = outcomes
            .iter()
            .enumerate()
            .filter_map(|(i, o)| match o.event {
                Some(SessionEvent::StageCompleted { stage, .. }) => Some((i as i64 * 100, stage.index())),
                _ => None,
            })
            .collect();
        // past the 500ms hold, cooldown 2000, then past the hold again from the exit tick
        assert_eq!(
            completed,
            vec![(600, 0), (3200, 1), (5800, 2), (8400, 3)]
        );
        assert!(state.is_complete());
    }

    #[test]
    fn test_ceil_secs() {
        assert_eq!(ceil_secs(Duration::from_millis(2000)), 2);
        assert_eq!(ceil_secs(Duration::from_millis(1999)), 2);
        assert_eq!(ceil_secs(Duration::from_millis(1000)), 1);
        assert_eq!(ceil_secs(Duration::from_millis(1)), 1);
    }

    proptest! {
        #[test]
        fn prop_stages_never_regress(
            ticks in prop::collection::vec((1i64..400, 0.0f32..1.0), 1..200)
        ) {
            let rules = MatchRules::default();
            let mut state = fresh();
            let mut now = 0i64;

            for (dt, score) in ticks {
                now += dt;
                let before = state.stage_number();
                let was_matching = matches!(state.phase(), Phase::Matching { .. });
                let anchor = state.match_anchor();

                let (next, outcome) = step(state, &Tick::scored(t(now), score), &rules);

                prop_assert!(next.stage_number() >= before);
                prop_assert!(next.stage_number() <= before + 1);
                prop_assert!((0.0..=1.0).contains(&outcome.hold_progress));

                if next.stage_number() > before {
                    // Only a matching tick more than a hold past the anchor advances
                    prop_assert!(was_matching);
                    prop_assert!(score > rules.threshold);
                    let anchor = anchor.unwrap();
                    prop_assert!(t(now).since(anchor) > rules.hold);
                }
                state = next;
            }
        }
    }
}
