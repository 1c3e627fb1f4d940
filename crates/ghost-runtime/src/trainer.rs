//! Trainer - the detection loop controller
//!
//! Each tick:
//! 1. Take the camera's current frame; skip unless it is new
//! 2. Ask the pose source for landmarks
//! 3. Score and align against the current stage's asset
//! 4. Fold the result into the session
//! 5. Emit a render instruction
//!
//! Assets are loaded on start and on pose switch only. A tick never does I/O.

use ghost_assets::{AssetSource, AssetStore, PoseAsset};
use ghost_core::{GhostError, GhostResult, LandmarkFrame, PoseType, TrainerConfig};
use ghost_session::{step, MatchRules, Observation, OperatorAction, Phase, SessionEvent, SessionState, Tick};
use ghost_time::Clock;
use ghost_visual::{score, Alignment, CanvasSize, OverlayAligner, OverlayDraw, Similarity};
use tracing::{debug, info, warn};

use crate::{FrameSubscription, PoseSource, RenderInstruction, ScoreDisplay, VideoSource};

/// Counters kept across sessions
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrainerStats {
    /// Frames evaluated
    pub ticks: u64,
    /// Ticks where the camera had no new frame
    pub stale_frames: u64,
    pub no_person_ticks: u64,
    pub unavailable_ticks: u64,
    pub stages_completed: u64,
    pub poses_completed: u64,
}

/// Ghost trainer over a camera, a pose detector and an asset source
pub struct Trainer<S, V, P, C> {
    config: TrainerConfig,
    rules: MatchRules,
    aligner: OverlayAligner,
    store: AssetStore<S>,
    video: V,
    poses: P,
    clock: C,
    session: Option<SessionState>,
    subscription: Option<FrameSubscription>,
    last_sequence: Option<u64>,
    stats: TrainerStats,
}

impl<S, V, P, C> Trainer<S, V, P, C>
where
    S: AssetSource,
    V: VideoSource,
    P: PoseSource<V::Frame>,
    C: Clock,
{
    /// Create a stopped trainer
    pub fn new(config: TrainerConfig, source: S, video: V, poses: P, clock: C) -> GhostResult<Self> {
        config.validate()?;
        Ok(Self {
            rules: MatchRules::from(&config),
            aligner: OverlayAligner::new(config.max_overlay_height_factor),
            config,
            store: AssetStore::new(source),
            video,
            poses,
            clock,
            session: None,
            subscription: None,
            last_sequence: None,
            stats: TrainerStats::default(),
        })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    pub fn store(&self) -> &AssetStore<S> {
        &self.store
    }

    pub fn video(&self) -> &V {
        &self.video
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn stats(&self) -> &TrainerStats {
        &self.stats
    }

    /// Running, and its frame subscription not cancelled
    pub fn is_active(&self) -> bool {
        self.session.is_some() && self.subscription.as_ref().is_some_and(FrameSubscription::is_active)
    }

    /// Current subscription, while running
    pub fn subscription(&self) -> Option<FrameSubscription> {
        self.subscription.clone()
    }

    /// Start at the first pose type of the cycle
    ///
    /// Starting a running trainer stops it instead and returns `None`.
    pub fn start(&mut self) -> Option<FrameSubscription> {
        if self.is_active() {
            self.stop();
            return None;
        }

        let session = SessionState::start(&self.config.pose_cycle, self.clock.now());
        self.load_assets(session.pose());
        info!(pose = %session.pose(), "trainer started");

        let subscription = FrameSubscription::new();
        self.session = Some(session);
        self.subscription = Some(subscription.clone());
        self.last_sequence = None;
        Some(subscription)
    }

    /// Discard the session; returns false if nothing was running
    pub fn stop(&mut self) -> bool {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        match self.session.take() {
            Some(session) => {
                info!(pose = %session.pose(), stage = session.stage_number(), "trainer stopped");
                true
            }
            None => false,
        }
    }

    /// Switch to stage 0 of the next pose type in the cycle
    pub fn next_pose(&mut self) -> GhostResult<()> {
        let session = self.active_session()?;
        let next = session.next_pose(&self.config.pose_cycle, self.clock.now());
        info!(from = %session.pose(), to = %next.pose(), "pose switched");
        self.load_assets(next.pose());
        self.session = Some(next);
        Ok(())
    }

    /// Restart matching; see `SessionState::reset_stage`
    pub fn reset_stage(&mut self) -> GhostResult<()> {
        let session = self.active_session()?;
        let next = session.reset_stage(&self.config.pose_cycle, self.clock.now());
        info!(pose = %next.pose(), stage = next.stage_number(), "stage reset");
        self.session = Some(next);
        Ok(())
    }

    /// Apply an operator action
    /// Actions on an inactive trainer are ignored and return `NotActive`.
    pub fn act(&mut self, action: OperatorAction) -> GhostResult<()> {
        match action {
            OperatorAction::NextPose => self.next_pose(),
            OperatorAction::ResetStage => self.reset_stage(),
            OperatorAction::Stop => {
                if self.stop() {
                    Ok(())
                } else {
                    Err(GhostError::NotActive)
                }
            }
        }
    }

    /// Evaluate the camera's current frame
    ///
    /// Returns `None` when stopped or when no new frame is available.
    pub fn tick(&mut self) -> Option<RenderInstruction> {
        if !self.is_active() {
            if self.session.is_some() {
                // Subscription cancelled by the host
                self.stop();
            }
            return None;
        }

        let Some(frame) = self.video.current_frame() else {
            self.stats.stale_frames += 1;
            return None;
        };
        if self.last_sequence == Some(frame.sequence) {
            self.stats.stale_frames += 1;
            return None;
        }
        self.last_sequence = Some(frame.sequence);

        let live = self.poses.estimate(&frame);
        let now = self.clock.now();
        let state = self.session.take()?;
        let pose = state.pose();

        let (observation, overlay) = match state.phase() {
            Phase::Matching { stage, .. } => match self.store.asset(pose, stage) {
                Some(asset) => {
                    let observation = match score(live.as_ref(), &asset.target) {
                        Similarity::Score(s) => Observation::Scored(s),
                        Similarity::NoPerson => Observation::NoPerson,
                    };
                    let overlay = self.overlay(live.as_ref(), asset, frame.size, self.config.active_alpha);
                    (observation, overlay)
                }
                None => (Observation::AssetsUnavailable, None),
            },
            Phase::Cooldown { stage, .. } => {
                let overlay = self
                    .store
                    .asset(pose, stage)
                    .and_then(|asset| self.overlay(live.as_ref(), asset, frame.size, self.config.preview_alpha));
                (Observation::NotScored, overlay)
            }
            Phase::Complete => (Observation::NotScored, None),
        };

        let (next, outcome) = step(state, &Tick::new(now, observation), &self.rules);
        self.record(pose, &observation, outcome.event.as_ref());

        debug!(
            sequence = frame.sequence,
            t_ms = now.as_millis(),
            observation = ?observation,
            phase = ?next.phase().kind(),
            stage = next.stage_number(),
            progress = outcome.hold_progress,
            "tick"
        );

        let display = self.score_display(&observation);
        let instruction = RenderInstruction::build(frame.sequence, now, &next, &outcome, display, overlay);
        self.session = Some(next);
        Some(instruction)
    }

    fn active_session(&self) -> GhostResult<&SessionState> {
        match &self.session {
            Some(session) if self.is_active() => Ok(session),
            _ => {
                debug!("operator action ignored, trainer not active");
                Err(GhostError::NotActive)
            }
        }
    }

    fn load_assets(&mut self, pose: PoseType) {
        let assets = self.store.load(pose);
        if assets.is_unavailable() {
            warn!(pose = %pose, "no stage assets available");
        } else if !assets.is_complete() {
            warn!(pose = %pose, ready = assets.summary().ready_stages, "some stage assets unavailable");
        }
    }

    fn overlay(
        &self,
        live: Option<&LandmarkFrame>,
        asset: &PoseAsset,
        canvas: CanvasSize,
        alpha: f32,
    ) -> Option<OverlayDraw> {
        let live = live?;
        match self.aligner.align(live, &asset.geometry(), canvas) {
            Alignment::Placed(placement) => Some(OverlayDraw { placement, alpha }),
            Alignment::Skip(reason) => {
                debug!(pose = %asset.pose, stage = %asset.stage, ?reason, "overlay skipped");
                None
            }
        }
    }

    fn score_display(&self, observation: &Observation) -> ScoreDisplay {
        match *observation {
            Observation::Scored(s) => {
                let similarity = Similarity::Score(s);
                ScoreDisplay::Score {
                    percent: similarity.percent().unwrap_or_default(),
                    matching: similarity.exceeds(self.rules.threshold),
                }
            }
            Observation::NoPerson => ScoreDisplay::NoPerson,
            Observation::AssetsUnavailable => ScoreDisplay::AssetsUnavailable,
            Observation::NotScored => ScoreDisplay::Hidden,
        }
    }

    fn record(&mut self, pose: PoseType, observation: &Observation, event: Option<&SessionEvent>) {
        self.stats.ticks += 1;
        match observation {
            Observation::NoPerson => self.stats.no_person_ticks += 1,
            Observation::AssetsUnavailable => self.stats.unavailable_ticks += 1,
            _ => {}
        }
        if let Some(SessionEvent::StageCompleted { next, .. }) = event {
            self.stats.stages_completed += 1;
            if next.is_none() {
                self.stats.poses_completed += 1;
                info!(pose = %pose, "pose complete");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghost_assets::{AssetError, AssetKind, AssetRequest, AssetResponse};
    use ghost_core::{Landmark, Stage, Timestamp, LANDMARK_COUNT};
    use ghost_session::PhaseKind;
    use ghost_time::ManualClock;
    use ghost_visual::ImageSize;

    use crate::VideoFrame;

    /// Serves the same standing target for every stage
    struct StandingAssets;

    fn standing() -> Vec<[f32; 2]> {
        let mut pts = vec![[0.5f32, 0.2f32]; LANDMARK_COUNT];
        pts[11] = [0.45, 0.3];
        pts[12] = [0.55, 0.3];
        pts[13] = [0.42, 0.45];
        pts[14] = [0.58, 0.45];
        pts[15] = [0.40, 0.6];
        pts[16] = [0.60, 0.6];
        pts[23] = [0.47, 0.6];
        pts[24] = [0.53, 0.6];
        pts[25] = [0.47, 0.8];
        pts[26] = [0.53, 0.8];
        pts
    }

    impl AssetSource for StandingAssets {
        fn fetch(&self, request: &AssetRequest) -> AssetResponse {
            let body = match request.kind {
                AssetKind::Meta => serde_json::to_vec(&[0.3f32, 0.5, 0.6]),
                AssetKind::Target => serde_json::to_vec(&standing()),
            };
            AssetResponse::ok(body.unwrap())
        }

        fn fetch_image(&self, _pose: PoseType, _stage: Stage) -> Result<ImageSize, AssetError> {
            Ok(ImageSize::new(200, 400))
        }
    }

    /// New frame on every call
    struct Camera(u64);

    impl VideoSource for Camera {
        type Frame = ();

        fn current_frame(&mut self) -> Option<VideoFrame<()>> {
            self.0 += 1;
            Some(VideoFrame::new(self.0, CanvasSize::new(640, 480), ()))
        }
    }

    fn person(_frame: &VideoFrame<()>) -> Option<LandmarkFrame> {
        let landmarks = standing().iter().map(|p| Landmark::new(p[0], p[1])).collect();
        Some(LandmarkFrame::new(landmarks))
    }

    type TestTrainer = Trainer<StandingAssets, Camera, fn(&VideoFrame<()>) -> Option<LandmarkFrame>, ManualClock>;

    fn trainer(clock: &ManualClock) -> TestTrainer {
        Trainer::new(
            TrainerConfig::default(),
            StandingAssets,
            Camera(0),
            person as fn(&VideoFrame<()>) -> Option<LandmarkFrame>,
            clock.clone(),
        )
        .unwrap()
    }

    #[test]
    fn test_inactive_trainer_ignores_everything() {
        let clock = ManualClock::new();
        let mut trainer = trainer(&clock);

        assert!(trainer.tick().is_none());
        assert!(matches!(trainer.next_pose(), Err(GhostError::NotActive)));
        assert!(matches!(trainer.reset_stage(), Err(GhostError::NotActive)));
        assert!(!trainer.stop());
        assert_eq!(trainer.stats().ticks, 0);
    }

    #[test]
    fn test_start_toggles() {
        let clock = ManualClock::new();
        let mut trainer = trainer(&clock);

        let sub = trainer.start().unwrap();
        assert!(trainer.is_active());
        assert!(trainer.start().is_none());
        assert!(!trainer.is_active());
        assert!(!sub.is_active());
    }

    #[test]
    fn test_tick_scores_and_draws() {
        let clock = ManualClock::new();
        let mut trainer = trainer(&clock);
        trainer.start().unwrap();

        let instruction = trainer.tick().unwrap();
        assert_eq!(
            instruction.score,
            ScoreDisplay::Score {
                percent: 100,
                matching: true
            }
        );
        let overlay = instruction.overlay.unwrap();
        assert!((overlay.alpha - 0.4).abs() < 1e-6);
        assert_eq!(instruction.step_label, "Step 1/4");
    }

    #[test]
    fn test_hold_then_cooldown_preview() {
        let clock = ManualClock::new();
        let mut trainer = trainer(&clock);
        trainer.start().unwrap();

        trainer.tick().unwrap();
        clock.advance_millis(500);
        assert!(trainer.tick().unwrap().banner.is_none());
        clock.advance_millis(100);
        let perfect = trainer.tick().unwrap();
        assert!(perfect.banner.is_some());
        assert_eq!(perfect.phase, PhaseKind::Cooldown);

        clock.advance_millis(100);
        let preview = trainer.tick().unwrap();
        assert_eq!(preview.score, ScoreDisplay::Hidden);
        assert!((preview.overlay.unwrap().alpha - 0.2).abs() < 1e-6);
        assert_eq!(trainer.stats().stages_completed, 1);
    }

    #[test]
    fn test_score_display_rounds_and_flags_threshold() {
        let clock = ManualClock::new();
        let trainer = trainer(&clock);

        assert_eq!(
            trainer.score_display(&Observation::Scored(0.854)),
            ScoreDisplay::Score {
                percent: 85,
                matching: true
            }
        );
        assert_eq!(
            trainer.score_display(&Observation::Scored(0.85)),
            ScoreDisplay::Score {
                percent: 85,
                matching: false
            }
        );
        assert_eq!(trainer.score_display(&Observation::NoPerson), ScoreDisplay::NoPerson);
        assert_eq!(trainer.score_display(&Observation::NotScored), ScoreDisplay::Hidden);
    }

    #[test]
    fn test_cancelled_subscription_stops_ticks() {
        let clock = ManualClock::new();
        let mut trainer = trainer(&clock);
        let sub = trainer.start().unwrap();
        trainer.tick().unwrap();

        sub.cancel();
        clock.advance_millis(1000);
        assert!(trainer.tick().is_none());
        assert!(trainer.session().is_none());
        assert_eq!(trainer.stats().ticks, 1);
    }

    #[test]
    fn test_start_always_begins_at_first_pose() {
        let clock = ManualClock::starting_at(Timestamp::from_millis(10));
        let mut trainer = trainer(&clock);
        trainer.start().unwrap();
        trainer.next_pose().unwrap();
        assert_eq!(trainer.session().unwrap().pose(), PoseType::DriveForehand);

        trainer.stop();
        trainer.start().unwrap();
        assert_eq!(trainer.session().unwrap().pose(), PoseType::Serve);
        assert_eq!(
            trainer.session().unwrap().match_anchor(),
            Some(Timestamp::from_millis(10))
        );
    }
}
