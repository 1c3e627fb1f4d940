//! Trainer simulator
//!
//! Drives a real `Trainer` with a scripted camera, an in-memory asset source
//! and a manual clock. Every `frame` call advances simulated time by one
//! frame interval, shows a frame and runs one tick.

use std::sync::Arc;
use std::time::Duration;

use ghost_core::{GhostResult, LandmarkFrame, Timestamp, TrainerConfig};
use ghost_runtime::{
    recorded_landmarks, Banner, FrameSubscription, RecordedPoses, RenderInstruction, Trainer,
};
use ghost_session::{Phase, SessionState};
use ghost_time::{Clock, ManualClock};

use crate::{fixtures, CameraFeed, InMemoryAssetSource, ScriptedCamera};

/// Trainer type the simulator drives
pub type SimulatedTrainer = Trainer<Arc<InMemoryAssetSource>, ScriptedCamera, RecordedPoses, ManualClock>;

/// Deterministic trainer harness
pub struct TrainerSimulator {
    trainer: SimulatedTrainer,
    assets: Arc<InMemoryAssetSource>,
    feed: CameraFeed,
    clock: ManualClock,
    frame_interval: Duration,
    emitted: Vec<RenderInstruction>,
}

impl TrainerSimulator {
    pub fn new(config: TrainerConfig, assets: InMemoryAssetSource) -> GhostResult<Self> {
        let assets = Arc::new(assets);
        let feed = CameraFeed::default();
        let clock = ManualClock::new();
        let trainer = Trainer::new(
            config,
            assets.clone(),
            feed.camera(),
            recorded_landmarks as RecordedPoses,
            clock.clone(),
        )?;
        Ok(Self {
            trainer,
            assets,
            feed,
            clock,
            frame_interval: Duration::from_millis(100),
            emitted: Vec::new(),
        })
    }

    /// Default configuration over the standard fixture assets
    pub fn standard() -> Self {
        Self::new(TrainerConfig::default(), InMemoryAssetSource::standard())
            .expect("default configuration is valid")
    }

    /// Set the simulated time between frames
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn start(&mut self) -> Option<FrameSubscription> {
        self.trainer.start()
    }

    /// Advance one frame interval, show `landmarks` and tick
    pub fn frame(&mut self, landmarks: Option<LandmarkFrame>) -> Option<RenderInstruction> {
        self.clock.advance(self.frame_interval);
        self.show_and_tick(landmarks)
    }

    /// Jump to `t_ms`, show `landmarks` and tick
    pub fn frame_at(&mut self, t_ms: i64, landmarks: Option<LandmarkFrame>) -> Option<RenderInstruction> {
        self.clock.set(Timestamp::from_millis(t_ms));
        self.show_and_tick(landmarks)
    }

    /// Show the same body for `duration`, one frame per interval
    pub fn hold(&mut self, landmarks: &LandmarkFrame, duration: Duration) -> Vec<RenderInstruction> {
        let frames = duration.as_micros() / self.frame_interval.as_micros().max(1);
        (0..frames)
            .filter_map(|_| self.frame(Some(landmarks.clone())))
            .collect()
    }

    /// Hold the fixture body of the current stage one frame past the hold
    /// time, then sit out the cooldown showing the same body
    ///
    /// Returns the instruction of the completing tick, if there was one.
    pub fn clear_stage(&mut self) -> Option<RenderInstruction> {
        let stage = self.state()?.stage()?;
        let body = fixtures::stage_frame(stage);
        let completing = self
            .hold(&body, self.trainer.config().hold() + self.frame_interval)
            .into_iter()
            .find(|i| matches!(i.banner, Some(Banner::Perfect { .. })));

        if matches!(self.state().map(SessionState::phase), Some(Phase::Cooldown { .. })) {
            let cooldown = self.trainer.config().cooldown();
            self.hold(&body, cooldown);
        }
        completing
    }

    /// Tick without a new camera frame
    pub fn poll(&mut self) -> Option<RenderInstruction> {
        self.clock.advance(self.frame_interval);
        let instruction = self.trainer.tick();
        self.record(instruction)
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.trainer.session()
    }

    pub fn trainer(&self) -> &SimulatedTrainer {
        &self.trainer
    }

    pub fn trainer_mut(&mut self) -> &mut SimulatedTrainer {
        &mut self.trainer
    }

    /// Asset source, for injecting failures mid-session
    pub fn assets(&self) -> &InMemoryAssetSource {
        &self.assets
    }

    pub fn feed(&self) -> &CameraFeed {
        &self.feed
    }

    /// Every instruction emitted so far
    pub fn emitted(&self) -> &[RenderInstruction] {
        &self.emitted
    }

    fn show_and_tick(&mut self, landmarks: Option<LandmarkFrame>) -> Option<RenderInstruction> {
        self.feed.show(landmarks);
        let instruction = self.trainer.tick();
        self.record(instruction)
    }

    fn record(&mut self, instruction: Option<RenderInstruction>) -> Option<RenderInstruction> {
        if let Some(instruction) = &instruction {
            self.emitted.push(instruction.clone());
        }
        instruction
    }
}
