//! Scripted camera
//!
//! The test decides what the camera shows. Each `show` produces a new frame;
//! polling without a `show` in between returns the same frame again, which
//! the trainer must skip.

use std::sync::Arc;

use ghost_core::LandmarkFrame;
use ghost_runtime::{VideoFrame, VideoSource};
use ghost_visual::CanvasSize;
use parking_lot::Mutex;

/// Default canvas of the scripted camera
pub const CANVAS: CanvasSize = CanvasSize {
    width: 640,
    height: 480,
};

#[derive(Debug, Default)]
struct FeedState {
    sequence: u64,
    canvas: CanvasSize,
    landmarks: Option<LandmarkFrame>,
    shown: bool,
}

/// Test-side handle to what the camera shows
#[derive(Debug, Clone)]
pub struct CameraFeed {
    state: Arc<Mutex<FeedState>>,
}

impl CameraFeed {
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            state: Arc::new(Mutex::new(FeedState {
                canvas,
                ..FeedState::default()
            })),
        }
    }

    /// Publish a new frame; `None` is a frame with nobody in it
    pub fn show(&self, landmarks: Option<LandmarkFrame>) -> u64 {
        let mut state = self.state.lock();
        state.sequence += 1;
        state.landmarks = landmarks;
        state.shown = true;
        state.sequence
    }

    pub fn resize(&self, canvas: CanvasSize) {
        self.state.lock().canvas = canvas;
    }

    pub fn camera(&self) -> ScriptedCamera {
        ScriptedCamera { feed: self.clone() }
    }
}

impl Default for CameraFeed {
    fn default() -> Self {
        Self::new(CANVAS)
    }
}

/// Camera side of a `CameraFeed`
/// Frames carry their landmarks, so `recorded_landmarks` is its pose source.
#[derive(Debug, Clone)]
pub struct ScriptedCamera {
    feed: CameraFeed,
}

impl VideoSource for ScriptedCamera {
    type Frame = Option<LandmarkFrame>;

    fn current_frame(&mut self) -> Option<VideoFrame<Self::Frame>> {
        let state = self.feed.state.lock();
        if !state.shown {
            return None;
        }
        Some(VideoFrame::new(state.sequence, state.canvas, state.landmarks.clone()))
    }
}
