//! Frame and landmark sources
//!
//! Both are external: the camera hands out its latest frame, the pose
//! detector turns a frame into at most one landmark set.

use ghost_core::LandmarkFrame;
use ghost_visual::CanvasSize;

/// A video frame as handed out by the camera
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame<F> {
    /// Increases with every new frame the camera produces
    pub sequence: u64,
    /// Size of the canvas the frame is shown on
    pub size: CanvasSize,
    pub image: F,
}

impl<F> VideoFrame<F> {
    pub fn new(sequence: u64, size: CanvasSize, image: F) -> Self {
        Self {
            sequence,
            size,
            image,
        }
    }
}

/// Camera feed
pub trait VideoSource {
    type Frame;

    /// Latest frame, `None` while the camera has nothing to show
    /// Returning the same sequence again means no new frame arrived.
    fn current_frame(&mut self) -> Option<VideoFrame<Self::Frame>>;

    /// No frame will ever arrive again; live cameras never finish
    fn is_finished(&self) -> bool {
        false
    }
}

/// External pose detector
pub trait PoseSource<F> {
    /// Landmarks of the person in the frame, if any
    fn estimate(&mut self, frame: &VideoFrame<F>) -> Option<LandmarkFrame>;
}

impl<F, T> PoseSource<F> for T
where
    T: FnMut(&VideoFrame<F>) -> Option<LandmarkFrame>,
{
    fn estimate(&mut self, frame: &VideoFrame<F>) -> Option<LandmarkFrame> {
        self(frame)
    }
}
