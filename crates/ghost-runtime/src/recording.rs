//! Landmark recordings
//!
//! A recording is JSON lines, one object per captured frame:
//!
//! ```text
//! {"t_ms":0,"width":640,"height":480,"landmarks":[{"x":0.51,"y":0.12},...]}
//! {"t_ms":33,"width":640,"height":480,"landmarks":null}
//! ```
//!
//! `landmarks` is null or absent when the detector saw nobody. Replaying
//! moves a manual clock to each frame's time, so a replay is deterministic.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use ghost_core::{GhostError, GhostResult, LandmarkFrame, Timestamp};
use ghost_time::ManualClock;
use ghost_visual::CanvasSize;
use serde::{Deserialize, Serialize};

use crate::{VideoFrame, VideoSource};

/// One captured frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub t_ms: i64,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub landmarks: Option<LandmarkFrame>,
}

/// Frames in capture order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recording {
    frames: Vec<RecordedFrame>,
}

impl Recording {
    pub fn new(frames: Vec<RecordedFrame>) -> Self {
        Self { frames }
    }

    /// Parse JSON lines; blank lines are skipped
    pub fn from_reader<R: BufRead>(reader: R) -> GhostResult<Self> {
        let mut frames: Vec<RecordedFrame> = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let frame: RecordedFrame =
                serde_json::from_str(&line).map_err(|e| GhostError::MalformedRecording {
                    line: index + 1,
                    reason: e.to_string(),
                })?;
            if frames.last().is_some_and(|prev| prev.t_ms > frame.t_ms) {
                return Err(GhostError::MalformedRecording {
                    line: index + 1,
                    reason: "timestamp goes backwards".to_string(),
                });
            }
            frames.push(frame);
        }
        Ok(Self { frames })
    }

    pub fn from_path(path: impl AsRef<Path>) -> GhostResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Write as JSON lines
    pub fn write_to<W: Write>(&self, mut writer: W) -> GhostResult<()> {
        for frame in &self.frames {
            serde_json::to_writer(&mut writer, frame).map_err(std::io::Error::from)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Time of the first frame
    pub fn start_time(&self) -> Option<Timestamp> {
        self.frames.first().map(|f| Timestamp::from_millis(f.t_ms))
    }

    /// Play back through a camera driving `clock`
    pub fn into_camera(self, clock: ManualClock) -> ReplayCamera {
        ReplayCamera {
            frames: self.frames.into(),
            clock,
            sequence: 0,
        }
    }
}

/// Camera that hands out recorded frames, one per call
#[derive(Debug)]
pub struct ReplayCamera {
    frames: VecDeque<RecordedFrame>,
    clock: ManualClock,
    sequence: u64,
}

impl ReplayCamera {
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl VideoSource for ReplayCamera {
    type Frame = Option<LandmarkFrame>;

    fn current_frame(&mut self) -> Option<VideoFrame<Self::Frame>> {
        let frame = self.frames.pop_front()?;
        self.clock.set(Timestamp::from_millis(frame.t_ms));
        self.sequence += 1;
        Some(VideoFrame::new(
            self.sequence,
            CanvasSize::new(frame.width, frame.height),
            frame.landmarks,
        ))
    }

    fn is_finished(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Pose source for replayed frames
pub type RecordedPoses = fn(&VideoFrame<Option<LandmarkFrame>>) -> Option<LandmarkFrame>;

/// Landmarks stored with the frame
pub fn recorded_landmarks(frame: &VideoFrame<Option<LandmarkFrame>>) -> Option<LandmarkFrame> {
    frame.image.clone()
}
