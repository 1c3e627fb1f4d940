//! Body landmarks
//!
//! A landmark frame is the 33-point body topology produced by the external
//! pose detector once per tick. Positions are normalized to the frame:
//! (0, 0) is the top-left corner, (1, 1) the bottom-right.

use serde::{Deserialize, Serialize};

use crate::{GhostError, GhostResult};

/// Number of landmarks in a complete body frame
pub const LANDMARK_COUNT: usize = 33;

/// Landmark indices of the 33-point body topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Plain 2D point in normalized coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Midpoint between two points
    pub fn midpoint(&self, other: &Point2) -> Point2 {
        Point2 {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Displacement from `self` to `other`
    pub fn to(&self, other: &Point2) -> Point2 {
        Point2 {
            x: other.x - self.x,
            y: other.y - self.y,
        }
    }

    pub fn dot(&self, other: &Point2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A single detected landmark
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility: None,
        }
    }

    pub fn with_depth(mut self, z: f32) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Planar position
    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// A landmark is usable when its planar position is a real number
    pub fn is_defined(&self) -> bool {
        self.point().is_finite()
    }
}

/// Read access to an indexed set of 2D body points
///
/// Implemented by live frames and stored targets so the scorer and the
/// aligner can treat them alike.
pub trait LandmarkSet {
    /// Number of entries in the set
    fn len(&self) -> usize;

    /// Planar position of a landmark, `None` if absent or undefined
    fn point(&self, index: usize) -> Option<Point2>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Does the set carry the whole body topology?
    fn is_complete(&self) -> bool {
        self.len() >= LANDMARK_COUNT
            && (0..LANDMARK_COUNT).all(|i| self.point(i).is_some())
    }

    fn body_point(&self, landmark: BodyLandmark) -> Option<Point2> {
        self.point(landmark.index())
    }

    /// Midpoint of two landmarks, if both are defined
    fn midpoint(&self, a: BodyLandmark, b: BodyLandmark) -> Option<Point2> {
        Some(self.body_point(a)?.midpoint(&self.body_point(b)?))
    }
}

/// One tick's worth of detector output
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkFrame {
    landmarks: Vec<Landmark>,
}

impl LandmarkFrame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// Build a frame from plain points (no depth or visibility)
    pub fn from_points(points: &[Point2]) -> Self {
        Self {
            landmarks: points.iter().map(|p| Landmark::new(p.x, p.y)).collect(),
        }
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    /// Replace a landmark, ignoring indices outside the frame
    pub fn set(&mut self, index: usize, landmark: Landmark) {
        if let Some(slot) = self.landmarks.get_mut(index) {
            *slot = landmark;
        }
    }
}

impl LandmarkSet for LandmarkFrame {
    fn len(&self) -> usize {
        self.landmarks.len()
    }

    fn point(&self, index: usize) -> Option<Point2> {
        self.landmarks
            .get(index)
            .filter(|l| l.is_defined())
            .map(Landmark::point)
    }
}

/// Stored target pose for one stage: 33 plain (x, y) pairs
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPose {
    points: Vec<Point2>,
}

impl TargetPose {
    /// Build a target from `[x, y]` pairs; exactly 33 are required
    pub fn from_pairs(pairs: &[[f32; 2]]) -> GhostResult<Self> {
        if pairs.len() != LANDMARK_COUNT {
            return Err(GhostError::MalformedAsset(format!(
                "target pose has {} landmarks, expected {}",
                pairs.len(),
                LANDMARK_COUNT
            )));
        }
        Ok(Self {
            points: pairs.iter().map(|[x, y]| Point2::new(*x, *y)).collect(),
        })
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Pairs in the lookup-API layout
    pub fn to_pairs(&self) -> Vec<[f32; 2]> {
        self.points.iter().map(|p| [p.x, p.y]).collect()
    }
}

impl LandmarkSet for TargetPose {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn point(&self, index: usize) -> Option<Point2> {
        self.points.get(index).copied().filter(Point2::is_finite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_frame() -> LandmarkFrame {
        LandmarkFrame::new(
            (0..LANDMARK_COUNT)
                .map(|i| Landmark::new(i as f32 / 40.0, 0.5).with_visibility(0.9))
                .collect(),
        )
    }

    #[test]
    fn test_frame_completeness() {
        let frame = full_frame();
        assert!(frame.is_complete());

        let short = LandmarkFrame::new(frame.landmarks()[..20].to_vec());
        assert!(!short.is_complete());
        assert!(!LandmarkFrame::default().is_complete());
    }

    #[test]
    fn test_undefined_landmark_is_not_usable() {
        let mut frame = full_frame();
        frame.set(BodyLandmark::LeftElbow.index(), Landmark::new(f32::NAN, 0.2));

        assert!(frame.body_point(BodyLandmark::LeftElbow).is_none());
        assert!(!frame.is_complete());
    }

    #[test]
    fn test_midpoint() {
        let mut frame = full_frame();
        frame.set(11, Landmark::new(0.4, 0.2));
        frame.set(12, Landmark::new(0.6, 0.4));

        let mid = frame
            .midpoint(BodyLandmark::LeftShoulder, BodyLandmark::RightShoulder)
            .unwrap();
        assert!((mid.x - 0.5).abs() < 1e-6);
        assert!((mid.y - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_target_requires_full_topology() {
        let pairs = vec![[0.5, 0.5]; LANDMARK_COUNT];
        let target = TargetPose::from_pairs(&pairs).unwrap();
        assert_eq!(target.len(), LANDMARK_COUNT);
        assert_eq!(target.to_pairs(), pairs);

        assert!(TargetPose::from_pairs(&pairs[..32]).is_err());
    }

    #[test]
    fn test_frame_json_is_a_plain_array() {
        let frame = LandmarkFrame::new(vec![Landmark::new(0.25, 0.75)]);
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(json, r#"[{"x":0.25,"y":0.75}]"#);
    }
}
