//! Skeleton bones used for pose comparison

use ghost_core::{BodyLandmark, LandmarkSet, Point2};

/// A bone: directed segment between two landmarks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bone {
    pub from: BodyLandmark,
    pub to: BodyLandmark,
}

impl Bone {
    pub const fn new(from: BodyLandmark, to: BodyLandmark) -> Self {
        Self { from, to }
    }

    /// Displacement vector of this bone in a landmark set
    /// `None` if either endpoint is missing or undefined.
    pub fn vector<S: LandmarkSet + ?Sized>(&self, set: &S) -> Option<Point2> {
        let from = set.body_point(self.from)?;
        let to = set.body_point(self.to)?;
        Some(from.to(&to))
    }
}

/// Arm, torso-side and thigh bones compared when scoring a pose
pub const SCORING_BONES: [Bone; 8] = [
    // Left arm
    Bone::new(BodyLandmark::LeftShoulder, BodyLandmark::LeftElbow),
    Bone::new(BodyLandmark::LeftElbow, BodyLandmark::LeftWrist),
    // Right arm
    Bone::new(BodyLandmark::RightShoulder, BodyLandmark::RightElbow),
    Bone::new(BodyLandmark::RightElbow, BodyLandmark::RightWrist),
    // Torso sides
    Bone::new(BodyLandmark::LeftShoulder, BodyLandmark::LeftHip),
    Bone::new(BodyLandmark::RightShoulder, BodyLandmark::RightHip),
    // Thighs
    Bone::new(BodyLandmark::LeftHip, BodyLandmark::LeftKnee),
    Bone::new(BodyLandmark::RightHip, BodyLandmark::RightKnee),
];
