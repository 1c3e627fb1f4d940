//! Synthetic bodies
//!
//! A standing figure whose arms swing outward by a given angle. Stage `n`
//! of every fixture pose type raises the arms by `n * 60` degrees, so
//! neighbouring stages score 0.75 against each other: below the default
//! threshold, and far from a match.

use ghost_core::{BodyLandmark, Landmark, LandmarkFrame, Point2, Stage, TargetPose, LANDMARK_COUNT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const UPPER_ARM: f32 = 0.12;
const FOREARM: f32 = 0.11;

/// Arm raise between consecutive fixture stages
pub const STAGE_STEP_DEGREES: f32 = 60.0;

/// Shoulder line of the fixture body
pub const SHOULDER_Y: f32 = 0.30;
/// Hip line of the fixture body
pub const HIP_Y: f32 = 0.55;

/// 33 points of a standing body, arms raised by `arm_degrees` from hanging
pub fn body(arm_degrees: f32) -> Vec<Point2> {
    let mut pts = vec![Point2::new(0.5, 0.15); LANDMARK_COUNT];

    // Face around the nose
    for (i, p) in pts.iter_mut().enumerate().take(11).skip(1) {
        let side = if i % 2 == 0 { 1.0 } else { -1.0 };
        *p = Point2::new(0.5 + side * 0.01 * (i as f32 / 2.0), 0.13 + 0.003 * i as f32);
    }

    let left_shoulder = Point2::new(0.44, SHOULDER_Y);
    let right_shoulder = Point2::new(0.56, SHOULDER_Y);
    set(&mut pts, BodyLandmark::LeftShoulder, left_shoulder);
    set(&mut pts, BodyLandmark::RightShoulder, right_shoulder);

    let theta = arm_degrees.to_radians();
    let left_dir = Point2::new(-theta.sin(), theta.cos());
    let right_dir = Point2::new(theta.sin(), theta.cos());
    let left_elbow = offset(left_shoulder, left_dir, UPPER_ARM);
    let right_elbow = offset(right_shoulder, right_dir, UPPER_ARM);
    let left_wrist = offset(left_elbow, left_dir, FOREARM);
    let right_wrist = offset(right_elbow, right_dir, FOREARM);
    set(&mut pts, BodyLandmark::LeftElbow, left_elbow);
    set(&mut pts, BodyLandmark::RightElbow, right_elbow);
    set(&mut pts, BodyLandmark::LeftWrist, left_wrist);
    set(&mut pts, BodyLandmark::RightWrist, right_wrist);
    for hand in [BodyLandmark::LeftPinky, BodyLandmark::LeftIndex, BodyLandmark::LeftThumb] {
        set(&mut pts, hand, offset(left_wrist, left_dir, 0.02));
    }
    for hand in [BodyLandmark::RightPinky, BodyLandmark::RightIndex, BodyLandmark::RightThumb] {
        set(&mut pts, hand, offset(right_wrist, right_dir, 0.02));
    }

    let legs = [
        (BodyLandmark::LeftHip, BodyLandmark::RightHip, HIP_Y),
        (BodyLandmark::LeftKnee, BodyLandmark::RightKnee, 0.72),
        (BodyLandmark::LeftAnkle, BodyLandmark::RightAnkle, 0.88),
        (BodyLandmark::LeftHeel, BodyLandmark::RightHeel, 0.90),
        (BodyLandmark::LeftFootIndex, BodyLandmark::RightFootIndex, 0.92),
    ];
    for (left, right, y) in legs {
        set(&mut pts, left, Point2::new(0.46, y));
        set(&mut pts, right, Point2::new(0.54, y));
    }

    pts
}

/// Body matching a fixture stage
pub fn stage_body(stage: Stage) -> Vec<Point2> {
    body(f32::from(stage.index()) * STAGE_STEP_DEGREES)
}

/// Target landmarks of a fixture stage
pub fn stage_target(stage: Stage) -> TargetPose {
    target(&stage_body(stage))
}

pub fn frame(points: &[Point2]) -> LandmarkFrame {
    LandmarkFrame::from_points(points)
}

pub fn target(points: &[Point2]) -> TargetPose {
    let pairs: Vec<[f32; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
    TargetPose::from_pairs(&pairs).expect("fixture bodies have 33 points")
}

/// Live frame of a fixture stage
pub fn stage_frame(stage: Stage) -> LandmarkFrame {
    frame(&stage_body(stage))
}

/// Same body, scaled about its hip midpoint and shifted
/// Models the player standing closer to or further from the camera.
pub fn rescaled(points: &[Point2], scale: f32, dx: f32, dy: f32) -> Vec<Point2> {
    let hip = Point2::new(0.5, HIP_Y);
    points
        .iter()
        .map(|p| Point2::new(hip.x + (p.x - hip.x) * scale + dx, hip.y + (p.y - hip.y) * scale + dy))
        .collect()
}

/// Add seeded uniform noise of at most `amplitude` to every coordinate
pub fn jittered(points: &[Point2], amplitude: f32, seed: u64) -> Vec<Point2> {
    let mut rng = StdRng::seed_from_u64(seed);
    points
        .iter()
        .map(|p| {
            Point2::new(
                p.x + rng.gen_range(-amplitude..=amplitude),
                p.y + rng.gen_range(-amplitude..=amplitude),
            )
        })
        .collect()
}

/// Only the first `count` landmarks of a frame
pub fn truncated(frame: &LandmarkFrame, count: usize) -> LandmarkFrame {
    LandmarkFrame::new(frame.landmarks().iter().take(count).copied().collect())
}

/// Frame with one landmark knocked out
pub fn without(frame: &LandmarkFrame, landmark: BodyLandmark) -> LandmarkFrame {
    let mut frame = frame.clone();
    frame.set(landmark.index(), Landmark::new(f32::NAN, f32::NAN));
    frame
}

fn set(pts: &mut [Point2], landmark: BodyLandmark, point: Point2) {
    pts[landmark.index()] = point;
}

fn offset(from: Point2, dir: Point2, length: f32) -> Point2 {
    Point2::new(from.x + dir.x * length, from.y + dir.y * length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghost_visual::{score, Similarity};

    fn stage(i: u8) -> Stage {
        Stage::new(i).unwrap()
    }

    #[test]
    fn test_stage_matches_itself() {
        for s in Stage::ALL {
            assert_eq!(score(Some(&stage_frame(s)), &stage_target(s)), Similarity::Score(1.0));
        }
    }

    #[test]
    fn test_neighbouring_stages_do_not_match() {
        let value = score(Some(&stage_frame(stage(1))), &stage_target(stage(0)))
            .value()
            .unwrap();
        assert!((value - 0.75).abs() < 1e-4);
    }

    #[test]
    fn test_jitter_is_seeded() {
        let a = jittered(&body(0.0), 0.01, 7);
        let b = jittered(&body(0.0), 0.01, 7);
        assert_eq!(a, b);
    }
}
