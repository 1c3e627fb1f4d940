//! Pose similarity
//!
//! Compares bone directions, not raw positions. Each bone present in both
//! sets contributes the cosine of the angle between its live and target
//! vectors; the score is their mean, in [-1, 1].

use ghost_core::{LandmarkFrame, LandmarkSet, TargetPose};
use serde::Serialize;

use crate::{Bone, SCORING_BONES};

/// Outcome of scoring one live frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Similarity {
    /// Mean bone cosine in [-1, 1]
    Score(f32),
    /// No frame, or fewer than 33 usable landmarks
    NoPerson,
}

impl Similarity {
    pub fn value(&self) -> Option<f32> {
        match self {
            Similarity::Score(s) => Some(*s),
            Similarity::NoPerson => None,
        }
    }

    /// Score as a rounded percentage
    pub fn percent(&self) -> Option<i32> {
        self.value().map(|s| (s * 100.0).round() as i32)
    }

    /// Strictly above the threshold; a missing person never matches
    pub fn exceeds(&self, threshold: f32) -> bool {
        self.value().map_or(false, |s| s > threshold)
    }
}

/// Score a live frame against a stage's target pose
pub fn score(live: Option<&LandmarkFrame>, target: &TargetPose) -> Similarity {
    match live {
        Some(frame) if frame.is_complete() => {
            Similarity::Score(bone_similarity(frame, target, &SCORING_BONES))
        }
        _ => Similarity::NoPerson,
    }
}

/// Mean cosine similarity over the bones valid in both sets
///
/// A bone is skipped when an endpoint is undefined on either side or when
/// either vector has zero length. Returns 0 when no bone is valid.
pub fn bone_similarity<A, B>(live: &A, target: &B, bones: &[Bone]) -> f32
where
    A: LandmarkSet + ?Sized,
    B: LandmarkSet + ?Sized,
{
    let mut total = 0.0f64;
    let mut valid = 0usize;

    for bone in bones {
        let (Some(u), Some(t)) = (bone.vector(live), bone.vector(target)) else {
            continue;
        };
        if let Some(cos) = cosine(u.x as f64, u.y as f64, t.x as f64, t.y as f64) {
            total += cos;
            valid += 1;
        }
    }

    if valid == 0 {
        0.0
    } else {
        (total / valid as f64) as f32
    }
}

/// Cosine of the angle between two 2D vectors, `None` if either is zero
/// sqrt(|u|² |t|²) keeps identical vectors at exactly 1.0.
fn cosine(ux: f64, uy: f64, tx: f64, ty: f64) -> Option<f64> {
    let nu2 = ux * ux + uy * uy;
    let nt2 = tx * tx + ty * ty;
    if nu2 <= 0.0 || nt2 <= 0.0 {
        return None;
    }
    let cos = (ux * tx + uy * ty) / (nu2 * nt2).sqrt();
    cos.is_finite().then(|| cos.clamp(-1.0, 1.0))
}
