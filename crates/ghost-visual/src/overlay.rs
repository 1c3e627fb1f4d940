//! Overlay alignment
//!
//! Places a reference image over the live canvas so that:
//! - its torso length matches the player's measured torso length
//! - its hip anchor sits on the player's hip midpoint
//!
//! The player's distance from the camera only changes the scale.

use ghost_core::{BodyLandmark, LandmarkFrame, LandmarkSet, Point2};
use serde::Serialize;

/// Size of the live canvas in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Pixel dimensions of a reference image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, 0 for an empty image
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Alignment metadata of one reference image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayGeometry {
    /// Torso length of the figure as a fraction of the image height
    pub torso_ratio: f32,
    /// Hip midpoint of the figure, normalized to the image
    pub hip_anchor: Point2,
    /// Reference image dimensions
    pub image: ImageSize,
}

/// Where to draw the reference image, in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Why an overlay was not placed this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Fewer than 33 usable landmarks
    IncompleteLandmarks,
    /// Metadata torso ratio is zero
    ZeroTorsoRatio,
    /// Shoulders and hips measured at the same height
    ZeroTorsoLength,
    /// Reference image or canvas has no area
    EmptyImage,
}

/// Result of aligning an overlay for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alignment {
    Placed(Placement),
    Skip(SkipReason),
}

impl Alignment {
    pub fn placement(&self) -> Option<Placement> {
        match self {
            Alignment::Placed(p) => Some(*p),
            Alignment::Skip(_) => None,
        }
    }
}

/// Placement plus draw alpha, as handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayDraw {
    #[serde(flatten)]
    pub placement: Placement,
    pub alpha: f32,
}

/// Torso-scaled, hip-anchored overlay aligner
#[derive(Debug, Clone, Copy)]
pub struct OverlayAligner {
    /// Overlay height is clamped to this multiple of the canvas height
    max_height_factor: f32,
}

impl Default for OverlayAligner {
    fn default() -> Self {
        Self::new(2.5)
    }
}

impl OverlayAligner {
    pub fn new(max_height_factor: f32) -> Self {
        Self { max_height_factor }
    }

    /// Compute the placement of a reference image over the live canvas
    pub fn align(
        &self,
        live: &LandmarkFrame,
        geometry: &OverlayGeometry,
        canvas: CanvasSize,
    ) -> Alignment {
        if !live.is_complete() {
            return Alignment::Skip(SkipReason::IncompleteLandmarks);
        }
        let (Some(shoulders), Some(hips)) = (
            live.midpoint(BodyLandmark::LeftShoulder, BodyLandmark::RightShoulder),
            live.midpoint(BodyLandmark::LeftHip, BodyLandmark::RightHip),
        ) else {
            return Alignment::Skip(SkipReason::IncompleteLandmarks);
        };
        if !(geometry.torso_ratio.is_finite() && geometry.torso_ratio > 0.0) {
            return Alignment::Skip(SkipReason::ZeroTorsoRatio);
        }
        let aspect = geometry.image.aspect_ratio();
        if aspect <= 0.0 || canvas.width == 0 || canvas.height == 0 {
            return Alignment::Skip(SkipReason::EmptyImage);
        }

        let canvas_w = canvas.width as f32;
        let canvas_h = canvas.height as f32;

        let torso_px = (shoulders.y - hips.y).abs() * canvas_h;
        if torso_px <= 0.0 {
            return Alignment::Skip(SkipReason::ZeroTorsoLength);
        }

        let mut height = torso_px / geometry.torso_ratio;
        let max_height = canvas_h * self.max_height_factor;
        if height > max_height {
            height = max_height;
        }
        let width = height * aspect;

        // Hip anchor of the image lands on the player's hip midpoint
        let x = hips.x * canvas_w - geometry.hip_anchor.x * width;
        let y = hips.y * canvas_h - geometry.hip_anchor.y * height;

        Alignment::Placed(Placement {
            x,
            y,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghost_core::LANDMARK_COUNT;
    use proptest::prelude::*;

    /// Body with shoulders at `shoulder_y`, hips at `hip_y`, hips centered on `hip_x`
    fn body(hip_x: f32, shoulder_y: f32, hip_y: f32) -> LandmarkFrame {
        let mut points = vec![Point2::new(hip_x, (shoulder_y + hip_y) / 2.0); LANDMARK_COUNT];
        points[11] = Point2::new(hip_x + 0.05, shoulder_y);
        points[12] = Point2::new(hip_x - 0.05, shoulder_y);
        points[23] = Point2::new(hip_x + 0.04, hip_y);
        points[24] = Point2::new(hip_x - 0.04, hip_y);
        LandmarkFrame::from_points(&points)
    }

    fn geometry(torso_ratio: f32) -> OverlayGeometry {
        OverlayGeometry {
            torso_ratio,
            hip_anchor: Point2::new(0.5, 0.6),
            image: ImageSize::new(300, 600),
        }
    }

    #[test]
    fn test_torso_scaled_height() {
        // 150 px torso on a 500 px canvas
        let live = body(0.5, 0.3, 0.6);
        let canvas = CanvasSize::new(800, 500);

        let placement = OverlayAligner::default()
            .align(&live, &geometry(0.3), canvas)
            .placement()
            .unwrap();

        assert!((placement.height - 500.0).abs() < 1e-3);
        assert!((placement.width - 250.0).abs() < 1e-3);
    }

    #[test]
    fn test_hip_anchor_lands_on_hips() {
        let live = body(0.4, 0.3, 0.6);
        let canvas = CanvasSize::new(800, 500);
        let geo = geometry(0.3);

        let p = OverlayAligner::default()
            .align(&live, &geo, canvas)
            .placement()
            .unwrap();

        let anchor_x = p.x + geo.hip_anchor.x * p.width;
        let anchor_y = p.y + geo.hip_anchor.y * p.height;
        assert!((anchor_x - 0.4 * 800.0).abs() < 1e-3);
        assert!((anchor_y - 0.6 * 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_height_is_clamped() {
        // Player very close to the camera
        let live = body(0.5, 0.0, 1.0);
        let canvas = CanvasSize::new(640, 480);

        let p = OverlayAligner::default()
            .align(&live, &geometry(0.1), canvas)
            .placement()
            .unwrap();

        assert!((p.height - 480.0 * 2.5).abs() < 1e-3);
        assert!((p.width - p.height * 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_inputs_skip() {
        let canvas = CanvasSize::new(640, 480);
        let aligner = OverlayAligner::default();

        assert_eq!(
            aligner.align(&body(0.5, 0.3, 0.6), &geometry(0.0), canvas),
            Alignment::Skip(SkipReason::ZeroTorsoRatio)
        );
        assert_eq!(
            aligner.align(&body(0.5, 0.5, 0.5), &geometry(0.3), canvas),
            Alignment::Skip(SkipReason::ZeroTorsoLength)
        );
        assert_eq!(
            aligner.align(&LandmarkFrame::default(), &geometry(0.3), canvas),
            Alignment::Skip(SkipReason::IncompleteLandmarks)
        );

        let mut flat = geometry(0.3);
        flat.image = ImageSize::new(300, 0);
        assert_eq!(
            aligner.align(&body(0.5, 0.3, 0.6), &flat, canvas),
            Alignment::Skip(SkipReason::EmptyImage)
        );
    }

    proptest! {
        #[test]
        fn prop_height_proportional_and_bounded(
            torso in 0.01f32..0.99,
            ratio in 0.05f32..1.0,
        ) {
            let canvas = CanvasSize::new(640, 480);
            let aligner = OverlayAligner::default();
            let live = body(0.5, 0.0, torso);

            let p = aligner.align(&live, &geometry(ratio), canvas).placement().unwrap();
            let unclamped = torso * 480.0 / ratio;

            prop_assert!(p.height <= 480.0 * 2.5 + 1e-3);
            prop_assert!((p.height - unclamped.min(1200.0)).abs() < 1e-2);
        }
    }
}
