//! In-memory asset source with failure injection
//!
//! Failures are injected through `&self`, so a test can keep an `Arc` to the
//! source and break or heal lookups while a trainer owns another.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use ghost_assets::{AssetError, AssetKind, AssetRequest, AssetResponse, AssetSource};
use ghost_core::{Point2, PoseType, Stage, TargetPose};
use ghost_visual::ImageSize;
use parking_lot::Mutex;

use crate::fixtures;

/// Default fixture metadata: torso ratio, hip anchor x, hip anchor y
pub const FIXTURE_META: [f32; 3] = [0.3, 0.5, 0.6];
/// Default fixture image size
pub const FIXTURE_IMAGE: ImageSize = ImageSize {
    width: 300,
    height: 600,
};

#[derive(Debug, Clone)]
struct StageFiles {
    image: ImageSize,
    meta: Vec<u8>,
    target: Vec<u8>,
}

/// Asset source backed by memory
#[derive(Debug, Default)]
pub struct InMemoryAssetSource {
    stages: HashMap<(PoseType, Stage), StageFiles>,
    overrides: Mutex<HashMap<AssetRequest, AssetResponse>>,
    broken_images: Mutex<HashSet<(PoseType, Stage)>>,
    fetches: AtomicUsize,
}

impl InMemoryAssetSource {
    /// A source with nothing in it
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every pose type and stage, with the fixture stage bodies as targets
    pub fn standard() -> Self {
        let mut source = Self::empty();
        for pose in PoseType::ALL {
            for stage in Stage::ALL {
                source.insert_stage(
                    pose,
                    stage,
                    FIXTURE_IMAGE,
                    FIXTURE_META,
                    &fixtures::stage_target(stage),
                );
            }
        }
        source
    }

    pub fn insert_stage(
        &mut self,
        pose: PoseType,
        stage: Stage,
        image: ImageSize,
        meta: [f32; 3],
        target: &TargetPose,
    ) {
        let files = StageFiles {
            image,
            meta: json(&meta),
            target: json(&target.to_pairs()),
        };
        self.stages.insert((pose, stage), files);
    }

    /// Insert a stage whose target is given as plain points
    pub fn insert_points(&mut self, pose: PoseType, stage: Stage, points: &[Point2]) {
        self.insert_stage(pose, stage, FIXTURE_IMAGE, FIXTURE_META, &fixtures::target(points));
    }

    /// Answer a lookup with an error status from now on
    pub fn fail_with(&self, request: AssetRequest, status: u16) {
        let message = match status {
            AssetResponse::NOT_FOUND => "File not found",
            _ => "Failed to read asset",
        };
        self.overrides
            .lock()
            .insert(request, AssetResponse::error(status, message));
    }

    /// Answer a lookup with a raw body and status 200
    pub fn respond_with(&self, request: AssetRequest, body: &str) {
        self.overrides
            .lock()
            .insert(request, AssetResponse::ok(body.as_bytes().to_vec()));
    }

    /// Make the reference image of a stage unreadable
    pub fn break_image(&self, pose: PoseType, stage: Stage) {
        self.broken_images.lock().insert((pose, stage));
    }

    /// Drop every injected failure
    pub fn heal(&self) {
        self.overrides.lock().clear();
        self.broken_images.lock().clear();
    }

    /// Number of JSON lookups answered so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl AssetSource for InMemoryAssetSource {
    fn fetch(&self, request: &AssetRequest) -> AssetResponse {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        if let Some(response) = self.overrides.lock().get(request) {
            return response.clone();
        }
        match self.stages.get(&(request.pose, request.stage)) {
            Some(files) => AssetResponse::ok(match request.kind {
                AssetKind::Meta => files.meta.clone(),
                AssetKind::Target => files.target.clone(),
            }),
            None => AssetResponse::not_found(),
        }
    }

    fn fetch_image(&self, pose: PoseType, stage: Stage) -> Result<ImageSize, AssetError> {
        if self.broken_images.lock().contains(&(pose, stage)) {
            return Err(AssetError::Image(format!("{pose}/ghost_{stage}.png is corrupt")));
        }
        self.stages
            .get(&(pose, stage))
            .map(|files| files.image)
            .ok_or_else(|| AssetError::NotFound(format!("{pose}/ghost_{stage}.png")))
    }
}

fn json<T: serde::Serialize + ?Sized>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injected_failure_and_heal() {
        let source = InMemoryAssetSource::standard();
        let request = AssetRequest::target(PoseType::DriveBackhand, Stage::new(2).unwrap());

        assert!(source.fetch(&request).is_success());
        source.fail_with(request, 404);
        assert_eq!(source.fetch(&request).status, 404);
        assert!(!source.has_stage(PoseType::DriveBackhand, Stage::new(2).unwrap()));

        source.heal();
        assert!(source.fetch(&request).is_success());
        assert_eq!(source.fetch_count(), 5);
    }
}
