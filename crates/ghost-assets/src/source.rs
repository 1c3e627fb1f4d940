//! Asset sources
//!
//! A source answers lookup requests. Failures are reported as response
//! statuses, the way a remote lookup API would.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ghost_core::{GhostResult, PoseType, Stage};
use ghost_visual::ImageSize;
use tracing::debug;

use crate::{AssetError, AssetKind, AssetRequest, AssetResponse};

/// Provider of reference assets
pub trait AssetSource {
    /// Answer a JSON lookup; never panics, failures are statuses
    fn fetch(&self, request: &AssetRequest) -> AssetResponse;

    /// Dimensions of the reference image for a stage
    fn fetch_image(&self, pose: PoseType, stage: Stage) -> Result<ImageSize, AssetError>;

    /// Are all three parts of a stage available?
    fn has_stage(&self, pose: PoseType, stage: Stage) -> bool {
        self.fetch_image(pose, stage).is_ok()
            && self.fetch(&AssetRequest::meta(pose, stage)).is_success()
            && self.fetch(&AssetRequest::target(pose, stage)).is_success()
    }
}

impl<S: AssetSource + ?Sized> AssetSource for &S {
    fn fetch(&self, request: &AssetRequest) -> AssetResponse {
        (**self).fetch(request)
    }

    fn fetch_image(&self, pose: PoseType, stage: Stage) -> Result<ImageSize, AssetError> {
        (**self).fetch_image(pose, stage)
    }

    fn has_stage(&self, pose: PoseType, stage: Stage) -> bool {
        (**self).has_stage(pose, stage)
    }
}

impl<S: AssetSource + ?Sized> AssetSource for Arc<S> {
    fn fetch(&self, request: &AssetRequest) -> AssetResponse {
        (**self).fetch(request)
    }

    fn fetch_image(&self, pose: PoseType, stage: Stage) -> Result<ImageSize, AssetError> {
        (**self).fetch_image(pose, stage)
    }

    fn has_stage(&self, pose: PoseType, stage: Stage) -> bool {
        (**self).has_stage(pose, stage)
    }
}

/// Handle a raw lookup query against a source
///
/// Invalid parameters answer 400 without touching the source.
pub fn serve_query<S: AssetSource + ?Sized>(
    source: &S,
    pose: &str,
    kind: &str,
    stage: &str,
) -> AssetResponse {
    match AssetRequest::from_query(pose, kind, stage) {
        Ok(request) => source.fetch(&request),
        Err(err) => AssetResponse::rejected(&err),
    }
}

/// Assets laid out on disk
///
/// ```text
/// <root>/<PoseType>/ghost_<stage>.png
/// <root>/<PoseType>/meta_<stage>.json
/// <root>/<PoseType>/target_<stage>.json
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryAssetSource {
    root: PathBuf,
}

impl DirectoryAssetSource {
    /// Open an asset directory; it must exist
    pub fn open(root: impl Into<PathBuf>) -> GhostResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("asset directory {} does not exist", root.display()),
            )
            .into());
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn json_path(&self, request: &AssetRequest) -> PathBuf {
        self.root
            .join(request.pose.name())
            .join(format!("{}_{}.json", request.kind, request.stage))
    }

    pub fn image_path(&self, pose: PoseType, stage: Stage) -> PathBuf {
        self.root
            .join(pose.name())
            .join(format!("ghost_{}.png", stage))
    }
}

impl AssetSource for DirectoryAssetSource {
    fn fetch(&self, request: &AssetRequest) -> AssetResponse {
        let path = self.json_path(request);
        if !path.is_file() {
            debug!(asset = %request, path = %path.display(), "asset file missing");
            return AssetResponse::not_found();
        }

        let body = match std::fs::read(&path) {
            Ok(body) => body,
            Err(e) => {
                return AssetResponse::error(
                    AssetResponse::INTERNAL_ERROR,
                    &format!("Failed to read asset: {e}"),
                )
            }
        };

        // Only well-formed JSON leaves the source
        if let Err(e) = serde_json::from_slice::<serde_json::Value>(&body) {
            return AssetResponse::error(
                AssetResponse::INTERNAL_ERROR,
                &format!("Failed to read asset: {e}"),
            );
        }

        AssetResponse::ok(body)
    }

    fn fetch_image(&self, pose: PoseType, stage: Stage) -> Result<ImageSize, AssetError> {
        let path = self.image_path(pose, stage);
        if !path.is_file() {
            return Err(AssetError::NotFound(path.display().to_string()));
        }
        let (width, height) =
            image::image_dimensions(&path).map_err(|e| AssetError::Image(e.to_string()))?;
        Ok(ImageSize::new(width, height))
    }

    fn has_stage(&self, pose: PoseType, stage: Stage) -> bool {
        self.image_path(pose, stage).is_file()
            && [AssetKind::Meta, AssetKind::Target]
                .into_iter()
                .all(|kind| self.json_path(&AssetRequest::new(pose, kind, stage)).is_file())
    }
}
