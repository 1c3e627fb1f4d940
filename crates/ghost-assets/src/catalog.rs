//! Pose catalog - what can be trained

use ghost_core::{PoseType, Stage};
use serde::Serialize;

use crate::AssetSource;

/// A selectable pose type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub pose: PoseType,
    pub name: &'static str,
    pub description: &'static str,
    /// First stage has its image, metadata and target
    pub has_assets: bool,
}

/// List every pose type with its asset availability
pub fn catalog<S: AssetSource + ?Sized>(source: &S) -> Vec<CatalogEntry> {
    PoseType::ALL
        .into_iter()
        .map(|pose| CatalogEntry {
            pose,
            name: pose.display_name(),
            description: pose.description(),
            has_assets: source.has_stage(pose, Stage::FIRST),
        })
        .collect()
}
