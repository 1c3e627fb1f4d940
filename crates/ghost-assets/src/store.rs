//! Asset store - per pose-type cache of loaded stages
//!
//! Loading a pose type is the only blocking step in a session. It happens
//! when the trainer starts and when the operator switches pose type, never
//! inside the detection loop.

use std::collections::HashMap;

use ghost_core::{GhostError, PoseType, Stage};
use tracing::{info, warn};

use crate::{decode_target, AssetMeta, AssetRequest, AssetSource, PoseAsset};

/// Part of a stage's assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetPart {
    Image,
    Meta,
    Target,
}

/// Why a stage could not be loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    /// Failed parts with their error messages
    pub failures: Vec<(AssetPart, String)>,
}

impl StageFailure {
    pub fn is_missing(&self, part: AssetPart) -> bool {
        self.failures.iter().any(|(p, _)| *p == part)
    }

    pub fn to_error(&self, pose: PoseType, stage: Stage) -> GhostError {
        let reason = self
            .failures
            .iter()
            .map(|(part, msg)| format!("{part:?}: {msg}"))
            .collect::<Vec<_>>()
            .join("; ");
        GhostError::AssetUnavailable {
            pose,
            stage,
            reason,
        }
    }
}

/// Load state of one stage
#[derive(Debug, Clone, PartialEq)]
pub enum StageSlot {
    Ready(PoseAsset),
    Unavailable(StageFailure),
}

impl StageSlot {
    pub fn asset(&self) -> Option<&PoseAsset> {
        match self {
            StageSlot::Ready(asset) => Some(asset),
            StageSlot::Unavailable(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, StageSlot::Ready(_))
    }
}

/// Counts of loaded parts, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    pub images: usize,
    pub metadata: usize,
    pub targets: usize,
    pub ready_stages: usize,
}

/// All stages of one pose type
#[derive(Debug, Clone, PartialEq)]
pub struct PoseAssets {
    pub pose: PoseType,
    stages: Vec<StageSlot>,
}

impl PoseAssets {
    pub fn stage(&self, stage: Stage) -> &StageSlot {
        &self.stages[usize::from(stage.index())]
    }

    pub fn stages(&self) -> impl Iterator<Item = (Stage, &StageSlot)> {
        Stage::ALL.into_iter().zip(self.stages.iter())
    }

    /// Every stage loaded
    pub fn is_complete(&self) -> bool {
        self.stages.iter().all(StageSlot::is_ready)
    }

    /// No stage loaded at all
    pub fn is_unavailable(&self) -> bool {
        !self.stages.iter().any(StageSlot::is_ready)
    }

    pub fn summary(&self) -> LoadSummary {
        let mut summary = LoadSummary::default();
        for slot in &self.stages {
            let loaded = |part| match slot {
                StageSlot::Ready(_) => true,
                StageSlot::Unavailable(f) => !f.is_missing(part),
            };
            summary.images += usize::from(loaded(AssetPart::Image));
            summary.metadata += usize::from(loaded(AssetPart::Meta));
            summary.targets += usize::from(loaded(AssetPart::Target));
            summary.ready_stages += usize::from(slot.is_ready());
        }
        summary
    }
}

/// Caching asset store over a source
#[derive(Debug)]
pub struct AssetStore<S> {
    source: S,
    cache: HashMap<PoseType, PoseAssets>,
}

impl<S: AssetSource> AssetStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: HashMap::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load a pose type, reusing cached stages
    ///
    /// Stages that failed on an earlier load are retried; ready ones are
    /// kept as they are.
    pub fn load(&mut self, pose: PoseType) -> &PoseAssets {
        let source = &self.source;
        let entry = self.cache.entry(pose).or_insert_with(|| PoseAssets {
            pose,
            stages: Stage::ALL
                .iter()
                .map(|_| StageSlot::Unavailable(StageFailure { failures: Vec::new() }))
                .collect(),
        });

        let mut retried = 0;
        for (slot, stage) in entry.stages.iter_mut().zip(Stage::ALL) {
            if !slot.is_ready() {
                *slot = load_stage(source, pose, stage);
                retried += 1;
            }
        }

        if retried > 0 {
            let summary = entry.summary();
            info!(
                pose = %pose,
                images = summary.images,
                metadata = summary.metadata,
                targets = summary.targets,
                ready = summary.ready_stages,
                "loaded pose assets"
            );
        }
        entry
    }

    /// Drop any cached stages of a pose type and load it from scratch
    pub fn reload(&mut self, pose: PoseType) -> &PoseAssets {
        self.cache.remove(&pose);
        self.load(pose)
    }

    /// Cached assets, without loading
    pub fn get(&self, pose: PoseType) -> Option<&PoseAssets> {
        self.cache.get(&pose)
    }

    /// Cached asset for one stage, `None` if not loaded or unavailable
    pub fn asset(&self, pose: PoseType, stage: Stage) -> Option<&PoseAsset> {
        self.get(pose)?.stage(stage).asset()
    }
}

/// Fetch and decode the three parts of a stage
/// Each part is fetched even when an earlier one failed.
fn load_stage<S: AssetSource + ?Sized>(source: &S, pose: PoseType, stage: Stage) -> StageSlot {
    let mut failures = Vec::new();

    let image = source
        .fetch_image(pose, stage)
        .map_err(|e| failures.push((AssetPart::Image, e.to_string())))
        .ok();
    let meta = AssetMeta::from_response(&source.fetch(&AssetRequest::meta(pose, stage)))
        .map_err(|e| failures.push((AssetPart::Meta, e.to_string())))
        .ok();
    let target = decode_target(&source.fetch(&AssetRequest::target(pose, stage)))
        .map_err(|e| failures.push((AssetPart::Target, e.to_string())))
        .ok();

    match (image, meta, target) {
        (Some(image), Some(meta), Some(target)) => StageSlot::Ready(PoseAsset {
            pose,
            stage,
            image,
            meta,
            target,
        }),
        _ => {
            for (part, reason) in &failures {
                warn!(pose = %pose, stage = %stage, part = ?part, %reason, "failed to load stage asset");
            }
            StageSlot::Unavailable(StageFailure { failures })
        }
    }
}
