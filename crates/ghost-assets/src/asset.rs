//! Decoded reference assets

use ghost_core::{Point2, PoseType, Stage, TargetPose};
use ghost_visual::{ImageSize, OverlayGeometry};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{AssetError, AssetResponse};

/// Scale and alignment metadata of a reference image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetMeta {
    /// Torso length as a fraction of the image height
    pub torso_ratio: f32,
    /// Normalized hip position inside the image
    pub hip_anchor: Point2,
}

impl AssetMeta {
    /// Decode a `meta` response: `[torsoRatio, hipAnchorX, hipAnchorY]`
    pub fn from_response(response: &AssetResponse) -> Result<Self, AssetError> {
        let values: Vec<f32> = decode_payload(response)?;
        match values.as_slice() {
            [torso_ratio, hip_x, hip_y] => Ok(AssetMeta {
                torso_ratio: *torso_ratio,
                hip_anchor: Point2::new(*hip_x, *hip_y),
            }),
            other => Err(AssetError::Malformed(format!(
                "meta has {} values, expected 3",
                other.len()
            ))),
        }
    }
}

/// Decode a `target` response: 33 `[x, y]` pairs
pub fn decode_target(response: &AssetResponse) -> Result<TargetPose, AssetError> {
    let pairs: Vec<[f32; 2]> = decode_payload(response)?;
    TargetPose::from_pairs(&pairs).map_err(|e| AssetError::Malformed(e.to_string()))
}

/// Body of a lookup response: data, or an error object
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Error { error: String },
    Data(T),
}

fn decode_payload<T: DeserializeOwned>(response: &AssetResponse) -> Result<T, AssetError> {
    let payload = serde_json::from_slice::<Payload<T>>(&response.body);

    if !response.is_success() {
        let message = match payload {
            Ok(Payload::Error { error }) => error,
            _ => String::from_utf8_lossy(&response.body).into_owned(),
        };
        return Err(AssetError::Http {
            status: response.status,
            message,
        });
    }

    match payload {
        Ok(Payload::Data(data)) => Ok(data),
        Ok(Payload::Error { error }) => Err(AssetError::Malformed(error)),
        Err(e) => Err(AssetError::Malformed(e.to_string())),
    }
}

/// Everything needed to score and draw one stage
#[derive(Debug, Clone, PartialEq)]
pub struct PoseAsset {
    pub pose: PoseType,
    pub stage: Stage,
    pub image: ImageSize,
    pub meta: AssetMeta,
    pub target: TargetPose,
}

impl PoseAsset {
    /// Geometry consumed by the overlay aligner
    pub fn geometry(&self) -> OverlayGeometry {
        OverlayGeometry {
            torso_ratio: self.meta.torso_ratio,
            hip_anchor: self.meta.hip_anchor,
            image: self.image,
        }
    }
}
