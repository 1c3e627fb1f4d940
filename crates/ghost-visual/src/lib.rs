//! Ghost Trainer Visual - Pose comparison and overlay placement
//!
//! Both operations are pure functions of a live landmark frame and stored
//! reference data:
//!
//! - Similarity: mean cosine between matching bone vectors of the live body
//!   and the target pose. Invariant to where the player stands and largely
//!   to how far from the camera.
//! - Overlay: torso-scaled, hip-anchored placement of the reference image on
//!   the live canvas. Not a skeleton warp.

pub mod overlay;
pub mod similarity;
pub mod skeleton;

pub use overlay::*;
pub use similarity::*;
pub use skeleton::*;
