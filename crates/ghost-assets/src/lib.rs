//! Ghost Trainer Assets - Reference data for every (pose type, stage)
//!
//! Each stage of a pose type has three independently fetched parts:
//! - a reference image (only its dimensions matter to the engine)
//! - metadata `[torsoRatio, hipAnchorX, hipAnchorY]`
//! - a target pose of 33 `[x, y]` pairs
//!
//! A stage is usable only when all three loaded. A failed part makes that
//! stage unavailable; it never aborts the session.

pub mod asset;
pub mod catalog;
pub mod error;
pub mod request;
pub mod source;
pub mod store;

pub use asset::*;
pub use catalog::*;
pub use error::*;
pub use request::*;
pub use source::*;
pub use store::*;
