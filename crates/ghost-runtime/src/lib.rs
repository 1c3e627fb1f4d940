//! Ghost Trainer Runtime - Detection loop and its host integration
//!
//! This crate wires the pieces into a running trainer:
//! - Camera and pose detector seams
//! - The per-frame detection loop controller
//! - Render instructions for the UI layer
//! - Frame subscription handles
//! - Recording replay and host loops
//! - Tracing setup

pub mod driver;
pub mod recording;
pub mod render;
pub mod source;
pub mod subscription;
pub mod telemetry;
pub mod trainer;

pub use driver::*;
pub use recording::*;
pub use render::*;
pub use source::*;
pub use subscription::*;
pub use telemetry::*;
pub use trainer::*;
