//! Ghost Trainer Test Harness - Deterministic trainer simulation
//!
//! This crate provides:
//! - Synthetic landmark bodies for every fixture stage
//! - An in-memory asset source with per-request failure injection
//! - A scripted camera
//! - A trainer simulator on a manual clock

pub mod assets;
pub mod camera;
pub mod fixtures;
pub mod simulator;

pub use assets::*;
pub use camera::*;
pub use simulator::*;
