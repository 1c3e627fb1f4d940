//! Ghost Trainer Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every part of the trainer:
//! - Body landmarks (LandmarkFrame, Point2)
//! - The closed set of pose types and their stages
//! - Session timestamps
//! - Errors and trainer configuration

pub mod config;
pub mod error;
pub mod landmark;
pub mod pose;
pub mod time;

pub use config::*;
pub use error::*;
pub use landmark::*;
pub use pose::*;
pub use time::*;
