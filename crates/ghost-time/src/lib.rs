//! Ghost Trainer Time - Clock abstraction
//!
//! The session never reads wall time directly. A `Clock` is injected into the
//! detection loop so that hold and cooldown timing can be driven by:
//! - `MonotonicClock`: real elapsed time, for live cameras
//! - `ManualClock`: explicitly advanced time, for replays and tests

pub mod clock;

pub use clock::*;
