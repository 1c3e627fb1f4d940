//! Frame subscription
//!
//! The host's per-frame callback holds a `FrameSubscription` and checks it
//! before every tick. Cancelling is idempotent and takes effect before the
//! next scheduled tick runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Handle to the trainer's per-frame schedule
#[derive(Debug, Clone)]
pub struct FrameSubscription {
    active: Arc<AtomicBool>,
}

impl FrameSubscription {
    pub(crate) fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stop scheduling ticks; returns whether this call did the cancelling
    pub fn cancel(&self) -> bool {
        self.active.swap(false, Ordering::AcqRel)
    }
}
