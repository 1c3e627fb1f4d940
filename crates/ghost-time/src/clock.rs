//! Clock implementations

use std::sync::Arc;
use std::time::{Duration, Instant};

use ghost_core::Timestamp;
use parking_lot::Mutex;

/// Source of the current session time
pub trait Clock {
    /// Current time. MUST never go backwards between calls.
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Wall clock backed by the monotonic OS clock
/// Time zero is the moment the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    reference: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            reference: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        let elapsed = self.reference.elapsed();
        Timestamp::from_micros(elapsed.as_micros().min(i64::MAX as u128) as i64)
    }
}

/// Simulation clock, moved only by explicit calls
///
/// Clones share the same time, so a test can keep a handle while the loop
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    value: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    /// Create a clock starting at zero
    pub fn new() -> Self {
        Self::starting_at(Timestamp::ZERO)
    }

    pub fn starting_at(start: Timestamp) -> Self {
        ManualClock {
            value: Arc::new(Mutex::new(start)),
        }
    }

    /// Advance by a duration, returning the new time
    pub fn advance(&self, dt: Duration) -> Timestamp {
        let mut value = self.value.lock();
        *value = value.saturating_add(dt);
        *value
    }

    pub fn advance_millis(&self, millis: u64) -> Timestamp {
        self.advance(Duration::from_millis(millis))
    }

    /// Jump to a specific time
    /// Only allowed to move forward; earlier targets are ignored.
    pub fn set(&self, target: Timestamp) -> Timestamp {
        let mut value = self.value.lock();
        if target > *value {
            *value = target;
        }
        *value
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.value.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();

        let t1 = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        let t2 = clock.now();

        assert!(t2 > t1);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let handle = clock.clone();

        handle.advance_millis(250);

        assert_eq!(clock.now(), Timestamp::from_millis(250));
    }

    #[test]
    fn test_manual_clock_never_moves_back() {
        let clock = ManualClock::starting_at(Timestamp::from_millis(1000));

        clock.set(Timestamp::from_millis(400));
        assert_eq!(clock.now(), Timestamp::from_millis(1000));

        clock.set(Timestamp::from_millis(1600));
        assert_eq!(clock.now(), Timestamp::from_millis(1600));
    }

    #[test]
    fn test_clock_through_arc() {
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(ManualClock::new());
        assert_eq!(clock.now(), Timestamp::ZERO);
    }

    proptest! {
        #[test]
        fn prop_manual_clock_monotonic(steps in proptest::collection::vec(0i64..5_000, 1..50)) {
            let clock = ManualClock::new();
            let mut last = clock.now();
            for step in steps {
                let now = clock.set(Timestamp::from_millis(step));
                prop_assert!(now >= last);
                last = now;
            }
        }
    }
}
