//! Time abstraction.
//!
//! The engine never reads wall-clock time directly: every timed behavior
//! (auction start delay, price decay, the 24 h reward unlock window) is a
//! lazy comparison against an injected [`Clock`]. Production uses
//! [`SystemClock`]; tests inject a `SimClock` they can advance.

use std::fmt;

/// Unix timestamp in whole seconds.
pub type Timestamp = i64;

/// Monotonic time source injected into the engine.
pub trait Clock: Send + Sync {
    /// Current time according to this clock.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time via `chrono`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp()
    }
}

impl fmt::Display for SystemClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SystemClock")
    }
}

#[cfg(any(test, feature = "test-helpers"))]
mod sim {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::{Clock, Timestamp};

    /// Deterministic test clock. Clones share the same underlying instant,
    /// so a test can hold one handle while the engine holds another.
    #[derive(Debug, Clone)]
    pub struct SimClock {
        now: Arc<AtomicI64>,
    }

    impl SimClock {
        #[must_use]
        pub fn new(start: Timestamp) -> Self {
            Self {
                now: Arc::new(AtomicI64::new(start)),
            }
        }

        /// Move time forward by `secs`.
        pub fn advance(&self, secs: i64) {
            self.now.fetch_add(secs, Ordering::SeqCst);
        }

        /// Jump to an absolute instant.
        pub fn set(&self, t: Timestamp) {
            self.now.store(t, Ordering::SeqCst);
        }
    }

    impl Clock for SimClock {
        fn now(&self) -> Timestamp {
            self.now.load(Ordering::SeqCst)
        }
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use sim::SimClock;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_sane() {
        // 2020-01-01 as a lower bound
        assert!(SystemClock.now() > 1_577_836_800);
    }

    #[test]
    fn sim_clock_advances() {
        let clock = SimClock::new(1_000);
        assert_eq!(clock.now(), 1_000);
        clock.advance(86_400);
        assert_eq!(clock.now(), 87_400);
        clock.set(5);
        assert_eq!(clock.now(), 5);
    }

    #[test]
    fn sim_clock_clones_share_time() {
        let clock = SimClock::new(0);
        let handle = clock.clone();
        handle.advance(60);
        assert_eq!(clock.now(), 60);
    }
}
