//! Clock adapters.
//!
//! - [`MonotonicClock`] wraps `std::time::Instant` for the simulator and
//!   any hosted deployment.
//! - [`ManualClock`] is advanced by hand; scripted runs and tests use it to
//!   replay exact timelines.

use core::cell::Cell;
use core::time::Duration;

use crate::app::ports::TimePort;
use crate::time::Instant;

/// Milliseconds since the clock was created.
pub struct MonotonicClock {
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Seconds since start (monotonic).
    pub fn uptime_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}

impl TimePort for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.start.elapsed().as_millis() as u64)
    }
}

/// Clock that only moves when told to.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new(start: Instant) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Jump to `at`.  Moving backwards is ignored.
    pub fn set(&self, at: Instant) {
        if at > self.now.get() {
            self.now.set(at);
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl TimePort for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
