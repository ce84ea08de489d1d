#![forbid(unsafe_code)]

//! Time sources.
//!
//! Controllers take host timestamps as a [`Duration`] since an arbitrary
//! origin. [`WallClock`] measures from its own creation; [`ManualClock`] is
//! stepped explicitly by tests and offline renderers.

use std::cell::Cell;

use web_time::{Duration, Instant};

/// A monotonic timestamp source.
pub trait Clock {
    /// Time since the clock's origin.
    fn now(&self) -> Duration;
}

/// Real time via `web-time`, so it works natively and on `wasm32`.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn starting_at(now: Duration) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by));
    }

    /// Jump to an absolute time. Moving backwards is allowed; consumers must
    /// tolerate it.
    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}
