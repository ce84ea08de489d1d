#![forbid(unsafe_code)]

//! Host-driven frame loops and the start-once latch.
//!
//! A [`FrameLoop`] never schedules itself. The host calls
//! [`tick`](FrameLoop::tick) from its animation callback; the loop answers
//! with the delta since its previous tick, or `None` once it has been
//! cancelled or has finished.
//!
//! # Invariants
//!
//! 1. A cancelled or finished loop never yields another tick.
//! 2. Deltas are never negative; a host clock that steps backwards yields a
//!    zero delta and re-bases the loop.

use tracing::trace;
use web_time::Duration;

use crate::cancellation::{CancellationSource, CancellationToken};

/// One cooperative per-frame loop.
#[derive(Debug)]
pub struct FrameLoop {
    name: &'static str,
    source: CancellationSource,
    last: Option<Duration>,
    frames: u64,
    finished: bool,
}

impl FrameLoop {
    /// Start a new live loop.
    #[must_use]
    pub fn start(name: &'static str) -> Self {
        trace!(loop_name = name, "frame loop started");
        Self {
            name,
            source: CancellationSource::new(),
            last: None,
            frames: 0,
            finished: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Token observing this loop's cancellation.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.source.token()
    }

    /// Advance one frame. The first tick reports a zero delta.
    pub fn tick(&mut self, now: Duration) -> Option<Duration> {
        if !self.is_live() {
            return None;
        }
        let dt = match self.last {
            Some(last) => now.checked_sub(last).unwrap_or(Duration::ZERO),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        self.frames += 1;
        Some(dt)
    }

    /// Stop permanently.
    pub fn cancel(&mut self) {
        if self.source.cancel() {
            trace!(loop_name = self.name, frames = self.frames, "frame loop cancelled");
        }
    }

    /// Mark the loop as having reached its natural end.
    pub fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            trace!(loop_name = self.name, frames = self.frames, "frame loop finished");
        }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.finished && !self.source.is_cancelled()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.source.is_cancelled()
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.source.cancel();
    }
}

/// Fires once per activation edge.
///
/// Re-renders that observe "still active" must not restart the clock;
/// only a cleared latch lets the next activation begin a fresh run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StartLatch {
    armed: bool,
}

impl StartLatch {
    #[must_use]
    pub const fn new() -> Self {
        Self { armed: false }
    }

    /// Arm the latch. Returns `true` only if it was not armed already.
    pub fn arm(&mut self) -> bool {
        !std::mem::replace(&mut self.armed, true)
    }

    pub fn clear(&mut self) {
        self.armed = false;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }
}
