#![forbid(unsafe_code)]

//! Fixed-step frame clock.
//!
//! Tests never sleep. A [`FrameClock`] hands out synthetic instants on a
//! fixed frame cadence anchored at a single real `Instant`, so every run of
//! a scenario sees identical timestamps relative to its start.

use web_time::{Duration, Instant};

/// One 60Hz frame, rounded down to whole milliseconds.
pub const FRAME: Duration = Duration::from_millis(16);

/// Deterministic time source for scenario replay.
#[derive(Debug, Clone)]
pub struct FrameClock {
    origin: Instant,
    now: Instant,
    step: Duration,
}

impl FrameClock {
    /// A clock at `origin` stepping by [`FRAME`].
    #[must_use]
    pub fn new(origin: Instant) -> Self {
        Self::with_step(origin, FRAME)
    }

    /// A clock at `origin` stepping by `step`.
    #[must_use]
    pub fn with_step(origin: Instant, step: Duration) -> Self {
        Self {
            origin,
            now: origin,
            step,
        }
    }

    #[inline]
    #[must_use]
    pub fn now(&self) -> Instant {
        self.now
    }

    #[inline]
    #[must_use]
    pub fn origin(&self) -> Instant {
        self.origin
    }

    #[inline]
    #[must_use]
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Time since the origin.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.now - self.origin
    }

    /// Advance one frame and return the new time.
    pub fn advance(&mut self) -> Instant {
        self.now += self.step;
        self.now
    }

    /// Jump to `origin + offset`. Never moves backwards.
    pub fn seek(&mut self, offset: Duration) -> Instant {
        let target = self.origin + offset;
        if target > self.now {
            self.now = target;
        }
        self.now
    }

    /// The next frame boundary strictly after the current time.
    #[must_use]
    pub fn next_frame(&self) -> Instant {
        self.now + self.step
    }
}
