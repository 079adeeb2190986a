#![forbid(unsafe_code)]

//! Tween: one continuous timing animation between two scalars.
//!
//! # Invariants
//!
//! 1. `value()` is `from` before the first tick and exactly `to` once complete.
//! 2. Elapsed time never exceeds `duration`; the excess of the last tick is
//!    reported by `overshoot()`.
//!
//! # Failure Modes
//!
//! - Zero duration: clamped to 1ns, so the first non-zero tick completes it.

use web_time::Duration;

use super::{Animation, Easing};

/// Interpolates `from -> to` over `duration` through an [`Easing`] curve.
#[derive(Debug, Clone)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
    overshoot: Duration,
}

impl Tween {
    /// Create a tween.
    #[must_use]
    pub fn new(from: f32, to: f32, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration: if duration.is_zero() {
                Duration::from_nanos(1)
            } else {
                duration
            },
            elapsed: Duration::ZERO,
            easing,
            overshoot: Duration::ZERO,
        }
    }

    /// Start value.
    #[inline]
    #[must_use]
    pub fn start(&self) -> f32 {
        self.from
    }

    /// End value.
    #[inline]
    #[must_use]
    pub fn target(&self) -> f32 {
        self.to
    }

    /// Linear progress in [0, 1].
    #[must_use]
    pub fn progress(&self) -> f32 {
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0) as f32
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        let next = self.elapsed.saturating_add(dt);
        if next >= self.duration {
            self.overshoot = next - self.duration;
            self.elapsed = self.duration;
        } else {
            self.overshoot = Duration::ZERO;
            self.elapsed = next;
        }
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        if self.is_complete() {
            return self.to;
        }
        let eased = self.easing.apply(self.progress());
        self.from + (self.to - self.from) * eased
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.overshoot = Duration::ZERO;
    }

    fn overshoot(&self) -> Duration {
        self.overshoot
    }
}
