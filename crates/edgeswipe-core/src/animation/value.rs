#![forbid(unsafe_code)]

//! Owned animated scalar.
//!
//! [`AnimatedValue`] is the handle behind a swipe's progress. It is either
//! resting at a value or running exactly one [`Tween`] toward a target.
//!
//! # Invariants
//!
//! 1. `value()` always lies in the handle's `[min, max]` range.
//! 2. At most one tween runs at a time; `set()` and `animate_to()` replace it.
//! 3. `tick()` reports [`AnimationEnd`] exactly once per tween, and only when
//!    the tween ran to completion. A stopped tween reports nothing.
//! 4. Dropping the handle stops any running tween.

use web_time::Duration;

use super::{Animation, Easing, Tween};
use crate::logging::TARGET_ANIMATION;

/// A tween ran to completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationEnd {
    /// The value the tween settled on.
    pub value: f32,
}

/// Clamped scalar that can be animated.
#[derive(Debug)]
pub struct AnimatedValue {
    value: f32,
    min: f32,
    max: f32,
    tween: Option<Tween>,
}

impl AnimatedValue {
    /// Create a value resting at `initial`, clamped to `[min, max]`.
    ///
    /// If `max < min` the range collapses to `min`.
    #[must_use]
    pub fn new(initial: f32, min: f32, max: f32) -> Self {
        let max = max.max(min);
        Self {
            value: clamp_finite(initial, min, max),
            min,
            max,
            tween: None,
        }
    }

    /// Current value.
    #[inline]
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Upper bound of the range.
    #[inline]
    #[must_use]
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Whether a tween is running.
    #[inline]
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Target of the running tween, if any.
    #[must_use]
    pub fn animation_target(&self) -> Option<f32> {
        self.tween.as_ref().map(Tween::target)
    }

    /// Jump to `value`, stopping any running tween.
    pub fn set(&mut self, value: f32) {
        self.tween = None;
        self.value = clamp_finite(value, self.min, self.max);
    }

    /// Start a single continuous tween from the current value to `target`.
    pub fn animate_to(&mut self, target: f32, duration: Duration, easing: Easing) {
        let target = clamp_finite(target, self.min, self.max);
        self.tween = Some(Tween::new(self.value, target, duration, easing));
    }

    /// Advance the running tween by `dt`.
    pub fn tick(&mut self, dt: Duration) -> Option<AnimationEnd> {
        let tween = self.tween.as_mut()?;
        tween.tick(dt);
        self.value = clamp_finite(tween.value(), self.min, self.max);
        if tween.is_complete() {
            self.tween = None;
            return Some(AnimationEnd { value: self.value });
        }
        None
    }

    /// Stop the running tween where it is. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        self.tween.take().is_some()
    }
}

impl Drop for AnimatedValue {
    fn drop(&mut self) {
        if self.stop() {
            tracing::trace!(
                target: TARGET_ANIMATION,
                value = self.value,
                "animation stopped on drop"
            );
        }
    }
}

fn clamp_finite(v: f32, min: f32, max: f32) -> f32 {
    if v.is_nan() { min } else { v.clamp(min, max) }
}
