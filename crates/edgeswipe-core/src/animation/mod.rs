#![forbid(unsafe_code)]

//! Frame-ticked animation primitives.
//!
//! Everything here is driven by explicit `tick(dt)` calls from the host's
//! frame clock. There are no threads and no hidden timers: an animation only
//! advances when the caller says time has passed.
//!
//! - [`Animation`]: the common contract (`tick`, `value`, `is_complete`).
//! - [`Easing`] plus the free easing functions.
//! - [`Tween`]: a single continuous timing animation between two values.
//! - [`AnimatedValue`]: an owned, clamped scalar that can run one tween at a
//!   time and stops it on drop.

mod tween;
mod value;

pub use tween::Tween;
pub use value::{AnimatedValue, AnimationEnd};

use web_time::Duration;

#[cfg(feature = "config-file")]
use serde::{Deserialize, Serialize};

/// A time-driven animation producing a scalar value.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current value.
    fn value(&self) -> f32;

    /// Rewind to the initial state.
    fn reset(&mut self);

    /// Time consumed past completion by the last tick.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

// ---------------------------------------------------------------------------
// Easing
// ---------------------------------------------------------------------------

/// `t` unchanged.
#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-in.
#[inline]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Quadratic ease-out.
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out.
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Cubic ease-out.
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Named easing curve, so configs can select one without a function pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(rename_all = "snake_case"))]
pub enum Easing {
    Linear,
    EaseIn,
    #[default]
    EaseOut,
    EaseInOut,
    EaseOutCubic,
}

impl Easing {
    /// Map linear progress `t` in [0, 1] through the curve.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Self::Linear => linear(t),
            Self::EaseIn => ease_in(t),
            Self::EaseOut => ease_out(t),
            Self::EaseInOut => ease_in_out(t),
            Self::EaseOutCubic => ease_out_cubic(t),
        }
    }
}
