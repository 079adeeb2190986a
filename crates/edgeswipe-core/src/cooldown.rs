#![forbid(unsafe_code)]

//! Debounced single-shot deadline.
//!
//! [`CooldownTimer`] backs the temporary-disable window. Re-arming replaces
//! the pending deadline instead of stacking a second one, so a burst of
//! programmatic tab changes keeps pushing the expiry out from the latest call.
//!
//! The timer never fires on its own. The owner polls it from event and frame
//! handlers with the current [`Instant`].
//!
//! A duration too large to add to `now` saturates to an unbounded deadline:
//! the timer stays active until [`cancel`](CooldownTimer::cancel)led.

use web_time::{Duration, Instant};

use crate::logging::TARGET_COORDINATOR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deadline {
    At(Instant),
    Unbounded,
}

/// A restartable deadline.
#[derive(Debug, Clone, Default)]
pub struct CooldownTimer {
    deadline: Option<Deadline>,
}

impl CooldownTimer {
    /// Create an idle timer.
    #[must_use]
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Start (or restart) the countdown. Returns the new deadline, or `None`
    /// when `now + duration` is not representable.
    pub fn arm(&mut self, now: Instant, duration: Duration) -> Option<Instant> {
        let deadline = now.checked_add(duration);
        self.deadline = Some(deadline.map_or(Deadline::Unbounded, Deadline::At));
        if deadline.is_none() {
            tracing::debug!(
                target: TARGET_COORDINATOR,
                ?duration,
                "cooldown saturated to unbounded"
            );
        }
        deadline
    }

    /// Drop any pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Whether the countdown is still running at `now`.
    #[must_use]
    pub fn is_active(&self, now: Instant) -> bool {
        match self.deadline {
            Some(Deadline::At(deadline)) => now < deadline,
            Some(Deadline::Unbounded) => true,
            None => false,
        }
    }

    /// Whether a deadline is pending, bounded or not.
    #[inline]
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Pending deadline, if armed with a representable one.
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        match self.deadline {
            Some(Deadline::At(deadline)) => Some(deadline),
            _ => None,
        }
    }

    /// Returns `true` exactly once, on the first poll at or after the deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(Deadline::At(deadline)) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
