#![forbid(unsafe_code)]

//! Edge-swipe recognition: qualifies touch streams and measures them.
//!
//! [`GestureRecognizer`] is a small stateful processor fed by the
//! [`TouchArbiter`](crate::arbiter::TouchArbiter) callbacks. It decides
//! whether a stream is a left-edge swipe and converts it into
//! [`RecognizerEvent`]s that the coordinator turns into progress and
//! completion.
//!
//! # State Machine
//!
//! ```text
//!   Idle ──start qualifies──▶ Armed ──move qualifies──▶ Tracking
//!    ▲                          │                          │
//!    └──── release / steal ─────┴──── release / steal ─────┘
//! ```
//!
//! - **Start qualification**: the touch begins within `edge_threshold_px` of
//!   the left edge, the screen is enabled and focused, nothing blocks the
//!   gesture, no cooldown is running, and no gesture is being tracked.
//! - **Move qualification**: horizontal travel dominates (`|dx| > |dy|`) and
//!   is rightward beyond `move_slop_px`.
//!
//! # Invariants
//!
//! 1. `Began` is always followed by zero or more `Moved` and then exactly one
//!    `Released` or `Terminated`.
//! 2. An armed stream that never qualifies ends silently: no event is emitted
//!    for its release or termination.
//! 3. While tracking, the recognizer refuses termination requests.
//! 4. After `reset()` the recognizer is idle.
//!
//! # Failure Modes
//!
//! - Samples with non-increasing timestamps do not update the velocity
//!   estimate; the previous estimate is kept.
//! - Direction reversal while tracking is not a failure: `dx` may shrink or go
//!   negative and the gesture continues.

use web_time::Instant;

use crate::arbiter::TouchTrack;
use crate::config::GestureConfig;
use crate::logging::TARGET_GESTURE;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Caller-owned gating flags, read at start qualification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorContext {
    /// The gesture is enabled on this screen at all.
    pub is_enabled: bool,
    /// The hosting screen currently has focus.
    pub is_screen_focused: bool,
    /// The drawer is already open, or the caller suppresses the gesture.
    pub is_blocked: bool,
    /// A cooldown window is running.
    pub is_temporarily_disabled: bool,
}

impl CoordinatorContext {
    /// Whether these flags allow a new gesture to start.
    #[inline]
    #[must_use]
    pub fn permits_start(&self) -> bool {
        self.is_enabled
            && self.is_screen_focused
            && !self.is_blocked
            && !self.is_temporarily_disabled
    }
}

/// One measurement of an active gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    /// Where the touch went down.
    pub start_x: f32,
    /// Horizontal displacement from the start.
    pub dx: f32,
    /// Vertical displacement from the start.
    pub dy: f32,
    /// Horizontal velocity in px/ms.
    pub velocity_x: f32,
    /// When the sample was taken.
    pub timestamp: Instant,
}

/// Output of the recognizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecognizerEvent {
    /// Start qualification passed; the stream is captured.
    Armed { start_x: f32 },
    /// Move qualification passed; tracking begins.
    Began(GestureSample),
    /// A tracked move.
    Moved(GestureSample),
    /// Finger lifted while tracking.
    Released {
        sample: GestureSample,
        should_complete: bool,
    },
    /// The stream was taken away or aborted while tracking.
    Terminated(GestureSample),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Armed,
    Tracking,
}

// ---------------------------------------------------------------------------
// GestureRecognizer
// ---------------------------------------------------------------------------

/// Stateful left-edge swipe recognizer.
pub struct GestureRecognizer {
    config: GestureConfig,
    phase: Phase,
    // (dx, timestamp) of the most recent sample, for velocity.
    last: Option<(f32, Instant)>,
    velocity_x: f32,
}

impl std::fmt::Debug for GestureRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureRecognizer")
            .field("phase", &self.phase)
            .field("velocity_x", &self.velocity_x)
            .finish()
    }
}

impl GestureRecognizer {
    /// Create an idle recognizer.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            last: None,
            velocity_x: 0.0,
        }
    }

    /// Whether a qualified gesture is being tracked.
    #[inline]
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.phase == Phase::Tracking
    }

    /// Whether the stream is captured but not yet qualified as a swipe.
    #[inline]
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.phase == Phase::Armed
    }

    /// Get a reference to the current configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Start qualification for a touch going down at `start_x`.
    #[must_use]
    pub fn qualifies_start(&self, start_x: f32, ctx: &CoordinatorContext) -> bool {
        let in_edge = start_x.is_finite() && start_x <= self.config.edge_threshold_px;
        let ok = in_edge && ctx.permits_start() && !self.is_tracking();
        if !ok {
            tracing::trace!(
                target: TARGET_GESTURE,
                start_x,
                in_edge,
                ?ctx,
                "start not qualified"
            );
        }
        ok
    }

    /// Move qualification for a displacement from the start.
    #[must_use]
    pub fn qualifies_move(&self, dx: f32, dy: f32) -> bool {
        dx.abs() > dy.abs() && dx > self.config.move_slop_px
    }

    /// Whether to claim the stream on a move in the capture pass.
    ///
    /// An idle recognizer re-runs start qualification against the stream's
    /// origin, so a stream that was not captured on `Down` can still be
    /// claimed once the gating flags allow it.
    #[must_use]
    pub fn wants_move(&self, track: &TouchTrack, ctx: &CoordinatorContext) -> bool {
        match self.phase {
            Phase::Tracking => true,
            Phase::Armed => self.qualifies_move(track.dx(), track.dy()),
            Phase::Idle => {
                self.qualifies_start(track.start().x, ctx)
                    && self.qualifies_move(track.dx(), track.dy())
            }
        }
    }

    /// Whether a competing recognizer may take the stream.
    #[inline]
    #[must_use]
    pub fn allows_termination(&self) -> bool {
        !self.is_tracking()
    }

    /// The stream was granted to this recognizer.
    pub fn arm(&mut self, track: &TouchTrack, ctx: &CoordinatorContext) -> Option<RecognizerEvent> {
        let start_x = track.start().x;
        if self.phase != Phase::Idle || !self.qualifies_start(start_x, ctx) {
            return None;
        }
        self.phase = Phase::Armed;
        self.velocity_x = 0.0;
        self.last = Some((0.0, track.origin.timestamp));
        tracing::debug!(target: TARGET_GESTURE, start_x, "armed");
        Some(RecognizerEvent::Armed { start_x })
    }

    /// A move on an owned stream.
    pub fn track_move(&mut self, track: &TouchTrack) -> Option<RecognizerEvent> {
        match self.phase {
            Phase::Idle => None,
            Phase::Armed => {
                self.observe(track);
                if !self.qualifies_move(track.dx(), track.dy()) {
                    return None;
                }
                self.phase = Phase::Tracking;
                let sample = self.sample(track);
                tracing::debug!(
                    target: TARGET_GESTURE,
                    dx = sample.dx,
                    dy = sample.dy,
                    "tracking"
                );
                Some(RecognizerEvent::Began(sample))
            }
            Phase::Tracking => {
                self.observe(track);
                Some(RecognizerEvent::Moved(self.sample(track)))
            }
        }
    }

    /// Finger lifted on an owned stream.
    ///
    /// The release sample carries the velocity of the last move. The `Up`
    /// itself is not a velocity observation: a finger usually lifts where it
    /// last moved, some milliseconds later.
    pub fn release(&mut self, track: &TouchTrack) -> Option<RecognizerEvent> {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        if phase != Phase::Tracking {
            self.last = None;
            return None;
        }
        let sample = self.sample(track);
        self.last = None;
        let should_complete = Self::should_complete(&sample, &self.config);
        tracing::debug!(
            target: TARGET_GESTURE,
            dx = sample.dx,
            velocity_x = sample.velocity_x,
            should_complete,
            "released"
        );
        Some(RecognizerEvent::Released {
            sample,
            should_complete,
        })
    }

    /// The stream was stolen or aborted.
    pub fn terminate(&mut self, track: &TouchTrack) -> Option<RecognizerEvent> {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        if phase != Phase::Tracking {
            self.last = None;
            return None;
        }
        let sample = self.sample(track);
        self.last = None;
        tracing::debug!(target: TARGET_GESTURE, dx = sample.dx, "terminated");
        Some(RecognizerEvent::Terminated(sample))
    }

    /// Return to idle, dropping any measurement in progress.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.last = None;
        self.velocity_x = 0.0;
    }

    /// The completion rule, evaluated on the release sample.
    ///
    /// A drag completes once it travels past `min_completion_distance_px`.
    /// A shorter flick completes if it travelled past `flick_min_distance_px`
    /// and is still moving faster than `min_completion_velocity`.
    #[must_use]
    pub fn should_complete(sample: &GestureSample, config: &GestureConfig) -> bool {
        sample.dx > config.min_completion_distance_px
            || (sample.dx > config.flick_min_distance_px
                && sample.velocity_x > config.min_completion_velocity)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

impl GestureRecognizer {
    fn observe(&mut self, track: &TouchTrack) {
        let dx = track.dx();
        let now = track.current.timestamp;
        match self.last {
            Some((prev_dx, prev_t)) if now > prev_t => {
                let dt_ms = now.duration_since(prev_t).as_secs_f32() * 1000.0;
                if dt_ms > 0.0 {
                    self.velocity_x = (dx - prev_dx) / dt_ms;
                }
                self.last = Some((dx, now));
            }
            Some((_, prev_t)) => self.last = Some((dx, prev_t)),
            None => self.last = Some((dx, now)),
        }
    }

    fn sample(&self, track: &TouchTrack) -> GestureSample {
        GestureSample {
            start_x: track.start().x,
            dx: track.dx(),
            dy: track.dy(),
            velocity_x: self.velocity_x,
            timestamp: track.current.timestamp,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
