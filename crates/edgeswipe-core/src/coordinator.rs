#![forbid(unsafe_code)]

//! Swipe coordinator: the per-screen edge-swipe state machine.
//!
//! [`SwipeCoordinator`] wraps a [`GestureRecognizer`] and owns everything a
//! screen needs to open its navigation drawer from the left edge:
//!
//! - focus gating and the temporary-disable cooldown,
//! - the completion rule and the settle animation that follows release,
//! - the single-fire "open navigation" callback,
//! - the edge-glow [`ProgressIndicator`].
//!
//! The coordinator implements [`TouchResponder`], so the host routes touches
//! to it through a [`TouchArbiter`](crate::arbiter::TouchArbiter) alongside
//! its own recognizers.
//!
//! # State Machine
//!
//! ```text
//!   Idle ──qualified move──▶ Tracking ──release──▶ Completing ──anim end──▶ Idle
//!                                │                                  (callback)
//!                                └──release / steal──▶ Cancelling ──anim end──▶ Idle
//! ```
//!
//! # Invariants
//!
//! 1. `progress()` lies in `[0, max_travel_px]` at all times.
//! 2. The completion callback fires at most once per gesture, on the frame
//!    the opening animation reaches `max_travel_px`, and never otherwise.
//! 3. Every settle ends with `progress() == 0` and `state() == Idle`.
//! 4. No new gesture starts unless the state is `Idle`.
//! 5. `reset_swipe()` is idempotent.
//!
//! # Failure Modes
//!
//! - Blur or drop mid-animation: the animation is stopped and the callback is
//!   not fired.
//! - A stale cooldown after blur: cleared on blur, so it cannot fire into a
//!   background screen.

use web_time::{Duration, Instant};

use crate::animation::AnimatedValue;
use crate::arbiter::{ResponderPhase, TouchResponder, TouchTrack};
use crate::config::{ConfigError, GestureConfig, GestureConfigOverrides};
use crate::cooldown::CooldownTimer;
use crate::gesture::{CoordinatorContext, GestureRecognizer, RecognizerEvent};
use crate::indicator::ProgressIndicator;
use crate::logging::TARGET_COORDINATOR;

/// Capture priority of the edge swipe. High enough to run before the
/// navigation stack's own back-swipe recognizer.
pub const EDGE_SWIPE_PRIORITY: i32 = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Lifecycle of an edge swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SwipeState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Following the finger.
    Tracking,
    /// Animating to full travel; the callback fires when it lands.
    Completing,
    /// Animating back to zero.
    Cancelling,
}

impl SwipeState {
    /// Whether a gesture or its settle animation is in flight.
    #[inline]
    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Whether the settle animation is running.
    #[inline]
    #[must_use]
    pub fn is_settling(self) -> bool {
        matches!(self, Self::Completing | Self::Cancelling)
    }
}

/// Screen focus transitions delivered by the host navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenLifecycle {
    Focused,
    Blurred,
}

/// Construction inputs supplied by the hosting screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeOptions {
    /// Whether the gesture and its indicator are enabled.
    pub is_enabled: bool,
    /// Whether the drawer is already open or the gesture is suppressed.
    pub is_blocked: bool,
    /// Partial config merged over the defaults.
    pub config: GestureConfigOverrides,
}

impl Default for SwipeOptions {
    fn default() -> Self {
        Self {
            is_enabled: true,
            is_blocked: false,
            config: GestureConfigOverrides::default(),
        }
    }
}

impl SwipeOptions {
    #[must_use]
    pub fn enabled(mut self, is_enabled: bool) -> Self {
        self.is_enabled = is_enabled;
        self
    }

    #[must_use]
    pub fn blocked(mut self, is_blocked: bool) -> Self {
        self.is_blocked = is_blocked;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: GestureConfigOverrides) -> Self {
        self.config = config;
        self
    }
}

// ---------------------------------------------------------------------------
// SwipeCoordinator
// ---------------------------------------------------------------------------

/// One screen's edge-swipe state machine.
pub struct SwipeCoordinator {
    config: GestureConfig,
    recognizer: GestureRecognizer,
    progress: AnimatedValue,
    state: SwipeState,
    is_enabled: bool,
    is_blocked: bool,
    is_screen_focused: bool,
    cooldown: CooldownTimer,
    last_frame: Option<Instant>,
    on_swipe_complete: Box<dyn FnMut()>,
}

impl std::fmt::Debug for SwipeCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwipeCoordinator")
            .field("state", &self.state)
            .field("progress", &self.progress.value())
            .field("is_enabled", &self.is_enabled)
            .field("is_blocked", &self.is_blocked)
            .field("is_screen_focused", &self.is_screen_focused)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

impl SwipeCoordinator {
    /// Build a coordinator for a screen that is currently shown.
    ///
    /// `on_swipe_complete` is called once per completed swipe, after the
    /// opening animation lands.
    pub fn new(
        options: SwipeOptions,
        on_swipe_complete: impl FnMut() + 'static,
    ) -> Result<Self, ConfigError> {
        let config = options.config.resolve()?;
        Ok(Self {
            recognizer: GestureRecognizer::new(config.clone()),
            progress: AnimatedValue::new(0.0, 0.0, config.max_travel_px),
            config,
            state: SwipeState::Idle,
            is_enabled: options.is_enabled,
            is_blocked: options.is_blocked,
            is_screen_focused: true,
            cooldown: CooldownTimer::new(),
            last_frame: None,
            on_swipe_complete: Box::new(on_swipe_complete),
        })
    }

    // --- Inputs ---

    /// Enable or disable the gesture. Disabling does not abort a gesture in flight.
    pub fn set_enabled(&mut self, is_enabled: bool) {
        self.is_enabled = is_enabled;
    }

    /// Block or unblock new gestures. Blocking does not abort a gesture in flight.
    pub fn set_blocked(&mut self, is_blocked: bool) {
        if self.is_blocked != is_blocked {
            tracing::debug!(target: TARGET_COORDINATOR, is_blocked, "blocked changed");
        }
        self.is_blocked = is_blocked;
    }

    /// React to the hosting screen gaining or losing focus.
    pub fn handle_lifecycle(&mut self, event: ScreenLifecycle) {
        let _span = tracing::debug_span!(target: TARGET_COORDINATOR, "lifecycle", ?event)
            .entered();
        match event {
            ScreenLifecycle::Focused => {
                self.is_screen_focused = true;
                self.reset_swipe();
                self.recognizer = GestureRecognizer::new(self.config.clone());
            }
            ScreenLifecycle::Blurred => {
                self.is_screen_focused = false;
                self.reset_swipe();
                if self.cooldown.cancel() {
                    tracing::debug!(target: TARGET_COORDINATOR, "cooldown cleared on blur");
                }
            }
        }
    }

    // --- Operations ---

    /// Suppress new gestures for `duration` (default: the configured cooldown).
    ///
    /// A repeated call restarts the countdown from `now`.
    pub fn temporarily_disable(&mut self, now: Instant, duration: Option<Duration>) {
        let duration = duration.unwrap_or(self.config.cooldown);
        self.cooldown.arm(now, duration);
        tracing::debug!(
            target: TARGET_COORDINATOR,
            duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            "temporarily disabled"
        );
    }

    /// Force progress to zero and the state to `Idle`.
    pub fn reset_swipe(&mut self) {
        if self.state.is_active() || self.progress.value() != 0.0 {
            tracing::debug!(target: TARGET_COORDINATOR, state = ?self.state, "reset");
        }
        self.progress.set(0.0);
        self.recognizer.reset();
        self.state = SwipeState::Idle;
        self.last_frame = None;
    }

    /// Start the settle animation after a release.
    ///
    /// Completing animates to `max_travel_px`, cancelling to zero, both over
    /// `open_animation`. Ignored unless a gesture is being tracked.
    pub fn settle(&mut self, should_complete: bool, now: Instant) {
        if self.state != SwipeState::Tracking {
            tracing::debug!(
                target: TARGET_COORDINATOR,
                state = ?self.state,
                "settle ignored outside tracking"
            );
            return;
        }
        let (state, target) = if should_complete {
            (SwipeState::Completing, self.config.max_travel_px)
        } else {
            (SwipeState::Cancelling, 0.0)
        };
        self.state = state;
        self.progress
            .animate_to(target, self.config.open_animation, self.config.easing);
        self.last_frame = Some(now);
        tracing::debug!(
            target: TARGET_COORDINATOR,
            ?state,
            from = self.progress.value(),
            "settling"
        );
    }

    /// Frame hook: advance the settle animation and expire the cooldown.
    pub fn tick(&mut self, now: Instant) {
        self.poll_cooldown(now);
        let Some(last) = self.last_frame else {
            return;
        };
        let dt = now.saturating_duration_since(last);
        self.last_frame = Some(now);
        if self.progress.tick(dt).is_some() {
            self.finish_settle();
        }
    }

    // --- Outputs ---

    /// Current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SwipeState {
        self.state
    }

    /// Current progress in `[0, max_travel_px]`.
    #[inline]
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress.value()
    }

    /// Whether a gesture or its settle animation is in flight.
    #[inline]
    #[must_use]
    pub fn is_swipe_active(&self) -> bool {
        self.state.is_active()
    }

    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    #[inline]
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.is_blocked
    }

    #[inline]
    #[must_use]
    pub fn is_screen_focused(&self) -> bool {
        self.is_screen_focused
    }

    /// Whether the cooldown is running at `now`.
    #[must_use]
    pub fn is_temporarily_disabled(&self, now: Instant) -> bool {
        self.cooldown.is_active(now)
    }

    /// Snapshot of the gating flags at `now`.
    #[must_use]
    pub fn context(&self, now: Instant) -> CoordinatorContext {
        CoordinatorContext {
            is_enabled: self.is_enabled,
            is_screen_focused: self.is_screen_focused,
            is_blocked: self.is_blocked,
            is_temporarily_disabled: self.is_temporarily_disabled(now),
        }
    }

    /// Edge-glow view model for the current progress.
    #[must_use]
    pub fn indicator(&self) -> ProgressIndicator {
        ProgressIndicator::from_progress(
            self.progress.value(),
            self.config.max_travel_px,
            self.config.edge_threshold_px,
            self.is_enabled,
        )
    }

    /// Get a reference to the resolved configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }
}

// ---------------------------------------------------------------------------
// Internal
// ---------------------------------------------------------------------------

impl SwipeCoordinator {
    fn poll_cooldown(&mut self, now: Instant) {
        if self.cooldown.poll(now) {
            tracing::debug!(target: TARGET_COORDINATOR, "cooldown lifted");
        }
    }

    fn handle(&mut self, event: RecognizerEvent) {
        match event {
            RecognizerEvent::Armed { .. } => {}
            RecognizerEvent::Began(sample) => {
                self.state = SwipeState::Tracking;
                self.progress.set(sample.dx);
            }
            RecognizerEvent::Moved(sample) => {
                self.progress.set(sample.dx);
                tracing::trace!(
                    target: TARGET_COORDINATOR,
                    progress = self.progress.value(),
                    "progress"
                );
            }
            RecognizerEvent::Released {
                sample,
                should_complete,
            } => {
                self.progress.set(sample.dx);
                self.settle(should_complete, sample.timestamp);
            }
            RecognizerEvent::Terminated(sample) => self.settle(false, sample.timestamp),
        }
    }

    fn finish_settle(&mut self) {
        if self.state == SwipeState::Completing {
            tracing::info!(
                target: TARGET_COORDINATOR,
                progress = self.progress.value(),
                "swipe completed"
            );
            (self.on_swipe_complete)();
        }
        self.progress.set(0.0);
        self.state = SwipeState::Idle;
        self.last_frame = None;
    }

    fn accepts_touch(&self) -> bool {
        !self.state.is_settling()
    }
}

impl TouchResponder for SwipeCoordinator {
    fn priority(&self) -> i32 {
        EDGE_SWIPE_PRIORITY
    }

    fn wants_start(&mut self, phase: ResponderPhase, track: &TouchTrack) -> bool {
        if phase != ResponderPhase::Capture || self.state != SwipeState::Idle {
            return false;
        }
        let now = track.current.timestamp;
        self.poll_cooldown(now);
        let ctx = self.context(now);
        self.recognizer.qualifies_start(track.start().x, &ctx)
    }

    fn wants_move(&mut self, phase: ResponderPhase, track: &TouchTrack) -> bool {
        if phase != ResponderPhase::Capture || !self.accepts_touch() {
            return false;
        }
        let now = track.current.timestamp;
        self.poll_cooldown(now);
        let ctx = self.context(now);
        self.recognizer.wants_move(track, &ctx)
    }

    fn on_grant(&mut self, track: &TouchTrack) {
        if self.state != SwipeState::Idle {
            return;
        }
        let ctx = self.context(track.current.timestamp);
        if let Some(event) = self.recognizer.arm(track, &ctx) {
            self.handle(event);
        }
    }

    fn on_move(&mut self, track: &TouchTrack) {
        if !self.accepts_touch() {
            return;
        }
        if let Some(event) = self.recognizer.track_move(track) {
            self.handle(event);
        }
    }

    fn on_release(&mut self, track: &TouchTrack) {
        if let Some(event) = self.recognizer.release(track) {
            self.handle(event);
        }
    }

    fn on_terminate(&mut self, track: &TouchTrack) {
        if let Some(event) = self.recognizer.terminate(track) {
            self.handle(event);
        }
    }

    fn allows_termination(&self) -> bool {
        self.recognizer.allows_termination()
    }
}

impl Drop for SwipeCoordinator {
    fn drop(&mut self) {
        self.reset_swipe();
        self.cooldown.cancel();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
