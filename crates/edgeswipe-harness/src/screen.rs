#![forbid(unsafe_code)]

//! Simulated host screen.
//!
//! [`SimulatedScreen`] stands in for a mobile screen that embeds the edge
//! swipe. It owns:
//!
//! - a [`SwipeCoordinator`] whose completion callback opens the drawer,
//! - a [`HostBackSwipe`]: the navigation stack's own horizontal recognizer,
//!   negotiating for the same touch stream in the bubble phase,
//! - a [`TouchArbiter`] routing touches between the two,
//! - a [`FrameClock`] driving animation frames.
//!
//! While the drawer is open the coordinator is blocked, as a real host
//! would do from its drawer-state listener.
//!
//! # JSONL Schema
//!
//! ```json
//! {"event":"touch","at_ms":0,"phase":"down","x":10.0,"y":300.0,"granted":0}
//! {"event":"swipe_complete","at_ms":1104,"completions":1}
//! {"event":"drawer","at_ms":1104,"open":true}
//! ```

use std::cell::Cell;
use std::rc::Rc;

use edgeswipe_core::{
    ConfigError, DispatchOutcome, ResponderPhase, ScreenLifecycle, SwipeCoordinator,
    SwipeOptions, SwipeState, TouchArbiter, TouchEvent, TouchPhase, TouchResponder, TouchTrack,
};
use serde_json::json;
use web_time::{Duration, Instant};

use crate::clock::FrameClock;
use crate::script::{ScriptAction, TouchScript};

/// Upper bound on frames run after a script ends.
const SETTLE_LIMIT: Duration = Duration::from_secs(2);

/// Horizontal travel the host back swipe needs before claiming a stream.
pub const BACK_SWIPE_SLOP_PX: f32 = 10.0;

// ============================================================================
// Host back swipe
// ============================================================================

/// The navigation stack's horizontal back-swipe recognizer.
///
/// Claims horizontal moves in the bubble phase, so any capture-phase
/// recognizer above it wins the same stream.
#[derive(Debug, Default, Clone)]
pub struct HostBackSwipe {
    grants: u32,
    releases: u32,
    terminations: u32,
    active: bool,
}

impl HostBackSwipe {
    /// Streams granted to the back swipe.
    #[must_use]
    pub fn grants(&self) -> u32 {
        self.grants
    }

    #[must_use]
    pub fn releases(&self) -> u32 {
        self.releases
    }

    #[must_use]
    pub fn terminations(&self) -> u32 {
        self.terminations
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl TouchResponder for HostBackSwipe {
    fn wants_start(&mut self, _phase: ResponderPhase, _track: &TouchTrack) -> bool {
        false
    }

    fn wants_move(&mut self, phase: ResponderPhase, track: &TouchTrack) -> bool {
        phase == ResponderPhase::Bubble
            && track.dx().abs() > track.dy().abs()
            && track.dx().abs() > BACK_SWIPE_SLOP_PX
    }

    fn on_grant(&mut self, _track: &TouchTrack) {
        self.grants += 1;
        self.active = true;
    }

    fn on_move(&mut self, _track: &TouchTrack) {}

    fn on_release(&mut self, _track: &TouchTrack) {
        self.releases += 1;
        self.active = false;
    }

    fn on_terminate(&mut self, _track: &TouchTrack) {
        self.terminations += 1;
        self.active = false;
    }
}

// ============================================================================
// Samples and reports
// ============================================================================

/// What produced a [`Sample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// A frame tick.
    Frame,
    /// A scripted step.
    Step,
}

/// Observable state after a frame or step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub kind: SampleKind,
    /// Offset from the clock origin.
    pub at: Duration,
    pub state: SwipeState,
    pub progress: f32,
    pub opacity: f32,
    pub drawer_open: bool,
    /// Completions fired by this frame or step.
    pub completed: u32,
}

/// Summary of one [`SimulatedScreen::run`].
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub samples: Vec<Sample>,
    /// Completion callbacks fired during the run.
    pub completions: u32,
    /// Streams granted to the host back swipe during the run.
    pub back_swipe_grants: u32,
}

impl RunReport {
    /// Whether the coordinator was ever observed tracking.
    #[must_use]
    pub fn tracked(&self) -> bool {
        self.samples.iter().any(|s| s.state == SwipeState::Tracking)
    }

    /// Largest progress observed.
    #[must_use]
    pub fn max_progress(&self) -> f32 {
        self.samples.iter().map(|s| s.progress).fold(0.0, f32::max)
    }

    /// Samples where a completion fired.
    pub fn completion_samples(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter().filter(|s| s.completed > 0)
    }

    /// The last sample, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }
}

// ============================================================================
// SimulatedScreen
// ============================================================================

/// A focused screen with an edge-swipe drawer and a back-swipe navigator.
pub struct SimulatedScreen {
    coordinator: SwipeCoordinator,
    back_swipe: HostBackSwipe,
    arbiter: TouchArbiter,
    drawer_open: Rc<Cell<bool>>,
    completions: Rc<Cell<u32>>,
    clock: FrameClock,
    log: Vec<String>,
}

impl std::fmt::Debug for SimulatedScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedScreen")
            .field("coordinator", &self.coordinator)
            .field("drawer_open", &self.drawer_open.get())
            .field("completions", &self.completions.get())
            .field("elapsed", &self.clock.elapsed())
            .finish_non_exhaustive()
    }
}

impl SimulatedScreen {
    /// A screen starting at the current instant.
    pub fn new(options: SwipeOptions) -> Result<Self, ConfigError> {
        Self::with_clock(options, FrameClock::new(Instant::now()))
    }

    /// A screen driven by `clock`.
    ///
    /// `options.is_blocked` doubles as the initial drawer state.
    pub fn with_clock(options: SwipeOptions, clock: FrameClock) -> Result<Self, ConfigError> {
        let drawer_open = Rc::new(Cell::new(options.is_blocked));
        let completions = Rc::new(Cell::new(0));
        let on_complete = {
            let drawer_open = Rc::clone(&drawer_open);
            let completions = Rc::clone(&completions);
            move || {
                drawer_open.set(true);
                completions.set(completions.get() + 1);
            }
        };
        Ok(Self {
            coordinator: SwipeCoordinator::new(options, on_complete)?,
            back_swipe: HostBackSwipe::default(),
            arbiter: TouchArbiter::new(),
            drawer_open,
            completions,
            clock,
            log: Vec::new(),
        })
    }

    // --- Accessors ---

    #[must_use]
    pub fn coordinator(&self) -> &SwipeCoordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut SwipeCoordinator {
        &mut self.coordinator
    }

    #[must_use]
    pub fn back_swipe(&self) -> &HostBackSwipe {
        &self.back_swipe
    }

    #[must_use]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    #[must_use]
    pub fn drawer_open(&self) -> bool {
        self.drawer_open.get()
    }

    /// Completion callbacks fired over the screen's lifetime.
    #[must_use]
    pub fn completions(&self) -> u32 {
        self.completions.get()
    }

    /// JSONL evidence of everything the screen did.
    #[must_use]
    pub fn jsonl(&self) -> &[String] {
        &self.log
    }

    // --- Driving ---

    /// Route one touch event at the current clock time.
    pub fn dispatch(&mut self, event: &TouchEvent) -> DispatchOutcome {
        let outcome = self
            .arbiter
            .dispatch(event, &mut [&mut self.coordinator, &mut self.back_swipe]);
        self.log.push(
            json!({
                "event": "touch",
                "at_ms": self.at_ms(),
                "phase": phase_name(event.phase),
                "x": event.position.x,
                "y": event.position.y,
                "granted": outcome.granted,
                "terminated": outcome.terminated,
                "released": outcome.released,
                "refused": outcome.refused,
                "abandoned": outcome.abandoned,
            })
            .to_string(),
        );
        outcome
    }

    /// Advance one frame. Returns the completions fired by it.
    pub fn frame(&mut self) -> u32 {
        let before = self.completions.get();
        let now = self.clock.advance();
        self.coordinator.tick(now);
        let fired = self.completions.get() - before;
        if fired > 0 {
            self.log.push(
                json!({
                    "event": "swipe_complete",
                    "at_ms": self.at_ms(),
                    "completions": self.completions.get(),
                })
                .to_string(),
            );
        }
        self.sync_drawer();
        fired
    }

    /// Run frames until no settle animation is in flight.
    pub fn settle(&mut self) -> Vec<Sample> {
        let start = self.clock.elapsed();
        let mut samples = Vec::new();
        while self.coordinator.state().is_settling() && self.clock.elapsed() - start < SETTLE_LIMIT
        {
            let fired = self.frame();
            samples.push(self.sample(SampleKind::Frame, fired));
        }
        samples
    }

    /// Replay `script` from the current clock time, ticking frames between
    /// steps, then settle.
    pub fn run(&mut self, script: &TouchScript) -> RunReport {
        let _span = tracing::info_span!("scenario_run", steps = script.len()).entered();
        let completions_before = self.completions.get();
        let grants_before = self.back_swipe.grants();
        let base = self.clock.elapsed();
        let mut samples = Vec::with_capacity(script.len() * 2);

        for step in script.steps() {
            let target = base + step.at;
            while self.clock.next_frame() <= self.clock.origin() + target {
                let fired = self.frame();
                samples.push(self.sample(SampleKind::Frame, fired));
            }
            self.clock.seek(target);
            self.apply(step.action);
            samples.push(self.sample(SampleKind::Step, 0));
        }
        samples.extend(self.settle());
        tracing::debug!(
            completions = self.completions.get() - completions_before,
            frames = samples.iter().filter(|s| s.kind == SampleKind::Frame).count(),
            "scenario finished"
        );

        RunReport {
            samples,
            completions: self.completions.get() - completions_before,
            back_swipe_grants: self.back_swipe.grants() - grants_before,
        }
    }

    // --- Host actions ---

    pub fn temporarily_disable(&mut self, duration: Option<Duration>) {
        let now = self.clock.now();
        self.coordinator.temporarily_disable(now, duration);
    }

    /// Screen loses focus: the coordinator resets and the stream ends.
    pub fn blur(&mut self) {
        self.coordinator.handle_lifecycle(ScreenLifecycle::Blurred);
        self.arbiter
            .cancel(&mut [&mut self.coordinator, &mut self.back_swipe]);
    }

    pub fn focus(&mut self) {
        self.coordinator.handle_lifecycle(ScreenLifecycle::Focused);
    }

    pub fn open_drawer(&mut self) {
        self.drawer_open.set(true);
        self.sync_drawer();
    }

    pub fn close_drawer(&mut self) {
        self.drawer_open.set(false);
        self.sync_drawer();
    }

    // --- Internal ---

    fn apply(&mut self, action: ScriptAction) {
        match action {
            ScriptAction::Touch(phase, position) => {
                let event = TouchEvent::new(phase, position, self.clock.now());
                self.dispatch(&event);
            }
            ScriptAction::TemporarilyDisable(duration) => self.temporarily_disable(duration),
            ScriptAction::Blur => self.blur(),
            ScriptAction::Focus => self.focus(),
            ScriptAction::SetEnabled(enabled) => self.coordinator.set_enabled(enabled),
            ScriptAction::OpenDrawer => self.open_drawer(),
            ScriptAction::CloseDrawer => self.close_drawer(),
        }
    }

    fn sync_drawer(&mut self) {
        let open = self.drawer_open.get();
        if self.coordinator.is_blocked() != open {
            self.coordinator.set_blocked(open);
            self.log.push(
                json!({
                    "event": "drawer",
                    "at_ms": self.at_ms(),
                    "open": open,
                })
                .to_string(),
            );
        }
    }

    fn sample(&self, kind: SampleKind, completed: u32) -> Sample {
        Sample {
            kind,
            at: self.clock.elapsed(),
            state: self.coordinator.state(),
            progress: self.coordinator.progress(),
            opacity: self.coordinator.indicator().opacity,
            drawer_open: self.drawer_open.get(),
            completed,
        }
    }

    fn at_ms(&self) -> u64 {
        self.clock.elapsed().as_millis() as u64
    }
}

fn phase_name(phase: TouchPhase) -> &'static str {
    match phase {
        TouchPhase::Down => "down",
        TouchPhase::Move => "move",
        TouchPhase::Up => "up",
        TouchPhase::Cancel => "cancel",
    }
}
