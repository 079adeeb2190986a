#![forbid(unsafe_code)]

//! Scripted touch streams.
//!
//! A [`TouchScript`] is a timeline of touch events and host actions, each at
//! an offset from the start of the run. The builder keeps a cursor: touch
//! steps happen at the cursor, [`wait`](TouchScript::wait) moves it forward.
//!
//! ```
//! use edgeswipe_harness::TouchScript;
//!
//! // Scenario A: slow drag from x=10 to x=90 over 800ms.
//! let script = TouchScript::new()
//!     .down(10.0, 300.0)
//!     .drag_to(90.0, 300.0, 8, 800)
//!     .up();
//! assert_eq!(script.len(), 10);
//! ```

use edgeswipe_core::{Point, TouchEvent, TouchPhase};
use web_time::{Duration, Instant};

/// One entry on the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptAction {
    /// A raw touch event at a position.
    Touch(TouchPhase, Point),
    /// `temporarily_disable` with an optional explicit duration.
    TemporarilyDisable(Option<Duration>),
    /// The hosting screen loses focus.
    Blur,
    /// The hosting screen regains focus.
    Focus,
    /// The host toggles `is_enabled`.
    SetEnabled(bool),
    /// The drawer is opened through another path.
    OpenDrawer,
    /// The drawer is closed.
    CloseDrawer,
}

/// A timed action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptStep {
    /// Offset from the start of the run.
    pub at: Duration,
    pub action: ScriptAction,
}

impl ScriptStep {
    /// The touch event for this step, if it is one.
    #[must_use]
    pub fn touch_event(&self, origin: Instant) -> Option<TouchEvent> {
        match self.action {
            ScriptAction::Touch(phase, position) => {
                Some(TouchEvent::new(phase, position, origin + self.at))
            }
            _ => None,
        }
    }
}

/// Builder for a timeline of touches and host actions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TouchScript {
    steps: Vec<ScriptStep>,
    cursor: Duration,
    last: Point,
}

impl TouchScript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the cursor forward by `ms`.
    #[must_use]
    pub fn wait(mut self, ms: u64) -> Self {
        self.cursor += Duration::from_millis(ms);
        self
    }

    /// Move the cursor to an absolute offset. Never moves backwards.
    #[must_use]
    pub fn at(mut self, ms: u64) -> Self {
        self.cursor = self.cursor.max(Duration::from_millis(ms));
        self
    }

    #[must_use]
    pub fn down(mut self, x: f32, y: f32) -> Self {
        self.touch(TouchPhase::Down, Point::new(x, y));
        self
    }

    #[must_use]
    pub fn move_to(mut self, x: f32, y: f32) -> Self {
        self.touch(TouchPhase::Move, Point::new(x, y));
        self
    }

    /// Linear drag from the last position in `steps` moves spread over `over_ms`.
    #[must_use]
    pub fn drag_to(mut self, x: f32, y: f32, steps: u32, over_ms: u64) -> Self {
        let steps = steps.max(1);
        let from = self.last;
        let step_dt = Duration::from_millis(over_ms) / steps;
        for i in 1..=steps {
            let f = i as f32 / steps as f32;
            self.cursor += step_dt;
            let p = Point::new(from.x + (x - from.x) * f, from.y + (y - from.y) * f);
            self.touch(TouchPhase::Move, p);
        }
        self
    }

    /// Lift at the last position.
    #[must_use]
    pub fn up(mut self) -> Self {
        let p = self.last;
        self.touch(TouchPhase::Up, p);
        self
    }

    /// Platform abort at the last position.
    #[must_use]
    pub fn cancel(mut self) -> Self {
        let p = self.last;
        self.touch(TouchPhase::Cancel, p);
        self
    }

    #[must_use]
    pub fn temporarily_disable(self, duration_ms: Option<u64>) -> Self {
        self.action(ScriptAction::TemporarilyDisable(
            duration_ms.map(Duration::from_millis),
        ))
    }

    #[must_use]
    pub fn blur(self) -> Self {
        self.action(ScriptAction::Blur)
    }

    #[must_use]
    pub fn focus(self) -> Self {
        self.action(ScriptAction::Focus)
    }

    #[must_use]
    pub fn set_enabled(self, enabled: bool) -> Self {
        self.action(ScriptAction::SetEnabled(enabled))
    }

    #[must_use]
    pub fn open_drawer(self) -> Self {
        self.action(ScriptAction::OpenDrawer)
    }

    #[must_use]
    pub fn close_drawer(self) -> Self {
        self.action(ScriptAction::CloseDrawer)
    }

    /// Append an arbitrary action at the cursor.
    #[must_use]
    pub fn action(mut self, action: ScriptAction) -> Self {
        self.steps.push(ScriptStep {
            at: self.cursor,
            action,
        });
        self
    }

    /// Steps in timeline order.
    #[must_use]
    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Offset of the last step.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.steps.last().map_or(Duration::ZERO, |s| s.at)
    }

    /// The touch events of the script, stamped from `origin`.
    #[must_use]
    pub fn events(&self, origin: Instant) -> Vec<TouchEvent> {
        self.steps
            .iter()
            .filter_map(|s| s.touch_event(origin))
            .collect()
    }

    fn touch(&mut self, phase: TouchPhase, position: Point) {
        self.last = position;
        self.steps.push(ScriptStep {
            at: self.cursor,
            action: ScriptAction::Touch(phase, position),
        });
    }
}
