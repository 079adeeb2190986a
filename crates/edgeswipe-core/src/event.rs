#![forbid(unsafe_code)]

//! Canonical single-finger touch events.
//!
//! The host platform translates its native touch callbacks into
//! [`TouchEvent`] values and feeds them, in delivery order, to a
//! [`TouchArbiter`](crate::arbiter::TouchArbiter).
//!
//! # Design Notes
//!
//! - Coordinates are logical pixels with the origin at the top-left corner
//!   of the screen, so `x` is also the distance from the left edge.
//! - Timestamps are monotonic [`Instant`]s supplied by the caller; nothing in
//!   this crate reads the wall clock on its own.
//! - Only one pointer is modelled. Additional fingers are the host's concern.

use web_time::Instant;

/// A 2D position in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise offset from `origin` to `self`.
    #[must_use]
    pub fn delta_from(self, origin: Self) -> (f32, f32) {
        (self.x - origin.x, self.y - origin.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Stage of a touch stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    /// Finger went down.
    Down,
    /// Finger moved while down.
    Move,
    /// Finger lifted.
    Up,
    /// The platform aborted the stream (system gesture, incoming call, ...).
    Cancel,
}

/// A single touch observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    /// Which stage of the stream this is.
    pub phase: TouchPhase,
    /// Absolute position of the finger.
    pub position: Point,
    /// When the platform observed the touch.
    pub timestamp: Instant,
}

impl TouchEvent {
    /// Create a new touch event.
    #[must_use]
    pub const fn new(phase: TouchPhase, position: Point, timestamp: Instant) -> Self {
        Self {
            phase,
            position,
            timestamp,
        }
    }

    #[must_use]
    pub const fn down(x: f32, y: f32, timestamp: Instant) -> Self {
        Self::new(TouchPhase::Down, Point::new(x, y), timestamp)
    }

    #[must_use]
    pub const fn moved(x: f32, y: f32, timestamp: Instant) -> Self {
        Self::new(TouchPhase::Move, Point::new(x, y), timestamp)
    }

    #[must_use]
    pub const fn up(x: f32, y: f32, timestamp: Instant) -> Self {
        Self::new(TouchPhase::Up, Point::new(x, y), timestamp)
    }

    #[must_use]
    pub const fn cancel(x: f32, y: f32, timestamp: Instant) -> Self {
        Self::new(TouchPhase::Cancel, Point::new(x, y), timestamp)
    }

    /// Whether this event ends the stream.
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, TouchPhase::Up | TouchPhase::Cancel)
    }
}
