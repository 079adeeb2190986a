#![forbid(unsafe_code)]

//! Deterministic scenario harness for `edgeswipe-core`.
//!
//! Scripts touch streams with [`TouchScript`], replays them against a
//! [`SimulatedScreen`] on a fixed-step [`FrameClock`], and reports what the
//! coordinator did frame by frame. [`storm`] generates seeded gesture storms
//! for fault-injection runs.

pub mod clock;
pub mod screen;
pub mod script;
pub mod storm;

pub use clock::{FRAME, FrameClock};
pub use screen::{HostBackSwipe, RunReport, Sample, SampleKind, SimulatedScreen};
pub use script::{ScriptAction, ScriptStep, TouchScript};
pub use storm::{GestureStorm, StormConfig, StormPattern, generate_storm, run_storm_with_logging};
