#![forbid(unsafe_code)]

//! Core: left-edge swipe recognition and the drawer-open coordinator.
//!
//! # Role in edgeswipe
//! `edgeswipe-core` turns a raw touch stream into a single "open the
//! navigation drawer" signal. It owns gesture qualification, the release
//! rule, the settle animation, and the edge-glow view model. Rendering and
//! the drawer itself belong to the host.
//!
//! # Primary responsibilities
//! - **TouchArbiter**: decides which recognizer owns a touch stream.
//! - **GestureRecognizer**: qualifies left-edge swipes and measures them.
//! - **SwipeCoordinator**: per-screen state machine, cooldown, focus binding,
//!   and the single-fire completion callback.
//! - **ProgressIndicator**: opacity of the edge glow for the current progress.
//! - **GestureConfig**: validated thresholds, optionally loaded from TOML/JSON.
//!
//! # How it fits in the system
//! The host feeds [`TouchEvent`]s and frame ticks; `edgeswipe-core` answers
//! with progress, an indicator snapshot, and at most one completion callback
//! per gesture. `edgeswipe-harness` drives the same API deterministically for
//! scenario tests.
//!
//! # Example
//! ```
//! use edgeswipe_core::{SwipeCoordinator, SwipeOptions, TouchArbiter, TouchEvent};
//! use web_time::{Duration, Instant};
//!
//! let mut coord = SwipeCoordinator::new(SwipeOptions::default(), || {}).unwrap();
//! let mut arbiter = TouchArbiter::new();
//! let t = Instant::now();
//! arbiter.dispatch(&TouchEvent::down(8.0, 200.0, t), &mut [&mut coord]);
//! arbiter.dispatch(
//!     &TouchEvent::moved(48.0, 202.0, t + Duration::from_millis(60)),
//!     &mut [&mut coord],
//! );
//! assert_eq!(coord.progress(), 40.0);
//! ```

pub mod animation;
pub mod arbiter;
pub mod config;
pub mod cooldown;
pub mod coordinator;
pub mod event;
pub mod gesture;
pub mod indicator;
pub mod logging;

pub use arbiter::{DispatchOutcome, ResponderPhase, TouchArbiter, TouchResponder, TouchTrack};
pub use config::{ConfigError, GestureConfig, GestureConfigOverrides};
pub use coordinator::{ScreenLifecycle, SwipeCoordinator, SwipeOptions, SwipeState};
pub use event::{Point, TouchEvent, TouchPhase};
pub use gesture::{CoordinatorContext, GestureRecognizer, GestureSample, RecognizerEvent};
pub use indicator::{PointerEvents, ProgressIndicator};
