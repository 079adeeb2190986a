#![forbid(unsafe_code)]

//! Tracing targets and an optional JSON subscriber.
//!
//! The crate only emits [`tracing`] events; installing a subscriber is the
//! host's job. Events are grouped by target:
//!
//! | Target | Emitted by | Levels |
//! |--------|------------|--------|
//! | `edgeswipe::gesture` | recognizer qualification and release | trace, debug |
//! | `edgeswipe::arbiter` | stream grants and hand-overs | debug |
//! | `edgeswipe::coordinator` | settle, cooldown, lifecycle, completion | trace, debug, info |
//! | `edgeswipe::animation` | animation handles stopped on drop | trace |
//!
//! Only a completed swipe logs at `info`.
//!
//! With the `tracing-json` feature, [`init_json_subscriber`] installs a
//! line-delimited JSON formatter filtered by the `EDGESWIPE_LOG` environment
//! variable (same syntax as `RUST_LOG`).

/// Target of every event the crate emits, by subsystem.
pub const TARGET_GESTURE: &str = "edgeswipe::gesture";
pub const TARGET_ARBITER: &str = "edgeswipe::arbiter";
pub const TARGET_COORDINATOR: &str = "edgeswipe::coordinator";
pub const TARGET_ANIMATION: &str = "edgeswipe::animation";

/// Environment variable read by [`init_json_subscriber`].
pub const LOG_ENV: &str = "EDGESWIPE_LOG";

/// Filter used when [`LOG_ENV`] is unset or unparsable.
pub const DEFAULT_FILTER: &str = "edgeswipe=info";

/// Install a global JSON subscriber.
///
/// Fails if a global subscriber is already set.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber() -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json().with_target(true))
        .try_init()
}
