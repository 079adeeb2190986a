#![forbid(unsafe_code)]

//! Gesture storm generator for fault-injection testing.
//!
//! Generates deterministic [`TouchScript`]s mixing edge swipes, off-edge
//! drags, vertical scrolls, platform cancels, and host interruptions. The
//! same seed always yields the same script.
//!
//! # Storm Patterns
//!
//! | Pattern | Description |
//! |---------|-------------|
//! | [`StormPattern::EdgeSwipes`] | Edge swipes of random length and speed |
//! | [`StormPattern::Mixed`] | Swipes, scrolls, cancels, cooldowns, blur/focus, drawer closes |
//! | [`StormPattern::RapidTaps`] | Down/up pairs in the edge band with no travel |
//!
//! # JSONL Schema
//!
//! ```json
//! {"event":"storm_start","pattern":"mixed","seed":42,"step_count":310}
//! {"event":"storm_complete","completions":3,"back_swipe_grants":7,"drawer_open":true}
//! ```

use serde_json::json;

use crate::script::TouchScript;
use crate::screen::{RunReport, SimulatedScreen};

/// Kind of storm to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StormPattern {
    /// `count` edge swipes.
    EdgeSwipes { count: usize },
    /// `count` gestures of mixed kinds with host interruptions.
    Mixed { count: usize },
    /// `count` taps in the edge band.
    RapidTaps { count: usize },
}

impl StormPattern {
    /// Pattern name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::EdgeSwipes { .. } => "edge_swipes",
            Self::Mixed { .. } => "mixed",
            Self::RapidTaps { .. } => "rapid_taps",
        }
    }
}

/// Storm parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StormConfig {
    pub pattern: StormPattern,
    pub seed: u64,
}

impl StormConfig {
    #[must_use]
    pub fn new(pattern: StormPattern, seed: u64) -> Self {
        Self { pattern, seed }
    }
}

/// A generated storm.
#[derive(Debug, Clone)]
pub struct GestureStorm {
    pub script: TouchScript,
    pub pattern_name: &'static str,
    pub seed: u64,
}

// ============================================================================
// Generation
// ============================================================================

/// xorshift64.
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform in `[lo, hi)`.
    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        if hi <= lo {
            return lo;
        }
        lo + self.next() % (hi - lo)
    }

    fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        let unit = (self.next() % 10_000) as f32 / 10_000.0;
        lo + (hi - lo) * unit
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.next() % 100 < percent
    }
}

/// Generate a deterministic storm.
#[must_use]
pub fn generate_storm(config: &StormConfig) -> GestureStorm {
    let mut rng = Rng::new(config.seed);
    let script = match config.pattern {
        StormPattern::EdgeSwipes { count } => {
            (0..count).fold(TouchScript::new(), |s, _| edge_swipe(s, &mut rng).wait(400))
        }
        StormPattern::Mixed { count } => {
            (0..count).fold(TouchScript::new(), |s, _| mixed_step(s, &mut rng))
        }
        StormPattern::RapidTaps { count } => (0..count).fold(TouchScript::new(), |s, _| {
            let x = rng.range_f32(0.0, 30.0);
            s.down(x, 300.0).wait(rng.range(10, 80)).up().wait(rng.range(5, 40))
        }),
    };
    GestureStorm {
        script,
        pattern_name: config.pattern.name(),
        seed: config.seed,
    }
}

fn edge_swipe(script: TouchScript, rng: &mut Rng) -> TouchScript {
    let x = rng.range_f32(0.0, 30.0);
    let y = rng.range_f32(100.0, 700.0);
    let dx = rng.range_f32(-20.0, 200.0);
    let dy = rng.range_f32(-15.0, 15.0);
    let steps = rng.range(1, 12) as u32;
    let over = rng.range(20, 900);
    let script = script
        .down(x, y)
        .drag_to(x + dx, y + dy, steps, over)
        .wait(rng.range(0, 60));
    if rng.chance(10) {
        script.cancel()
    } else {
        script.up()
    }
}

fn mixed_step(script: TouchScript, rng: &mut Rng) -> TouchScript {
    let script = match rng.range(0, 10) {
        0..=3 => edge_swipe(script, rng),
        4 => {
            let x = rng.range_f32(31.0, 300.0);
            script
                .down(x, 300.0)
                .drag_to(x + rng.range_f32(-100.0, 150.0), 300.0, 4, rng.range(40, 400))
                .up()
        }
        5 => {
            let x = rng.range_f32(0.0, 30.0);
            script
                .down(x, 300.0)
                .drag_to(x + 3.0, 300.0 + rng.range_f32(-200.0, 200.0), 5, 200)
                .up()
        }
        6 => script.temporarily_disable(Some(rng.range(50, 600))),
        7 => script.blur().wait(rng.range(0, 300)).focus(),
        8 => script.close_drawer(),
        _ => script.set_enabled(rng.chance(80)),
    };
    script.wait(rng.range(0, 500))
}

// ============================================================================
// Execution
// ============================================================================

/// Replay a storm on `screen`, collecting JSONL evidence.
pub fn run_storm_with_logging(
    screen: &mut SimulatedScreen,
    storm: &GestureStorm,
) -> (RunReport, Vec<String>) {
    let mut log = vec![
        json!({
            "event": "storm_start",
            "pattern": storm.pattern_name,
            "seed": storm.seed,
            "step_count": storm.script.len(),
        })
        .to_string(),
    ];
    let report = screen.run(&storm.script);
    log.push(
        json!({
            "event": "storm_complete",
            "completions": report.completions,
            "back_swipe_grants": report.back_swipe_grants,
            "drawer_open": screen.drawer_open(),
        })
        .to_string(),
    );
    (report, log)
}
