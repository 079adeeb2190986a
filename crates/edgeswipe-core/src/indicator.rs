#![forbid(unsafe_code)]

//! Edge-glow progress indicator.
//!
//! The indicator is a pure view model: given the current swipe progress it
//! reports how opaque the glow strip along the left edge should be. It has
//! no behavior and never receives touches.
//!
//! Opacity follows a piecewise-linear [`Interpolation`] over
//! `0 -> 0.0`, `50px -> 0.3`, `max_travel_px -> 0.5`.

/// Input position of the middle opacity breakpoint.
pub const GLOW_MID_PX: f32 = 50.0;
/// Opacity at the middle breakpoint.
pub const GLOW_MID_OPACITY: f32 = 0.3;
/// Opacity at full travel.
pub const GLOW_MAX_OPACITY: f32 = 0.5;

/// Piecewise-linear mapping with clamped ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolation {
    points: Vec<(f32, f32)>,
}

impl Interpolation {
    /// Build from `(input, output)` breakpoints.
    ///
    /// Returns `None` if `points` is empty, contains a non-finite value, or
    /// the inputs decrease anywhere.
    #[must_use]
    pub fn new(points: &[(f32, f32)]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return None;
        }
        if points.windows(2).any(|w| w[1].0 < w[0].0) {
            return None;
        }
        Some(Self {
            points: points.to_vec(),
        })
    }

    /// The edge-glow curve for a travel range of `max_travel_px`.
    #[must_use]
    pub fn edge_glow(max_travel_px: f32) -> Self {
        let max = if max_travel_px.is_finite() {
            max_travel_px.max(0.0)
        } else {
            0.0
        };
        Self {
            points: vec![
                (0.0, 0.0),
                (GLOW_MID_PX.min(max), GLOW_MID_OPACITY),
                (max, GLOW_MAX_OPACITY),
            ],
        }
    }

    /// Evaluate at `x`. Zero-width segments are skipped.
    #[must_use]
    pub fn eval(&self, x: f32) -> f32 {
        let (first_x, first_y) = self.points[0];
        if x.is_nan() || x <= first_x {
            return first_y;
        }
        for w in self.points.windows(2) {
            let ((x0, y0), (x1, y1)) = (w[0], w[1]);
            if x1 <= x0 {
                continue;
            }
            if x < x1 {
                let t = (x - x0) / (x1 - x0);
                return y0 + (y1 - y0) * t;
            }
        }
        self.points[self.points.len() - 1].1
    }
}

/// Hit-testing mode of a presentational element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerEvents {
    /// Element and children receive touches.
    Auto,
    /// Element is transparent to touches.
    #[default]
    None,
}

/// Renderable snapshot of the edge glow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressIndicator {
    /// Glow opacity in [0, 0.5].
    pub opacity: f32,
    /// Whether the host should render the glow at all.
    pub visible: bool,
    /// Width of the glow strip, matching the edge capture band.
    pub width_px: f32,
    /// Always [`PointerEvents::None`].
    pub pointer_events: PointerEvents,
}

impl ProgressIndicator {
    /// Snapshot for `progress` on a `[0, max_travel_px]` range.
    #[must_use]
    pub fn from_progress(progress: f32, max_travel_px: f32, width_px: f32, visible: bool) -> Self {
        let opacity = if visible {
            Interpolation::edge_glow(max_travel_px).eval(progress)
        } else {
            0.0
        };
        Self {
            opacity,
            visible,
            width_px,
            pointer_events: PointerEvents::None,
        }
    }

    /// Hidden indicator, used when the gesture is disabled.
    #[must_use]
    pub fn hidden(width_px: f32) -> Self {
        Self::from_progress(0.0, 0.0, width_px, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn glow_hits_breakpoints() {
        let curve = Interpolation::edge_glow(100.0);
        assert!(approx(curve.eval(0.0), 0.0));
        assert!(approx(curve.eval(25.0), 0.15));
        assert!(approx(curve.eval(50.0), 0.3));
        assert!(approx(curve.eval(75.0), 0.4));
        assert!(approx(curve.eval(100.0), 0.5));
    }

    #[test]
    fn glow_clamps_outside_range() {
        let curve = Interpolation::edge_glow(100.0);
        assert!(approx(curve.eval(-10.0), 0.0));
        assert!(approx(curve.eval(400.0), 0.5));
        assert!(approx(curve.eval(f32::NAN), 0.0));
    }

    #[test]
    fn short_travel_stays_monotonic() {
        let curve = Interpolation::edge_glow(40.0);
        let mut prev = 0.0;
        for i in 0..=80 {
            let v = curve.eval(i as f32);
            assert!(v >= prev, "opacity decreased at {i}");
            prev = v;
        }
        assert!(approx(curve.eval(40.0), 0.5));
    }

    #[test]
    fn rejects_decreasing_inputs() {
        assert!(Interpolation::new(&[(0.0, 0.0), (10.0, 1.0), (5.0, 2.0)]).is_none());
        assert!(Interpolation::new(&[]).is_none());
        assert!(Interpolation::new(&[(0.0, f32::INFINITY)]).is_none());
    }

    #[test]
    fn single_point_is_constant() {
        let curve = Interpolation::new(&[(3.0, 0.7)]).unwrap();
        assert!(approx(curve.eval(-1.0), 0.7));
        assert!(approx(curve.eval(99.0), 0.7));
    }

    #[test]
    fn indicator_never_interactive() {
        let shown = ProgressIndicator::from_progress(50.0, 100.0, 30.0, true);
        assert_eq!(shown.pointer_events, PointerEvents::None);
        assert!(approx(shown.opacity, 0.3));

        let hidden = ProgressIndicator::hidden(30.0);
        assert!(!hidden.visible);
        assert_eq!(hidden.opacity, 0.0);
        assert_eq!(hidden.pointer_events, PointerEvents::None);
    }
}
