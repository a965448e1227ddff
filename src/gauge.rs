//! Geometry for the traditional 240° automotive gauge that displays the risk
//! score, and the spring that makes its arc sweep rather than jump.

use crate::spring::Spring;
use std::f64::consts::PI;
use std::time::Duration;

/// Degrees of arc the gauge covers.
pub const SWEEP_DEGREES: f64 = 240.0;

/// Where the arc starts, in degrees counter-clockwise from +x. The arc runs
/// clockwise from here, so it opens at the bottom.
pub const START_DEGREES: f64 = 210.0;

/// A circular arc of [SWEEP_DEGREES] around a centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeArc {
    #[allow(missing_docs)]
    pub cx: f64,
    #[allow(missing_docs)]
    pub cy: f64,
    #[allow(missing_docs)]
    pub radius: f64,
}

impl GaugeArc {
    #[allow(missing_docs)]
    pub fn new(cx: f64, cy: f64, radius: f64) -> Self {
        Self { cx, cy, radius }
    }

    /// Length of the drawn part of the circle.
    pub fn arc_length(&self) -> f64 {
        SWEEP_DEGREES / 360.0 * 2.0 * PI * self.radius
    }

    /// How much of the arc is left undrawn for a score in `[0, 100]`.
    pub fn progress_offset(&self, score: f64) -> f64 {
        let arc = self.arc_length();
        arc - score.clamp(0.0, 100.0) / 100.0 * arc
    }

    /// The point `fraction` of the way along the arc.
    pub fn point_at(&self, fraction: f64) -> (f64, f64) {
        let degrees = START_DEGREES - fraction.clamp(0.0, 1.0) * SWEEP_DEGREES;
        let radians = degrees.to_radians();
        (
            self.cx + self.radius * radians.cos(),
            self.cy + self.radius * radians.sin(),
        )
    }

    /// Sample `n + 1` evenly spaced points covering the first `fraction` of
    /// the arc, suitable for drawing as a polyline.
    pub fn polyline(&self, fraction: f64, n: usize) -> Vec<(f64, f64)> {
        let fraction = fraction.clamp(0.0, 1.0);
        (0..=n)
            .map(|i| self.point_at(fraction * i as f64 / n.max(1) as f64))
            .collect()
    }
}

/// The displayed gauge value; chases the latest score on a spring.
#[derive(Debug, Clone)]
pub struct RiskGauge {
    spring: Spring,
}

impl RiskGauge {
    /// A gauge resting at `score`.
    pub fn new(score: f64) -> Self {
        Self {
            spring: Spring::new(45.0, 20.0, score),
        }
    }

    /// Point the gauge at a new score.
    pub fn set_score(&mut self, score: f64) {
        self.spring.set_target(score.clamp(0.0, 100.0));
    }

    /// Advance the animation and return the value to draw.
    pub fn step(&mut self, dt: Duration) -> f64 {
        self.spring.step(dt);
        self.shown()
    }

    /// The value currently drawn, as a fraction of the arc.
    pub fn fraction(&self) -> f64 {
        self.shown() / 100.0
    }

    fn shown(&self) -> f64 {
        self.spring.value().clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_at_the_ends() {
        let arc = GaugeArc::new(125.0, 125.0, 100.0);
        assert!((arc.progress_offset(0.0) - arc.arc_length()).abs() < 1e-9);
        assert!(arc.progress_offset(100.0).abs() < 1e-9);
        assert!((arc.progress_offset(50.0) - arc.arc_length() / 2.0).abs() < 1e-9);
    }

    #[test]
    fn arc_is_two_thirds_of_circumference() {
        let arc = GaugeArc::new(0.0, 0.0, 3.0);
        assert!((arc.arc_length() - 4.0 * PI).abs() < 1e-9);
    }

    #[test]
    fn arc_ends_are_symmetric_about_vertical() {
        let arc = GaugeArc::new(0.0, 0.0, 1.0);
        let (x0, y0) = arc.point_at(0.0);
        let (x1, y1) = arc.point_at(1.0);
        assert!((x0 + x1).abs() < 1e-9);
        assert!((y0 - y1).abs() < 1e-9);
        assert!(y0 < 0.0);
        let (xm, ym) = arc.point_at(0.5);
        assert!(xm.abs() < 1e-9);
        assert!((ym - 1.0).abs() < 1e-9);
    }

    #[test]
    fn gauge_sweeps_toward_score() {
        let mut gauge = RiskGauge::new(0.0);
        gauge.set_score(80.0);
        let first = gauge.step(Duration::from_millis(16));
        assert!(first > 0.0 && first < 80.0);
        for _ in 0..1200 {
            gauge.step(Duration::from_millis(16));
        }
        assert!((gauge.fraction() - 0.8).abs() < 1e-3);
    }
}
