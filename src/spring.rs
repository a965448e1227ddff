//! A damped spring that chases a target value. Used wherever something on
//! screen should move with inertia instead of jumping or sliding linearly:
//! the vehicle's lateral offset and tilt, and the gauge arc.

use std::time::Duration;

// Longest single integration step, in seconds
const MAX_STEP: f64 = 1.0 / 120.0;

const REST_EPSILON: f64 = 1e-3;

/// A mass on a damped spring, integrated with semi-implicit Euler.
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    stiffness: f64,
    damping: f64,
    mass: f64,
    value: f64,
    velocity: f64,
    target: f64,
}

impl Spring {
    /// A spring at rest at `value`.
    pub fn new(stiffness: f64, damping: f64, value: f64) -> Self {
        Self {
            stiffness,
            damping,
            mass: 1.0,
            value,
            velocity: 0.0,
            target: value,
        }
    }

    /// The default feel for UI motion: stiffness 100, damping 10.
    pub fn ui(value: f64) -> Self {
        Self::new(100.0, 10.0, value)
    }

    /// Set the value the spring pulls toward. Velocity is preserved, so a
    /// moving spring curves toward the new target.
    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    #[allow(missing_docs)]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[allow(missing_docs)]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[allow(missing_docs)]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Advance by `dt`, splitting long frames into sub-steps so a stalled
    /// frame can't blow the integration up.
    pub fn step(&mut self, dt: Duration) -> f64 {
        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 {
            let h = remaining.min(MAX_STEP);
            let force = -self.stiffness * (self.value - self.target) - self.damping * self.velocity;
            self.velocity += force / self.mass * h;
            self.value += self.velocity * h;
            remaining -= h;
        }
        self.value
    }

    /// True once the spring is (visually) at rest on its target.
    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < REST_EPSILON && self.velocity.abs() < REST_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_micros(16_667);

    #[test]
    fn first_frame_moves_part_way() {
        let mut s = Spring::ui(0.0);
        s.set_target(10.0);
        let v = s.step(FRAME);
        assert!(v > 0.0);
        assert!(v < 10.0);
    }

    #[test]
    fn settles_on_target() {
        let mut s = Spring::ui(0.0);
        s.set_target(-3.0);
        for _ in 0..600 {
            s.step(FRAME);
        }
        assert!(s.is_settled());
        assert!((s.value() + 3.0).abs() < 1e-3);
    }

    #[test]
    fn long_frame_stays_stable() {
        let mut s = Spring::new(45.0, 20.0, 0.0);
        s.set_target(100.0);
        s.step(Duration::from_secs(5));
        assert!(s.value().is_finite());
        assert!((s.value() - 100.0).abs() < 1.0);
    }

    #[test]
    fn at_rest_stays_put() {
        let mut s = Spring::ui(4.0);
        s.step(FRAME);
        assert_eq!(s.value(), 4.0);
        assert!(s.is_settled());
    }
}
