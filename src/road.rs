//! The road model behind the cockpit view: how far we have travelled, how
//! hard the road is bending, and how far the car has wandered from the lane
//! centre. [RoadState::advance] integrates one frame; [RoadState::scene]
//! turns the current state into perspective geometry for a surface.

use crate::risk::SimulationInputs;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tuning for the road. Distances are in road units, screen measurements in
/// surface units (the renderer's canvas is 200 by 100 of those).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RoadParams {
    /// Travel per frame at zero complexity
    pub base_speed: f64,
    /// Extra travel per frame at full complexity
    pub speed_gain: f64,
    /// Fraction of the speed error closed each frame
    pub speed_damping: f64,
    /// Distance between new curvature targets
    pub curve_interval: f64,
    /// Largest curvature target, reached only at full complexity
    pub max_curvature: f64,
    /// Fraction of the curvature error closed each frame
    pub curvature_damping: f64,
    /// Attention below which the car starts to wander
    pub distraction_threshold: u8,
    /// Angular frequency of the wander, radians per second
    pub drift_frequency: f64,
    /// Drift added per frame per point of attention below the threshold
    pub drift_gain: f64,
    /// Multiplier applied to drift each attentive frame
    pub drift_decay: f64,
    /// Drift is kept within plus or minus this
    pub max_drift: f64,
    /// Number of trapezoids between the bumper and the horizon
    pub segment_count: usize,
    /// Road distance covered by one shading stripe
    pub segment_length: f64,
    /// Half the road width at the bottom of the surface
    pub near_half_width: f64,
    /// Half the road width at the horizon
    pub far_half_width: f64,
    /// Height of the horizon above the bottom of the surface
    pub horizon: f64,
    /// Horizontal shift at the horizon per unit of curvature
    pub curve_offset_scale: f64,
    /// Opacity of the vision mask when attention is zero
    pub max_vision_mask: f64,
    /// Screen offset of the car per unit of drift
    pub lane_half_width: f64,
    /// Car rotation, in radians, per unit of drift
    pub max_tilt: f64,
}

impl Default for RoadParams {
    fn default() -> Self {
        Self {
            base_speed: 2.0,
            speed_gain: 8.0,
            speed_damping: 0.1,
            curve_interval: 600.0,
            max_curvature: 1.0,
            curvature_damping: 0.02,
            distraction_threshold: 40,
            drift_frequency: 1.5,
            drift_gain: 0.0015,
            drift_decay: 0.94,
            max_drift: 1.0,
            segment_count: 24,
            segment_length: 40.0,
            near_half_width: 70.0,
            far_half_width: 4.0,
            horizon: 60.0,
            curve_offset_scale: 60.0,
            max_vision_mask: 0.7,
            lane_half_width: 30.0,
            max_tilt: 0.35,
        }
    }
}

/// Everything the road remembers between frames.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RoadState {
    #[allow(missing_docs)]
    pub position: f64,
    #[allow(missing_docs)]
    pub current_curvature: f64,
    #[allow(missing_docs)]
    pub target_curvature: f64,
    #[allow(missing_docs)]
    pub speed: f64,
    #[allow(missing_docs)]
    pub lateral_drift: f64,
    /// Seconds since the road was created
    pub elapsed: f64,
}

/// Alternating asphalt tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
    #[allow(missing_docs)]
    Light,
    #[allow(missing_docs)]
    Dark,
}

/// A horizontal slice across the road at one depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadEdge {
    /// Height above the bottom of the surface
    pub y: f64,
    #[allow(missing_docs)]
    pub left: f64,
    #[allow(missing_docs)]
    pub right: f64,
}

impl RoadEdge {
    /// Midpoint between the road edges.
    pub fn centre(&self) -> f64 {
        (self.left + self.right) / 2.0
    }
}

/// One trapezoid of road, between a nearer and a farther edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadSegment {
    #[allow(missing_docs)]
    pub near: RoadEdge,
    #[allow(missing_docs)]
    pub far: RoadEdge,
    #[allow(missing_docs)]
    pub shade: Shade,
}

/// Where the car sits on screen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VehiclePose {
    /// Horizontal displacement from the surface centre
    pub offset: f64,
    /// Rotation in radians, positive is counter-clockwise
    pub rotation: f64,
}

/// A frame's worth of geometry, ready for a surface to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadScene {
    #[allow(missing_docs)]
    pub width: f64,
    #[allow(missing_docs)]
    pub height: f64,
    /// Segments ordered from the bumper to the horizon
    pub segments: Vec<RoadSegment>,
    /// Opacity of the darkening overlay, in `[0, 1]`
    pub vision_mask: f64,
    #[allow(missing_docs)]
    pub vehicle: VehiclePose,
}

impl RoadParams {
    /// The first parameter [RoadState::advance] or [RoadState::scene] can't
    /// work with, if any.
    pub fn invalid_field(&self) -> Option<&'static str> {
        let fraction = |v: f64| (0.0..=1.0).contains(&v);
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !fraction(self.speed_damping) {
            Some("speed_damping")
        } else if !fraction(self.curvature_damping) {
            Some("curvature_damping")
        } else if !fraction(self.drift_decay) {
            Some("drift_decay")
        } else if !(self.max_drift.is_finite() && self.max_drift >= 0.0) {
            Some("max_drift")
        } else if !positive(self.curve_interval) {
            Some("curve_interval")
        } else if !positive(self.segment_length) {
            Some("segment_length")
        } else {
            None
        }
    }
}

impl RoadState {
    /// A stationary, straight road.
    pub fn new() -> Self {
        Self::default()
    }

    /// Integrate one frame of `dt` seconds. Curvature targets are drawn from
    /// `rng`, so a seeded generator makes the whole road reproducible.
    pub fn advance<R: Rng>(
        &mut self,
        inputs: SimulationInputs,
        params: &RoadParams,
        dt: f64,
        rng: &mut R,
    ) {
        let complexity = inputs.complexity as f64 / 100.0;

        let target_speed = params.base_speed + complexity * params.speed_gain;
        self.speed += (target_speed - self.speed) * params.speed_damping;

        let before = (self.position / params.curve_interval).floor();
        self.position += self.speed;
        let after = (self.position / params.curve_interval).floor();
        if after > before {
            self.target_curvature =
                rng.gen_range(-1.0_f64..=1.0) * complexity * params.max_curvature;
            debug!(
                "new curvature target {:.3} at {:.0}",
                self.target_curvature, self.position
            );
        }
        self.current_curvature +=
            (self.target_curvature - self.current_curvature) * params.curvature_damping;

        self.elapsed += dt;
        if inputs.attention < params.distraction_threshold {
            let deficit = (params.distraction_threshold - inputs.attention) as f64;
            self.lateral_drift +=
                (self.elapsed * params.drift_frequency).sin() * deficit * params.drift_gain;
        } else {
            self.lateral_drift *= params.drift_decay;
        }
        self.lateral_drift = self
            .lateral_drift
            .clamp(-params.max_drift, params.max_drift);
    }

    /// Project the road onto a `width` by `height` surface with the origin
    /// at the bottom left.
    pub fn scene(
        &self,
        inputs: SimulationInputs,
        params: &RoadParams,
        width: f64,
        height: f64,
        vehicle: VehiclePose,
    ) -> RoadScene {
        let n = params.segment_count.max(1);
        let horizon = params.horizon.min(height);
        let centre = width / 2.0;
        let scroll = (self.position / params.segment_length).floor() as i64;

        let edge_at = |i: usize| -> RoadEdge {
            // 1 at the bumper row, 0 at the horizon
            let proximity = 1.0 - i as f64 / n as f64;
            let half = params.far_half_width
                + (params.near_half_width - params.far_half_width) * proximity;
            let bend =
                self.current_curvature * params.curve_offset_scale * (1.0 - proximity).powi(2);
            RoadEdge {
                y: horizon * (1.0 - proximity),
                left: centre + bend - half,
                right: centre + bend + half,
            }
        };

        let segments = (0..n)
            .map(|i| RoadSegment {
                near: edge_at(i),
                far: edge_at(i + 1),
                shade: if (i as i64 + scroll).rem_euclid(2) == 0 {
                    Shade::Light
                } else {
                    Shade::Dark
                },
            })
            .collect();

        let inattention = (100 - inputs.attention.min(100)) as f64 / 100.0;

        RoadScene {
            width,
            height,
            segments,
            vision_mask: inattention * params.max_vision_mask,
            vehicle,
        }
    }
}
