//! The risk estimator. Two slider inputs, driver attention and environmental
//! complexity, are folded into a single score in `[0, 100]`, and that score
//! is binned into one of three [RiskMode]s. Everything the dashboard shows
//! about risk (the pips, the multimodal indicators, the take-over banner) is
//! derived from an [RiskAssessment] here, without any memory of previous
//! assessments.

use serde::{Deserialize, Serialize};
use std::fmt;

const ATTENTION_WEIGHT: f64 = 0.7;
const COMPLEXITY_WEIGHT: f64 = 0.3;

/// Attention below this level turns the attention read-out amber.
pub const ATTENTION_WARNING_LEVEL: u8 = 40;

/// Number of pips shown underneath the gauge read-out.
pub const RISK_PIPS: usize = 5;

/// The two user-controlled inputs. Both are percentages; the sliders that
/// write them saturate at the ends, so the estimator never checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SimulationInputs {
    /// 0 is fully distracted, 100 is fully attentive
    pub attention: u8,
    /// 0 is an empty road, 100 is the worst environment we model
    pub complexity: u8,
}

impl Default for SimulationInputs {
    fn default() -> Self {
        Self {
            attention: 85,
            complexity: 20,
        }
    }
}

impl SimulationInputs {
    /// Build a set of inputs.
    pub fn new(attention: u8, complexity: u8) -> Self {
        Self {
            attention,
            complexity,
        }
    }

    /// True when the driver is distracted enough to flag the attention
    /// read-out.
    pub fn attention_warning(&self) -> bool {
        self.attention < ATTENTION_WARNING_LEVEL
    }
}

/// The discrete alert band a score falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum RiskMode {
    /// Nothing to report
    Nominal,
    /// Low-intensity cues
    Advisory,
    /// Take-over request
    Urgent,
}

impl RiskMode {
    /// The label shown as the HMI logic state.
    pub fn label(&self) -> &'static str {
        match self {
            RiskMode::Nominal => "NOMINAL",
            RiskMode::Advisory => "ADVISORY",
            RiskMode::Urgent => "URGENT",
        }
    }

    /// The take-over request stage this mode corresponds to.
    pub fn tor_stage(&self) -> &'static str {
        match self {
            RiskMode::Nominal => "STAGE_1_NOMINAL",
            RiskMode::Advisory => "STAGE_2_ADVISORY",
            RiskMode::Urgent => "STAGE_3_TOR",
        }
    }

    /// Only urgent risk asks the driver to take over.
    pub fn take_over_required(&self) -> bool {
        matches!(self, RiskMode::Urgent)
    }
}

impl fmt::Display for RiskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Score boundaries between the modes. A score equal to a boundary stays in
/// the lower band.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Thresholds {
    /// Scores strictly above this are [RiskMode::Urgent]
    pub high: f64,
    /// Scores strictly above this (and not above `high`) are [RiskMode::Advisory]
    pub low: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high: 70.0,
            low: 40.0,
        }
    }
}

impl Thresholds {
    /// Whether `low <= high` and both are inside the score range.
    pub fn is_ordered(&self) -> bool {
        (0.0..=100.0).contains(&self.low)
            && (0.0..=100.0).contains(&self.high)
            && self.low <= self.high
    }

    /// Bin a score.
    pub fn classify(&self, score: f64) -> RiskMode {
        if score > self.high {
            RiskMode::Urgent
        } else if score > self.low {
            RiskMode::Advisory
        } else {
            RiskMode::Nominal
        }
    }
}

/// A score and the mode it falls in. Never stored; recompute it whenever the
/// inputs change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskAssessment {
    /// Weighted risk in `[0, 100]`
    pub score: f64,
    /// The band `score` falls in
    pub mode: RiskMode,
}

/// The weighted sum of inattention and complexity, clamped to `[0, 100]`.
pub fn risk_score(inputs: SimulationInputs) -> f64 {
    let inattention = 100.0 - inputs.attention as f64;
    let risk = inattention * ATTENTION_WEIGHT + inputs.complexity as f64 * COMPLEXITY_WEIGHT;
    risk.clamp(0.0, 100.0)
}

/// Assess a set of inputs against a pair of thresholds.
pub fn assess(inputs: SimulationInputs, thresholds: &Thresholds) -> RiskAssessment {
    let score = risk_score(inputs);
    RiskAssessment {
        score,
        mode: thresholds.classify(score),
    }
}

impl RiskAssessment {
    /// The score as the big read-out shows it.
    pub fn display_score(&self) -> u8 {
        self.score.round() as u8
    }

    /// Which of the [RISK_PIPS] pips are lit; pip `i` lights once the score
    /// reaches `20 * (i + 1)`.
    pub fn pips(&self) -> [bool; RISK_PIPS] {
        let mut pips = [false; RISK_PIPS];
        for (i, pip) in pips.iter_mut().enumerate() {
            *pip = self.score >= 20.0 * (i + 1) as f64;
        }
        pips
    }
}

/// How hard an active indicator is pushing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    #[allow(missing_docs)]
    Low,
    #[allow(missing_docs)]
    Normal,
    #[allow(missing_docs)]
    High,
}

/// One output modality of the HMI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indicator {
    /// Label under the indicator
    pub label: &'static str,
    /// Whether the modality is engaged at all
    pub active: bool,
    /// How strongly it is engaged
    pub intensity: Intensity,
}

/// The haptic, audio, and safety-integrity indicators for a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indicators {
    #[allow(missing_docs)]
    pub haptic: Indicator,
    #[allow(missing_docs)]
    pub audio: Indicator,
    #[allow(missing_docs)]
    pub safety: Indicator,
}

impl Indicators {
    /// Haptics come on above nominal, audio only for a take-over request,
    /// and the safety-integrity light is always on.
    pub fn for_mode(mode: RiskMode) -> Self {
        Self {
            haptic: Indicator {
                label: "Haptic",
                active: mode != RiskMode::Nominal,
                intensity: if mode == RiskMode::Urgent {
                    Intensity::High
                } else {
                    Intensity::Low
                },
            },
            audio: Indicator {
                label: "Audio",
                active: mode == RiskMode::Urgent,
                intensity: Intensity::High,
            },
            safety: Indicator {
                label: "Safety Int.",
                active: true,
                intensity: Intensity::Normal,
            },
        }
    }

    /// The indicators in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Indicator> {
        [&self.haptic, &self.audio, &self.safety].into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_inputs() -> impl Iterator<Item = SimulationInputs> {
        (0..=100u8).flat_map(|a| (0..=100u8).map(move |c| SimulationInputs::new(a, c)))
    }

    #[test]
    fn score_matches_formula_and_stays_in_range() {
        for inputs in all_inputs() {
            let expected = (0.7 * (100.0 - inputs.attention as f64)
                + 0.3 * inputs.complexity as f64)
                .clamp(0.0, 100.0);
            let score = risk_score(inputs);
            assert_eq!(score, expected);
            assert!((0.0..=100.0).contains(&score));
        }
    }

    #[test]
    fn score_is_monotonic_in_each_input() {
        for held in 0..=100u8 {
            for v in 0..100u8 {
                assert!(
                    risk_score(SimulationInputs::new(v + 1, held))
                        <= risk_score(SimulationInputs::new(v, held))
                );
                assert!(
                    risk_score(SimulationInputs::new(held, v + 1))
                        >= risk_score(SimulationInputs::new(held, v))
                );
            }
        }
    }

    #[test]
    fn boundaries_stay_in_the_lower_band() {
        let t = Thresholds::default();
        assert_eq!(t.classify(70.0), RiskMode::Advisory);
        assert_eq!(t.classify(70.0 + 1e-9), RiskMode::Urgent);
        assert_eq!(t.classify(40.0), RiskMode::Nominal);
        assert_eq!(t.classify(40.0 + 1e-9), RiskMode::Advisory);
    }

    #[test]
    fn concrete_scenarios() {
        let t = Thresholds::default();

        let calm = assess(SimulationInputs::new(100, 0), &t);
        assert_eq!(calm.score, 0.0);
        assert_eq!(calm.mode, RiskMode::Nominal);

        let worst = assess(SimulationInputs::new(0, 100), &t);
        assert_eq!(worst.score, 100.0);
        assert_eq!(worst.mode, RiskMode::Urgent);

        let default = assess(SimulationInputs::default(), &t);
        assert!((default.score - 16.5).abs() < 1e-9);
        assert_eq!(default.mode, RiskMode::Nominal);
    }

    #[test]
    fn assessment_is_idempotent() {
        let t = Thresholds::default();
        let inputs = SimulationInputs::new(37, 64);
        let first = assess(inputs, &t);
        // interleave an unrelated assessment to make sure nothing carries over
        let _ = assess(SimulationInputs::new(0, 100), &t);
        let second = assess(inputs, &t);
        assert_eq!(first.score.to_bits(), second.score.to_bits());
        assert_eq!(first.mode, second.mode);
    }

    #[test]
    fn pips_light_in_steps_of_twenty() {
        let t = Thresholds::default();
        for inputs in all_inputs() {
            let a = assess(inputs, &t);
            let lit = a.pips().iter().filter(|&&p| p).count();
            assert_eq!(lit, (a.score / 20.0).floor() as usize);
        }
    }

    #[test]
    fn indicators_follow_mode() {
        let nominal = Indicators::for_mode(RiskMode::Nominal);
        assert!(!nominal.haptic.active);
        assert!(!nominal.audio.active);
        assert!(nominal.safety.active);

        let advisory = Indicators::for_mode(RiskMode::Advisory);
        assert!(advisory.haptic.active);
        assert_eq!(advisory.haptic.intensity, Intensity::Low);
        assert!(!advisory.audio.active);

        let urgent = Indicators::for_mode(RiskMode::Urgent);
        assert!(urgent.haptic.active);
        assert_eq!(urgent.haptic.intensity, Intensity::High);
        assert!(urgent.audio.active);
        assert_eq!(urgent.safety.intensity, Intensity::Normal);
    }

    #[test]
    fn only_urgent_requests_take_over() {
        assert!(!RiskMode::Nominal.take_over_required());
        assert!(!RiskMode::Advisory.take_over_required());
        assert!(RiskMode::Urgent.take_over_required());
        assert_eq!(RiskMode::Urgent.tor_stage(), "STAGE_3_TOR");
    }

    #[test]
    fn attention_warning_below_forty() {
        assert!(SimulationInputs::new(39, 0).attention_warning());
        assert!(!SimulationInputs::new(40, 0).attention_warning());
    }

    #[test]
    fn threshold_ordering() {
        assert!(Thresholds::default().is_ordered());
        assert!(Thresholds { high: 65.0, low: 35.0 }.is_ordered());
        assert!(!Thresholds { high: 30.0, low: 60.0 }.is_ordered());
        assert!(!Thresholds { high: 120.0, low: 40.0 }.is_ordered());
    }
}
