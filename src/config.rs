//! Simulator configuration, read from a [ron] file. Every field has a
//! default, so a config file only needs to mention what it changes:
//!
//! ```text
//! (
//!     thresholds: (high: 65.0, low: 35.0),
//!     defaults: (attention: 85, complexity: 25),
//!     road: (max_drift: 0.8),
//!     fps: 30.0,
//!     seed: 7,
//! )
//! ```

use crate::risk::{SimulationInputs, Thresholds};
use crate::road::RoadParams;

use serde::{Deserialize, Serialize};
use std::{borrow::Cow, fmt, fs, path::Path};

/// Everything tunable about a simulator session.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimConfig {
    /// Mode boundaries for the risk estimator
    pub thresholds: Thresholds,
    /// Where the sliders start, and where `r` puts them back
    pub defaults: SimulationInputs,
    /// Road behaviour and geometry
    pub road: RoadParams,
    /// Target frames per second
    pub fps: f64,
    /// Seed for the road's curvature generator
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            defaults: SimulationInputs::default(),
            road: RoadParams::default(),
            fps: 60.0,
            seed: 0x5EED,
        }
    }
}

/// Things that can go wrong while loading a [SimConfig].
#[derive(Debug)]
pub enum ConfigError {
    /// Returned when the file can't be read.
    IoError(std::io::Error),

    /// Returned when the file isn't valid RON for a [SimConfig].
    RonSpannedError(ron::de::SpannedError),

    /// Returned when the thresholds are out of range or `low > high`.
    InvalidThresholds(Thresholds),

    /// Returned when the frame rate isn't a positive number.
    InvalidFps(f64),

    /// Returned when a slider default is above 100.
    InvalidDefaults(SimulationInputs),

    /// Returned when a road parameter is out of range. Names the field.
    InvalidRoad(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ConfigError as CE;
        let msg = match self {
            CE::IoError(error) => Cow::from(format!("io error: {}", error)),
            CE::RonSpannedError(error) => Cow::from(format!("ron error: {}", error)),
            CE::InvalidThresholds(t) => Cow::from(format!(
                "thresholds must satisfy 0 <= low <= high <= 100, got low {} high {}",
                t.low, t.high
            )),
            CE::InvalidFps(fps) => Cow::from(format!("fps must be positive, got {}", fps)),
            CE::InvalidDefaults(inputs) => Cow::from(format!(
                "default inputs must be within 0..=100, got attention {} complexity {}",
                inputs.attention, inputs.complexity
            )),
            CE::InvalidRoad(field) => Cow::from(format!("road parameter {} is out of range", field)),
        };

        write!(f, "{}", msg)
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::IoError(value)
    }
}

impl From<ron::de::SpannedError> for ConfigError {
    fn from(value: ron::de::SpannedError) -> Self {
        Self::RonSpannedError(value)
    }
}

impl SimConfig {
    /// Read and validate a config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Parse and validate a config from RON text.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = ron::from_str(text)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if !self.thresholds.is_ordered() {
            return Err(ConfigError::InvalidThresholds(self.thresholds));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(ConfigError::InvalidFps(self.fps));
        }
        if self.defaults.attention > 100 || self.defaults.complexity > 100 {
            return Err(ConfigError::InvalidDefaults(self.defaults));
        }
        if let Some(field) = self.road.invalid_field() {
            return Err(ConfigError::InvalidRoad(field));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_is_all_defaults() {
        assert_eq!(SimConfig::from_ron("()").unwrap(), SimConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = SimConfig::from_ron(
            "(thresholds: (high: 65.0, low: 35.0), road: (max_drift: 0.5), seed: 9)",
        )
        .unwrap();
        assert_eq!(config.thresholds, Thresholds { high: 65.0, low: 35.0 });
        assert_eq!(config.road.max_drift, 0.5);
        assert_eq!(config.road.drift_decay, RoadParams::default().drift_decay);
        assert_eq!(config.seed, 9);
        assert_eq!(config.defaults, SimulationInputs::default());
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let res = SimConfig::from_ron("(thresholds: (high: 30.0, low: 60.0))");
        assert!(matches!(res, Err(ConfigError::InvalidThresholds(_))));
    }

    #[test]
    fn zero_fps_is_rejected() {
        let res = SimConfig::from_ron("(fps: 0.0)");
        assert!(matches!(res, Err(ConfigError::InvalidFps(_))));
    }

    #[test]
    fn defaults_above_100_are_rejected() {
        let res = SimConfig::from_ron("(defaults: (attention: 250, complexity: 20))");
        assert!(matches!(res, Err(ConfigError::InvalidDefaults(_))));
        let res = SimConfig::from_ron("(defaults: (attention: 85, complexity: 101))");
        assert!(matches!(res, Err(ConfigError::InvalidDefaults(_))));
        assert!(SimConfig::from_ron("(defaults: (attention: 100, complexity: 0))").is_ok());
    }

    #[test]
    fn negative_max_drift_is_rejected() {
        let res = SimConfig::from_ron("(road: (max_drift: -1.0))");
        assert!(matches!(res, Err(ConfigError::InvalidRoad("max_drift"))));
        assert!(SimConfig::from_ron("(road: (max_drift: 0.0))").is_ok());
    }

    #[test]
    fn zero_lengths_are_rejected() {
        let res = SimConfig::from_ron("(road: (curve_interval: 0.0))");
        assert!(matches!(res, Err(ConfigError::InvalidRoad("curve_interval"))));
        let res = SimConfig::from_ron("(road: (segment_length: 0.0))");
        assert!(matches!(res, Err(ConfigError::InvalidRoad("segment_length"))));
    }

    #[test]
    fn damping_outside_unit_range_is_rejected() {
        for (doc, field) in [
            ("(road: (speed_damping: 1.5))", "speed_damping"),
            ("(road: (curvature_damping: -0.1))", "curvature_damping"),
            ("(road: (drift_decay: 2.0))", "drift_decay"),
        ] {
            match SimConfig::from_ron(doc) {
                Err(ConfigError::InvalidRoad(f)) => assert_eq!(f, field),
                other => panic!("{} loaded as {:?}", doc, other),
            }
        }
    }

    #[test]
    fn garbage_is_a_ron_error() {
        let res = SimConfig::from_ron("(thresholds: nope");
        assert!(matches!(res, Err(ConfigError::RonSpannedError(_))));
    }

    #[test]
    fn read_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(defaults: (attention: 60, complexity: 25), fps: 30.0)").unwrap();
        let config = SimConfig::from_path(file.path()).unwrap();
        assert_eq!(config.defaults, SimulationInputs::new(60, 25));
        assert_eq!(config.fps, 30.0);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let res = SimConfig::from_path(dir.path().join("nope.ron"));
        assert!(matches!(res, Err(ConfigError::IoError(_))));
    }
}
