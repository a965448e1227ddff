//! Headless telemetry traces. A trace drives a [RoadView] through a
//! [FrameScheduler] for a fixed number of frames at a fixed frame time and
//! records what the dashboard would have shown on each one. Traces are
//! written as [ron], the same way the config is read.

use crate::config::SimConfig;
use crate::frame_loop::FrameScheduler;
use crate::renderer::{Extent, RoadRenderer, RoadView, SceneBuffer};
use crate::risk::{assess, RiskMode, SimulationInputs, Thresholds};

use log::info;
use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    cell::{Cell, RefCell},
    fmt,
    fs::File,
    io::{Read, Write},
    path::Path,
    rc::Rc,
    time::Duration,
};

/// One frame of telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct TraceSample {
    #[allow(missing_docs)]
    pub frame: u64,
    #[allow(missing_docs)]
    pub score: f64,
    #[allow(missing_docs)]
    pub mode: RiskMode,
    #[allow(missing_docs)]
    pub speed: f64,
    #[allow(missing_docs)]
    pub curvature: f64,
    #[allow(missing_docs)]
    pub lateral_drift: f64,
    /// Where the car was drawn, after spring easing
    pub vehicle_offset: f64,
}

/// A recorded run and the settings that produced it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Trace {
    #[allow(missing_docs)]
    pub seed: u64,
    #[allow(missing_docs)]
    pub fps: f64,
    #[allow(missing_docs)]
    pub thresholds: Thresholds,
    #[allow(missing_docs)]
    pub inputs: SimulationInputs,
    #[allow(missing_docs)]
    pub samples: Vec<TraceSample>,
}

/// Things that can go wrong while saving or loading a [Trace].
#[derive(Debug)]
pub enum TraceError {
    /// Returned when io fails when reading or writing files.
    IoError(std::io::Error),

    /// Returned when serialization fails.
    RonError(ron::Error),

    /// Returned when deserialization fails.
    RonSpannedError(ron::de::SpannedError),
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TraceError as TE;
        let msg = match self {
            TE::IoError(error) => Cow::from(format!("io error: {}", error)),
            TE::RonError(error) => Cow::from(format!("ron error: {}", error)),
            TE::RonSpannedError(error) => Cow::from(format!("ron spanning error: {}", error)),
        };

        write!(f, "{}", msg)
    }
}

impl std::error::Error for TraceError {}

/// Run the simulator without a screen for `frames` frames and record it.
pub fn record(config: &SimConfig, inputs: SimulationInputs, frames: u64) -> Trace {
    let dt = Duration::from_secs_f64(1.0 / config.fps);
    let mut scheduler = FrameScheduler::new();
    let shared_inputs = Rc::new(Cell::new(inputs));
    let surface = Rc::new(RefCell::new(SceneBuffer::new()));
    surface.borrow_mut().set_extent(Some(Extent {
        width: 200.0,
        height: 100.0,
    }));

    let view = RoadView::activate(
        &scheduler,
        RoadRenderer::new(config.road, config.seed),
        shared_inputs.clone(),
        surface.clone(),
    );

    // inputs are fixed for the run, so the assessment is too
    let assessment = assess(shared_inputs.get(), &config.thresholds);
    let mut samples = Vec::new();
    for frame in 0..frames {
        scheduler.tick(dt);
        let renderer = view.renderer();
        let state = renderer.state();
        samples.push(TraceSample {
            frame,
            score: assessment.score,
            mode: assessment.mode,
            speed: state.speed,
            curvature: state.current_curvature,
            lateral_drift: state.lateral_drift,
            vehicle_offset: renderer.vehicle().offset,
        });
    }
    drop(view);

    info!(
        "recorded {} frames at {} fps, mode {}",
        frames, config.fps, assessment.mode
    );

    Trace {
        seed: config.seed,
        fps: config.fps,
        thresholds: config.thresholds,
        inputs,
        samples,
    }
}

impl Trace {
    /// Write the trace to the path provided.
    pub fn to_path(&self, path: impl AsRef<Path>) -> Result<(), TraceError> {
        let mut handle = File::create(path).map_err(TraceError::IoError)?;
        self.to_file(&mut handle)
    }

    /// Write the trace to the [Write]able object provided.
    pub fn to_file(&self, file: &mut impl Write) -> Result<(), TraceError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(TraceError::RonError)?;
        file.write_all(text.as_bytes())
            .map_err(TraceError::IoError)
    }

    /// Read a trace from the path provided.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let mut handle = File::open(path).map_err(TraceError::IoError)?;
        Self::from_file(&mut handle)
    }

    /// Read a trace from the [Read]able object provided.
    pub fn from_file(file: &mut impl Read) -> Result<Self, TraceError> {
        let mut text = Vec::new();
        file.read_to_end(&mut text).map_err(TraceError::IoError)?;
        ron::de::from_bytes(&text).map_err(TraceError::RonSpannedError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn records_requested_frames() {
        let config = SimConfig::default();
        let trace = record(&config, SimulationInputs::new(0, 100), 120);
        assert_eq!(trace.samples.len(), 120);
        assert!(trace.samples.iter().all(|s| s.mode == RiskMode::Urgent));
        assert!(trace
            .samples
            .iter()
            .all(|s| s.lateral_drift.abs() <= config.road.max_drift));
        assert_eq!(trace.samples.last().map(|s| s.frame), Some(119));
    }

    #[test]
    fn same_config_same_trace() {
        let config = SimConfig::default();
        let inputs = SimulationInputs::new(30, 70);
        assert_eq!(record(&config, inputs, 500), record(&config, inputs, 500));
    }

    #[test]
    fn write_and_read_path() {
        let tempfile = tempfile::NamedTempFile::new().unwrap();
        let trace = record(&SimConfig::default(), SimulationInputs::default(), 300);
        trace.to_path(tempfile.path()).unwrap();
        let read = Trace::from_path(tempfile.path()).unwrap();
        assert_eq!(trace, read);
    }

    #[test]
    fn zero_frames_records_nothing() {
        let trace = record(&SimConfig::default(), SimulationInputs::default(), 0);
        assert!(trace.samples.is_empty());
    }

    #[test]
    fn truncated_file_is_an_error() {
        let trace = record(&SimConfig::default(), SimulationInputs::default(), 3);
        let mut buf = Cursor::new(Vec::new());
        trace.to_file(&mut buf).unwrap();
        let mut bytes = buf.into_inner();
        bytes.truncate(bytes.len() / 2);
        let res = Trace::from_file(&mut Cursor::new(bytes));
        assert!(matches!(res, Err(TraceError::RonSpannedError(_))));
    }
}
