//! Commandline argument parser using clap for the cockpit simulator

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::SimConfig;

#[derive(Debug, Parser, Clone)]
#[clap(version, about)]
#[allow(missing_docs)]
pub struct CockpitArgs {
    #[command(subcommand)]
    /// Which task to perform, the interactive cockpit or a headless trace
    pub command: CommandTask,

    /// RON file with thresholds, defaults, and road tuning
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand, Clone)]
#[allow(missing_docs)]
pub enum CommandTask {
    /// Open the interactive cockpit in the terminal
    #[command(about)]
    Run(RunCommand),

    /// Simulate without a screen and write a RON telemetry trace
    #[command(about)]
    Trace(TraceCommand),
}

/// Overrides shared by every subcommand. Anything left out comes from the
/// config file, or the built-in defaults.
#[derive(Debug, Args, Clone, Default)]
pub struct SessionArgs {
    /// Starting driver attention, in percent
    #[arg(short = 'a', long = "attention", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub attention: Option<u8>,

    /// Starting environmental complexity, in percent
    #[arg(short = 'x', long = "complexity", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub complexity: Option<u8>,

    /// Seed for the road's curvature generator
    #[arg(short = 's', long = "seed")]
    pub seed: Option<u64>,

    /// Frames per second
    #[arg(long = "fps")]
    pub fps: Option<f64>,
}

#[derive(Debug, Args, Clone)]
#[command(version, about)]
#[allow(missing_docs)]
pub struct RunCommand {
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Debug, Args, Clone)]
#[command(version, about)]
#[allow(missing_docs)]
pub struct TraceCommand {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Number of frames to simulate
    #[arg(short = 'n', long = "frames", default_value_t = 600)]
    pub frames: u64,

    /// Filename for the trace to be written to
    #[arg(short = 'o', long = "out")]
    pub outfile: PathBuf,
}

impl SessionArgs {
    /// Fold the overrides into a config. Slider defaults are replaced too,
    /// so `r` in the cockpit returns to what was asked for on the command line.
    pub fn apply(&self, mut config: SimConfig) -> SimConfig {
        if let Some(attention) = self.attention {
            config.defaults.attention = attention;
        }
        if let Some(complexity) = self.complexity {
            config.defaults.complexity = complexity;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(fps) = self.fps.filter(|f| f.is_finite() && *f > 0.0) {
            config.fps = fps;
        }
        config
    }
}
