//! A cockpit simulator for a context-aware driver HMI. Two inputs, driver
//! attention and environmental complexity, feed a risk estimator that picks
//! how loudly the car should talk to its driver, and a procedural road that
//! bends, speeds up, and wanders out of lane in response to the same inputs.
//!
//! The [risk] module is pure: the same inputs always give the same
//! [risk::RiskAssessment]. The [road] and [renderer] modules carry state from
//! frame to frame, driven by a [frame_loop::FrameScheduler] that the
//! terminal front end in [gui] ticks at the display rate. [trace] runs the
//! same loop without a screen and writes what happened to a [ron] file.
//!
//! Run `cockpit run` for the interactive dashboard, or
//! `cockpit trace --frames 600 --out trace.ron` for a headless recording.
//! Set `RUST_LOG=info` (and redirect stderr) to see mode transitions.

#![warn(missing_docs)]
pub mod args;
pub mod config;
pub mod frame_loop;
pub mod gauge;
pub mod gui;
pub mod renderer;
pub mod risk;
pub mod road;
pub mod spring;
pub mod trace;
