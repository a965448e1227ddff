//! The terminal cockpit: input sliders on the left, the virtual cockpit with
//! the road, risk gauge and multimodal indicators on the right.

mod cockpit;
mod dashboard;
mod error;
mod pacer;

pub use cockpit::{run_cockpit, Cockpit, Control, Slider};
pub use dashboard::draw;
pub use error::CockpitGuiError;
pub use pacer::FramePacer;
