use std::time::{Duration, Instant};

use spin_sleep::SpinSleeper;

// A frame that took longer than this is treated as this long
const MAX_FRAME: Duration = Duration::from_millis(250);

/// Stands in for the display refresh: hands out frame times and sleeps off
/// whatever is left of each frame.
pub struct FramePacer {
    period: Duration,
    frame_start: Instant,
    sleeper: SpinSleeper,
}

impl FramePacer {
    /// A pacer aiming for `fps` frames per second.
    pub fn new(fps: f64) -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / fps),
            frame_start: Instant::now(),
            sleeper: SpinSleeper::default(),
        }
    }

    /// Start a frame, returning the time since the previous one started.
    pub fn begin(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.duration_since(self.frame_start);
        self.frame_start = now;
        dt.min(MAX_FRAME)
    }

    /// Sleep until the current frame's period is used up.
    pub fn sleep_remaining(&self) {
        if let Some(rest) = self.period.checked_sub(self.frame_start.elapsed()) {
            self.sleeper.sleep(rest);
        }
    }

    #[allow(missing_docs)]
    pub fn period(&self) -> Duration {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_from_fps() {
        let pacer = FramePacer::new(50.0);
        assert_eq!(pacer.period(), Duration::from_millis(20));
    }

    #[test]
    fn frames_are_paced() {
        let mut pacer = FramePacer::new(100.0);
        pacer.begin();
        pacer.sleep_remaining();
        let dt = pacer.begin();
        assert!(dt >= Duration::from_millis(10));
        assert!(dt <= MAX_FRAME);
    }
}
