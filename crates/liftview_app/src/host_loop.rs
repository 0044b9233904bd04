// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fixed-step simulated clock driving the viewer.

use std::time::Duration;

/// Frame clock
#[derive(Debug, Clone)]
pub struct HostLoop {
    /// Length of one frame in milliseconds
    frame_ms: f64,
    /// Time scale for the simulation (1.0 = normal speed)
    pub time_scale: f64,
    /// Simulated milliseconds since start
    pub elapsed_ms: f64,
    /// Frames advanced since start
    pub frame_count: u64,
}

impl HostLoop {
    /// Create a clock ticking at `frame_rate` frames per second
    pub fn new(frame_rate: u32) -> Self {
        Self {
            frame_ms: 1000.0 / f64::from(frame_rate.max(1)),
            time_scale: 1.0,
            elapsed_ms: 0.0,
            frame_count: 0,
        }
    }

    /// Wall-clock length of one frame
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(self.frame_ms / 1000.0)
    }

    /// Time of the frame about to run; the first frame runs at 0
    pub fn now(&self) -> f64 {
        self.elapsed_ms
    }

    /// Move to the next frame. Returns the new simulated time.
    pub fn advance(&mut self) -> f64 {
        self.frame_count += 1;
        self.elapsed_ms += self.frame_ms * self.time_scale;
        self.elapsed_ms
    }

    /// Set time scale (clamped to reasonable range)
    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale.clamp(0.0, 10.0);
    }
}

impl Default for HostLoop {
    fn default() -> Self {
        Self::new(60)
    }
}
