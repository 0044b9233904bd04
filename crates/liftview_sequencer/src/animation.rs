// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transient animation records polled by the sequencer.
//!
//! Each record is created when a phase begins and dropped once its
//! progress reaches 1.0. Nothing reschedules itself: the owner calls
//! `tick(now)` once per frame and reads back the status.

use crate::easing::{Easing, Interpolation};

/// Host timestamp in milliseconds
pub type Millis = f64;

/// Result of polling an animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStatus {
    /// Still running
    InProgress,
    /// Reached its end
    Complete,
}

impl AnimationStatus {
    fn from_progress(progress: f64) -> Self {
        if progress >= 1.0 {
            Self::Complete
        } else {
            Self::InProgress
        }
    }
}

/// Start time and duration of one animation.
///
/// An animation created before the host's first tick has no start time
/// yet; it is stamped by the first `progress` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    start_time: Option<Millis>,
    duration: Millis,
}

impl Timing {
    /// Create timing starting at `start_time` (or at the first poll when `None`)
    pub fn new(start_time: Option<Millis>, duration: Millis) -> Self {
        Self {
            start_time,
            duration: duration.max(0.0),
        }
    }

    /// Start time, once known
    pub fn start_time(&self) -> Option<Millis> {
        self.start_time
    }

    /// Instant the animation ends, once the start is known
    pub fn end_time(&self) -> Option<Millis> {
        self.start_time.map(|start| start + self.duration)
    }

    /// Normalized progress at `now`
    pub fn progress(&mut self, now: Millis) -> f64 {
        let start = *self.start_time.get_or_insert(now);
        Interpolation::progress(now - start, self.duration)
    }
}

/// Linear slide of the two door leaves
#[derive(Debug, Clone, PartialEq)]
pub struct DoorAnimation {
    /// Leaf offsets when the animation began
    pub start_positions: [f64; 2],
    /// Leaf offsets at completion
    pub target_positions: [f64; 2],
    timing: Timing,
}

impl DoorAnimation {
    /// Create a door animation
    pub fn new(
        start_positions: [f64; 2],
        target_positions: [f64; 2],
        start_time: Option<Millis>,
        duration: Millis,
    ) -> Self {
        Self {
            start_positions,
            target_positions,
            timing: Timing::new(start_time, duration),
        }
    }

    /// Leaf offsets at `now`
    pub fn tick(&mut self, now: Millis) -> ([f64; 2], AnimationStatus) {
        let progress = Easing::Linear.apply(self.timing.progress(now));
        let positions =
            Interpolation::lerp_pair(self.start_positions, self.target_positions, progress);
        (positions, AnimationStatus::from_progress(progress))
    }

    /// Timing of this animation
    pub fn timing(&self) -> &Timing {
        &self.timing
    }
}

/// Eased vertical travel of the car
#[derive(Debug, Clone, PartialEq)]
pub struct CarAnimation {
    /// Car offset when travel began
    pub start_y: f64,
    /// Resting offset of the target floor
    pub target_y: f64,
    timing: Timing,
}

impl CarAnimation {
    /// Create a car animation
    pub fn new(start_y: f64, target_y: f64, start_time: Option<Millis>, duration: Millis) -> Self {
        Self {
            start_y,
            target_y,
            timing: Timing::new(start_time, duration),
        }
    }

    /// Car offset at `now`
    pub fn tick(&mut self, now: Millis) -> (f64, AnimationStatus) {
        let progress = self.timing.progress(now);
        let eased = Easing::EaseInOutCubic.apply(progress);
        (
            Interpolation::lerp(self.start_y, self.target_y, eased),
            AnimationStatus::from_progress(progress),
        )
    }

    /// Timing of this animation
    pub fn timing(&self) -> &Timing {
        &self.timing
    }
}

/// A plain wait with nothing to interpolate
#[derive(Debug, Clone, PartialEq)]
pub struct Dwell {
    timing: Timing,
}

impl Dwell {
    /// Create a dwell
    pub fn new(start_time: Option<Millis>, duration: Millis) -> Self {
        Self {
            timing: Timing::new(start_time, duration),
        }
    }

    /// Poll the dwell
    pub fn tick(&mut self, now: Millis) -> AnimationStatus {
        AnimationStatus::from_progress(self.timing.progress(now))
    }

    /// Timing of this dwell
    pub fn timing(&self) -> &Timing {
        &self.timing
    }
}
