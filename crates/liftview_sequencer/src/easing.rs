// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interpolation and easing curves for the door and car animations.

use serde::{Deserialize, Serialize};

/// Timing curve applied to normalized animation progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Easing {
    /// Constant speed (door leaves)
    #[default]
    Linear,
    /// Cubic ease-in-out: slow start and end, fast middle (car travel)
    EaseInOutCubic,
}

impl Easing {
    /// Map progress in `[0, 1]` to eased progress. Input outside the range is clamped.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two values
    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + (b - a) * t
    }

    /// Interpolate both door leaves at once
    pub fn lerp_pair(a: [f64; 2], b: [f64; 2], t: f64) -> [f64; 2] {
        [Self::lerp(a[0], b[0], t), Self::lerp(a[1], b[1], t)]
    }

    /// Normalized progress of `elapsed` through `duration`, clamped to `[0, 1]`.
    ///
    /// A zero-length animation is complete immediately.
    pub fn progress(elapsed: f64, duration: f64) -> f64 {
        if duration <= 0.0 {
            return 1.0;
        }
        (elapsed / duration).clamp(0.0, 1.0)
    }
}
