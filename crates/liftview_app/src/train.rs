// SPDX-License-Identifier: MIT OR Apache-2.0
//! Toy train running around the building on a circular track.
//!
//! Car placement is a pure function of elapsed time, so the train needs
//! no state beyond its settings.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Train settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainSettings {
    /// Whether the train is part of the scene
    pub enabled: bool,
    /// Track radius around the building axis
    pub radius: f64,
    /// Height of the rails above the ground
    pub rail_height: f64,
    /// Angular speed in radians per second (positive is counter-clockwise from above)
    pub angular_speed: f64,
    /// Number of cars including the engine
    pub car_count: u32,
    /// Angle between consecutive cars in radians
    pub car_spacing: f64,
}

impl Default for TrainSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: 15.0,
            rail_height: 0.25,
            angular_speed: 0.5,
            car_count: 4,
            car_spacing: 0.3,
        }
    }
}

/// Placement of one train car
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrainCar {
    /// World position of the car center
    pub position: [f64; 3],
    /// Rotation about the vertical axis, in radians
    pub heading: f64,
}

/// Train on a circular track
#[derive(Debug, Clone)]
pub struct TrainOrbit {
    settings: TrainSettings,
}

impl TrainOrbit {
    /// Create a train from settings
    pub fn new(settings: TrainSettings) -> Self {
        Self { settings }
    }

    /// Angle of the engine after `elapsed_ms`, wrapped to `[0, TAU)`
    pub fn engine_angle(&self, elapsed_ms: f64) -> f64 {
        (self.settings.angular_speed * elapsed_ms / 1000.0).rem_euclid(TAU)
    }

    /// Placement of every car after `elapsed_ms`; empty when the train is disabled
    pub fn cars_at(&self, elapsed_ms: f64) -> Vec<TrainCar> {
        if !self.settings.enabled {
            return Vec::new();
        }

        let engine = self.engine_angle(elapsed_ms);
        // Trailing cars sit behind the engine along the direction of travel
        let direction = if self.settings.angular_speed < 0.0 {
            -1.0
        } else {
            1.0
        };

        (0..self.settings.car_count)
            .map(|index| {
                let angle = engine - direction * f64::from(index) * self.settings.car_spacing;
                self.car_at_angle(angle, direction)
            })
            .collect()
    }

    fn car_at_angle(&self, angle: f64, direction: f64) -> TrainCar {
        let TrainSettings {
            radius,
            rail_height,
            ..
        } = self.settings;
        TrainCar {
            position: [radius * angle.cos(), rail_height, radius * angle.sin()],
            heading: (angle + direction * FRAC_PI_2).rem_euclid(TAU),
        }
    }

    /// Points along the rail circle, for drawing the track; empty when the train is disabled
    pub fn rail_points(&self, segments: u32) -> Vec<[f64; 3]> {
        if !self.settings.enabled {
            return Vec::new();
        }
        let segments = segments.max(3);
        (0..segments)
            .map(|i| {
                let angle = TAU * f64::from(i) / f64::from(segments);
                [
                    self.settings.radius * angle.cos(),
                    self.settings.rail_height,
                    self.settings.radius * angle.sin(),
                ]
            })
            .collect()
    }
}
