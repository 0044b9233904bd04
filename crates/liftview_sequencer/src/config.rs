// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequencer configuration: building shape, door geometry and phase timings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::Millis;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The building has no floors
    #[error("Building must have at least one floor")]
    NoFloors,

    /// Floor spacing is zero, negative or not a number
    #[error("Invalid floor height: {0}")]
    InvalidFloorHeight(f64),

    /// A phase duration is negative or not a number
    #[error("Invalid duration for {name}: {value} ms")]
    InvalidDuration {
        /// Which duration
        name: &'static str,
        /// Offending value
        value: Millis,
    },

    /// Door offsets must satisfy `0 <= closed < open`
    #[error("Invalid door geometry: closed offset {closed} must be >= 0 and below open offset {open}")]
    InvalidDoorGeometry {
        /// Closed leaf offset
        closed: f64,
        /// Open leaf offset
        open: f64,
    },
}

/// Horizontal resting offsets of the two door leaves.
///
/// Leaves sit symmetrically about the car's center line; the left leaf
/// takes the negative offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorGeometry {
    /// Leaf center offset when closed
    pub closed_offset: f64,
    /// Leaf center offset when open
    pub open_offset: f64,
}

impl DoorGeometry {
    /// Geometry for a car of the given width with two leaves of half its width.
    ///
    /// Closed leaves meet in the middle; open leaves slide one full leaf
    /// width outward.
    pub fn for_car_width(car_width: f64) -> Self {
        let leaf_width = car_width / 2.0;
        Self {
            closed_offset: leaf_width / 2.0,
            open_offset: leaf_width / 2.0 + leaf_width,
        }
    }

    /// Leaf offsets for the open or closed position
    pub fn targets(&self, open: bool) -> [f64; 2] {
        let offset = if open {
            self.open_offset
        } else {
            self.closed_offset
        };
        [-offset, offset]
    }
}

impl Default for DoorGeometry {
    fn default() -> Self {
        Self::for_car_width(8.0)
    }
}

/// Sequencer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Number of floors (floors are numbered from 1)
    pub floor_count: u32,
    /// Vertical distance between floors
    pub floor_height: f64,
    /// Car offset above a floor slab when resting at that floor
    pub rest_offset: f64,
    /// Car offset before the first trip
    pub initial_car_offset: f64,
    /// Door slide time
    pub door_duration_ms: Millis,
    /// Closed-door wait before travel starts
    pub dispatch_delay_ms: Millis,
    /// Travel time between any two floors
    pub travel_duration_ms: Millis,
    /// Door leaf offsets
    pub doors: DoorGeometry,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            floor_count: 10,
            floor_height: 5.0,
            rest_offset: 2.0,
            initial_car_offset: 4.5,
            door_duration_ms: 1000.0,
            dispatch_delay_ms: 1000.0,
            travel_duration_ms: 2000.0,
            doors: DoorGeometry::default(),
        }
    }
}

impl SequencerConfig {
    /// Check the configuration for values the sequencer cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.floor_count == 0 {
            return Err(ConfigError::NoFloors);
        }
        if self.floor_height.is_nan() || self.floor_height <= 0.0 {
            return Err(ConfigError::InvalidFloorHeight(self.floor_height));
        }

        let durations = [
            ("door_duration_ms", self.door_duration_ms),
            ("dispatch_delay_ms", self.dispatch_delay_ms),
            ("travel_duration_ms", self.travel_duration_ms),
        ];
        for (name, value) in durations {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::InvalidDuration { name, value });
            }
        }

        let DoorGeometry {
            closed_offset,
            open_offset,
        } = self.doors;
        let ordered = closed_offset >= 0.0 && closed_offset < open_offset;
        if !ordered {
            return Err(ConfigError::InvalidDoorGeometry {
                closed: closed_offset,
                open: open_offset,
            });
        }

        Ok(())
    }

    /// Whether `floor` names a floor of this building
    pub fn contains_floor(&self, floor: u32) -> bool {
        (1..=self.floor_count).contains(&floor)
    }

    /// Resting car offset for a floor
    pub fn floor_offset(&self, floor: u32) -> f64 {
        f64::from(floor.saturating_sub(1)) * self.floor_height + self.rest_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SequencerConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.floor_count, 10);
        assert_eq!(config.travel_duration_ms, 2000.0);
    }

    #[test]
    fn test_floor_offsets() {
        let config = SequencerConfig::default();
        assert_eq!(config.floor_offset(1), 2.0);
        assert_eq!(config.floor_offset(5), 22.0);
        assert_eq!(config.floor_offset(10), 47.0);
    }

    #[test]
    fn test_contains_floor() {
        let config = SequencerConfig::default();
        assert!(!config.contains_floor(0));
        assert!(config.contains_floor(1));
        assert!(config.contains_floor(10));
        assert!(!config.contains_floor(11));
    }

    #[test]
    fn test_door_geometry() {
        let doors = DoorGeometry::for_car_width(8.0);
        assert_eq!(doors.targets(false), [-2.0, 2.0]);
        assert_eq!(doors.targets(true), [-6.0, 6.0]);
    }

    #[test]
    fn test_validation_errors() {
        let config = SequencerConfig {
            floor_count: 0,
            ..SequencerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoFloors));

        let config = SequencerConfig {
            floor_height: 0.0,
            ..SequencerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidFloorHeight(0.0)));

        let config = SequencerConfig {
            travel_duration_ms: -1.0,
            ..SequencerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDuration { name: "travel_duration_ms", .. })
        ));

        let config = SequencerConfig {
            doors: DoorGeometry {
                closed_offset: 3.0,
                open_offset: 3.0,
            },
            ..SequencerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDoorGeometry { .. })
        ));
    }
}
