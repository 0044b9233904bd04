// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless scene description.
//!
//! The renderer is an external collaborator; this module keeps the
//! numbers it would need: the static building layout, and the car,
//! doors and rider that follow the sequencer every frame.

use crate::assets::{AssetLoad, AssetLoader};
use crate::camera::{Camera, CameraView};
use liftview_sequencer::{SequencerConfig, SequencerState};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Building footprint width
pub const BUILDING_WIDTH: f64 = 12.0;
/// Building footprint depth
pub const BUILDING_DEPTH: f64 = 12.0;
/// Ground slab edge length
pub const GROUND_SIZE: f64 = 40.0;
/// Ground slab thickness
pub const GROUND_THICKNESS: f64 = 0.5;

/// Car box dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarDimensions {
    /// Width (door axis)
    pub width: f64,
    /// Height
    pub height: f64,
    /// Depth
    pub depth: f64,
}

impl Default for CarDimensions {
    fn default() -> Self {
        Self {
            width: 8.0,
            height: 10.0,
            depth: 8.0,
        }
    }
}

impl CarDimensions {
    /// Size of one door leaf: half the car width, most of its height
    pub fn door_leaf(&self) -> [f64; 3] {
        [self.width / 2.0, self.height * 0.85, 0.1]
    }

    /// Door leaves sit just inside the front face
    pub fn door_z(&self) -> f64 {
        self.depth / 2.0 - 0.05
    }
}

/// Rider character standing in the car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Character {
    /// Panda
    Panda,
    /// Rabbit
    Rabbit,
    /// Cat
    Cat,
}

impl Character {
    /// Image asset for this character
    pub fn image(&self) -> &'static str {
        match self {
            Character::Panda => "panda.png",
            Character::Rabbit => "usagi.png",
            Character::Cat => "cat.png",
        }
    }

    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Character::Panda => "Panda",
            Character::Rabbit => "Rabbit",
            Character::Cat => "Cat",
        }
    }
}

/// A textured quad attached to the car
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Billboard {
    /// Texture path
    pub texture: PathBuf,
    /// Position relative to the car center
    pub position: [f64; 3],
    /// Quad width and height
    pub size: [f64; 2],
    /// Rotation about the vertical axis
    pub yaw: f64,
}

/// Static building geometry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingLayout {
    /// Outer shell size
    pub size: [f64; 3],
    /// Vertical center of the shell
    pub center_y: f64,
    /// Heights of the floor slabs
    pub floor_slabs: Vec<f64>,
    /// Ground slab size
    pub ground_size: [f64; 3],
    /// Vertical center of the ground slab
    pub ground_y: f64,
}

impl BuildingLayout {
    /// Lay out a building for the sequencer's floors
    pub fn new(config: &SequencerConfig) -> Self {
        let height = config.floor_height * f64::from(config.floor_count) + 2.0;
        Self {
            size: [BUILDING_WIDTH, height, BUILDING_DEPTH],
            center_y: height / 2.0 - 1.0,
            floor_slabs: (0..config.floor_count)
                .map(|i| f64::from(i) * config.floor_height)
                .collect(),
            ground_size: [GROUND_SIZE, GROUND_THICKNESS, GROUND_SIZE],
            ground_y: -GROUND_THICKNESS / 2.0,
        }
    }
}

/// Everything a renderer would draw this frame
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    /// Static building
    pub building: BuildingLayout,
    /// Car box
    pub car: CarDimensions,
    /// Car vertical offset
    pub car_y: f64,
    /// Size of each door leaf
    pub door_leaf: [f64; 3],
    /// Depth of the door leaves inside the car
    pub door_z: f64,
    /// Door leaf horizontal offsets
    pub door_x: [f64; 2],
    /// Camera
    pub camera: Camera,
    /// Rider currently chosen
    character: Option<Character>,
    /// Rider quad, once its texture has loaded
    pub rider: Option<Billboard>,
    /// Control-panel quad on the right wall, once loaded
    pub control_panel: Option<Billboard>,
    /// Train track around the building
    pub rails: Vec<[f64; 3]>,
    /// Texture the rider is waiting for
    #[serde(skip)]
    pending_rider: Option<PathBuf>,
    /// Texture the control panel is waiting for
    #[serde(skip)]
    pending_panel: Option<PathBuf>,
}

impl Scene {
    /// Build the scene around a sequencer's initial state
    pub fn new(config: &SequencerConfig, state: &SequencerState, view: CameraView) -> Self {
        let car = CarDimensions::default();
        Self {
            building: BuildingLayout::new(config),
            car,
            car_y: state.car_offset,
            door_leaf: car.door_leaf(),
            door_z: car.door_z(),
            door_x: state.door_offsets,
            camera: Camera::new(view, 16.0 / 9.0),
            character: None,
            rider: None,
            control_panel: None,
            rails: Vec::new(),
            pending_rider: None,
            pending_panel: None,
        }
    }

    /// Move the car and doors to match the sequencer
    pub fn apply(&mut self, state: &SequencerState) {
        self.car_y = state.car_offset;
        self.door_x = state.door_offsets;
    }

    /// Swap the rider. The old rider disappears at once; the new one
    /// appears when its texture has loaded.
    pub fn set_character(&mut self, character: Option<Character>, loader: &AssetLoader) {
        self.rider = None;
        self.character = character;
        self.pending_rider = character.map(|c| loader.request(c.image()));
        if let Some(c) = character {
            tracing::info!("Rider: {}", c.name());
        }
    }

    /// Start loading the control-panel image
    pub fn load_control_panel(&mut self, image: &str, loader: &AssetLoader) {
        self.control_panel = None;
        self.pending_panel = Some(loader.request(image));
    }

    /// Attach finished textures. Loads nobody is waiting for any more are dropped.
    pub fn attach_loads(&mut self, loads: &[AssetLoad]) {
        for load in loads {
            if self.pending_rider.as_ref() == Some(&load.path) {
                self.pending_rider = None;
                if load.result.is_ok() {
                    self.rider = Some(Billboard {
                        texture: load.path.clone(),
                        position: [0.0, -2.5, 2.7],
                        size: [1.8, 1.8],
                        yaw: std::f64::consts::PI,
                    });
                }
            } else if self.pending_panel.as_ref() == Some(&load.path) {
                self.pending_panel = None;
                if load.result.is_ok() {
                    self.control_panel = Some(Billboard {
                        texture: load.path.clone(),
                        position: [self.car.width / 2.0 - 0.03, 0.8, 2.2],
                        size: [2.2, 5.0],
                        yaw: -std::f64::consts::FRAC_PI_2,
                    });
                }
            }
        }
    }

    /// Whether a texture the scene needs is still loading
    pub fn is_waiting_for_assets(&self) -> bool {
        self.pending_rider.is_some() || self.pending_panel.is_some()
    }
}
