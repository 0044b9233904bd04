// SPDX-License-Identifier: MIT OR Apache-2.0
//! Observable sequencer state.

use serde::{Deserialize, Serialize};

/// Sequencer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Phase {
    /// Doors open, car at rest
    #[default]
    IdleOpen,
    /// Doors sliding shut
    Closing,
    /// Doors shut, car at rest (or waiting to dispatch)
    IdleClosed,
    /// Car moving between floors
    Traveling,
    /// Doors sliding open
    Opening,
}

impl Phase {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::IdleOpen => "Idle (open)",
            Self::Closing => "Closing",
            Self::IdleClosed => "Idle (closed)",
            Self::Traveling => "Traveling",
            Self::Opening => "Opening",
        }
    }

    /// Whether the doors or car are being animated
    pub fn is_animating(&self) -> bool {
        matches!(self, Self::Closing | Self::Traveling | Self::Opening)
    }
}

/// Read-only snapshot of the sequencer, enough to draw a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencerState {
    /// Floor the car last arrived at
    pub current_floor: u32,
    /// Commanded door state
    pub doors_open: bool,
    /// A floor request is being served
    pub moving: bool,
    /// Current phase
    pub phase: Phase,
    /// Floor being served, if any
    pub target_floor: Option<u32>,
    /// Vertical car offset
    pub car_offset: f64,
    /// Horizontal offsets of the left and right door leaves
    pub door_offsets: [f64; 2],
}
