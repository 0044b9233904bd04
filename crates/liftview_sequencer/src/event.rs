// SPDX-License-Identifier: MIT OR Apache-2.0
//! Events emitted by the sequencer.

use crate::state::Phase;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one accepted floor request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TripId(pub Uuid);

impl TripId {
    /// Create a new random trip ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TripId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Something observable happened in the sequencer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SequencerEvent {
    /// A floor request was accepted; queued at acceptance, not arrival
    FloorSelected {
        /// Trip serving the request
        trip: TripId,
        /// Requested floor
        floor: u32,
    },
    /// The phase changed
    PhaseChanged {
        /// Previous phase
        from: Phase,
        /// New phase
        to: Phase,
    },
    /// The doors finished opening at the requested floor
    Arrived {
        /// Completed trip
        trip: TripId,
        /// Floor reached
        floor: u32,
    },
}

/// Receiver of the floor-selection notification (e.g. a button panel)
pub trait FloorSelection {
    /// Mark `floor` as the selected button and clear all others
    fn on_floor_selected(&mut self, floor: u32);
}

/// Deliver every `FloorSelected` event to `selection`, returning how many were delivered
pub fn dispatch_selection(events: &[SequencerEvent], selection: &mut impl FloorSelection) -> usize {
    let mut delivered = 0;
    for event in events {
        if let SequencerEvent::FloorSelected { floor, .. } = event {
            selection.on_floor_selected(*floor);
            delivered += 1;
        }
    }
    delivered
}
