// SPDX-License-Identifier: MIT OR Apache-2.0
//! Elevator sequencer for `LiftView`.
//!
//! This crate owns the only stateful logic of the scene:
//! - Door open/close timing
//! - Eased floor-to-floor car travel
//! - Request gating (new requests are dropped while a trip runs)
//! - The floor-button panel that mirrors accepted requests
//!
//! ## Architecture
//!
//! The sequencer is built on:
//! - Transient animation records polled with `tick(now)`
//! - A single phase machine advanced by the host's frame loop
//! - An event queue drained by the host after each tick

pub mod animation;
pub mod config;
pub mod easing;
pub mod event;
pub mod sequencer;
pub mod state;
pub mod ui;

pub use animation::{AnimationStatus, CarAnimation, DoorAnimation, Dwell, Millis, Timing};
pub use config::{ConfigError, DoorGeometry, SequencerConfig};
pub use easing::{Easing, Interpolation};
pub use event::{dispatch_selection, FloorSelection, SequencerEvent, TripId};
pub use sequencer::ElevatorSequencer;
pub use state::{Phase, SequencerState};
pub use ui::{ControlPanel, PanelAction};
