// SPDX-License-Identifier: MIT OR Apache-2.0
//! The elevator sequencer.
//!
//! One accepted floor request runs `Closing -> IdleClosed (dwell) ->
//! Traveling -> Opening -> IdleOpen` to completion. Requests arriving
//! while a trip is in flight are dropped, not queued.
//!
//! The host drives everything through [`ElevatorSequencer::on_tick`]. A
//! phase that completes inside a tick hands over to the next phase at
//! its exact end instant, so the timeline does not depend on frame rate.

use crate::animation::{AnimationStatus, CarAnimation, DoorAnimation, Dwell, Millis};
use crate::config::{ConfigError, SequencerConfig};
use crate::event::{SequencerEvent, TripId};
use crate::state::{Phase, SequencerState};

/// An accepted floor request
#[derive(Debug, Clone, Copy)]
struct Trip {
    id: TripId,
    floor: u32,
}

/// Animation currently owned by the active phase
#[derive(Debug, Clone)]
enum Motion {
    Idle,
    Doors(DoorAnimation),
    Dwell(Dwell),
    Travel(CarAnimation),
}

/// Elevator door and car sequencer
#[derive(Debug, Clone)]
pub struct ElevatorSequencer {
    config: SequencerConfig,
    current_floor: u32,
    doors_open: bool,
    phase: Phase,
    motion: Motion,
    trip: Option<Trip>,
    car_offset: f64,
    door_offsets: [f64; 2],
    /// Latest host time seen by `on_tick`
    clock: Option<Millis>,
    /// Events raised since the last `take_events`
    pending_events: Vec<SequencerEvent>,
}

impl ElevatorSequencer {
    /// Create a sequencer resting at floor 1 with its doors open
    pub fn new(config: SequencerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: SequencerConfig) -> Self {
        Self {
            current_floor: 1,
            doors_open: true,
            phase: Phase::IdleOpen,
            motion: Motion::Idle,
            trip: None,
            car_offset: config.initial_car_offset,
            door_offsets: config.doors.targets(true),
            clock: None,
            pending_events: Vec::new(),
            config,
        }
    }

    /// Ask the car to go to `floor`.
    ///
    /// Ignored when `floor` is outside `1..=floor_count` or a trip is
    /// already in progress. On acceptance a `FloorSelected` event is
    /// queued immediately and the doors start closing.
    pub fn request_floor(&mut self, floor: u32) -> Option<TripId> {
        if !self.config.contains_floor(floor) {
            tracing::debug!(floor, "Ignoring request for nonexistent floor");
            return None;
        }
        if self.is_moving() {
            tracing::debug!(floor, phase = self.phase.name(), "Ignoring request while moving");
            return None;
        }

        let trip = Trip {
            id: TripId::new(),
            floor,
        };
        self.trip = Some(trip);
        self.pending_events.push(SequencerEvent::FloorSelected {
            trip: trip.id,
            floor,
        });
        tracing::info!(trip = %trip.id, from = self.current_floor, to = floor, "Accepted floor request");

        if self.doors_open {
            self.animate_doors(false, self.clock);
        } else if self.phase != Phase::Closing {
            // Doors already shut: go straight to the dispatch wait
            self.begin_dwell(self.clock);
        }
        // A manual close in flight hands over to the dwell when it finishes

        Some(trip.id)
    }

    /// Open the doors outside of a trip. Returns whether an animation started.
    pub fn open_doors(&mut self) -> bool {
        self.manual_doors(true)
    }

    /// Close the doors outside of a trip. Returns whether an animation started.
    pub fn close_doors(&mut self) -> bool {
        self.manual_doors(false)
    }

    fn manual_doors(&mut self, open: bool) -> bool {
        if self.is_moving() {
            tracing::debug!(open, "Ignoring manual door command during a trip");
            return false;
        }
        self.animate_doors(open, self.clock)
    }

    /// Start a door slide toward open or closed.
    ///
    /// No-op when the doors are already commanded that way.
    fn animate_doors(&mut self, open: bool, start: Option<Millis>) -> bool {
        if open == self.doors_open {
            return false;
        }
        self.doors_open = open;
        let targets = self.config.doors.targets(open);
        self.motion = Motion::Doors(DoorAnimation::new(
            self.door_offsets,
            targets,
            start,
            self.config.door_duration_ms,
        ));
        self.set_phase(if open { Phase::Opening } else { Phase::Closing });
        true
    }

    fn begin_dwell(&mut self, start: Option<Millis>) {
        self.motion = Motion::Dwell(Dwell::new(start, self.config.dispatch_delay_ms));
        self.set_phase(Phase::IdleClosed);
    }

    fn set_phase(&mut self, to: Phase) {
        if self.phase == to {
            return;
        }
        let from = self.phase;
        self.phase = to;
        tracing::debug!(from = from.name(), to = to.name(), "Phase changed");
        self.pending_events.push(SequencerEvent::PhaseChanged { from, to });
    }

    /// Advance in-flight animations to `now`.
    ///
    /// Time never runs backwards: a `now` older than a previous tick is
    /// treated as the previous tick. Non-finite times are ignored.
    pub fn on_tick(&mut self, now: Millis) -> AnimationStatus {
        if !now.is_finite() {
            tracing::debug!(now, "Ignoring non-finite tick time");
            return self.status();
        }
        let now = match self.clock {
            Some(last) if now < last => last,
            _ => now,
        };
        self.clock = Some(now);

        loop {
            let finished_at = match &mut self.motion {
                Motion::Idle => break,
                Motion::Doors(anim) => {
                    let (positions, status) = anim.tick(now);
                    self.door_offsets = positions;
                    if status == AnimationStatus::InProgress {
                        break;
                    }
                    anim.timing().end_time()
                }
                Motion::Dwell(dwell) => {
                    if dwell.tick(now) == AnimationStatus::InProgress {
                        break;
                    }
                    dwell.timing().end_time()
                }
                Motion::Travel(anim) => {
                    let (y, status) = anim.tick(now);
                    self.car_offset = y;
                    if status == AnimationStatus::InProgress {
                        break;
                    }
                    anim.timing().end_time()
                }
            };
            self.advance(finished_at.unwrap_or(now));
        }

        self.status()
    }

    fn status(&self) -> AnimationStatus {
        if matches!(self.motion, Motion::Idle) {
            AnimationStatus::Complete
        } else {
            AnimationStatus::InProgress
        }
    }

    /// The active phase finished at `at`; start whatever follows it
    fn advance(&mut self, at: Millis) {
        self.motion = Motion::Idle;
        match self.phase {
            Phase::Closing => {
                self.set_phase(Phase::IdleClosed);
                if self.trip.is_some() {
                    self.begin_dwell(Some(at));
                }
            }
            Phase::IdleClosed => {
                let Some(trip) = self.trip else {
                    return;
                };
                let target = self.config.floor_offset(trip.floor);
                self.motion = Motion::Travel(CarAnimation::new(
                    self.car_offset,
                    target,
                    Some(at),
                    self.config.travel_duration_ms,
                ));
                self.set_phase(Phase::Traveling);
            }
            Phase::Traveling => {
                if !self.animate_doors(true, Some(at)) {
                    self.finish_trip();
                }
            }
            Phase::Opening => self.finish_trip(),
            Phase::IdleOpen => {}
        }
    }

    fn finish_trip(&mut self) {
        self.set_phase(Phase::IdleOpen);
        if let Some(trip) = self.trip.take() {
            self.current_floor = trip.floor;
            tracing::info!(trip = %trip.id, floor = trip.floor, "Arrived");
            self.pending_events.push(SequencerEvent::Arrived {
                trip: trip.id,
                floor: trip.floor,
            });
        }
    }

    /// Snapshot for rendering
    pub fn state(&self) -> SequencerState {
        SequencerState {
            current_floor: self.current_floor,
            doors_open: self.doors_open,
            moving: self.is_moving(),
            phase: self.phase,
            target_floor: self.trip.map(|t| t.floor),
            car_offset: self.car_offset,
            door_offsets: self.door_offsets,
        }
    }

    /// Get pending events and clear them
    pub fn take_events(&mut self) -> Vec<SequencerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// A trip is in progress
    pub fn is_moving(&self) -> bool {
        self.trip.is_some()
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Floor the car last arrived at
    pub fn current_floor(&self) -> u32 {
        self.current_floor
    }

    /// Commanded door state
    pub fn doors_open(&self) -> bool {
        self.doors_open
    }

    /// Configuration in use
    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }
}

impl Default for ElevatorSequencer {
    fn default() -> Self {
        Self::from_valid_config(SequencerConfig::default())
    }
}
