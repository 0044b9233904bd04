// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-frame trace of a demo run, exported as JSON.

use crate::camera::CameraView;
use crate::scene::Scene;
use crate::train::TrainCar;
use liftview_sequencer::SequencerState;
use serde::Serialize;
use std::path::Path;

/// Trace export errors
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// Serialization failed
    #[error("Failed to serialize trace: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Writing failed
    #[error("Failed to write trace: {0}")]
    Io(#[from] std::io::Error),
}

/// What one frame looked like
#[derive(Debug, Clone, Serialize)]
pub struct FrameRecord {
    /// Simulated time
    pub time_ms: f64,
    /// Elevator snapshot
    pub state: SequencerState,
    /// Camera preset
    pub camera: CameraView,
    /// Train car placements
    pub train: Vec<TrainCar>,
}

/// Recorded frames plus the scene as it ended
#[derive(Debug, Default, Serialize)]
pub struct Trace {
    frames: Vec<FrameRecord>,
    scene: Option<Scene>,
}

impl Trace {
    /// Create an empty trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame
    pub fn record(&mut self, frame: FrameRecord) {
        self.frames.push(frame);
    }

    /// Attach the final scene description
    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = Some(scene);
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String, TraceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the trace to a file
    pub fn save(&self, path: &Path) -> Result<(), TraceError> {
        std::fs::write(path, self.to_json()?)?;
        tracing::info!("Wrote {} frames to {}", self.frames.len(), path.display());
        Ok(())
    }
}
