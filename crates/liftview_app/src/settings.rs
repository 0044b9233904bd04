// SPDX-License-Identifier: MIT OR Apache-2.0
//! Viewer settings.
//!
//! Stored as RON next to the viewer (`liftview.ron` by default). Every
//! section falls back to its defaults when left out of the file.

use crate::camera::CameraView;
use crate::offline_cache::OfflineSettings;
use crate::scene::Character;
use crate::train::TrainSettings;
use liftview_sequencer::SequencerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Default settings file name
pub const SETTINGS_FILE_NAME: &str = "liftview.ron";

/// Something the demo script does at a given time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptAction {
    /// Press a floor button
    Floor(u32),
    /// Press the open-doors button
    OpenDoors,
    /// Press the close-doors button
    CloseDoors,
    /// Switch camera preset
    Camera(CameraView),
    /// Switch rider, or remove it
    Character(Option<Character>),
}

/// One scripted input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Simulated time the input fires at
    pub at_ms: f64,
    /// Input
    pub action: ScriptAction,
}

/// Demo run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    /// Host frame rate
    pub frame_rate: u32,
    /// Sleep between frames to run at wall-clock speed
    pub realtime: bool,
    /// Simulated milliseconds per wall-clock millisecond (clamped to 0..=10)
    pub time_scale: f64,
    /// Stop after this much simulated time
    pub max_duration_ms: f64,
    /// Scripted inputs, fired in time order
    pub script: Vec<ScriptStep>,
    /// Write per-frame snapshots here as JSON
    pub trace_path: Option<PathBuf>,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            realtime: false,
            time_scale: 1.0,
            max_duration_ms: 60_000.0,
            script: vec![
                ScriptStep {
                    at_ms: 0.0,
                    action: ScriptAction::Character(Some(Character::Panda)),
                },
                ScriptStep {
                    at_ms: 500.0,
                    action: ScriptAction::Floor(5),
                },
                ScriptStep {
                    at_ms: 7000.0,
                    action: ScriptAction::Camera(CameraView::Side),
                },
                ScriptStep {
                    at_ms: 7500.0,
                    action: ScriptAction::Floor(1),
                },
            ],
            trace_path: None,
        }
    }
}

/// All viewer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Format version
    pub version: u32,
    /// Elevator timing and geometry
    pub elevator: SequencerConfig,
    /// Starting camera preset
    pub camera: CameraView,
    /// Starting rider
    pub character: Option<Character>,
    /// Directory images are loaded from
    pub asset_dir: PathBuf,
    /// Control-panel image inside the asset directory
    pub control_panel_image: String,
    /// Train around the building
    pub train: TrainSettings,
    /// Offline cache version and manifest
    pub offline: OfflineSettings,
    /// Demo run
    pub demo: DemoSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            elevator: SequencerConfig::default(),
            camera: CameraView::default(),
            character: None,
            asset_dir: PathBuf::from("assets"),
            control_panel_image: "panel.png".to_string(),
            train: TrainSettings::default(),
            offline: OfflineSettings::default(),
            demo: DemoSettings::default(),
        }
    }
}

impl AppSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: AppSettings = ron::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        // Version check
        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Settings version {} is newer than supported version {}",
                    settings.version, SETTINGS_FORMAT_VERSION
                ),
            ));
        }

        Ok(settings)
    }

    /// Load settings, or use the defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> std::io::Result<Self> {
        match Self::load(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        std::fs::write(path, content)
    }

    /// Script steps in firing order
    pub fn sorted_script(&self) -> Vec<ScriptStep> {
        let mut script = self.demo.script.clone();
        script.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
        script
    }
}
