// SPDX-License-Identifier: MIT OR Apache-2.0
//! Main viewer application.
//!
//! Owns the single sequencer instance and drives it from a fixed-step
//! frame loop. Each frame:
//! 1. Fires scripted inputs that are due; button presses go to the panel
//! 2. Runs the control panel through a headless egui pass and applies
//!    what was pressed
//! 3. Ticks the sequencer and hands its events back to the panel
//! 4. Attaches textures the asset worker finished
//! 5. Applies the snapshot to the scene and places the train

use crate::assets::AssetLoader;
use crate::host_loop::HostLoop;
use crate::offline_cache::{CacheError, DirectoryNetwork, OfflineCache};
use crate::scene::Scene;
use crate::settings::{AppSettings, ScriptAction, ScriptStep};
use crate::trace::{FrameRecord, Trace, TraceError};
use crate::train::TrainOrbit;
use liftview_sequencer::{
    dispatch_selection, AnimationStatus, ConfigError, ControlPanel, ElevatorSequencer,
    PanelAction, SequencerEvent, SequencerState,
};
use std::collections::VecDeque;
use std::time::Duration;

/// Segments used to draw the train's rail circle
const RAIL_SEGMENTS: u32 = 64;

/// Fatal viewer errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Settings could not be read
    #[error("Failed to load settings: {0}")]
    Settings(#[from] std::io::Error),
    /// Elevator configuration is invalid
    #[error("Invalid elevator configuration: {0}")]
    Config(#[from] ConfigError),
    /// Trace could not be written
    #[error(transparent)]
    Trace(#[from] TraceError),
}

/// How a run ended
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Frames run
    pub frames: u64,
    /// Simulated time of the last frame
    pub elapsed_ms: f64,
    /// Final elevator snapshot
    pub state: SequencerState,
    /// Highlighted floor button
    pub selected_floor: Option<u32>,
    /// Trips completed
    pub arrivals: usize,
    /// Stopped at the duration limit instead of settling
    pub timed_out: bool,
}

/// Viewer application
pub struct App {
    settings: AppSettings,
    sequencer: ElevatorSequencer,
    panel: ControlPanel,
    /// Headless UI context the panel is drawn into
    ui_ctx: egui::Context,
    scene: Scene,
    loader: AssetLoader,
    train: TrainOrbit,
    clock: HostLoop,
    /// Scripted inputs not fired yet, earliest first
    script: VecDeque<ScriptStep>,
    trace: Option<Trace>,
    arrivals: usize,
}

impl App {
    /// Build the viewer from settings
    pub fn new(settings: AppSettings) -> Result<Self, AppError> {
        let sequencer = ElevatorSequencer::new(settings.elevator.clone())?;
        let loader = AssetLoader::new(&settings.asset_dir);

        let mut scene = Scene::new(sequencer.config(), &sequencer.state(), settings.camera);
        scene.load_control_panel(&settings.control_panel_image, &loader);
        if settings.character.is_some() {
            scene.set_character(settings.character, &loader);
        }

        let train = TrainOrbit::new(settings.train.clone());
        scene.rails = train.rail_points(RAIL_SEGMENTS);

        let mut clock = HostLoop::new(settings.demo.frame_rate);
        clock.set_time_scale(settings.demo.time_scale);

        Ok(Self {
            sequencer,
            panel: ControlPanel::new(),
            ui_ctx: egui::Context::default(),
            scene,
            loader,
            train,
            clock,
            script: settings.sorted_script().into(),
            trace: settings.demo.trace_path.as_ref().map(|_| Trace::new()),
            arrivals: 0,
            settings,
        })
    }

    /// Install the offline cache from the page directory and drop older versions
    pub fn prepare_offline_cache(&self) -> Result<OfflineCache, CacheError> {
        let mut cache = OfflineCache::new(self.settings.offline.clone());
        cache.install(&DirectoryNetwork::new(&self.settings.offline.root))?;
        cache.activate();
        Ok(cache)
    }

    /// Run frames until the script is done and the scene has settled
    pub fn run(&mut self) -> Result<RunSummary, AppError> {
        tracing::info!(
            "Running at {} fps, {} scripted inputs",
            self.settings.demo.frame_rate,
            self.script.len()
        );

        let timed_out = loop {
            let status = self.frame();

            if self.script.is_empty()
                && status == AnimationStatus::Complete
                && !self.scene.is_waiting_for_assets()
            {
                break false;
            }
            if self.clock.now() > self.settings.demo.max_duration_ms {
                tracing::warn!("Stopping after {} ms", self.settings.demo.max_duration_ms);
                break true;
            }

            if self.settings.demo.realtime {
                std::thread::sleep(self.clock.frame_duration());
            } else if self.scene.is_waiting_for_assets() {
                // Give the asset worker a chance to catch up with simulated time
                std::thread::sleep(Duration::from_millis(1));
            }
        };

        if let (Some(trace), Some(path)) = (&mut self.trace, &self.settings.demo.trace_path) {
            trace.set_scene(self.scene.clone());
            trace.save(path)?;
        }

        Ok(RunSummary {
            frames: self.clock.frame_count,
            elapsed_ms: self.clock.now(),
            state: self.sequencer.state(),
            selected_floor: self.panel.selected_floor(),
            arrivals: self.arrivals,
            timed_out,
        })
    }

    /// Run one frame at the clock's current time, then advance the clock
    pub fn frame(&mut self) -> AnimationStatus {
        let now = self.clock.now();
        self.fire_due_steps(now);
        for action in self.render_panel() {
            self.press(action);
        }

        let status = self.sequencer.on_tick(now);
        let events = self.sequencer.take_events();
        dispatch_selection(&events, &mut self.panel);
        self.arrivals += events
            .iter()
            .filter(|e| matches!(e, SequencerEvent::Arrived { .. }))
            .count();

        let loads = self.loader.poll();
        self.scene.attach_loads(&loads);

        let state = self.sequencer.state();
        self.scene.apply(&state);
        let train = self.train.cars_at(now);

        if let Some(trace) = &mut self.trace {
            trace.record(FrameRecord {
                time_ms: now,
                state,
                camera: self.scene.camera.view,
                train,
            });
        }

        self.clock.advance();
        status
    }

    /// Draw the control panel and collect the buttons pressed this frame
    fn render_panel(&mut self) -> Vec<PanelAction> {
        let state = self.sequencer.state();
        let floor_count = self.sequencer.config().floor_count;
        let panel = &mut self.panel;
        let mut actions = Vec::new();

        let _ = self.ui_ctx.run(egui::RawInput::default(), |ctx| {
            egui::SidePanel::right("liftview_control_panel").show(ctx, |ui| {
                actions.extend(panel.ui(ui, &state, floor_count));
            });
        });

        actions
    }

    fn fire_due_steps(&mut self, now: f64) {
        while self.script.front().is_some_and(|step| step.at_ms <= now) {
            if let Some(step) = self.script.pop_front() {
                self.apply_action(&step.action);
            }
        }
    }

    fn apply_action(&mut self, action: &ScriptAction) {
        match action {
            ScriptAction::Floor(floor) => self.panel.press(PanelAction::RequestFloor(*floor)),
            ScriptAction::OpenDoors => self.panel.press(PanelAction::OpenDoors),
            ScriptAction::CloseDoors => self.panel.press(PanelAction::CloseDoors),
            ScriptAction::Camera(view) => self.scene.camera.set_view(*view),
            ScriptAction::Character(character) => {
                self.scene.set_character(*character, &self.loader);
            }
        }
    }

    fn press(&mut self, action: PanelAction) {
        if !action.apply(&mut self.sequencer) {
            tracing::debug!(?action, "Panel input had no effect");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraView;
    use crate::offline_cache::OfflineSettings;
    use crate::settings::DemoSettings;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("liftview-app-{}-{}", name, std::process::id()))
    }

    fn settings_with(script: Vec<ScriptStep>) -> AppSettings {
        AppSettings {
            asset_dir: scratch_dir("no-assets"),
            demo: DemoSettings {
                script,
                ..DemoSettings::default()
            },
            ..AppSettings::default()
        }
    }

    fn step(at_ms: f64, action: ScriptAction) -> ScriptStep {
        ScriptStep { at_ms, action }
    }

    #[test]
    fn test_single_trip() {
        let mut app = App::new(settings_with(vec![step(0.0, ScriptAction::Floor(5))])).unwrap();
        let summary = app.run().unwrap();

        assert!(!summary.timed_out);
        assert_eq!(summary.state.current_floor, 5);
        assert!(summary.state.doors_open);
        assert!(!summary.state.moving);
        assert_eq!(summary.state.car_offset, 22.0);
        assert_eq!(summary.selected_floor, Some(5));
        assert_eq!(summary.arrivals, 1);
        assert!(summary.elapsed_ms >= 5000.0 && summary.elapsed_ms < 5100.0);
        assert_eq!(app.scene.car_y, 22.0);
    }

    #[test]
    fn test_request_during_trip_is_dropped() {
        let mut app = App::new(settings_with(vec![
            step(0.0, ScriptAction::Floor(5)),
            step(1500.0, ScriptAction::Floor(3)),
            step(100.0, ScriptAction::Camera(CameraView::Top)),
        ]))
        .unwrap();
        let summary = app.run().unwrap();

        assert_eq!(summary.state.current_floor, 5);
        assert_eq!(summary.selected_floor, Some(5));
        assert_eq!(summary.arrivals, 1);
        assert_eq!(app.scene.camera.view, CameraView::Top);
    }

    #[test]
    fn test_missing_assets_do_not_block() {
        let mut app = App::new(settings_with(vec![step(
            0.0,
            ScriptAction::Character(Some(crate::scene::Character::Cat)),
        )]))
        .unwrap();
        let summary = app.run().unwrap();

        assert!(!summary.timed_out);
        assert!(app.scene.rider.is_none());
        assert!(app.scene.control_panel.is_none());
    }

    #[test]
    fn test_times_out() {
        let mut settings = settings_with(vec![step(0.0, ScriptAction::Floor(9))]);
        settings.demo.max_duration_ms = 1000.0;
        let summary = App::new(settings).unwrap().run().unwrap();

        assert!(summary.timed_out);
        assert!(summary.state.moving);
    }

    #[test]
    fn test_writes_trace() {
        let path = scratch_dir("trace").with_extension("json");
        let mut settings = settings_with(vec![step(0.0, ScriptAction::Floor(2))]);
        settings.demo.trace_path = Some(path.clone());
        let summary = App::new(settings).unwrap().run().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        let frames = value["frames"].as_array().unwrap();
        assert_eq!(frames.len() as u64, summary.frames);
        assert_eq!(frames[0]["train"].as_array().unwrap().len(), 4);
        assert_eq!(value["scene"]["building"]["size"][1], 52.0);
        assert_eq!(value["scene"]["door_leaf"][0], 4.0);
        assert_eq!(value["scene"]["rails"].as_array().unwrap().len(), 64);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_scripted_doors_go_through_panel() {
        let mut app = App::new(settings_with(vec![
            step(0.0, ScriptAction::CloseDoors),
            step(1500.0, ScriptAction::OpenDoors),
        ]))
        .unwrap();

        app.frame();
        assert!(!app.sequencer.doors_open());
        let summary = app.run().unwrap();
        assert!(summary.state.doors_open);
        assert_eq!(summary.selected_floor, None);
        assert_eq!(summary.arrivals, 0);
    }

    #[test]
    fn test_time_scale_speeds_up_the_clock() {
        let mut settings = settings_with(vec![step(0.0, ScriptAction::Floor(5))]);
        settings.demo.time_scale = 2.0;
        let summary = App::new(settings).unwrap().run().unwrap();

        assert_eq!(summary.state.current_floor, 5);
        assert!(summary.frames <= 160, "{} frames", summary.frames);
    }

    #[test]
    fn test_invalid_config() {
        let mut settings = AppSettings::default();
        settings.elevator.floor_count = 0;
        assert!(matches!(App::new(settings), Err(AppError::Config(_))));
    }

    #[test]
    fn test_prepare_offline_cache() {
        let root = scratch_dir("web");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("index.html"), "<html>").unwrap();

        let mut settings = settings_with(Vec::new());
        settings.offline = OfflineSettings {
            cache_name: "liftview-test".to_string(),
            manifest: vec!["./".to_string(), "./index.html".to_string()],
            root: root.clone(),
        };
        let app = App::new(settings).unwrap();
        let cache = app.prepare_offline_cache().unwrap();
        assert_eq!(cache.storage().len_of("liftview-test"), 2);

        let _ = std::fs::remove_dir_all(root);
    }
}
