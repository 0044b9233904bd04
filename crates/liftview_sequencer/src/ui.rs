// SPDX-License-Identifier: MIT OR Apache-2.0
//! Floor-button control panel.
//!
//! Features:
//! - One button per floor, highest floor on top
//! - The accepted floor stays highlighted until the next accepted request
//! - Manual open/close door buttons
//! - Status line with the current floor and phase
//! - Presses queued from outside the UI (keyboard, scripts) come back
//!   out of `ui()` together with the clicks

use crate::event::FloorSelection;
use crate::sequencer::ElevatorSequencer;
use crate::state::SequencerState;
use egui::{Color32, RichText};

const DEFAULT_COLUMNS: usize = 2;
const SELECTED_COLOR: Color32 = Color32::from_rgb(255, 200, 100);
const MOVING_COLOR: Color32 = Color32::from_rgb(120, 180, 255);

/// Something the user clicked this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    /// A floor button
    RequestFloor(u32),
    /// The open-doors button
    OpenDoors,
    /// The close-doors button
    CloseDoors,
}

impl PanelAction {
    /// Forward the action to the sequencer. Returns whether it was accepted.
    pub fn apply(self, sequencer: &mut ElevatorSequencer) -> bool {
        match self {
            PanelAction::RequestFloor(floor) => sequencer.request_floor(floor).is_some(),
            PanelAction::OpenDoors => sequencer.open_doors(),
            PanelAction::CloseDoors => sequencer.close_doors(),
        }
    }
}

/// Floor-button panel state
#[derive(Debug, Clone)]
pub struct ControlPanel {
    /// Highlighted floor button
    selected_floor: Option<u32>,
    /// Buttons per row
    pub columns: usize,
    /// Presses waiting for the next `ui()` call
    queued: Vec<PanelAction>,
}

impl ControlPanel {
    /// Create a panel with nothing selected
    pub fn new() -> Self {
        Self {
            selected_floor: None,
            columns: DEFAULT_COLUMNS,
            queued: Vec::new(),
        }
    }

    /// Highlighted floor button
    pub fn selected_floor(&self) -> Option<u32> {
        self.selected_floor
    }

    /// Press a button without clicking it; reported by the next `ui()` call
    pub fn press(&mut self, action: PanelAction) {
        self.queued.push(action);
    }

    /// Render the panel and return the actions pressed this frame,
    /// queued presses first
    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        state: &SequencerState,
        floor_count: u32,
    ) -> Vec<PanelAction> {
        let mut actions = std::mem::take(&mut self.queued);

        let mut status =
            RichText::new(format!("Floor {} | {}", state.current_floor, state.phase.name()))
                .monospace();
        if state.phase.is_animating() {
            status = status.color(MOVING_COLOR);
        }
        ui.label(status);
        ui.separator();

        self.render_floor_buttons(ui, floor_count, &mut actions);
        ui.separator();

        // Manual door controls only make sense outside a trip
        ui.horizontal(|ui| {
            let idle = !state.moving;
            if ui
                .add_enabled(idle && !state.doors_open, egui::Button::new("◀ ▶"))
                .on_hover_text("Open doors")
                .clicked()
            {
                actions.push(PanelAction::OpenDoors);
            }
            if ui
                .add_enabled(idle && state.doors_open, egui::Button::new("▶ ◀"))
                .on_hover_text("Close doors")
                .clicked()
            {
                actions.push(PanelAction::CloseDoors);
            }
        });

        actions
    }

    fn render_floor_buttons(
        &self,
        ui: &mut egui::Ui,
        floor_count: u32,
        actions: &mut Vec<PanelAction>,
    ) {
        let columns = self.columns.max(1);
        egui::Grid::new("liftview_floor_buttons")
            .num_columns(columns)
            .spacing([6.0, 6.0])
            .show(ui, |ui| {
                for (index, floor) in (1..=floor_count).rev().enumerate() {
                    let selected = self.selected_floor == Some(floor);
                    let mut text = RichText::new(floor.to_string()).monospace();
                    if selected {
                        text = text.color(SELECTED_COLOR).strong();
                    }
                    if ui.selectable_label(selected, text).clicked() {
                        actions.push(PanelAction::RequestFloor(floor));
                    }
                    if (index + 1) % columns == 0 {
                        ui.end_row();
                    }
                }
            });
    }
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl FloorSelection for ControlPanel {
    fn on_floor_selected(&mut self, floor: u32) {
        self.selected_floor = Some(floor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::dispatch_selection;

    fn render(panel: &mut ControlPanel, state: &SequencerState, floor_count: u32) -> Vec<PanelAction> {
        let ctx = egui::Context::default();
        let mut actions = Vec::new();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                actions.extend(panel.ui(ui, state, floor_count));
            });
        });
        actions
    }

    #[test]
    fn test_panel_renders_without_input() {
        let seq = ElevatorSequencer::default();
        let mut panel = ControlPanel::new();
        let actions = render(&mut panel, &seq.state(), seq.config().floor_count);
        assert!(actions.is_empty());
        assert_eq!(panel.selected_floor(), None);
    }

    #[test]
    fn test_accepted_request_selects_only_that_floor() {
        let mut seq = ElevatorSequencer::default();
        let mut panel = ControlPanel::new();

        assert!(PanelAction::RequestFloor(6).apply(&mut seq));
        dispatch_selection(&seq.take_events(), &mut panel);
        assert_eq!(panel.selected_floor(), Some(6));

        // Rejected while moving: selection stays on 6
        assert!(!PanelAction::RequestFloor(2).apply(&mut seq));
        dispatch_selection(&seq.take_events(), &mut panel);
        assert_eq!(panel.selected_floor(), Some(6));
    }

    #[test]
    fn test_rejected_request_leaves_selection_alone() {
        let mut seq = ElevatorSequencer::default();
        let mut panel = ControlPanel::new();

        assert!(!PanelAction::RequestFloor(42).apply(&mut seq));
        dispatch_selection(&seq.take_events(), &mut panel);
        assert_eq!(panel.selected_floor(), None);
    }

    #[test]
    fn test_queued_presses_come_out_of_ui() {
        let mut seq = ElevatorSequencer::default();
        let mut panel = ControlPanel::new();
        panel.press(PanelAction::RequestFloor(3));
        panel.press(PanelAction::OpenDoors);

        let actions = render(&mut panel, &seq.state(), seq.config().floor_count);
        assert_eq!(actions, vec![PanelAction::RequestFloor(3), PanelAction::OpenDoors]);

        let accepted: Vec<bool> = actions.into_iter().map(|a| a.apply(&mut seq)).collect();
        assert_eq!(accepted, vec![true, false]);
        dispatch_selection(&seq.take_events(), &mut panel);
        assert_eq!(panel.selected_floor(), Some(3));

        // Drained after one frame
        seq.on_tick(0.0);
        assert!(render(&mut panel, &seq.state(), seq.config().floor_count).is_empty());
    }

    #[test]
    fn test_door_actions() {
        let mut seq = ElevatorSequencer::default();
        assert!(!PanelAction::OpenDoors.apply(&mut seq));
        assert!(PanelAction::CloseDoors.apply(&mut seq));
        assert!(!seq.doors_open());
    }
}
