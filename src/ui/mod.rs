//! User interface components and rendering logic for the image board.
//!
//! This module contains the eframe application: toolbar, keyboard shortcuts,
//! canvas input, rendering, and file operations. Board semantics live in the
//! crate root; this layer only translates input into calls on them.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main BoardApp
//! - `file_ops` - Native file dialogs for save/load and picking images
//! - `canvas` - Canvas navigation and pointer input for the drag state machine
//! - `rendering` - Drawing the grid, connections, and image nodes
//! - `undo` - Undo/redo history

mod canvas;
mod file_ops;
mod rendering;
mod state;
mod undo;

pub use state::BoardApp;
pub use undo::{UndoAction, UndoHistory, UndoableBoard};

use crate::board::Board;
use crate::interaction::PointerEvent;
use eframe::egui;
use log::warn;

const APP_STATE_KEY: &str = "app_state";
const BOARD_STATE_KEY: &str = "board_state";

impl BoardApp {
    /// Creates the app, restoring settings and the last board from eframe storage.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let Some(storage) = cc.storage else {
            return Self::default();
        };

        let mut app = storage
            .get_string(APP_STATE_KEY)
            .and_then(|json| match Self::from_json(&json) {
                Ok(app) => Some(app),
                Err(err) => {
                    warn!("Ignoring stored app state: {err}");
                    None
                }
            })
            .unwrap_or_default();

        if let Some(json) = storage.get_string(BOARD_STATE_KEY) {
            match Board::from_json(&json) {
                Ok(board) => app.replace_board(board),
                Err(err) => warn!("Ignoring stored board: {err}"),
            }
        }
        app
    }
}

impl eframe::App for BoardApp {
    /// Persist settings and the board between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.to_json() {
            Ok(json) => storage.set_string(APP_STATE_KEY, json),
            Err(err) => warn!("Failed to serialize app state: {err}"),
        }
        match self.board.to_json() {
            Ok(json) => storage.set_string(BOARD_STATE_KEY, json),
            Err(err) => warn!("Failed to serialize board: {err}"),
        }
    }

    /// Main update function called by egui for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.config.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_pending_operations(ctx);
        self.handle_focus_change(ctx);
        self.handle_undo_redo_keys(ctx);
        self.handle_board_keys(ctx);
        self.handle_file_shortcuts(ctx);

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_canvas(ui);
        });

        if self.config.physics.enabled {
            let moving = self.layout.step(
                &mut self.board,
                &self.config.physics,
                self.config.canvas_size,
                self.machine.dragged_node(),
            );
            if moving > 0 {
                ctx.request_repaint();
            }
        }
    }
}

impl BoardApp {
    /// Cancels an in-progress drag when the window loses focus.
    fn handle_focus_change(&mut self, ctx: &egui::Context) {
        let focused = ctx.input(|i| i.focused);
        if self.was_focused && !focused && self.machine.is_active() {
            self.dispatch(PointerEvent::Cancel);
        }
        self.was_focused = focused;
    }

    /// Handles undo/redo keyboard shortcuts.
    fn handle_undo_redo_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Z) && i.modifiers.command && !i.modifiers.shift)
        {
            self.perform_undo();
        } else if ctx.input(|i| {
            (i.key_pressed(egui::Key::Z) && i.modifiers.command && i.modifiers.shift)
                || (i.key_pressed(egui::Key::Y) && i.modifiers.command)
        }) {
            self.perform_redo();
        }
    }

    /// Delete/Backspace removes the selection, Space anchors it, Escape cancels a drag.
    fn handle_board_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (delete, anchor, cancel) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
                i.key_pressed(egui::Key::Space),
                i.key_pressed(egui::Key::Escape),
            )
        });
        if cancel && self.machine.is_active() {
            self.dispatch(PointerEvent::Cancel);
        }
        if delete {
            self.delete_selected();
        }
        if anchor {
            self.toggle_selected_anchor();
        }
    }

    /// Handles New, Open, Save, and Save As shortcuts with the platform command modifier.
    fn handle_file_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (save_as, save, open, new) = ctx.input(|i| {
            let cmd = i.modifiers.command;
            let shift = i.modifiers.shift;
            (
                i.key_pressed(egui::Key::S) && cmd && shift,
                i.key_pressed(egui::Key::S) && cmd && !shift,
                i.key_pressed(egui::Key::O) && cmd,
                i.key_pressed(egui::Key::N) && cmd,
            )
        });
        if save_as {
            self.save_as_board();
        } else if save {
            self.save_board();
        }
        if open {
            self.load_board();
        }
        if new {
            self.new_board();
        }
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("New").clicked() {
                self.new_board();
            }
            if ui.button("Open").clicked() {
                self.load_board();
            }
            if ui.button("Save").clicked() {
                self.save_board();
            }
            if ui.button("Save As").clicked() {
                self.save_as_board();
            }
            if ui.button("Add Image…").clicked() {
                self.pick_images();
            }

            ui.separator();

            ui.add_enabled_ui(self.undo_history.can_undo(), |ui| {
                if ui.button("⟲ Undo").clicked() {
                    self.perform_undo();
                }
            });
            ui.add_enabled_ui(self.undo_history.can_redo(), |ui| {
                if ui.button("⟳ Redo").clicked() {
                    self.perform_redo();
                }
            });

            ui.separator();

            if ui
                .checkbox(&mut self.config.physics.enabled, "Physics")
                .changed()
                && !self.config.physics.enabled
            {
                self.layout.reset();
            }
            ui.checkbox(&mut self.config.show_grid, "Grid");
            ui.checkbox(&mut self.config.dark_mode, "Dark mode");

            ui.separator();

            let title = self.file.current_path.as_deref().unwrap_or("Untitled");
            let marker = if self.file.has_unsaved_changes { "*" } else { "" };
            ui.label(format!(
                "{title}{marker} | {} images, {} connections",
                self.board.nodes().len(),
                self.board.connections().len()
            ));
        });
    }

    /// Performs an undo operation.
    pub fn perform_undo(&mut self) {
        if self.machine.is_active() {
            self.dispatch(PointerEvent::Cancel);
        }
        if let Some(action) = self.undo_history.pop_undo() {
            if let Some(redo_action) = self.board.apply_undo(&action) {
                self.undo_history.push_redo(redo_action);
                self.file.has_unsaved_changes = true;
                self.interaction.selected_node = None;
            }
        }
    }

    /// Performs a redo operation.
    pub fn perform_redo(&mut self) {
        if self.machine.is_active() {
            self.dispatch(PointerEvent::Cancel);
        }
        if let Some(action) = self.undo_history.pop_redo() {
            if let Some(undo_action) = self.board.apply_undo(&action) {
                // push_action would clear the redo stack
                self.undo_history.push_undo(undo_action);
                self.file.has_unsaved_changes = true;
                self.interaction.selected_node = None;
            }
        }
    }
}
