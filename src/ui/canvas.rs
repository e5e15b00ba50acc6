//! Canvas interaction and navigation functionality.
//!
//! This module handles canvas panning and zooming, coordinate transformations
//! between screen and world space, and the translation of raw egui pointer
//! input and file drops into [`PointerEvent`]s for the drag state machine.

use super::state::BoardApp;
use super::state::ImageSlot;
use super::UndoAction;
use crate::assets::resolve_node_image;
use crate::constants::MULTI_DROP_OFFSET;
use crate::interaction::{DragOutcome, PointerEvent};
use crate::types::*;
use eframe::egui;

impl BoardApp {
    /// Converts screen coordinates to world coordinates accounting for zoom and pan.
    pub fn screen_to_world(&self, screen_pos: egui::Pos2) -> egui::Pos2 {
        (screen_pos - self.canvas.offset) / self.canvas.zoom_factor
    }

    /// Converts world coordinates to screen coordinates accounting for zoom and pan.
    pub fn world_to_screen(&self, world_pos: egui::Pos2) -> egui::Pos2 {
        world_pos * self.canvas.zoom_factor + self.canvas.offset
    }

    /// Draws the canvas and processes all pointer input for this frame.
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let canvas_rect = response.rect;
        self.canvas.last_rect = Some(canvas_rect);

        self.handle_canvas_panning(ui, &response);
        self.handle_canvas_zoom(ui, &response);
        self.handle_pointer_input(ui, canvas_rect);
        self.handle_dropped_files(ui.ctx(), canvas_rect);

        self.prepare_textures(ui.ctx());
        self.render_board(&painter, canvas_rect);
    }

    /// Handles middle-click or Cmd/Ctrl+left-click canvas panning functionality.
    ///
    /// Uses Cmd on macOS and Ctrl on other platforms for modifier-based panning.
    pub fn handle_canvas_panning(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let should_pan = ui.input(|i| {
            i.pointer.middle_down() || (i.pointer.primary_down() && i.modifiers.command)
        });

        if should_pan && !self.machine.is_active() {
            if let Some(current_pos) = response.interact_pointer_pos() {
                if !self.interaction.is_panning {
                    self.interaction.is_panning = true;
                    self.interaction.last_pan_pos = Some(current_pos);
                } else if let Some(last_pos) = self.interaction.last_pan_pos {
                    self.canvas.offset += current_pos - last_pos;
                    self.interaction.last_pan_pos = Some(current_pos);
                }
            }
        } else {
            self.interaction.is_panning = false;
            self.interaction.last_pan_pos = None;
        }
    }

    /// Handles scroll wheel zooming, keeping the world point under the cursor fixed.
    ///
    /// Zoom range is clamped between 0.25x and 5.0x.
    pub fn handle_canvas_zoom(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll_delta == 0.0 {
            return;
        }
        let Some(mouse_pos) = ui.input(|i| i.pointer.hover_pos()) else {
            return;
        };
        if !response.rect.contains(mouse_pos) {
            return;
        }

        let world_before = self.screen_to_world(mouse_pos);
        let zoom_delta = if scroll_delta > 0.0 { 0.025 } else { -0.025 };
        self.canvas.zoom_factor = (self.canvas.zoom_factor + zoom_delta).clamp(0.25, 5.0);
        let world_after = self.screen_to_world(mouse_pos);
        self.canvas.offset += (world_after - world_before) * self.canvas.zoom_factor;
    }

    /// Feeds press, move and release of the primary button to the state machine.
    fn handle_pointer_input(&mut self, ui: &egui::Ui, canvas_rect: egui::Rect) {
        let (pressed, released, moved, command, latest) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.delta() != egui::Vec2::ZERO,
                i.modifiers.command,
                i.pointer.latest_pos(),
            )
        });
        let Some(screen_pos) = latest else {
            // released outside the window: nowhere to drop, so abandon the gesture
            if released && self.machine.is_active() {
                self.dispatch(PointerEvent::Cancel);
            }
            return;
        };
        let world = self.screen_to_world(screen_pos);
        let pos = (world.x, world.y);

        if pressed && !command && canvas_rect.contains(screen_pos) {
            self.dispatch(PointerEvent::PointerDown { pos });
        }
        if moved && self.machine.is_active() {
            self.dispatch(PointerEvent::PointerMove { pos });
        }
        if released {
            self.dispatch(PointerEvent::PointerUp {
                pos,
                on_canvas: canvas_rect.contains(screen_pos),
            });
        }
    }

    /// Turns files dropped from the OS onto the window into nodes.
    fn handle_dropped_files(&mut self, ctx: &egui::Context, canvas_rect: egui::Rect) {
        let (dropped, latest) =
            ctx.input(|i| (i.raw.dropped_files.clone(), i.pointer.latest_pos()));
        if dropped.is_empty() {
            return;
        }

        let screen_pos = latest.unwrap_or(canvas_rect.center());
        let on_canvas = canvas_rect.contains(screen_pos);
        let world = self.screen_to_world(screen_pos);

        let paths = dropped.into_iter().filter_map(|file| file.path);
        for (index, path) in paths.enumerate() {
            let offset = index as f32 * MULTI_DROP_OFFSET;
            self.drop_image(
                path.display().to_string(),
                (world.x + offset, world.y + offset),
                on_canvas,
            );
        }
    }

    /// Runs a complete external drag for one image: start at `pos`, release at `pos`.
    ///
    /// The image is resolved first so the node can be sized from it; a missing
    /// image still produces a node, drawn as a placeholder.
    pub fn drop_image(&mut self, path: impl Into<String>, pos: (f32, f32), on_canvas: bool) {
        let image_ref = ImageRef::new(path);
        let (size, decoded) =
            resolve_node_image(&self.resolver, &image_ref, self.config.node_size);
        match decoded {
            Some(image) => {
                if !matches!(self.images.get(&image_ref), Some(ImageSlot::Texture(_))) {
                    self.images.insert(image_ref.clone(), ImageSlot::Decoded(image));
                }
            }
            None => {
                self.images.entry(image_ref.clone()).or_insert(ImageSlot::Missing);
            }
        }

        if self.machine.is_active() {
            self.dispatch(PointerEvent::Cancel);
        }
        self.dispatch(PointerEvent::ExternalDragStarted {
            image_ref,
            size,
            pos,
        });
        self.dispatch(PointerEvent::PointerUp { pos, on_canvas });
    }

    /// World position at the centre of the visible canvas.
    pub fn canvas_center_world(&self) -> (f32, f32) {
        let center = self
            .canvas
            .last_rect
            .map(|rect| rect.center())
            .unwrap_or(egui::Pos2::ZERO);
        let world = self.screen_to_world(center);
        (world.x, world.y)
    }

    /// Sends one event through the state machine and records its outcome.
    pub fn dispatch(&mut self, event: PointerEvent) {
        let outcome = self.machine.handle(&mut self.board, event);
        self.apply_outcome(outcome);
    }

    /// Updates selection, undo history and the unsaved flag from a gesture outcome.
    pub fn apply_outcome(&mut self, outcome: DragOutcome) {
        match outcome {
            DragOutcome::DragStarted(id) => {
                self.interaction.selected_node = Some(id);
            }
            DragOutcome::NodeCreated(id) => {
                self.interaction.selected_node = Some(id);
                self.record(UndoAction::NodeCreated { node_id: id });
            }
            DragOutcome::NodeMoved { id, from, to } => {
                if from != to {
                    self.record(UndoAction::NodeMoved {
                        node_id: id,
                        old_position: from,
                        new_position: to,
                    });
                }
            }
            DragOutcome::ConnectionToggled { a, b, .. } => {
                self.record(UndoAction::ConnectionToggled { a, b });
            }
            DragOutcome::Aborted(id) => {
                if self.interaction.selected_node == Some(id) {
                    self.interaction.selected_node = None;
                }
            }
            DragOutcome::Rejected(err) => {
                log::warn!("Gesture rejected: {err}");
            }
            DragOutcome::None
            | DragOutcome::NewDragStarted
            | DragOutcome::Discarded
            | DragOutcome::Reverted(_) => {}
        }
    }

    fn record(&mut self, action: UndoAction) {
        self.undo_history.push_action(action);
        self.file.has_unsaved_changes = true;
    }

    /// Deletes the selected node and its connections, cancelling any drag.
    pub fn delete_selected(&mut self) {
        let Some(id) = self.interaction.selected_node.take() else {
            return;
        };
        match self.machine.remove_node(&mut self.board, id) {
            Ok((node, pairs)) => {
                let neighbors = pairs.iter().filter_map(|p| p.other(id)).collect();
                self.record(UndoAction::NodeDeleted { node, neighbors });
            }
            Err(err) => log::warn!("Delete ignored: {err}"),
        }
    }

    /// Pins or unpins the selected node so the layout leaves it alone.
    pub fn toggle_selected_anchor(&mut self) {
        let Some(id) = self.interaction.selected_node else {
            return;
        };
        match self.board.toggle_anchor(id) {
            Ok(_) => self.record(UndoAction::AnchorToggled { node_id: id }),
            Err(err) => log::warn!("Anchor toggle ignored: {err}"),
        }
    }
}
