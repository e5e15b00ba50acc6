//! Canvas rendering for the grid, connections and image nodes.
//!
//! Elements are drawn in layers: grid first, then connection lines, then
//! nodes in z-order so the topmost node is painted last.

use super::state::{BoardApp, ImageSlot};
use crate::assets::AssetResolver;
use crate::constants::*;
use crate::types::*;
use eframe::egui;
use eframe::epaint::StrokeKind;
use std::collections::HashSet;

/// On-screen help, drawn in the top-left corner of the canvas.
const INSTRUCTIONS: [&str; 6] = [
    "Drop image files to add them",
    "Drag nodes to move them",
    "Drag one node onto another to connect or disconnect",
    "Space to anchor/unanchor the selected node",
    "Delete/Backspace to remove the selected node",
    "Esc to cancel a drag",
];

fn pos2(point: (f32, f32)) -> egui::Pos2 {
    egui::pos2(point.0, point.1)
}

impl BoardApp {
    /// Makes sure every image on the board has a texture or is known to be missing.
    ///
    /// Images dropped this session arrive already decoded; images from a loaded
    /// board are resolved here on first sight. Slots for images no node shows
    /// any more are dropped.
    pub fn prepare_textures(&mut self, ctx: &egui::Context) {
        let refs: HashSet<ImageRef> = self
            .board
            .nodes()
            .iter()
            .map(|n| n.image_ref.clone())
            .collect();
        self.images.retain(|image_ref, _| refs.contains(image_ref));

        for image_ref in refs {
            let slot = match self.images.remove(&image_ref) {
                Some(slot) => slot,
                None => match self.resolver.load(&image_ref) {
                    Ok(image) => ImageSlot::Decoded(image),
                    Err(_) => ImageSlot::Missing,
                },
            };
            let slot = match slot {
                ImageSlot::Decoded(image) => {
                    let color = egui::ColorImage::from_rgba_premultiplied(
                        [image.width as usize, image.height as usize],
                        &image.pixels,
                    );
                    let texture =
                        ctx.load_texture(image_ref.as_str(), color, egui::TextureOptions::LINEAR);
                    ImageSlot::Texture(texture)
                }
                other => other,
            };
            self.images.insert(image_ref, slot);
        }
    }

    /// Renders the board into `canvas_rect`.
    pub fn render_board(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let painter = painter.with_clip_rect(canvas_rect);
        if self.config.show_grid {
            self.draw_grid(&painter, canvas_rect);
        }

        let line_color = if self.config.dark_mode {
            egui::Color32::from_gray(110)
        } else {
            egui::Color32::from_gray(200)
        };
        let stroke = egui::Stroke::new(CONNECTION_STROKE_WIDTH, line_color);
        for segment in self.board.connection_segments() {
            painter.line_segment(
                [
                    self.world_to_screen(pos2(segment.from)),
                    self.world_to_screen(pos2(segment.to)),
                ],
                stroke,
            );
        }

        for node in self.board.draw_order() {
            self.draw_node(&painter, node);
        }

        self.draw_instructions(&painter, canvas_rect);
    }

    /// Draws a zoom-aware grid on the canvas for visual reference.
    pub fn draw_grid(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let grid_color = egui::Color32::from_rgba_unmultiplied(128, 128, 128, 32);
        let stroke = egui::Stroke::new(1.0, grid_color);

        let spacing = GRID_SIZE * self.canvas.zoom_factor;
        if spacing < 4.0 {
            return;
        }

        let top_left = self.screen_to_world(canvas_rect.min);
        let bottom_right = self.screen_to_world(canvas_rect.max);

        let mut x = (top_left.x / GRID_SIZE).floor() * GRID_SIZE;
        while x <= bottom_right.x {
            let screen_x = self.world_to_screen(egui::pos2(x, 0.0)).x;
            painter.line_segment(
                [
                    egui::pos2(screen_x, canvas_rect.min.y),
                    egui::pos2(screen_x, canvas_rect.max.y),
                ],
                stroke,
            );
            x += GRID_SIZE;
        }

        let mut y = (top_left.y / GRID_SIZE).floor() * GRID_SIZE;
        while y <= bottom_right.y {
            let screen_y = self.world_to_screen(egui::pos2(0.0, y)).y;
            painter.line_segment(
                [
                    egui::pos2(canvas_rect.min.x, screen_y),
                    egui::pos2(canvas_rect.max.x, screen_y),
                ],
                stroke,
            );
            y += GRID_SIZE;
        }
    }

    /// Draws one node: its image (or a placeholder), selection and drop-target
    /// highlights, and the anchor marker.
    pub fn draw_node(&self, painter: &egui::Painter, node: &BoardNode) {
        let min = self.world_to_screen(pos2(node.position));
        let max = self.world_to_screen(egui::pos2(
            node.position.0 + node.size.0,
            node.position.1 + node.size.1,
        ));
        let rect = egui::Rect::from_min_max(min, max);

        match self.images.get(&node.image_ref) {
            Some(ImageSlot::Texture(texture)) => {
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                painter.image(texture.id(), rect, uv, egui::Color32::WHITE);
            }
            _ => self.draw_placeholder(painter, rect, node),
        }

        if self.machine.toggle_target() == Some(node.id) {
            // green: drop will connect, red: drop will disconnect
            let will_disconnect = self
                .machine
                .dragged_node()
                .is_some_and(|dragged| self.board.has_connection(dragged, node.id));
            let color = if will_disconnect {
                egui::Color32::from_rgb(220, 80, 80)
            } else {
                egui::Color32::from_rgb(80, 200, 120)
            };
            painter.rect_stroke(
                rect.expand(3.0),
                4.0,
                egui::Stroke::new(3.0, color),
                StrokeKind::Outside,
            );
        }

        if self.interaction.selected_node == Some(node.id) {
            painter.rect_stroke(
                rect.expand(2.0),
                2.0,
                egui::Stroke::new(2.0, egui::Color32::from_rgb(0, 200, 0)),
                StrokeKind::Outside,
            );
        }

        if node.anchored {
            painter.circle_filled(rect.center(), ANCHOR_MARKER_RADIUS, egui::Color32::RED);
        }
    }

    fn draw_placeholder(&self, painter: &egui::Painter, rect: egui::Rect, node: &BoardNode) {
        let (fill, text_color) = if self.config.dark_mode {
            (egui::Color32::from_gray(60), egui::Color32::from_gray(220))
        } else {
            (egui::Color32::from_gray(240), egui::Color32::from_gray(40))
        };
        painter.rect_filled(rect, 4.0, fill);
        painter.rect_stroke(
            rect,
            4.0,
            egui::Stroke::new(1.0, egui::Color32::from_gray(128)),
            StrokeKind::Inside,
        );
        let font_size = (11.0 * self.canvas.zoom_factor).clamp(8.0, 20.0);
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            node.image_ref.file_name(),
            egui::FontId::proportional(font_size),
            text_color,
        );
    }

    fn draw_instructions(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let color = egui::Color32::from_gray(130);
        let font = egui::FontId::proportional(14.0);
        for (row, line) in INSTRUCTIONS.iter().enumerate() {
            painter.text(
                canvas_rect.min + egui::vec2(10.0, 10.0 + row as f32 * 18.0),
                egui::Align2::LEFT_TOP,
                *line,
                font.clone(),
                color,
            );
        }
    }
}
