//! File operations for saving and loading boards and picking images.
//!
//! Native file dialogs run on the tokio runtime entered in `main`; their
//! results come back to the UI thread over the [`FileOperationResult`] channel.

use super::state::{BoardApp, FileOperationResult, PendingLoadOperation, PendingSaveOperation};
use crate::board::Board;
use crate::constants::MULTI_DROP_OFFSET;
use eframe::egui;
use log::{info, warn};
use std::sync::mpsc::Sender;

fn send(sender: &Option<Sender<FileOperationResult>>, result: FileOperationResult) {
    if let Some(tx) = sender {
        let _ = tx.send(result);
    }
}

fn write_board(path: &std::path::Path, json: String) -> FileOperationResult {
    match std::fs::write(path, json) {
        Ok(()) => FileOperationResult::SaveCompleted(path.display().to_string()),
        Err(e) => FileOperationResult::OperationFailed(format!("Failed to save file: {e}")),
    }
}

impl BoardApp {
    /// Processes completed file operations and starts newly requested ones.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context, cloned into dialogs so they can request a repaint
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        self.process_file_results();

        if let Some(save_op) = self.file.pending_save_operation.take() {
            let json = match self.board.to_json() {
                Ok(json) => json,
                Err(e) => {
                    warn!("Failed to serialize board: {e}");
                    return;
                }
            };
            self.start_save(ctx, save_op, json);
        }

        if let Some(load_op) = self.file.pending_load_operation.take() {
            self.start_load(ctx, load_op);
        }
    }

    /// Applies every result waiting on the file operation channel.
    pub fn process_file_results(&mut self) {
        let results: Vec<FileOperationResult> = match &self.file.file_operation_receiver {
            Some(receiver) => receiver.try_iter().collect(),
            None => return,
        };

        for result in results {
            match result {
                FileOperationResult::SaveCompleted(path) => {
                    info!("Board saved to {path}");
                    self.file.current_path = Some(path);
                    self.file.has_unsaved_changes = false;
                }
                FileOperationResult::LoadCompleted(path, content) => {
                    match Board::from_json(&content) {
                        Ok(board) => {
                            info!(
                                "Loaded {path}: {} nodes, {} connections",
                                board.nodes().len(),
                                board.connections().len()
                            );
                            self.replace_board(board);
                            self.images.clear();
                            self.file.current_path = Some(path);
                            self.file.has_unsaved_changes = false;
                        }
                        Err(e) => warn!("Failed to load {path}: {e}"),
                    }
                }
                FileOperationResult::ImagesPicked(paths) => {
                    let (x, y) = self.canvas_center_world();
                    for (index, path) in paths.iter().enumerate() {
                        let offset = index as f32 * MULTI_DROP_OFFSET;
                        self.drop_image(path.display().to_string(), (x + offset, y + offset), true);
                    }
                }
                FileOperationResult::OperationFailed(error) => {
                    warn!("File operation failed: {error}");
                }
            }
        }
    }

    fn start_save(&mut self, ctx: &egui::Context, save_op: PendingSaveOperation, json: String) {
        let ctx = ctx.clone();
        let sender = self.file.file_operation_sender.clone();

        match (save_op, self.file.current_path.clone()) {
            (PendingSaveOperation::Save, Some(path)) => {
                tokio::spawn(async move {
                    send(&sender, write_board(std::path::Path::new(&path), json));
                    ctx.request_repaint();
                });
            }
            _ => {
                tokio::spawn(async move {
                    if let Some(handle) = rfd::AsyncFileDialog::new()
                        .add_filter("JSON", &["json"])
                        .set_file_name("board.json")
                        .save_file()
                        .await
                    {
                        send(&sender, write_board(handle.path(), json));
                    }
                    ctx.request_repaint();
                });
            }
        }
    }

    fn start_load(&mut self, ctx: &egui::Context, load_op: PendingLoadOperation) {
        let ctx = ctx.clone();
        let sender = self.file.file_operation_sender.clone();

        match load_op {
            PendingLoadOperation::Board => {
                tokio::spawn(async move {
                    if let Some(handle) = rfd::AsyncFileDialog::new()
                        .add_filter("JSON", &["json"])
                        .pick_file()
                        .await
                    {
                        let path = handle.path();
                        let result = match std::fs::read_to_string(path) {
                            Ok(json) => {
                                FileOperationResult::LoadCompleted(path.display().to_string(), json)
                            }
                            Err(e) => FileOperationResult::OperationFailed(format!(
                                "Failed to read file: {e}"
                            )),
                        };
                        send(&sender, result);
                    }
                    ctx.request_repaint();
                });
            }
            PendingLoadOperation::Images => {
                tokio::spawn(async move {
                    if let Some(handles) = rfd::AsyncFileDialog::new()
                        .add_filter("Images", &["png", "svg"])
                        .pick_files()
                        .await
                    {
                        let paths = handles.iter().map(|h| h.path().to_path_buf()).collect();
                        send(&sender, FileOperationResult::ImagesPicked(paths));
                    }
                    ctx.request_repaint();
                });
            }
        }
    }

    /// Opens a file dialog to save the board under a new name.
    pub fn save_as_board(&mut self) {
        self.file.pending_save_operation = Some(PendingSaveOperation::SaveAs);
    }

    /// Saves the board to the current file path, or triggers "Save As" if no path is set.
    pub fn save_board(&mut self) {
        if self.file.current_path.is_some() {
            self.file.pending_save_operation = Some(PendingSaveOperation::Save);
        } else {
            self.save_as_board();
        }
    }

    /// Opens a file dialog to load a board from disk.
    pub fn load_board(&mut self) {
        self.file.pending_load_operation = Some(PendingLoadOperation::Board);
    }

    /// Opens a file dialog to add images to the board.
    pub fn pick_images(&mut self) {
        self.file.pending_load_operation = Some(PendingLoadOperation::Images);
    }

    /// Starts an empty board, resetting file and view state.
    pub fn new_board(&mut self) {
        self.replace_board(Board::new());
        self.images.clear();
        self.file.current_path = None;
        self.file.has_unsaved_changes = false;
        self.canvas.offset = egui::Vec2::ZERO;
        self.canvas.zoom_factor = 1.0;
    }
}
