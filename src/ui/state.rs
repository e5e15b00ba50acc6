//! Application state management structures.
//!
//! This module contains the state structures that track the application's
//! current UI state: canvas navigation, selection, loaded images and file
//! operations, plus the board itself and the drag state machine that edits it.

use super::undo::UndoHistory;
use crate::assets::{DecodedImage, FsAssetResolver};
use crate::board::Board;
use crate::config::BoardConfig;
use crate::interaction::DragMachine;
use crate::layout::ForceLayout;
use crate::types::*;
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};

/// State related to canvas navigation and display.
///
/// Tracks the current pan offset and zoom level for the canvas.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasState {
    /// Current canvas pan offset for navigation (in screen space)
    #[serde(skip)]
    pub offset: egui::Vec2,
    /// Current zoom level (1.0 = normal, 2.0 = 2x zoom, 0.5 = 50% zoom)
    pub zoom_factor: f32,
    /// Screen rectangle the canvas occupied last frame
    #[serde(skip)]
    pub last_rect: Option<egui::Rect>,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            offset: egui::Vec2::ZERO,
            zoom_factor: 1.0,
            last_rect: None,
        }
    }
}

/// State related to user interactions that live outside the drag state machine.
#[derive(Default)]
pub struct InteractionState {
    /// Node most recently grabbed or created; target of Delete and Space
    pub selected_node: Option<NodeId>,
    /// Whether the user is currently panning the canvas
    pub is_panning: bool,
    /// Last mouse position during panning operation
    pub last_pan_pos: Option<egui::Pos2>,
}

/// What is known about the image behind an [`ImageRef`].
pub enum ImageSlot {
    /// Decoded but not yet uploaded to the GPU
    Decoded(DecodedImage),
    /// Ready to draw
    Texture(egui::TextureHandle),
    /// Could not be resolved; drawn as a placeholder
    Missing,
}

/// State related to file operations and persistence.
///
/// Manages file paths, unsaved changes tracking, and async file operations.
pub struct FileState {
    /// Current file path for save/load operations
    pub current_path: Option<String>,
    /// Flag indicating if the board has unsaved changes
    pub has_unsaved_changes: bool,
    /// Save requested by the user, started on the next frame
    pub pending_save_operation: Option<PendingSaveOperation>,
    /// Load requested by the user, started on the next frame
    pub pending_load_operation: Option<PendingLoadOperation>,
    /// Channel for receiving file operation results from async contexts
    pub file_operation_sender: Option<Sender<FileOperationResult>>,
    /// Receiving end, drained once per frame
    pub file_operation_receiver: Option<Receiver<FileOperationResult>>,
}

impl Default for FileState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            current_path: None,
            has_unsaved_changes: false,
            pending_save_operation: None,
            pending_load_operation: None,
            file_operation_sender: Some(sender),
            file_operation_receiver: Some(receiver),
        }
    }
}

/// Represents a pending save operation type.
#[derive(Debug)]
pub enum PendingSaveOperation {
    /// Save with a new file path (show file picker)
    SaveAs,
    /// Save to the existing file path
    Save,
}

/// Represents a pending load operation type.
#[derive(Debug)]
pub enum PendingLoadOperation {
    /// Load a board from a file (show file picker)
    Board,
    /// Pick image files to add as nodes
    Images,
}

/// Messages sent from async file operations back to the main app.
#[derive(Debug)]
pub enum FileOperationResult {
    /// Save operation completed successfully with the given path
    SaveCompleted(String),
    /// Load operation completed successfully with path and content
    LoadCompleted(String, String),
    /// The user picked image files to place on the board
    ImagesPicked(Vec<PathBuf>),
    /// Operation failed with an error message
    OperationFailed(String),
}

/// The main application structure containing UI state and the board.
///
/// This struct implements the `eframe::App` trait. Only settings are
/// serialized with it; the board is persisted separately as a
/// [`BoardState`] snapshot.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct BoardApp {
    /// The board being edited
    #[serde(skip)]
    pub board: Board,
    /// Drag gesture state machine
    #[serde(skip)]
    pub machine: DragMachine,
    /// Physics velocities carried across frames
    #[serde(skip)]
    pub layout: ForceLayout,
    /// Undo/redo history for tracking and reversing actions
    #[serde(skip)]
    pub undo_history: UndoHistory,
    /// Decoded images and textures, keyed by image reference
    #[serde(skip)]
    pub images: HashMap<ImageRef, ImageSlot>,
    /// Loads dropped and picked images
    #[serde(skip)]
    pub resolver: FsAssetResolver,
    /// User-tunable settings
    pub config: BoardConfig,
    /// Canvas navigation and display state
    pub canvas: CanvasState,
    /// User interaction state
    #[serde(skip)]
    pub interaction: InteractionState,
    /// File operations state
    #[serde(skip)]
    pub file: FileState,
    /// Whether the window had focus last frame
    #[serde(skip)]
    pub was_focused: bool,
}

impl Default for BoardApp {
    fn default() -> Self {
        let config = BoardConfig::default();
        Self {
            board: Board::new(),
            machine: DragMachine::new(),
            layout: ForceLayout::new(),
            undo_history: UndoHistory::new(),
            images: HashMap::new(),
            resolver: FsAssetResolver::new(config.node_size),
            config,
            canvas: CanvasState::default(),
            interaction: InteractionState::default(),
            file: FileState::default(),
            was_focused: true,
        }
    }
}

impl BoardApp {
    /// Serializes the application settings to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes application settings from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut app: Self = serde_json::from_str(json)?;
        app.resolver = FsAssetResolver::new(app.config.node_size);
        Ok(app)
    }

    /// Replaces the board, dropping everything tied to the previous one.
    pub fn replace_board(&mut self, board: Board) {
        self.board = board;
        self.machine = DragMachine::new();
        self.layout.reset();
        self.undo_history.clear();
        self.interaction.selected_node = None;
    }
}
