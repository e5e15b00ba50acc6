//! # Image Board
//!
//! An interactive canvas of image nodes. Images dropped onto the board become
//! nodes; dragging one node onto another toggles an undirected connection
//! between them, and the dragged node springs back to where it started.
//!
//! ## Features
//! - Node registry with z-ordering and bring-to-front
//! - Topmost-first hit testing
//! - Symmetric connection toggling keyed by unordered pairs
//! - A toolkit-independent drag state machine
//! - JSON snapshot and validated restore
//! - Optional force-directed layout with anchored nodes
//! - Undo/redo, canvas panning and zooming

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod assets;
mod board;
mod config;
mod connections;
pub mod constants;
mod error;
mod hit_test;
mod interaction;
mod layout;
mod registry;
mod types;
mod ui;

// Re-export public types and functions
pub use assets::*;
pub use board::Board;
pub use config::*;
pub use connections::ConnectionGraph;
pub use error::BoardError;
pub use hit_test::hit_test;
pub use interaction::*;
pub use layout::ForceLayout;
pub use registry::NodeRegistry;
pub use types::*;
pub use ui::{BoardApp, UndoAction, UndoHistory, UndoableBoard};

/// Runs the image board application with default settings.
///
/// This function opens the eframe window and starts the main event loop. It
/// must be called inside a tokio runtime context, which the file dialogs use.
///
/// # Returns
///
/// Returns `Ok(())` if the application runs successfully, or an `eframe::Error` if
/// initialization fails.
///
/// # Example
///
/// ```no_run
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let runtime = tokio::runtime::Runtime::new()?;
///     let _guard = runtime.enter();
///     image_board::run_app()?;
///     Ok(())
/// }
/// ```
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Image Board",
        options,
        Box::new(|cc| Ok(Box::new(BoardApp::new(cc)))),
    )
}
