//! Shared application-wide constants.
//! Centralizes tweakable values used by the board core, layout and UI.

// Node dimensions
/// Default node width in world units (diameter of a dropped image thumbnail).
pub const NODE_WIDTH: f32 = 80.0;
/// Default node height in world units.
pub const NODE_HEIGHT: f32 = 80.0;

// Canvas
/// Default width of the area the force layout keeps nodes inside.
pub const CANVAS_WIDTH: f32 = 800.0;
/// Default height of the area the force layout keeps nodes inside.
pub const CANVAS_HEIGHT: f32 = 600.0;
/// Offset applied between several files dropped in a single frame.
pub const MULTI_DROP_OFFSET: f32 = 24.0;

// Grid/drawing
/// Grid cell size in world units.
pub const GRID_SIZE: f32 = 20.0;
/// Stroke width of connection lines (in screen pixels).
pub const CONNECTION_STROKE_WIDTH: f32 = 2.0;
/// Radius of the anchor indicator drawn on pinned nodes (in screen pixels).
pub const ANCHOR_MARKER_RADIUS: f32 = 5.0;

// Physics
/// Rest length of the spring along each connection.
pub const SPRING_LENGTH: f32 = 100.0;
/// Spring stiffness applied per unit of displacement.
pub const SPRING_STRENGTH: f32 = 0.03;
/// Strength of the inverse-square repulsion between every pair of nodes.
pub const REPULSION: f32 = 500.0;
/// Velocity damping factor applied every step.
pub const DAMPING: f32 = 0.98;
/// Velocity multiplier applied when a node hits the canvas boundary.
pub const BOUNCE: f32 = -0.5;

// Undo/redo
/// Maximum number of undo history entries to retain.
pub const MAX_UNDO_HISTORY: usize = 100;
