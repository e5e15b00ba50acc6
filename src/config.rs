//! User-tunable board settings.
//!
//! Settings are persisted alongside the rest of the app state through eframe
//! storage; every field has a default so older saved state keeps loading.

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Parameters of the spring/repulsion layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Whether the layout runs every frame
    pub enabled: bool,
    /// Rest length of each connection spring
    pub spring_length: f32,
    /// Spring stiffness
    pub spring_strength: f32,
    /// Inverse-square repulsion strength between all nodes
    pub repulsion: f32,
    /// Per-step velocity damping
    pub damping: f32,
    /// Velocity multiplier applied on hitting the canvas edge
    pub bounce: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            spring_length: SPRING_LENGTH,
            spring_strength: SPRING_STRENGTH,
            repulsion: REPULSION,
            damping: DAMPING,
            bounce: BOUNCE,
        }
    }
}

/// Board-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Box that dropped images are fitted into, preserving aspect ratio
    pub node_size: (f32, f32),
    /// Area the layout keeps node centres inside
    pub canvas_size: (f32, f32),
    /// Layout parameters
    pub physics: PhysicsConfig,
    /// Whether the grid is drawn behind the board
    pub show_grid: bool,
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            node_size: (NODE_WIDTH, NODE_HEIGHT),
            canvas_size: (CANVAS_WIDTH, CANVAS_HEIGHT),
            physics: PhysicsConfig::default(),
            show_grid: true,
            dark_mode: true,
        }
    }
}

impl BoardConfig {
    /// Serialize the configuration to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a configuration from a JSON string; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
