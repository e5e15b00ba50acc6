//! Spring/repulsion layout that relaxes the board a little every frame.
//!
//! Each connection acts as a spring between node centres and every pair of
//! nodes pushes apart with an inverse-square force. Velocities are damped and
//! node centres are kept inside the canvas, bouncing off its edges. Anchored
//! nodes and the node under the pointer are never moved.

use std::collections::HashMap;

use crate::board::Board;
use crate::config::PhysicsConfig;
use crate::types::*;

/// Per-node velocities carried between frames.
#[derive(Debug, Clone, Default)]
pub struct ForceLayout {
    velocities: HashMap<NodeId, (f32, f32)>,
}

impl ForceLayout {
    /// Creates a layout with every node at rest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current velocity of a node (zero if it has never moved).
    pub fn velocity(&self, id: NodeId) -> (f32, f32) {
        self.velocities.get(&id).copied().unwrap_or((0.0, 0.0))
    }

    /// Forgets all velocities, e.g. after loading a different board.
    pub fn reset(&mut self) {
        self.velocities.clear();
    }

    /// Advances the simulation by one step.
    ///
    /// # Arguments
    ///
    /// * `board` - Board whose nodes are moved
    /// * `physics` - Force parameters
    /// * `bounds` - Width and height of the area node centres stay inside
    /// * `held` - Node currently held by the pointer; it stays put and loses its velocity
    ///
    /// # Returns
    ///
    /// The number of nodes that moved.
    pub fn step(
        &mut self,
        board: &mut Board,
        physics: &PhysicsConfig,
        bounds: (f32, f32),
        held: Option<NodeId>,
    ) -> usize {
        self.velocities.retain(|id, _| board.nodes().contains(*id));
        if let Some(id) = held {
            self.velocities.insert(id, (0.0, 0.0));
        }

        let centres: Vec<(NodeId, (f32, f32))> =
            board.nodes().iter().map(|n| (n.id, n.center())).collect();
        let mut updates: Vec<(NodeId, (f32, f32))> = Vec::new();

        for node in board.nodes().iter() {
            if node.anchored || Some(node.id) == held {
                continue;
            }
            let (x, y) = node.center();
            let mut velocity = self.velocity(node.id);

            for neighbor in board.connections_of(node.id) {
                let Some((_, (nx, ny))) = centres.iter().find(|(id, _)| *id == neighbor) else {
                    continue;
                };
                let (dx, dy) = (nx - x, ny - y);
                let distance = (dx * dx + dy * dy).sqrt();
                if distance == 0.0 {
                    continue;
                }
                let force = (distance - physics.spring_length) * physics.spring_strength;
                velocity.0 += dx / distance * force;
                velocity.1 += dy / distance * force;
            }

            for (other, (ox, oy)) in &centres {
                if *other == node.id {
                    continue;
                }
                let (dx, dy) = (ox - x, oy - y);
                let distance = (dx * dx + dy * dy).sqrt();
                if distance < 1.0 {
                    continue;
                }
                let force = physics.repulsion / (distance * distance);
                velocity.0 -= dx / distance * force;
                velocity.1 -= dy / distance * force;
            }

            velocity.0 *= physics.damping;
            velocity.1 *= physics.damping;
            let mut centre = (x + velocity.0, y + velocity.1);

            let padding = (node.size.0 / 2.0, node.size.1 / 2.0);
            clamp_axis(&mut centre.0, &mut velocity.0, padding.0, bounds.0, physics.bounce);
            clamp_axis(&mut centre.1, &mut velocity.1, padding.1, bounds.1, physics.bounce);

            self.velocities.insert(node.id, velocity);
            updates.push((node.id, (centre.0 - padding.0, centre.1 - padding.1)));
        }

        let mut moved = 0;
        for (id, position) in updates {
            let unchanged = board.node(id).is_some_and(|n| n.position == position);
            if !unchanged && board.nodes_mut().move_node(id, position) {
                moved += 1;
            }
        }
        moved
    }
}

fn clamp_axis(value: &mut f32, velocity: &mut f32, padding: f32, extent: f32, bounce: f32) {
    if *value < padding {
        *value = padding;
        *velocity *= bounce;
    } else if *value > extent - padding {
        *value = extent - padding;
        *velocity *= bounce;
    }
}
