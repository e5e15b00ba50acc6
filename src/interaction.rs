//! Drag interaction state machine.
//!
//! Pointer input is reduced to [`PointerEvent`]s in board coordinates. Each
//! event is fed through [`transition`], which takes the current [`DragState`],
//! applies any committed effect to the [`Board`], and returns the next state
//! together with a [`DragOutcome`] describing what happened. Nothing here
//! knows about a windowing toolkit, so every transition can be exercised
//! directly in tests.

use log::debug;

use crate::board::Board;
use crate::error::BoardError;
use crate::types::*;

/// Input events consumed by the state machine, in board coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    /// An external image started being dragged over the board.
    ExternalDragStarted {
        /// The image that will become a node
        image_ref: ImageRef,
        /// Size the node will have once dropped
        size: (f32, f32),
        /// Current pointer position
        pos: (f32, f32),
    },
    /// Primary button pressed.
    PointerDown {
        /// Pointer position
        pos: (f32, f32),
    },
    /// Pointer moved while a button may be held.
    PointerMove {
        /// Pointer position
        pos: (f32, f32),
    },
    /// Primary button released (or external drop).
    PointerUp {
        /// Pointer position
        pos: (f32, f32),
        /// Whether the release happened over the board canvas
        on_canvas: bool,
    },
    /// The gesture was interrupted (focus loss, Escape).
    Cancel,
}

/// Where a drag session currently is.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// An external image is being positioned; no node exists yet.
    DraggingNew {
        /// The image being dropped
        image_ref: ImageRef,
        /// Size of the node to create
        size: (f32, f32),
        /// Last known pointer position
        pointer: (f32, f32),
    },
    /// An existing node is being relocated.
    DraggingNode {
        /// The dragged node
        node: NodeId,
        /// Position before the drag started
        origin: (f32, f32),
        /// Pointer position relative to the node's top-left corner
        grab_offset: (f32, f32),
    },
    /// An existing node is hovering over another node; release toggles the link.
    PendingToggleTarget {
        /// The dragged node
        node: NodeId,
        /// Position before the drag started
        origin: (f32, f32),
        /// Pointer position relative to the node's top-left corner
        grab_offset: (f32, f32),
        /// The node under the pointer
        target: NodeId,
    },
}

/// The effect a handled event had on the board.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Nothing changed.
    None,
    /// A drag of an existing node started.
    DragStarted(NodeId),
    /// A drag of an external image started.
    NewDragStarted,
    /// A dropped image became a node.
    NodeCreated(NodeId),
    /// A node was released over empty canvas.
    NodeMoved {
        /// The moved node
        id: NodeId,
        /// Position before the drag
        from: (f32, f32),
        /// Position after the drag
        to: (f32, f32),
    },
    /// A node was dropped onto another node; the node went back to its origin.
    ConnectionToggled {
        /// The dragged node
        a: NodeId,
        /// The drop target
        b: NodeId,
        /// Whether the pair is connected afterwards
        connected: bool,
    },
    /// An external drag ended without creating a node.
    Discarded,
    /// A node drag was cancelled and the node returned to its origin.
    Reverted(NodeId),
    /// The dragged node disappeared mid-gesture; the gesture was dropped.
    Aborted(NodeId),
    /// The board refused the committed effect.
    Rejected(BoardError),
}

fn sub(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    (a.0 - b.0, a.1 - b.1)
}

/// Applies one event to one state.
///
/// Returns the next state and the outcome. Events that make no sense in the
/// current state (a second press mid-drag, a move while idle) leave the state
/// unchanged and report [`DragOutcome::None`].
pub fn transition(
    state: DragState,
    board: &mut Board,
    event: PointerEvent,
) -> (DragState, DragOutcome) {
    match (state, event) {
        (
            DragState::Idle,
            PointerEvent::ExternalDragStarted {
                image_ref,
                size,
                pos,
            },
        ) => (
            DragState::DraggingNew {
                image_ref,
                size,
                pointer: pos,
            },
            DragOutcome::NewDragStarted,
        ),

        (DragState::Idle, PointerEvent::PointerDown { pos }) => {
            let Some((node, origin)) = board.hit_test(pos, None).map(|n| (n.id, n.position)) else {
                return (DragState::Idle, DragOutcome::None);
            };
            board.bring_to_front(node);
            (
                DragState::DraggingNode {
                    node,
                    origin,
                    grab_offset: sub(pos, origin),
                },
                DragOutcome::DragStarted(node),
            )
        }

        (
            DragState::DraggingNew {
                image_ref, size, ..
            },
            PointerEvent::PointerMove { pos },
        ) => (
            DragState::DraggingNew {
                image_ref,
                size,
                pointer: pos,
            },
            DragOutcome::None,
        ),

        (
            DragState::DraggingNew {
                image_ref, size, ..
            },
            PointerEvent::PointerUp { pos, on_canvas },
        ) => {
            if !on_canvas {
                debug!("Discarded drop of {image_ref} outside the canvas");
                return (DragState::Idle, DragOutcome::Discarded);
            }
            let position = (pos.0 - size.0 / 2.0, pos.1 - size.1 / 2.0);
            match board.insert_node(image_ref, position, size) {
                Ok(id) => (DragState::Idle, DragOutcome::NodeCreated(id)),
                Err(err) => (DragState::Idle, DragOutcome::Rejected(err)),
            }
        }

        (DragState::DraggingNew { .. }, PointerEvent::Cancel) => {
            (DragState::Idle, DragOutcome::Discarded)
        }

        (
            DragState::DraggingNode {
                node,
                origin,
                grab_offset,
            }
            | DragState::PendingToggleTarget {
                node,
                origin,
                grab_offset,
                ..
            },
            PointerEvent::PointerMove { pos },
        ) => {
            if !board.move_node(node, sub(pos, grab_offset)) {
                return (DragState::Idle, DragOutcome::Aborted(node));
            }
            let next = match board.hit_test(pos, Some(node)) {
                Some(target) => DragState::PendingToggleTarget {
                    node,
                    origin,
                    grab_offset,
                    target: target.id,
                },
                None => DragState::DraggingNode {
                    node,
                    origin,
                    grab_offset,
                },
            };
            (next, DragOutcome::None)
        }

        (
            DragState::DraggingNode {
                node,
                origin,
                grab_offset,
            }
            | DragState::PendingToggleTarget {
                node,
                origin,
                grab_offset,
                ..
            },
            PointerEvent::PointerUp { pos, on_canvas },
        ) => {
            if board.node(node).is_none() {
                return (DragState::Idle, DragOutcome::Aborted(node));
            }
            if !on_canvas {
                board.move_node(node, origin);
                return (DragState::Idle, DragOutcome::Reverted(node));
            }
            match board.hit_test(pos, Some(node)).map(|n| n.id) {
                Some(target) => {
                    board.move_node(node, origin);
                    let outcome = match board.toggle_connection(node, target) {
                        Ok(connected) => DragOutcome::ConnectionToggled {
                            a: node,
                            b: target,
                            connected,
                        },
                        Err(err) => DragOutcome::Rejected(err),
                    };
                    (DragState::Idle, outcome)
                }
                None => {
                    let to = sub(pos, grab_offset);
                    board.move_node(node, to);
                    (
                        DragState::Idle,
                        DragOutcome::NodeMoved {
                            id: node,
                            from: origin,
                            to,
                        },
                    )
                }
            }
        }

        (
            DragState::DraggingNode { node, origin, .. }
            | DragState::PendingToggleTarget { node, origin, .. },
            PointerEvent::Cancel,
        ) => {
            if board.move_node(node, origin) {
                (DragState::Idle, DragOutcome::Reverted(node))
            } else {
                (DragState::Idle, DragOutcome::Aborted(node))
            }
        }

        (state, _) => (state, DragOutcome::None),
    }
}

/// Owns the current [`DragState`] and feeds events through [`transition`].
#[derive(Debug, Clone, Default)]
pub struct DragMachine {
    state: DragState,
}

impl DragMachine {
    /// Creates a machine in the `Idle` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Whether a drag session is in progress.
    pub fn is_active(&self) -> bool {
        self.state != DragState::Idle
    }

    /// The existing node being dragged, if any.
    pub fn dragged_node(&self) -> Option<NodeId> {
        match self.state {
            DragState::DraggingNode { node, .. } | DragState::PendingToggleTarget { node, .. } => {
                Some(node)
            }
            _ => None,
        }
    }

    /// The node a release would toggle a connection with, if any.
    pub fn toggle_target(&self) -> Option<NodeId> {
        match self.state {
            DragState::PendingToggleTarget { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Processes one event against `board`.
    pub fn handle(&mut self, board: &mut Board, event: PointerEvent) -> DragOutcome {
        let state = std::mem::take(&mut self.state);
        let (next, outcome) = transition(state, board, event);
        if outcome != DragOutcome::None {
            debug!("Drag outcome {outcome:?}, now {next:?}");
        }
        self.state = next;
        outcome
    }

    /// Deletes a node, discarding any gesture in progress.
    ///
    /// A node dragged by the discarded gesture (if it survives the delete)
    /// returns to where the drag started.
    pub fn remove_node(
        &mut self,
        board: &mut Board,
        id: NodeId,
    ) -> Result<(BoardNode, Vec<NodePair>), BoardError> {
        match std::mem::take(&mut self.state) {
            DragState::DraggingNode { node, origin, .. }
            | DragState::PendingToggleTarget { node, origin, .. }
                if node != id =>
            {
                board.move_node(node, origin);
            }
            _ => {}
        }
        board.remove_node(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: (f32, f32) = (40.0, 40.0);

    /// A at (0,0) and B at (50,0), both 40x40, with B on top.
    fn board_ab() -> (Board, NodeId, NodeId) {
        let mut board = Board::new();
        let a = board.insert_node("a.png".into(), (0.0, 0.0), SIZE).unwrap();
        let b = board.insert_node("b.png".into(), (50.0, 0.0), SIZE).unwrap();
        (board, a, b)
    }

    fn down(pos: (f32, f32)) -> PointerEvent {
        PointerEvent::PointerDown { pos }
    }

    fn moved(pos: (f32, f32)) -> PointerEvent {
        PointerEvent::PointerMove { pos }
    }

    fn up(pos: (f32, f32)) -> PointerEvent {
        PointerEvent::PointerUp {
            pos,
            on_canvas: true,
        }
    }

    fn external(pos: (f32, f32)) -> PointerEvent {
        PointerEvent::ExternalDragStarted {
            image_ref: "new.png".into(),
            size: SIZE,
            pos,
        }
    }

    #[test]
    fn idle_pointer_down_on_empty_canvas_stays_idle() {
        let (mut board, _, _) = board_ab();
        let before = board.clone();

        let (state, outcome) = transition(DragState::Idle, &mut board, down((300.0, 300.0)));

        assert_eq!(state, DragState::Idle);
        assert_eq!(outcome, DragOutcome::None);
        assert_eq!(board, before);
    }

    #[test]
    fn idle_pointer_down_on_node_starts_drag_and_raises_it() {
        let (mut board, a, b) = board_ab();

        let (state, outcome) = transition(DragState::Idle, &mut board, down((10.0, 15.0)));

        assert_eq!(outcome, DragOutcome::DragStarted(a));
        assert_eq!(
            state,
            DragState::DraggingNode {
                node: a,
                origin: (0.0, 0.0),
                grab_offset: (10.0, 15.0),
            }
        );
        assert!(board.node(a).unwrap().z_order > board.node(b).unwrap().z_order);
    }

    #[test]
    fn external_drop_on_canvas_creates_centred_node() {
        let (mut board, _, _) = board_ab();
        let mut machine = DragMachine::new();

        assert_eq!(
            machine.handle(&mut board, external((200.0, 200.0))),
            DragOutcome::NewDragStarted
        );
        machine.handle(&mut board, moved((300.0, 300.0)));
        let outcome = machine.handle(&mut board, up((300.0, 300.0)));

        let DragOutcome::NodeCreated(id) = outcome else {
            panic!("expected a node to be created, got {outcome:?}");
        };
        let node = board.node(id).unwrap();
        assert_eq!(node.position, (280.0, 280.0));
        assert_eq!(node.size, SIZE);
        assert_eq!(node.image_ref.as_str(), "new.png");
        assert!(!machine.is_active());
        assert_eq!(board.nodes().len(), 3);
    }

    #[test]
    fn external_drop_with_invalid_size_is_rejected() {
        let (mut board, _, _) = board_ab();
        let before = board.clone();
        let mut machine = DragMachine::new();

        machine.handle(
            &mut board,
            PointerEvent::ExternalDragStarted {
                image_ref: "bad.png".into(),
                size: (-5.0, f32::INFINITY),
                pos: (200.0, 200.0),
            },
        );
        let outcome = machine.handle(&mut board, up((200.0, 200.0)));

        assert!(matches!(
            outcome,
            DragOutcome::Rejected(BoardError::MalformedState(_))
        ));
        assert!(!machine.is_active());
        assert_eq!(board, before);
    }

    #[test]
    fn external_drop_outside_canvas_is_discarded() {
        let (mut board, _, _) = board_ab();
        let mut machine = DragMachine::new();

        machine.handle(&mut board, external((200.0, 200.0)));
        let outcome = machine.handle(
            &mut board,
            PointerEvent::PointerUp {
                pos: (-10.0, -10.0),
                on_canvas: false,
            },
        );

        assert_eq!(outcome, DragOutcome::Discarded);
        assert_eq!(board.nodes().len(), 2);
        assert!(!machine.is_active());
    }

    #[test]
    fn external_drag_cancel_is_discarded() {
        let (mut board, _, _) = board_ab();
        let mut machine = DragMachine::new();

        machine.handle(&mut board, external((200.0, 200.0)));
        assert_eq!(machine.handle(&mut board, PointerEvent::Cancel), DragOutcome::Discarded);
        assert_eq!(board.nodes().len(), 2);
    }

    #[test]
    fn dragging_node_tracks_pointer_with_grab_offset() {
        let (mut board, a, _) = board_ab();
        let mut machine = DragMachine::new();

        machine.handle(&mut board, down((10.0, 10.0)));
        machine.handle(&mut board, moved((210.0, 110.0)));

        assert_eq!(board.node(a).unwrap().position, (200.0, 100.0));
        assert_eq!(machine.dragged_node(), Some(a));
        assert_eq!(machine.toggle_target(), None);
    }

    #[test]
    fn release_over_empty_canvas_commits_move() {
        let (mut board, a, _) = board_ab();
        let mut machine = DragMachine::new();

        machine.handle(&mut board, down((10.0, 10.0)));
        machine.handle(&mut board, moved((210.0, 110.0)));
        let outcome = machine.handle(&mut board, up((310.0, 210.0)));

        assert_eq!(
            outcome,
            DragOutcome::NodeMoved {
                id: a,
                from: (0.0, 0.0),
                to: (300.0, 200.0),
            }
        );
        assert_eq!(board.node(a).unwrap().position, (300.0, 200.0));
        assert!(!machine.is_active());
    }

    #[test]
    fn hovering_another_node_enters_pending_toggle() {
        let (mut board, a, b) = board_ab();
        let mut machine = DragMachine::new();

        machine.handle(&mut board, down((10.0, 10.0)));
        machine.handle(&mut board, moved((70.0, 20.0)));

        assert_eq!(machine.toggle_target(), Some(b));
        assert_eq!(machine.dragged_node(), Some(a));
        // position tracking continues while the affordance is shown
        assert_eq!(board.node(a).unwrap().position, (60.0, 10.0));
    }

    #[test]
    fn moving_away_from_target_cancels_affordance() {
        let (mut board, _, _) = board_ab();
        let mut machine = DragMachine::new();

        machine.handle(&mut board, down((10.0, 10.0)));
        machine.handle(&mut board, moved((70.0, 20.0)));
        machine.handle(&mut board, moved((300.0, 300.0)));

        assert!(matches!(machine.state(), DragState::DraggingNode { .. }));
        assert_eq!(machine.toggle_target(), None);
    }

    #[test]
    fn pending_toggle_retargets_to_new_node() {
        let (mut board, _, _) = board_ab();
        let c = board.insert_node("c.png".into(), (200.0, 0.0), SIZE).unwrap();
        let mut machine = DragMachine::new();

        machine.handle(&mut board, down((10.0, 10.0)));
        machine.handle(&mut board, moved((70.0, 20.0)));
        machine.handle(&mut board, moved((220.0, 20.0)));

        assert_eq!(machine.toggle_target(), Some(c));
    }

    #[test]
    fn release_over_target_toggles_and_reverts_position() {
        let (mut board, a, b) = board_ab();
        let mut machine = DragMachine::new();

        machine.handle(&mut board, down((10.0, 10.0)));
        machine.handle(&mut board, moved((70.0, 20.0)));
        let outcome = machine.handle(&mut board, up((70.0, 20.0)));

        assert_eq!(
            outcome,
            DragOutcome::ConnectionToggled {
                a,
                b,
                connected: true,
            }
        );
        assert!(board.has_connection(a, b));
        assert_eq!(board.node(a).unwrap().position, (0.0, 0.0));
        assert!(!machine.is_active());
    }

    #[test]
    fn dragging_b_onto_a_breaks_link_made_by_dragging_a_onto_b() {
        let (mut board, a, b) = board_ab();
        let mut machine = DragMachine::new();

        // A onto B
        machine.handle(&mut board, down((10.0, 10.0)));
        machine.handle(&mut board, moved((70.0, 20.0)));
        machine.handle(&mut board, up((70.0, 20.0)));
        assert!(board.has_connection(a, b));

        // B onto A
        machine.handle(&mut board, down((60.0, 10.0)));
        assert_eq!(machine.dragged_node(), Some(b));
        machine.handle(&mut board, moved((20.0, 20.0)));
        assert_eq!(machine.toggle_target(), Some(a));
        let outcome = machine.handle(&mut board, up((20.0, 20.0)));

        assert_eq!(
            outcome,
            DragOutcome::ConnectionToggled {
                a: b,
                b: a,
                connected: false,
            }
        );
        assert!(!board.has_connection(a, b));
        assert_eq!(board.node(b).unwrap().position, (50.0, 0.0));
    }

    #[test]
    fn release_off_canvas_reverts_node() {
        let (mut board, a, _) = board_ab();
        let mut machine = DragMachine::new();

        machine.handle(&mut board, down((10.0, 10.0)));
        machine.handle(&mut board, moved((500.0, 500.0)));
        let outcome = machine.handle(
            &mut board,
            PointerEvent::PointerUp {
                pos: (900.0, 900.0),
                on_canvas: false,
            },
        );

        assert_eq!(outcome, DragOutcome::Reverted(a));
        assert_eq!(board.node(a).unwrap().position, (0.0, 0.0));
    }

    #[test]
    fn cancel_reverts_without_graph_mutation() {
        let (mut board, a, _) = board_ab();
        let mut machine = DragMachine::new();

        machine.handle(&mut board, down((10.0, 10.0)));
        machine.handle(&mut board, moved((70.0, 20.0)));
        let outcome = machine.handle(&mut board, PointerEvent::Cancel);

        assert_eq!(outcome, DragOutcome::Reverted(a));
        assert_eq!(board.node(a).unwrap().position, (0.0, 0.0));
        assert!(board.connections().is_empty());
        assert!(!machine.is_active());
    }

    #[test]
    fn deleting_dragged_node_mid_drag_returns_to_idle() {
        let (mut board, a, b) = board_ab();
        board.toggle_connection(a, b).unwrap();
        let mut machine = DragMachine::new();

        machine.handle(&mut board, down((10.0, 10.0)));
        machine.remove_node(&mut board, a).unwrap();

        assert!(!machine.is_active());
        assert!(board.connections().is_empty());
        assert_eq!(machine.handle(&mut board, up((60.0, 10.0))), DragOutcome::None);
    }

    #[test]
    fn deleting_target_mid_drag_reverts_dragged_node() {
        let (mut board, a, b) = board_ab();
        let mut machine = DragMachine::new();

        machine.handle(&mut board, down((10.0, 10.0)));
        machine.handle(&mut board, moved((70.0, 20.0)));
        machine.remove_node(&mut board, b).unwrap();

        assert!(!machine.is_active());
        assert_eq!(board.node(a).unwrap().position, (0.0, 0.0));
        assert!(board.connections().is_empty());
    }

    #[test]
    fn vanished_node_aborts_gesture() {
        let (mut board, a, _) = board_ab();
        let mut machine = DragMachine::new();

        machine.handle(&mut board, down((10.0, 10.0)));
        board.remove_node(a).unwrap();

        assert_eq!(machine.handle(&mut board, moved((20.0, 20.0))), DragOutcome::Aborted(a));
        assert!(!machine.is_active());
    }

    #[test]
    fn stray_events_are_ignored() {
        let (mut board, _, _) = board_ab();
        let before = board.clone();

        let (state, outcome) = transition(DragState::Idle, &mut board, up((10.0, 10.0)));
        assert_eq!((state, outcome), (DragState::Idle, DragOutcome::None));

        let (state, outcome) = transition(DragState::Idle, &mut board, PointerEvent::Cancel);
        assert_eq!((state, outcome), (DragState::Idle, DragOutcome::None));
        assert_eq!(board, before);
    }
}
