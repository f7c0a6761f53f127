//! Pointer interaction — tells a drag from a click.
//!
//! ```text
//!            primary down on node
//!   Idle ───────────────────────────▶ Dragging { node, offset, moved }
//!    ▲                                   │  move: position = pointer - offset,
//!    │                                   │        moved = true
//!    └───────── up / global release ─────┘
//! ```
//!
//! Releasing over the node without having moved is a click. A global
//! release (pointer left the node or the window) only ends the drag. The
//! controller knows nothing about the store; the engine applies positions
//! and opens detail views from the returned values.

use serde::{Deserialize, Serialize};

use aqrobloom_domain::geometry::Point;
use aqrobloom_domain::id::NodeId;

/// Which pointer button was pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Auxiliary,
}

/// The in-progress drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub node: NodeId,
    /// `pointer - node position` at grab time.
    pub offset: Point,
    pub moved: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PointerState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Result of a pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PointerDown {
    Grabbed { node: NodeId },
    /// Only the primary button starts a drag.
    IgnoredButton,
    /// A drag is already in progress; drags never nest.
    AlreadyDragging { node: NodeId },
}

/// Result of a pointer-up or global release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Release {
    /// Released without moving.
    Clicked { node: NodeId },
    /// Released after at least one move.
    Dragged { node: NodeId },
    /// Ended by a global release before any move. No click fires.
    Abandoned { node: NodeId },
    NotDragging,
}

#[derive(Debug, Default)]
pub struct PointerController {
    state: PointerState,
}

impl PointerController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> PointerState {
        self.state
    }

    #[must_use]
    pub fn session(&self) -> Option<DragSession> {
        match self.state {
            PointerState::Idle => None,
            PointerState::Dragging(session) => Some(session),
        }
    }

    /// Whether the window-wide release listener is needed.
    #[must_use]
    pub fn global_release_armed(&self) -> bool {
        matches!(self.state, PointerState::Dragging(_))
    }

    /// Pointer pressed over `node`, currently drawn at `node_position`.
    pub fn pointer_down(
        &mut self,
        node: NodeId,
        pointer: Point,
        node_position: Point,
        button: PointerButton,
    ) -> PointerDown {
        if let PointerState::Dragging(session) = self.state {
            tracing::debug!(%node, dragging = %session.node, "pointer down ignored, drag in progress");
            return PointerDown::AlreadyDragging { node: session.node };
        }
        if button != PointerButton::Primary {
            return PointerDown::IgnoredButton;
        }
        self.state = PointerState::Dragging(DragSession {
            node,
            offset: pointer - node_position,
            moved: false,
        });
        tracing::debug!(%node, "drag started");
        PointerDown::Grabbed { node }
    }

    /// Pointer moved. Returns the dragged node and its new position.
    pub fn pointer_move(&mut self, pointer: Point) -> Option<(NodeId, Point)> {
        let PointerState::Dragging(session) = &mut self.state else {
            return None;
        };
        session.moved = true;
        Some((session.node, pointer - session.offset))
    }

    /// Pointer released over the dragged node.
    pub fn pointer_up(&mut self) -> Release {
        match std::mem::take(&mut self.state) {
            PointerState::Idle => Release::NotDragging,
            PointerState::Dragging(DragSession { node, moved: false, .. }) => {
                tracing::debug!(%node, "click");
                Release::Clicked { node }
            }
            PointerState::Dragging(DragSession { node, .. }) => {
                tracing::debug!(%node, "drag finished");
                Release::Dragged { node }
            }
        }
    }

    /// Pointer released anywhere. Never produces a click.
    pub fn release_anywhere(&mut self) -> Release {
        match std::mem::take(&mut self.state) {
            PointerState::Idle => Release::NotDragging,
            PointerState::Dragging(DragSession { node, moved: true, .. }) => {
                tracing::debug!(%node, "drag finished by global release");
                Release::Dragged { node }
            }
            PointerState::Dragging(DragSession { node, .. }) => {
                tracing::debug!(%node, "drag abandoned");
                Release::Abandoned { node }
            }
        }
    }

    /// Drop any session without reporting it.
    pub fn cancel(&mut self) {
        self.state = PointerState::Idle;
    }
}
