use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::changes::{EdgeChange, NodeChange};
use crate::config::CanvasConfig;
use crate::model::CanvasEdge;
use crate::overlap;
use crate::store::GraphStore;

/// Events emitted by the Canvas logic to the host application.
#[derive(Clone, Debug, PartialEq)]
pub enum LogicEvent {
    /// A user-drawn connection produced a new edge.
    EdgeConnected {
        id: String,
        source: String,
        target: String,
    },
    /// A dropped node settled at its final position.
    NodeMoved { id: String, position: Vec2 },
    /// A node was clicked and is now the active configuration context.
    NodeActivated { id: String },
    /// The empty pane was clicked. Any open configuration or preview should close.
    PaneClicked,
    /// The graph visual state has changed, requiring a repaint.
    RepaintNeeded,
}

/// A connection gesture as reported by the renderer.
///
/// Either end is `None` when the user released the wire over nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub source: Option<String>,
    pub target: Option<String>,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            target: Some(target.into()),
        }
    }
}

/// Passes renderer-reported node changes through to the store.
pub fn on_nodes_change(
    store: &mut GraphStore,
    changes: Vec<NodeChange>,
    events: &mut Vec<LogicEvent>,
) {
    tracing::debug!(count = changes.len(), ?changes, "Node changes");
    store.apply_node_changes(changes);
    events.push(LogicEvent::RepaintNeeded);
}

/// Passes renderer-reported edge changes through to the store.
pub fn on_edges_change(
    store: &mut GraphStore,
    changes: Vec<EdgeChange>,
    events: &mut Vec<LogicEvent>,
) {
    tracing::debug!(count = changes.len(), ?changes, "Edge changes");
    store.apply_edge_changes(changes);
    events.push(LogicEvent::RepaintNeeded);
}

/// Turns a finished connection gesture into an edge.
///
/// Gestures with a missing endpoint are dropped silently, as are connections
/// whose derived id already exists. Returns the id of the new edge.
pub fn on_connect(
    store: &mut GraphStore,
    connection: Connection,
    events: &mut Vec<LogicEvent>,
) -> Option<String> {
    let source = connection.source.filter(|id| !id.is_empty());
    let target = connection.target.filter(|id| !id.is_empty());
    let (Some(source), Some(target)) = (source, target) else {
        return None;
    };

    let edge = CanvasEdge::between(source, target);
    if store.state().edge(&edge.id).is_some() {
        tracing::debug!(edge_id = %edge.id, "Edge already exists");
        return None;
    }

    let id = edge.id.clone();
    events.push(LogicEvent::EdgeConnected {
        id: id.clone(),
        source: edge.source.clone(),
        target: edge.target.clone(),
    });
    store.apply_edge_changes(vec![EdgeChange::Add { item: edge }]);
    events.push(LogicEvent::RepaintNeeded);
    Some(id)
}

/// Nudges the dropped node off its neighbours and commits its final position.
///
/// Only the dragged node is written. Returns the committed position.
pub fn on_node_drag_stop(
    store: &mut GraphStore,
    config: &CanvasConfig,
    node_id: &str,
    events: &mut Vec<LogicEvent>,
) -> Option<Vec2> {
    let position = {
        let state = store.state();
        let Some(moved) = state.node(node_id) else {
            tracing::debug!(node_id, "Drag stopped on unknown node");
            return None;
        };
        overlap::resolve(moved, state.nodes(), config.overlap_gap)
    };

    store.apply_node_changes(vec![NodeChange::Position {
        id: node_id.to_string(),
        position: Some(position),
        dragging: false,
    }]);
    events.push(LogicEvent::NodeMoved {
        id: node_id.to_string(),
        position,
    });
    events.push(LogicEvent::RepaintNeeded);
    Some(position)
}

/// Brings the clicked node to the front and reports it as the active context.
pub fn on_node_click(store: &mut GraphStore, node_id: &str, events: &mut Vec<LogicEvent>) {
    if store.node(node_id).is_none() {
        return;
    }
    store.bring_to_front(node_id);
    events.push(LogicEvent::NodeActivated {
        id: node_id.to_string(),
    });
    events.push(LogicEvent::RepaintNeeded);
}

/// Clicking the empty pane is a notification only; the graph is not touched.
pub fn on_pane_click(events: &mut Vec<LogicEvent>) {
    events.push(LogicEvent::PaneClicked);
}
