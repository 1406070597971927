//! # Change Batches
//!
//! Structured operations the renderer reports back to the canvas. A batch is
//! applied through [`GraphStore`](crate::store::GraphStore), which publishes
//! the result as a single snapshot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::model::{CanvasEdge, CanvasNode, NodeFlags};
use crate::store::GraphState;

/// A single node mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeChange {
    Add {
        item: CanvasNode,
    },
    Remove {
        id: String,
    },
    /// Drag progress. `position` is absent when only the dragging state changes.
    Position {
        id: String,
        #[serde(default)]
        position: Option<Vec2>,
        #[serde(default)]
        dragging: bool,
    },
    Select {
        id: String,
        selected: bool,
    },
    /// The renderer measured the node.
    Dimensions {
        id: String,
        #[serde(default)]
        dimensions: Option<Vec2>,
    },
}

impl NodeChange {
    pub(crate) fn apply(self, state: &mut GraphState) {
        match self {
            NodeChange::Add { item } => {
                state.insert_node(item);
            }
            NodeChange::Remove { id } => {
                if state.remove_node(&id).is_none() {
                    tracing::debug!(node_id = %id, "Ignoring removal of unknown node");
                }
            }
            NodeChange::Position {
                id,
                position,
                dragging,
            } => match state.node_mut(&id) {
                Some(node) => {
                    if let Some(position) = position {
                        node.position = position;
                    }
                    node.flags.set(NodeFlags::DRAGGING, dragging);
                }
                None => tracing::debug!(node_id = %id, "Ignoring move of unknown node"),
            },
            NodeChange::Select { id, selected } => match state.node_mut(&id) {
                Some(node) => node.flags.set(NodeFlags::SELECTED, selected),
                None => tracing::debug!(node_id = %id, "Ignoring selection of unknown node"),
            },
            NodeChange::Dimensions { id, dimensions } => match state.node_mut(&id) {
                Some(node) => {
                    if dimensions.is_some() {
                        node.size = dimensions;
                    }
                }
                None => tracing::debug!(node_id = %id, "Ignoring dimensions of unknown node"),
            },
        }
    }
}

/// A single edge mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EdgeChange {
    Add { item: CanvasEdge },
    Remove { id: String },
    Select { id: String, selected: bool },
}

impl EdgeChange {
    pub(crate) fn apply(self, state: &mut GraphState) {
        match self {
            EdgeChange::Add { item } => {
                state.insert_edge(item);
            }
            EdgeChange::Remove { id } => {
                if state.remove_edge(&id) == 0 {
                    tracing::debug!(edge_id = %id, "Ignoring removal of unknown edge");
                }
            }
            EdgeChange::Select { id, selected } => {
                let mut found = false;
                for (_, edge) in state.edges.iter_mut() {
                    if edge.id == id {
                        edge.selected = selected;
                        found = true;
                    }
                }
                if !found {
                    tracing::debug!(edge_id = %id, "Ignoring selection of unknown edge");
                }
            }
        }
    }
}
