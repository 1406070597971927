//! Wire shapes of the graph endpoint and their mapping onto canvas types.

use glam::Vec2;
use pipeline_canvas::model::{CanvasEdge, CanvasNode, EdgeMarker, NodeData, edge_id};
use serde::{Deserialize, Serialize};

/// Body of `GET transform/dbt_project/graph/`.
///
/// Node records carry their own `type` discriminator and map straight onto
/// [`NodeData`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
    #[serde(default)]
    pub nodes: Vec<NodeData>,
    #[serde(default)]
    pub edges: Vec<BackendEdge>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendEdge {
    #[serde(default)]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
}

impl BackendEdge {
    /// Rendering-ready edge with the arrow marker attached.
    pub fn into_canvas_edge(self) -> CanvasEdge {
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| edge_id(&self.source, &self.target));
        CanvasEdge {
            id,
            source: self.source,
            target: self.target,
            marker_end: Some(EdgeMarker::default()),
            selected: false,
        }
    }
}

impl GraphPayload {
    /// Splits the payload into unpositioned canvas nodes and edges, ready for layout.
    pub fn into_canvas(self) -> (Vec<CanvasNode>, Vec<CanvasEdge>) {
        let nodes = self
            .nodes
            .into_iter()
            .map(|data| CanvasNode::new(data, Vec2::ZERO))
            .collect();
        let edges = self
            .edges
            .into_iter()
            .map(BackendEdge::into_canvas_edge)
            .collect();
        (nodes, edges)
    }
}
