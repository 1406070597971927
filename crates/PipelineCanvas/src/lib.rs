//! # PipelineCanvas
//!
//! `pipeline_canvas` is the headless core of the pipeline editor. It owns the
//! visual graph (nodes, edges, positions) and the rules for mutating it, while
//! rendering and backend I/O are left to the host.
//!
//! ## Core Architecture
//! - **Model (`src/model.rs`)**: Source-model and operation nodes, edges.
//! - **Store (`src/store.rs`)**: Arena-backed graph state published as immutable snapshots.
//! - **Layout (`src/layout.rs`)**: Rank-based positions for freshly loaded graphs.
//! - **Interaction (`src/interaction.rs`)**: Gesture handlers emitting `LogicEvent`s.

pub mod changes;
pub mod config;
pub mod interaction;
pub mod layout;
pub mod math;
pub mod model;
pub mod overlap;
pub mod placement;
pub mod store;
pub mod view;

use std::sync::Arc;

use glam::Vec2;

use changes::{EdgeChange, NodeChange};
use interaction::Connection;
use model::{CanvasEdge, CanvasNode, NodeData, OperationData, SourceModelData};
use store::{GraphState, GraphStore};
use view::{Transform, View};

// Re-exports for convenience
pub use config::{CanvasConfig, LayoutConfig, LayoutDirection};
pub use interaction::LogicEvent;
pub use layout::LayoutError;

/// The main entry point for the library.
///
/// The `Canvas` struct holds the graph store, the viewport and the configuration.
/// It is intended to be instantiated once per editor and reused across refreshes.
pub struct Canvas {
    /// Configuration settings.
    pub config: CanvasConfig,
    /// The Viewport system handling coordinate transforms.
    pub view: View,
    /// The current graph.
    pub store: GraphStore,
}

impl Canvas {
    /// Creates a new, empty Canvas with the given configuration.
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            config,
            view: View::new(Transform::default(), Vec2::new(800.0, 600.0)), // Default 800x600, host should update
            store: GraphStore::default(),
        }
    }

    /// Updates the viewport size (e.g., on window resize).
    pub fn update_viewport_size(&mut self, size: Vec2) {
        self.view.viewport_size = size;
    }

    pub fn snapshot(&self) -> Arc<GraphState> {
        self.store.snapshot()
    }

    /// Lays the graph out and replaces the current one with it.
    ///
    /// On error the current graph is left untouched.
    pub fn load(
        &mut self,
        nodes: Vec<CanvasNode>,
        edges: Vec<CanvasEdge>,
    ) -> Result<(), LayoutError> {
        let nodes = layout::layout(nodes, &edges, self.config.direction, &self.config.layout)?;
        self.store.replace(nodes, edges);
        Ok(())
    }

    /// Places a source node under the rightmost node and recenters the view on it.
    pub fn add_source_node(&mut self, data: SourceModelData) -> Vec2 {
        let position =
            placement::next_node_position(self.store.state().nodes(), self.config.placement_gap);
        self.store
            .add_nodes([CanvasNode::new(NodeData::SourceModel(data), position)]);
        self.view.center_on(position, self.config.focus_zoom);
        position
    }

    /// Places an operation node at the configured default position.
    ///
    /// No overlap check happens here; the user is expected to drag it into place.
    pub fn add_operation_node(&mut self, data: OperationData) -> Vec2 {
        let position = self.config.operation_position;
        self.store
            .add_nodes([CanvasNode::new(NodeData::Operation(data), position)]);
        position
    }

    pub fn remove_node(&mut self, id: &str) -> Option<CanvasNode> {
        self.store.remove_node(id)
    }

    pub fn on_nodes_change(&mut self, changes: Vec<NodeChange>) -> Vec<LogicEvent> {
        let mut events = Vec::new();
        interaction::on_nodes_change(&mut self.store, changes, &mut events);
        events
    }

    pub fn on_edges_change(&mut self, changes: Vec<EdgeChange>) -> Vec<LogicEvent> {
        let mut events = Vec::new();
        interaction::on_edges_change(&mut self.store, changes, &mut events);
        events
    }

    pub fn on_connect(&mut self, connection: Connection) -> Vec<LogicEvent> {
        let mut events = Vec::new();
        interaction::on_connect(&mut self.store, connection, &mut events);
        events
    }

    pub fn on_node_drag_stop(&mut self, node_id: &str) -> Vec<LogicEvent> {
        let mut events = Vec::new();
        interaction::on_node_drag_stop(&mut self.store, &self.config, node_id, &mut events);
        events
    }

    pub fn on_node_click(&mut self, node_id: &str) -> Vec<LogicEvent> {
        let mut events = Vec::new();
        interaction::on_node_click(&mut self.store, node_id, &mut events);
        events
    }

    pub fn on_pane_click(&mut self) -> Vec<LogicEvent> {
        let mut events = Vec::new();
        interaction::on_pane_click(&mut events);
        events
    }
}
