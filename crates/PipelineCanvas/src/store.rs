//! # Graph State Store
//!
//! `GraphState` keeps nodes and edges in flat arenas (`SlotMap`) with a
//! string-id index, because every id the canvas sees comes from the backend or
//! from a locally generated UUID.
//!
//! `GraphStore` wraps the state in an `Arc` and publishes a new snapshot per
//! batch, so a renderer holding the previous snapshot never observes a
//! half-applied batch.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::changes::{EdgeChange, NodeChange};
use crate::model::{CanvasEdge, CanvasNode, EdgeKey, NodeKey};

/// The entire state of the Graph.
///
/// It is responsible for data storage, but not for layout or interaction logic.
/// The id index is not serialized; it is rebuilt when a state is decoded.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "StoredGraph")]
pub struct GraphState {
    /// Arena for Nodes.
    pub nodes: SlotMap<NodeKey, CanvasNode>,
    /// Arena for Edges.
    pub edges: SlotMap<EdgeKey, CanvasEdge>,
    /// Draw order cache.
    /// Lower index = Background/Bottom.
    /// Higher index = Foreground/Top.
    pub draw_order: Vec<NodeKey>,
    /// Insertion order of edges.
    pub edge_order: Vec<EdgeKey>,
    /// Index for O(1) id to NodeKey lookup.
    #[serde(skip)]
    pub node_index: HashMap<String, NodeKey>,
}

/// Serialized form of a `GraphState`.
#[derive(Deserialize)]
struct StoredGraph {
    nodes: SlotMap<NodeKey, CanvasNode>,
    #[serde(default)]
    edges: SlotMap<EdgeKey, CanvasEdge>,
    #[serde(default)]
    draw_order: Vec<NodeKey>,
    #[serde(default)]
    edge_order: Vec<EdgeKey>,
}

impl From<StoredGraph> for GraphState {
    fn from(stored: StoredGraph) -> Self {
        let StoredGraph {
            nodes,
            edges,
            mut draw_order,
            mut edge_order,
        } = stored;

        // Orders may be stale or missing; every live key appears exactly once
        let mut seen = HashSet::new();
        draw_order.retain(|key| nodes.contains_key(*key) && seen.insert(*key));
        draw_order.extend(nodes.keys().filter(|key| !seen.contains(key)));
        let mut seen = HashSet::new();
        edge_order.retain(|key| edges.contains_key(*key) && seen.insert(*key));
        edge_order.extend(edges.keys().filter(|key| !seen.contains(key)));

        let node_index = nodes
            .iter()
            .map(|(key, node)| (node.id.clone(), key))
            .collect();

        Self {
            nodes,
            edges,
            draw_order,
            edge_order,
            node_index,
        }
    }
}

impl GraphState {
    /// Builds a state from already positioned nodes and edges.
    pub fn from_parts(nodes: Vec<CanvasNode>, edges: Vec<CanvasEdge>) -> Self {
        let mut state = Self::default();
        for node in nodes {
            state.insert_node(node);
        }
        for edge in edges {
            state.insert_edge(edge);
        }
        state
    }

    pub fn node(&self, id: &str) -> Option<&CanvasNode> {
        self.node_index.get(id).and_then(|&key| self.nodes.get(key))
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut CanvasNode> {
        let key = *self.node_index.get(id)?;
        self.nodes.get_mut(key)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Nodes in draw order.
    pub fn nodes(&self) -> impl Iterator<Item = &CanvasNode> {
        self.draw_order.iter().filter_map(|&key| self.nodes.get(key))
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &CanvasEdge> {
        self.edge_order.iter().filter_map(|&key| self.edges.get(key))
    }

    pub fn edge(&self, id: &str) -> Option<&CanvasEdge> {
        self.edges().find(|edge| edge.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Inserts a node and updates the id index.
    ///
    /// A node whose id is already present replaces the existing one in place,
    /// keeping its slot in the draw order.
    pub fn insert_node(&mut self, node: CanvasNode) -> NodeKey {
        if let Some(&key) = self.node_index.get(&node.id)
            && let Some(existing) = self.nodes.get_mut(key)
        {
            tracing::debug!(node_id = %node.id, "Replacing node with duplicate id");
            *existing = node;
            return key;
        }
        let id = node.id.clone();
        let key = self.nodes.insert(node);
        self.node_index.insert(id, key);
        self.draw_order.push(key);
        key
    }

    /// Removes a node, updates the id index and drops every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Option<CanvasNode> {
        let key = self.node_index.remove(id)?;
        let node = self.nodes.remove(key)?;
        self.draw_order.retain(|&k| k != key);

        let incident: Vec<EdgeKey> = self
            .edges
            .iter()
            .filter(|(_, edge)| edge.source == id || edge.target == id)
            .map(|(key, _)| key)
            .collect();
        for edge_key in incident {
            self.edges.remove(edge_key);
        }
        self.edge_order.retain(|k| self.edges.contains_key(*k));

        Some(node)
    }

    pub fn insert_edge(&mut self, edge: CanvasEdge) -> EdgeKey {
        let key = self.edges.insert(edge);
        self.edge_order.push(key);
        key
    }

    /// Removes every edge carrying `id`. Returns how many were removed.
    pub fn remove_edge(&mut self, id: &str) -> usize {
        let before = self.edges.len();
        self.edges.retain(|_, edge| edge.id != id);
        self.edge_order.retain(|k| self.edges.contains_key(*k));
        before - self.edges.len()
    }

    /// Moves a node to the front of the draw order.
    pub fn bring_to_front(&mut self, id: &str) {
        if let Some(&key) = self.node_index.get(id) {
            self.draw_order.retain(|&k| k != key);
            self.draw_order.push(key);
        }
    }
}

/// Copy-on-write holder of the current `GraphState` snapshot.
#[derive(Clone, Debug, Default)]
pub struct GraphStore {
    state: Arc<GraphState>,
}

impl GraphStore {
    pub fn new(state: GraphState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// The current snapshot. It stays valid (and unchanged) after later batches.
    pub fn snapshot(&self) -> Arc<GraphState> {
        Arc::clone(&self.state)
    }

    pub fn state(&self) -> &GraphState {
        &self.state
    }

    /// Applies a batch of node changes and publishes the result as one snapshot.
    pub fn apply_node_changes(&mut self, changes: Vec<NodeChange>) {
        if changes.is_empty() {
            return;
        }
        let state = Arc::make_mut(&mut self.state);
        for change in changes {
            change.apply(state);
        }
    }

    /// Applies a batch of edge changes and publishes the result as one snapshot.
    pub fn apply_edge_changes(&mut self, changes: Vec<EdgeChange>) {
        if changes.is_empty() {
            return;
        }
        let state = Arc::make_mut(&mut self.state);
        for change in changes {
            change.apply(state);
        }
    }

    /// Appends fully-formed nodes whose positions were computed by the caller.
    pub fn add_nodes(&mut self, nodes: impl IntoIterator<Item = CanvasNode>) {
        let state = Arc::make_mut(&mut self.state);
        for node in nodes {
            state.insert_node(node);
        }
    }

    /// Replaces the whole graph.
    pub fn replace(&mut self, nodes: Vec<CanvasNode>, edges: Vec<CanvasEdge>) {
        self.state = Arc::new(GraphState::from_parts(nodes, edges));
    }

    /// Removes a node and its incident edges.
    pub fn remove_node(&mut self, id: &str) -> Option<CanvasNode> {
        if !self.state.contains_node(id) {
            return None;
        }
        Arc::make_mut(&mut self.state).remove_node(id)
    }

    pub fn bring_to_front(&mut self, id: &str) {
        if self.state.contains_node(id) {
            Arc::make_mut(&mut self.state).bring_to_front(id);
        }
    }

    pub fn node(&self, id: &str) -> Option<&CanvasNode> {
        self.state.node(id)
    }

    pub fn is_empty(&self) -> bool {
        self.state.node_count() == 0 && self.state.edge_count() == 0
    }
}
