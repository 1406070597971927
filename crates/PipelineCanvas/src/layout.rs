//! # Layout Engine
//!
//! Rank-based (hierarchical) layout for pipeline graphs.
//!
//! Every call builds its own `petgraph` graphs and drops them on return, so
//! nothing from a previous layout can leak into the next one. The algorithm is
//! the classic layered pipeline, kept small because pipelines are mostly linear:
//!
//! 1. Longest-path ranking over a topological order.
//! 2. Dummy slots for edges that skip ranks.
//! 3. Barycenter sweeps to reduce crossings (stable sorts, no randomness).
//! 4. Coordinates: ranks along the flow axis, slots stacked across it and
//!    centered on the widest rank.

use std::cmp::Ordering;
use std::collections::HashMap;

use glam::Vec2;
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use thiserror::Error;

use crate::config::{LayoutConfig, LayoutDirection};
use crate::model::{CanvasEdge, CanvasNode};

/// Upper bound on ordering sweeps. Each sweep alternates direction.
const ORDER_PASSES: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("edge `{edge}` references unknown node `{node}`")]
    UnknownEndpoint { edge: String, node: String },
    #[error("graph is not acyclic (cycle through `{node}`)")]
    Cycle { node: String },
}

/// A slot in a rank: either a real node (by input index) or a bend point of a long edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Node(usize),
    Dummy,
}

fn dedupe_ids(nodes: Vec<CanvasNode>) -> Vec<CanvasNode> {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(nodes.len());
    let mut unique: Vec<CanvasNode> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match slots.get(&node.id) {
            Some(&slot) => {
                tracing::warn!(node_id = %node.id, "Duplicate node id, keeping the later copy");
                unique[slot] = node;
            }
            None => {
                slots.insert(node.id.clone(), unique.len());
                unique.push(node);
            }
        }
    }
    unique
}

/// Positions `nodes` according to `edges`.
///
/// Returns the input nodes, in input order, with `position` set to the
/// top-left corner of their footprint. Identical inputs always give identical
/// positions.
///
/// A repeated id keeps the slot of its first occurrence and the contents of
/// its last, the same way `GraphState::insert_node` resolves it.
pub fn layout(
    nodes: Vec<CanvasNode>,
    edges: &[CanvasEdge],
    direction: LayoutDirection,
    config: &LayoutConfig,
) -> Result<Vec<CanvasNode>, LayoutError> {
    let mut nodes = dedupe_ids(nodes);
    if nodes.is_empty() {
        return Ok(nodes);
    }

    // 1. Build the dependency graph
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(nodes.len(), edges.len());
    let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        let ix = graph.add_node(i);
        index.insert(node.id.as_str(), ix);
    }
    for edge in edges {
        let source = endpoint(&index, edge, &edge.source)?;
        let target = endpoint(&index, edge, &edge.target)?;
        graph.update_edge(source, target, ());
    }

    // 2. Rank assignment
    let order = toposort(&graph, None).map_err(|cycle| LayoutError::Cycle {
        node: nodes[graph[cycle.node_id()]].id.clone(),
    })?;
    let mut ranks = vec![0usize; graph.node_count()];
    for &ix in &order {
        ranks[ix.index()] = graph
            .neighbors_directed(ix, Direction::Incoming)
            .map(|pred| ranks[pred.index()] + 1)
            .max()
            .unwrap_or(0);
    }

    // 3. Split long edges so that every layered edge spans exactly one rank
    let mut layered: DiGraph<Slot, ()> = DiGraph::with_capacity(nodes.len(), edges.len());
    for i in 0..nodes.len() {
        layered.add_node(Slot::Node(i));
    }
    let mut slot_ranks = ranks.clone();
    for edge in graph.edge_references() {
        let mut prev = edge.source();
        for rank in ranks[edge.source().index()] + 1..ranks[edge.target().index()] {
            let dummy = layered.add_node(Slot::Dummy);
            slot_ranks.push(rank);
            layered.add_edge(prev, dummy, ());
            prev = dummy;
        }
        layered.add_edge(prev, edge.target(), ());
    }

    // 4. Ordering within ranks
    let rank_count = slot_ranks.iter().max().map_or(0, |r| r + 1);
    let mut layers: Vec<Vec<NodeIndex>> = vec![Vec::new(); rank_count];
    for ix in layered.node_indices() {
        layers[slot_ranks[ix.index()]].push(ix);
    }
    order_layers(&layered, &mut layers);

    // 5. Coordinates
    let (flow_size, cross_size) = match direction {
        LayoutDirection::LeftRight => (config.node_size.x, config.node_size.y),
        LayoutDirection::TopBottom => (config.node_size.y, config.node_size.x),
    };
    let extent = |slot: Slot| match slot {
        Slot::Node(_) => cross_size,
        Slot::Dummy => 0.0,
    };
    let separation = |slot: Slot| match slot {
        Slot::Node(_) => config.node_separation,
        Slot::Dummy => config.edge_separation,
    };

    let mut offsets: Vec<Vec<f32>> = Vec::with_capacity(layers.len());
    let mut spans: Vec<f32> = Vec::with_capacity(layers.len());
    for layer in &layers {
        let mut cursor = 0.0;
        let mut layer_offsets = Vec::with_capacity(layer.len());
        for (i, &ix) in layer.iter().enumerate() {
            let slot = layered[ix];
            if i > 0 {
                cursor += (separation(layered[layer[i - 1]]) + separation(slot)) / 2.0;
            }
            layer_offsets.push(cursor);
            cursor += extent(slot);
        }
        offsets.push(layer_offsets);
        spans.push(cursor);
    }
    let widest = spans.iter().copied().fold(0.0_f32, f32::max);

    let mut positions = vec![Vec2::ZERO; nodes.len()];
    for (rank, layer) in layers.iter().enumerate() {
        let shift = (widest - spans[rank]) / 2.0;
        let flow = rank as f32 * (flow_size + config.rank_separation);
        for (&ix, &offset) in layer.iter().zip(&offsets[rank]) {
            if let Slot::Node(i) = layered[ix] {
                let cross = shift + offset;
                positions[i] = config.margin
                    + match direction {
                        LayoutDirection::LeftRight => Vec2::new(flow, cross),
                        LayoutDirection::TopBottom => Vec2::new(cross, flow),
                    };
            }
        }
    }

    for (node, position) in nodes.iter_mut().zip(positions) {
        node.position = position;
    }
    tracing::debug!(nodes = nodes.len(), ranks = rank_count, "Layout computed");
    Ok(nodes)
}

fn endpoint(
    index: &HashMap<&str, NodeIndex>,
    edge: &CanvasEdge,
    id: &str,
) -> Result<NodeIndex, LayoutError> {
    index
        .get(id)
        .copied()
        .ok_or_else(|| LayoutError::UnknownEndpoint {
            edge: edge.id.clone(),
            node: id.to_string(),
        })
}

/// Reorders every rank by barycenter, keeping the best ordering seen.
fn order_layers(graph: &DiGraph<Slot, ()>, layers: &mut [Vec<NodeIndex>]) {
    let mut best = layers.to_vec();
    let mut best_crossings = count_crossings(graph, layers);

    for pass in 0..ORDER_PASSES {
        if best_crossings == 0 {
            break;
        }
        if pass % 2 == 0 {
            for rank in 1..layers.len() {
                sweep(graph, layers, rank, rank - 1, Direction::Incoming);
            }
        } else {
            for rank in (0..layers.len().saturating_sub(1)).rev() {
                sweep(graph, layers, rank, rank + 1, Direction::Outgoing);
            }
        }

        let crossings = count_crossings(graph, layers);
        if crossings < best_crossings {
            best_crossings = crossings;
            best = layers.to_vec();
        }
    }

    for (layer, ordered) in layers.iter_mut().zip(best) {
        *layer = ordered;
    }
}

/// Sorts `layers[rank]` by the mean position of its neighbours in `layers[fixed]`.
///
/// Slots without neighbours there keep their current index as weight.
fn sweep(
    graph: &DiGraph<Slot, ()>,
    layers: &mut [Vec<NodeIndex>],
    rank: usize,
    fixed: usize,
    direction: Direction,
) {
    let fixed_positions: HashMap<NodeIndex, f32> = layers[fixed]
        .iter()
        .enumerate()
        .map(|(i, &ix)| (ix, i as f32))
        .collect();

    let mut weighted: Vec<(NodeIndex, f32)> = layers[rank]
        .iter()
        .enumerate()
        .map(|(i, &ix)| {
            let neighbours: Vec<f32> = graph
                .neighbors_directed(ix, direction)
                .filter_map(|n| fixed_positions.get(&n).copied())
                .collect();
            let weight = if neighbours.is_empty() {
                i as f32
            } else {
                neighbours.iter().sum::<f32>() / neighbours.len() as f32
            };
            (ix, weight)
        })
        .collect();

    // sort_by is stable, which keeps ties in their previous order
    weighted.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    layers[rank] = weighted.into_iter().map(|(ix, _)| ix).collect();
}

fn count_crossings(graph: &DiGraph<Slot, ()>, layers: &[Vec<NodeIndex>]) -> usize {
    let mut total = 0;
    for pair in layers.windows(2) {
        let next_positions: HashMap<NodeIndex, usize> =
            pair[1].iter().enumerate().map(|(i, &ix)| (ix, i)).collect();

        let mut segments: Vec<(usize, usize)> = Vec::new();
        for (i, &ix) in pair[0].iter().enumerate() {
            for succ in graph.neighbors_directed(ix, Direction::Outgoing) {
                if let Some(&j) = next_positions.get(&succ) {
                    segments.push((i, j));
                }
            }
        }

        for (a, &(a0, a1)) in segments.iter().enumerate() {
            for &(b0, b1) in &segments[a + 1..] {
                if (a0 < b0 && a1 > b1) || (a0 > b0 && a1 < b1) {
                    total += 1;
                }
            }
        }
    }
    total
}
