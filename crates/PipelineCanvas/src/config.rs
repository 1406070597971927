//! # Configuration
//!
//! This module defines the configuration structs for the Canvas and its layout engine.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Flow direction of the rank-based layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutDirection {
    /// Ranks advance along X.
    #[default]
    LeftRight,
    /// Ranks advance along Y.
    TopBottom,
}

/// Fixed spacing parameters of the hierarchical layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Gap between neighbouring nodes within a rank. Default: 200.
    pub node_separation: f32,
    /// Gap reserved for edges routed through a rank they skip. Default: 100.
    pub edge_separation: f32,
    /// Footprint assumed for every node, since nothing is measured before the first layout.
    pub node_size: Vec2,
    /// Gap between consecutive ranks. Default: 350.
    pub rank_separation: f32,
    /// Margin around the whole drawing. Default: 100 on both axes.
    pub margin: Vec2,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_separation: 200.0,
            edge_separation: 100.0,
            node_size: Vec2::new(250.0, 120.0),
            rank_separation: 350.0,
            margin: Vec2::new(100.0, 100.0),
        }
    }
}

/// Configuration parameters for the Canvas.
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Direction used whenever the graph is re-laid out.
    pub direction: LayoutDirection,
    pub layout: LayoutConfig,
    /// Extra distance added when pushing a dropped node off a neighbour. Default: 30.
    pub overlap_gap: f32,
    /// Vertical gap below the rightmost node when placing a new source node. Default: 30.
    pub placement_gap: f32,
    /// Where new operation nodes land. Default: (100, 125).
    pub operation_position: Vec2,
    /// Zoom applied when the view recenters on a freshly added node. Default: 1.0.
    pub focus_zoom: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            direction: LayoutDirection::LeftRight,
            layout: LayoutConfig::default(),
            overlap_gap: 30.0,
            placement_gap: 30.0,
            operation_position: Vec2::new(100.0, 125.0),
            focus_zoom: 1.0,
        }
    }
}
