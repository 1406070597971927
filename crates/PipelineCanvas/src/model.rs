//! # Core Data Models
//!
//! This module defines the visual nodes and edges of the pipeline canvas.
//!
//! Node payloads mirror the backend graph records field-for-field so that a
//! record can be deserialized straight into a [`NodeData`] without an
//! intermediate DTO. Positions and sizes are purely visual and never round-trip.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use uuid::Uuid;

use crate::math::Rect;

new_key_type! {
    /// Arena key of a node inside a `GraphState`.
    pub struct NodeKey;
    /// Arena key of an edge inside a `GraphState`.
    pub struct EdgeKey;
}

bitflags! {
    /// Bitflags representing transient UI state of a Node.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u8 {
        /// The node is currently selected by the user.
        const SELECTED = 1 << 0;
        /// The node is being dragged.
        const DRAGGING = 1 << 1;
    }
}

// Manual Serialize/Deserialize implementation for bitflags to be friendly
impl Serialize for NodeFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for NodeFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}

/// Discriminator of the two node variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// A reference to an existing table or model.
    #[serde(rename = "src_model_node")]
    SourceModel,
    /// A transform step.
    #[serde(rename = "operation_node")]
    Operation,
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::SourceModel => f.write_str("src_model_node"),
            NodeType::Operation => f.write_str("operation_node"),
        }
    }
}

/// Where a source-model node comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A model produced by the project itself.
    #[default]
    Model,
    /// A raw source table.
    Source,
}

/// Payload of a source-model node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceModelData {
    pub id: String,
    /// Display name of the table.
    #[serde(rename = "input_name")]
    pub name: String,
    /// Owning schema.
    #[serde(default)]
    pub schema: String,
    #[serde(rename = "input_type", default)]
    pub kind: SourceKind,
    /// Set for nodes that only exist locally.
    #[serde(rename = "isDummy", default)]
    pub is_dummy: bool,
}

/// Payload of an operation node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationData {
    pub id: String,
    /// Ordered output column names.
    #[serde(default)]
    pub output_cols: Vec<String>,
    /// The model this operation writes to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_model_id: Option<String>,
    /// Opaque operation configuration, owned by the config panel.
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(rename = "isDummy", default)]
    pub is_dummy: bool,
    /// Columns of the preceding source, captured when the operation was configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_source_columns: Option<Vec<String>>,
    /// Whether this is the final step of its chain.
    #[serde(default)]
    pub is_last_in_chain: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u32>,
}

impl OperationData {
    /// Builds a not-yet-persisted operation with a fresh local id.
    pub fn placeholder(config: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            output_cols: Vec::new(),
            target_model_id: None,
            config,
            is_dummy: true,
            prev_source_columns: None,
            is_last_in_chain: false,
            seq: None,
        }
    }
}

/// The payload of a node, tagged by `type` exactly like the backend records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeData {
    #[serde(rename = "src_model_node")]
    SourceModel(SourceModelData),
    #[serde(rename = "operation_node")]
    Operation(OperationData),
}

impl NodeData {
    pub fn id(&self) -> &str {
        match self {
            NodeData::SourceModel(data) => &data.id,
            NodeData::Operation(data) => &data.id,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            NodeData::SourceModel(_) => NodeType::SourceModel,
            NodeData::Operation(_) => NodeType::Operation,
        }
    }

    /// True for nodes that have no backend identity yet.
    pub fn is_placeholder(&self) -> bool {
        match self {
            NodeData::SourceModel(data) => data.is_dummy,
            NodeData::Operation(data) => data.is_dummy,
        }
    }
}

/// A Node on the canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasNode {
    /// Unique within the current graph.
    pub id: String,
    pub data: NodeData,
    /// World-space position of the top-left corner.
    pub position: Vec2,
    /// Size measured by the renderer, if it has reported one.
    #[serde(default)]
    pub size: Option<Vec2>,
    #[serde(default)]
    pub flags: NodeFlags,
}

impl CanvasNode {
    /// Creates a node whose id is taken from its payload.
    pub fn new(data: NodeData, position: Vec2) -> Self {
        Self {
            id: data.id().to_string(),
            data,
            position,
            size: None,
            flags: NodeFlags::empty(),
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.data.node_type()
    }

    pub fn is_placeholder(&self) -> bool {
        self.data.is_placeholder()
    }

    /// Measured width, zero until the renderer reports one.
    pub fn width(&self) -> f32 {
        self.size.map_or(0.0, |s| s.x)
    }

    /// Measured height, zero until the renderer reports one.
    pub fn height(&self) -> f32 {
        self.size.map_or(0.0, |s| s.y)
    }

    /// Bounding box in world space.
    pub fn rect(&self) -> Rect {
        Rect::new(self.position, Vec2::new(self.width(), self.height()))
    }
}

/// Shape of an edge's end marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    #[default]
    Arrow,
    ArrowClosed,
}

/// Rendering metadata for the end of an edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeMarker {
    #[serde(rename = "type")]
    pub kind: MarkerKind,
    pub width: f32,
    pub height: f32,
    pub color: String,
}

impl Default for EdgeMarker {
    fn default() -> Self {
        Self {
            kind: MarkerKind::ArrowClosed,
            width: 20.0,
            height: 20.0,
            color: "black".to_string(),
        }
    }
}

/// A directed edge between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "markerEnd", default, skip_serializing_if = "Option::is_none")]
    pub marker_end: Option<EdgeMarker>,
    #[serde(default)]
    pub selected: bool,
}

impl CanvasEdge {
    /// Creates an edge with the derived `source_target` id and the default arrow marker.
    pub fn between(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: edge_id(&source, &target),
            source,
            target,
            marker_end: Some(EdgeMarker::default()),
            selected: false,
        }
    }
}

/// Derives the id of the edge from `source` to `target`.
pub fn edge_id(source: &str, target: &str) -> String {
    format!("{}_{}", source, target)
}
