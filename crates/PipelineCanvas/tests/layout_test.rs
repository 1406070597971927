use glam::Vec2;
use pipeline_canvas::layout::{LayoutError, layout};
use pipeline_canvas::model::{
    CanvasEdge, CanvasNode, NodeData, OperationData, SourceKind, SourceModelData,
};
use pipeline_canvas::{LayoutConfig, LayoutDirection};

fn source(id: &str) -> CanvasNode {
    CanvasNode::new(
        NodeData::SourceModel(SourceModelData {
            id: id.to_string(),
            name: format!("table_{}", id),
            schema: "staging".to_string(),
            kind: SourceKind::Source,
            is_dummy: false,
        }),
        Vec2::ZERO,
    )
}

fn operation(id: &str) -> CanvasNode {
    let mut data = OperationData::placeholder(serde_json::json!({ "type": "castdatatypes" }));
    data.id = id.to_string();
    data.is_dummy = false;
    CanvasNode::new(NodeData::Operation(data), Vec2::ZERO)
}

fn position_of(nodes: &[CanvasNode], id: &str) -> Vec2 {
    nodes
        .iter()
        .find(|n| n.id == id)
        .map(|n| n.position)
        .expect("node missing from layout output")
}

#[test]
fn test_layout_is_idempotent() {
    let nodes = vec![source("a"), source("b"), operation("op"), source("out")];
    let edges = vec![
        CanvasEdge::between("a", "op"),
        CanvasEdge::between("b", "op"),
        CanvasEdge::between("op", "out"),
    ];
    let config = LayoutConfig::default();

    let first = layout(nodes.clone(), &edges, LayoutDirection::LeftRight, &config).unwrap();
    let second = layout(nodes, &edges, LayoutDirection::LeftRight, &config).unwrap();

    let first: Vec<Vec2> = first.iter().map(|n| n.position).collect();
    let second: Vec<Vec2> = second.iter().map(|n| n.position).collect();
    assert_eq!(first, second);
}

#[test]
fn test_linear_chain_flows_left_to_right() {
    let nodes = vec![source("raw"), operation("op"), source("clean")];
    let edges = vec![
        CanvasEdge::between("raw", "op"),
        CanvasEdge::between("op", "clean"),
    ];
    let config = LayoutConfig::default();

    let laid_out = layout(nodes, &edges, LayoutDirection::LeftRight, &config).unwrap();

    let raw = position_of(&laid_out, "raw");
    let op = position_of(&laid_out, "op");
    let clean = position_of(&laid_out, "clean");
    assert!(raw.x < op.x && op.x < clean.x);

    // Rank step = node width + rank separation, starting at the margin
    assert_eq!(raw, Vec2::new(100.0, 100.0));
    assert_eq!(op.x - raw.x, 250.0 + 350.0);
    assert_eq!(raw.y, op.y);
    assert_eq!(op.y, clean.y);
}

#[test]
fn test_top_bottom_direction_uses_y_for_ranks() {
    let nodes = vec![source("raw"), operation("op")];
    let edges = vec![CanvasEdge::between("raw", "op")];

    let laid_out = layout(
        nodes,
        &edges,
        LayoutDirection::TopBottom,
        &LayoutConfig::default(),
    )
    .unwrap();

    let raw = position_of(&laid_out, "raw");
    let op = position_of(&laid_out, "op");
    assert_eq!(raw.x, op.x);
    assert_eq!(op.y - raw.y, 120.0 + 350.0);
}

#[test]
fn test_siblings_share_a_rank_without_overlapping() {
    let nodes = vec![source("a"), source("b"), operation("op")];
    let edges = vec![
        CanvasEdge::between("a", "op"),
        CanvasEdge::between("b", "op"),
    ];
    let config = LayoutConfig::default();

    let laid_out = layout(nodes, &edges, LayoutDirection::LeftRight, &config).unwrap();

    let a = position_of(&laid_out, "a");
    let b = position_of(&laid_out, "b");
    let op = position_of(&laid_out, "op");
    assert_eq!(a.x, b.x);
    assert_eq!((a.y - b.y).abs(), 120.0 + 200.0);
    // The single node of the next rank is centered on the wider one
    assert_eq!(op.y, (a.y + b.y) / 2.0);
}

#[test]
fn test_long_edges_do_not_collapse_ranks() {
    // a -> b -> c plus a shortcut a -> c that needs a bend point in b's rank
    let nodes = vec![source("a"), operation("b"), source("c")];
    let edges = vec![
        CanvasEdge::between("a", "b"),
        CanvasEdge::between("b", "c"),
        CanvasEdge::between("a", "c"),
    ];

    let laid_out = layout(
        nodes,
        &edges,
        LayoutDirection::LeftRight,
        &LayoutConfig::default(),
    )
    .unwrap();

    let a = position_of(&laid_out, "a");
    let b = position_of(&laid_out, "b");
    let c = position_of(&laid_out, "c");
    assert!(a.x < b.x && b.x < c.x);
}

#[test]
fn test_dangling_edge_is_an_error() {
    let nodes = vec![source("a")];
    let edges = vec![CanvasEdge::between("a", "ghost")];

    let result = layout(
        nodes,
        &edges,
        LayoutDirection::LeftRight,
        &LayoutConfig::default(),
    );

    assert_eq!(
        result.unwrap_err(),
        LayoutError::UnknownEndpoint {
            edge: "a_ghost".to_string(),
            node: "ghost".to_string(),
        }
    );
}

#[test]
fn test_cycle_is_an_error() {
    let nodes = vec![operation("x"), operation("y")];
    let edges = vec![CanvasEdge::between("x", "y"), CanvasEdge::between("y", "x")];

    let result = layout(
        nodes,
        &edges,
        LayoutDirection::LeftRight,
        &LayoutConfig::default(),
    );

    assert!(matches!(result, Err(LayoutError::Cycle { .. })));
}

#[test]
fn test_empty_graph() {
    let laid_out = layout(
        Vec::new(),
        &[],
        LayoutDirection::LeftRight,
        &LayoutConfig::default(),
    )
    .unwrap();
    assert!(laid_out.is_empty());
}

#[test]
fn test_duplicate_ids_keep_the_later_copy() {
    let mut renamed = source("a");
    if let NodeData::SourceModel(data) = &mut renamed.data {
        data.name = "orders_v2".to_string();
    }
    let nodes = vec![source("a"), operation("op"), renamed];
    let edges = vec![CanvasEdge::between("a", "op")];

    let laid_out = layout(
        nodes,
        &edges,
        LayoutDirection::LeftRight,
        &LayoutConfig::default(),
    )
    .unwrap();

    // 1. One node per id, first slot kept
    let ids: Vec<&str> = laid_out.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["a", "op"]);

    // 2. The surviving copy is the later one, and it is the one ranked
    match &laid_out[0].data {
        NodeData::SourceModel(data) => assert_eq!(data.name, "orders_v2"),
        other => panic!("unexpected node data {:?}", other),
    }
    assert!(laid_out[0].position.x < position_of(&laid_out, "op").x);
}
