use glam::Vec2;
use pipeline_canvas::changes::NodeChange;
use pipeline_canvas::interaction::Connection;
use pipeline_canvas::model::{
    CanvasNode, NodeData, NodeFlags, OperationData, SourceKind, SourceModelData,
};
use pipeline_canvas::{Canvas, CanvasConfig, LogicEvent};

fn source_data(id: &str) -> SourceModelData {
    SourceModelData {
        id: id.to_string(),
        name: format!("{}_table", id),
        schema: "raw".to_string(),
        kind: SourceKind::Source,
        is_dummy: false,
    }
}

fn sized_node(id: &str, position: Vec2, size: Vec2) -> CanvasNode {
    let mut node = CanvasNode::new(NodeData::SourceModel(source_data(id)), position);
    node.size = Some(size);
    node
}

fn create_test_canvas() -> Canvas {
    let mut canvas = Canvas::new(CanvasConfig::default());
    canvas.store.add_nodes([
        sized_node("a", Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0)),
        sized_node("b", Vec2::new(300.0, 0.0), Vec2::new(100.0, 100.0)),
    ]);
    canvas
}

#[test]
fn test_connect_creates_derived_edge() {
    let mut canvas = create_test_canvas();

    let events = canvas.on_connect(Connection::new("a", "b"));

    let state = canvas.snapshot();
    let edge = state.edge("a_b").expect("edge should exist");
    assert_eq!(edge.source, "a");
    assert_eq!(edge.target, "b");
    assert!(edge.marker_end.is_some());
    assert!(events.contains(&LogicEvent::EdgeConnected {
        id: "a_b".to_string(),
        source: "a".to_string(),
        target: "b".to_string(),
    }));
}

#[test]
fn test_connect_with_missing_endpoint_is_dropped() {
    let mut canvas = create_test_canvas();

    let events = canvas.on_connect(Connection {
        source: Some("a".to_string()),
        target: None,
    });
    canvas.on_connect(Connection {
        source: None,
        target: Some("b".to_string()),
    });
    canvas.on_connect(Connection {
        source: Some(String::new()),
        target: Some("b".to_string()),
    });

    assert!(events.is_empty());
    assert_eq!(canvas.snapshot().edge_count(), 0);
}

#[test]
fn test_connect_twice_keeps_one_edge() {
    let mut canvas = create_test_canvas();

    canvas.on_connect(Connection::new("a", "b"));
    let events = canvas.on_connect(Connection::new("a", "b"));

    assert!(events.is_empty());
    assert_eq!(canvas.snapshot().edge_count(), 1);
}

#[test]
fn test_drag_stop_pushes_node_off_neighbour() {
    let mut canvas = create_test_canvas();

    // 1. Drag "b" onto "a" (overlap of 50 on both axes)
    canvas.on_nodes_change(vec![NodeChange::Position {
        id: "b".to_string(),
        position: Some(Vec2::new(50.0, 50.0)),
        dragging: true,
    }]);

    // 2. Drop it
    let events = canvas.on_node_drag_stop("b");

    // b is right of/below a, so it moves right/down by overlap + 30
    let state = canvas.snapshot();
    let b = state.node("b").unwrap();
    assert_eq!(b.position, Vec2::new(130.0, 130.0));
    assert!(!b.flags.contains(NodeFlags::DRAGGING));
    assert!(!b.rect().intersects(&state.node("a").unwrap().rect()));
    assert!(events.contains(&LogicEvent::NodeMoved {
        id: "b".to_string(),
        position: Vec2::new(130.0, 130.0),
    }));

    // a was not touched
    assert_eq!(state.node("a").unwrap().position, Vec2::ZERO);
}

#[test]
fn test_drag_stop_without_overlap_keeps_position() {
    let mut canvas = create_test_canvas();

    canvas.on_node_drag_stop("b");

    assert_eq!(
        canvas.snapshot().node("b").unwrap().position,
        Vec2::new(300.0, 0.0)
    );
}

#[test]
fn test_drag_stop_on_unknown_node() {
    let mut canvas = create_test_canvas();
    let events = canvas.on_node_drag_stop("ghost");
    assert!(events.is_empty());
}

#[test]
fn test_pane_click_only_notifies() {
    let mut canvas = create_test_canvas();
    let before = canvas.snapshot();

    let events = canvas.on_pane_click();

    assert_eq!(events, vec![LogicEvent::PaneClicked]);
    assert_eq!(before.node_count(), canvas.snapshot().node_count());
}

#[test]
fn test_node_click_brings_node_to_front() {
    let mut canvas = create_test_canvas();

    let events = canvas.on_node_click("a");

    let state = canvas.snapshot();
    assert_eq!(state.nodes().last().unwrap().id, "a");
    assert!(events.contains(&LogicEvent::NodeActivated {
        id: "a".to_string()
    }));
}

#[test]
fn test_add_source_node_goes_below_rightmost_and_recenters() {
    let mut canvas = create_test_canvas();
    canvas.update_viewport_size(Vec2::new(1000.0, 800.0));

    let position = canvas.add_source_node(source_data("c"));

    // Rightmost is "b" at (300, 0) with height 100
    assert_eq!(position, Vec2::new(300.0, 130.0));
    assert_eq!(
        canvas.snapshot().node("c").unwrap().position,
        Vec2::new(300.0, 130.0)
    );
    assert_eq!(
        canvas.view.world_to_screen(position),
        Vec2::new(500.0, 400.0)
    );
}

#[test]
fn test_add_operation_node_uses_default_position() {
    let mut canvas = create_test_canvas();

    let data = OperationData::placeholder(serde_json::json!({}));
    let id = data.id.clone();
    let position = canvas.add_operation_node(data);

    assert_eq!(position, Vec2::new(100.0, 125.0));
    let state = canvas.snapshot();
    let node = state.node(&id).unwrap();
    assert!(node.is_placeholder());
    assert_eq!(node.position, Vec2::new(100.0, 125.0));
}
