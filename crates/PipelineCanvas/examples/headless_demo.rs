use glam::Vec2;
use pipeline_canvas::changes::NodeChange;
use pipeline_canvas::interaction::Connection;
use pipeline_canvas::model::{
    CanvasEdge, CanvasNode, NodeData, OperationData, SourceKind, SourceModelData,
};
use pipeline_canvas::{Canvas, CanvasConfig, LogicEvent};

fn source(id: &str, name: &str) -> CanvasNode {
    CanvasNode::new(
        NodeData::SourceModel(SourceModelData {
            id: id.into(),
            name: name.into(),
            schema: "staging".into(),
            kind: SourceKind::Source,
            is_dummy: false,
        }),
        Vec2::ZERO,
    )
}

fn main() {
    println!("=== PipelineCanvas Headless Demo ===");

    // 1. Initialize Canvas
    let mut canvas = Canvas::new(CanvasConfig::default());
    // Explicitly set a viewport size (simulating a window)
    canvas.update_viewport_size(Vec2::new(1280.0, 720.0));

    // 2. Load a small graph and lay it out
    let mut join = OperationData::placeholder(serde_json::json!({ "type": "join" }));
    join.id = "op-join".into();
    join.is_dummy = false;

    let nodes = vec![
        source("orders", "orders"),
        source("customers", "customers"),
        CanvasNode::new(NodeData::Operation(join), Vec2::ZERO),
    ];
    let edges = vec![
        CanvasEdge::between("orders", "op-join"),
        CanvasEdge::between("customers", "op-join"),
    ];

    if let Err(err) = canvas.load(nodes, edges) {
        eprintln!("Layout failed: {}", err);
        return;
    }

    println!("Laid out graph:");
    for node in canvas.snapshot().nodes() {
        println!("  - {} ({}) at {:?}", node.id, node.node_type(), node.position);
    }

    // 3. Simulate the renderer measuring nodes
    let measured: Vec<NodeChange> = canvas
        .snapshot()
        .nodes()
        .map(|n| NodeChange::Dimensions {
            id: n.id.clone(),
            dimensions: Some(Vec2::new(250.0, 120.0)),
        })
        .collect();
    canvas.on_nodes_change(measured);

    // 4. Add a new source next to the existing ones
    let position = canvas.add_source_node(SourceModelData {
        id: "payments".into(),
        name: "payments".into(),
        schema: "staging".into(),
        kind: SourceKind::Model,
        is_dummy: false,
    });
    println!("\n>> Added 'payments' at {:?}", position);
    println!("   View pan is now {:?}", canvas.view.transform.pan);

    // 5. Connect it and drag it on top of the join
    canvas.on_connect(Connection::new("payments", "op-join"));
    let join_position = canvas.snapshot().node("op-join").map(|n| n.position);
    if let Some(target) = join_position {
        canvas.on_nodes_change(vec![NodeChange::Position {
            id: "payments".into(),
            position: Some(target + Vec2::new(20.0, 20.0)),
            dragging: true,
        }]);
    }

    for event in canvas.on_node_drag_stop("payments") {
        if let LogicEvent::NodeMoved { id, position } = event {
            println!(">> '{}' settled at {:?}", id, position);
        }
    }

    println!("\nFinal edges:");
    for edge in canvas.snapshot().edges() {
        println!("  - {}", edge.id);
    }
}
