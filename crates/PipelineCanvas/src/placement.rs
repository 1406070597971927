use glam::Vec2;

use crate::model::CanvasNode;

/// Where the next source node goes: under the rightmost node, `gap` below its bottom edge.
///
/// The first node with the greatest X wins ties. On an empty canvas the
/// result is `(0, gap)`.
pub fn next_node_position<'a>(nodes: impl IntoIterator<Item = &'a CanvasNode>, gap: f32) -> Vec2 {
    let mut rightmost: Option<&CanvasNode> = None;
    for node in nodes {
        match rightmost {
            Some(current) if node.position.x <= current.position.x => {}
            _ => rightmost = Some(node),
        }
    }

    match rightmost {
        Some(node) => Vec2::new(node.position.x, node.position.y + node.height() + gap),
        None => Vec2::new(0.0, gap),
    }
}
