//! # Overlap Resolver
//!
//! One-shot nudge applied when a drag ends. It is a heuristic: after several
//! simultaneous collisions the result is not guaranteed to be overlap-free.

use glam::Vec2;

use crate::model::CanvasNode;

/// Computes where `moved` should land so it no longer sits on top of its neighbours.
///
/// Every other node whose bounding box overlaps `moved` on both axes pushes it
/// away by the overlap plus `gap`, independently per axis: a node left of (or
/// above) the colliding one is pushed further left (up), otherwise right (down).
/// Collisions are all measured against the original rectangle and the pushes add up.
pub fn resolve<'a>(
    moved: &CanvasNode,
    others: impl IntoIterator<Item = &'a CanvasNode>,
    gap: f32,
) -> Vec2 {
    let rect = moved.rect();
    let mut position = moved.position;

    for other in others {
        if other.id == moved.id {
            continue;
        }
        let overlap = rect.overlap(&other.rect());
        if overlap.x <= 0.0 || overlap.y <= 0.0 {
            continue;
        }

        let push = overlap + Vec2::splat(gap);
        position.x += if moved.position.x < other.position.x {
            -push.x
        } else {
            push.x
        };
        position.y += if moved.position.y < other.position.y {
            -push.y
        } else {
            push.y
        };
        tracing::debug!(node_id = %moved.id, other = %other.id, ?push, "Resolved overlap");
    }

    position
}
