//! # Camera
//!
//! Where the canvas is looking. Nodes are stored in world coordinates; the
//! host renders them at `world * zoom + pan` in viewport pixels.

use glam::Vec2;
use serde::{Deserialize, Serialize};

const MIN_ZOOM: f32 = 0.1;
const MAX_ZOOM: f32 = 10.0;

/// Pan offset (pixels) and zoom factor applied to world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub pan: Vec2,
    /// 1.0 renders nodes at their world size.
    pub zoom: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

/// Camera plus the size of the area it renders into.
#[derive(Clone, Debug)]
pub struct View {
    pub transform: Transform,
    /// Pixels; the host reports this whenever the canvas is resized.
    pub viewport_size: Vec2,
}

impl View {
    pub fn new(transform: Transform, viewport_size: Vec2) -> Self {
        Self {
            transform,
            viewport_size,
        }
    }

    /// Viewport pixel at which a world point is drawn.
    pub fn world_to_screen(&self, world_pos: Vec2) -> Vec2 {
        world_pos * self.transform.zoom + self.transform.pan
    }

    /// Pans so `world_pos` lands on the viewport's midpoint, at `zoom`.
    pub fn center_on(&mut self, world_pos: Vec2, zoom: f32) {
        self.transform.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.transform.pan = self.viewport_size * 0.5 - world_pos * self.transform.zoom;
    }
}
