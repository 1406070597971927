//! # Pipeline Bridge
//!
//! Connects the headless [`pipeline_canvas::Canvas`] to the transform backend and
//! to the rest of the editor.
//!
//! - **Bus (`src/bus.rs`)**: Single-slot action and preview channels.
//! - **Controller (`src/controller.rs`)**: Graph sync, deletes and action handling.
//! - **Config (`src/config.rs`)**: Delete mode and startup behavior.

pub mod bus;
pub mod config;
pub mod controller;

pub use bus::{ActionBus, CanvasAction, DeleteNodeRequest, PreviewAction, PreviewBus, Published};
pub use config::{DeleteMode, SyncConfig};
pub use controller::{CanvasController, SyncOutcome};
