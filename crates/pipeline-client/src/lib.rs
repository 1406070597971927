//! # Pipeline Client
//!
//! Backend access for the pipeline canvas. The [`TransformApi`] trait is the seam
//! the sync controller talks through; [`HttpTransformApi`] is the `reqwest`
//! implementation used in production.

pub mod api;
pub mod config;
pub mod dto;

pub use api::{HttpTransformApi, TransformApi};
pub use config::ApiConfig;
pub use dto::{BackendEdge, GraphPayload};
