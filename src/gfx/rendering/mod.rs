//! Core rendering functionality
//!
//! Render pipelines, shadow maps and frame submission.

pub mod pipeline_manager;
pub mod render_engine;
pub mod shadow_maps;

pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::RenderEngine;
pub use shadow_maps::ShadowMaps;
