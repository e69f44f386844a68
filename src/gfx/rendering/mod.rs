// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Handles render pipelines, GPU resource management, and frame rendering.

pub mod fps;
pub mod pipeline_manager;
pub mod render_engine;

// Re-export main types
pub use fps::FpsCounter;
pub use pipeline_manager::{PipelineConfig, PipelineKind, PipelineManager};
pub use render_engine::RenderEngine;
