// src/lib.rs
//! Alcove room designer
//!
//! An interactive room planner built on wgpu and winit: a furnished room
//! rendered with Blinn-Phong lighting, an orbit camera, OBJ furniture
//! loading, and JSON scene save and restore.

pub mod app;
pub mod gfx;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::AlcoveApp;

/// Creates a default application instance
pub fn default() -> AlcoveApp {
    pollster::block_on(AlcoveApp::new())
}
