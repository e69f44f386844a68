// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles textures, uniform buffers, and bind groups for rendering.

pub mod global_bindings;
pub mod procedural;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{
    BindingLayouts, FlatUniforms, GlobalBindings, GlobalUniforms, Lighting, ObjectUniforms,
};
pub use texture_resource::{TexturePixels, TextureResource};
