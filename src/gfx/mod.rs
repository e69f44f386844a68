//! # Graphics Module
//!
//! This module contains all graphics-related functionality for the room
//! planner, including the camera system, render pipelines, scene management,
//! mesh import, and GPU resource handling.
//!
//! ## Architecture Overview
//!
//! The graphics system is organized into several key components:
//!
//! - **Camera System** ([`camera`]) - Orbit camera with drag, key, and wheel controls
//! - **Mesh Import** ([`mesh`]) - OBJ parsing and normalization
//! - **Rendering Pipeline** ([`rendering`]) - Blinn-Phong forward rendering
//! - **Scene Management** ([`scene`]) - Room fixtures, furniture, persistence
//! - **Resource Management** ([`resources`]) - Uniforms, textures, and bind groups
//!
//! ## Usage
//!
//! The graphics system is primarily used through the [`RenderEngine`] and [`Scene`] types:
//!
//! ```no_run
//! use alcove::gfx::{RenderEngine, scene::Scene};
//!
//! // The render engine is typically created automatically by AlcoveApp
//! // let render_engine = RenderEngine::new(window, width, height).await;
//!
//! // Scene management is handled through the main app
//! // let mut scene = Scene::new(camera_manager);
//! ```
//!
//! [`Scene`]: scene::Scene

pub mod camera;
pub mod mesh;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
