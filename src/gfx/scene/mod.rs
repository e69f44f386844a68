//! # Scene Management Module
//!
//! This module owns everything that lives inside the room: the fixed
//! architecture (floor, walls, window, door), furniture imported from OBJ
//! files, the helper geometry for the two lights, and the grid overlay.
//!
//! ## Key Components
//!
//! - [`Scene`] - Container that updates, picks, styles, and persists objects
//! - [`SceneObject`] - A drawable with CPU-side state and lazy GPU buffers
//! - [`Vertex3D`] - Interleaved vertex layout shared by every pipeline
//! - [`AssetLoader`] - Worker thread that loads furniture off the frame loop
//!
//! Persistence lives in [`persist`]: the scene serializes to a JSON array of
//! per-object entries and imports back through an [`ImportPlan`] that splits
//! entries into surface restyles, furniture spawns, and ignored names.

pub mod loader;
pub mod object;
pub mod persist;
pub mod room;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use loader::{load_obj, load_spawn, AssetLoader, CatalogItem, LoadError, FURNITURE_CATALOG};
pub use object::{DoorState, SceneObject, ShaderKind};
pub use persist::{
    export_entries, load_entries, plan_import, save_scene, FurnitureSpawn, ImportPlan,
    PersistError, SceneEntry, SurfaceRestyle,
};
pub use scene::Scene;
pub use vertex::Vertex3D;
