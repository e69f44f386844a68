pub mod obj_mesh;

// Re-export main types
pub use obj_mesh::{BoundingBox, MeshError, ObjMesh, VertexBuffers};
