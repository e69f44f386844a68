//! Furniture loading
//!
//! [`load_obj`] turns an OBJ file on disk into a ready [`SceneObject`]:
//! parse, normalize to the requested footprint around the origin, interleave
//! the vertex streams, and decode the optional texture. [`AssetLoader`] runs
//! the same pipeline on a worker thread so parsing a large mesh never stalls
//! the frame loop; finished objects are drained once per frame.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use cgmath::{Matrix4, Rad};
use thiserror::Error;

use crate::gfx::mesh::{MeshError, ObjMesh};
use crate::gfx::resources::TexturePixels;
use crate::gfx::scene::object::{SceneObject, ShaderKind};
use crate::gfx::scene::persist::FurnitureSpawn;
use crate::gfx::scene::vertex::Vertex3D;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Loads an OBJ file, recenters it at the origin scaled to `scale`, and
/// builds a selectable lit object translated to `position`.
///
/// A texture that fails to decode is logged and skipped; the object then
/// renders with the plain white fallback texture.
pub fn load_obj(
    path: &str,
    position: [f32; 3],
    scale: f32,
    color: [f32; 3],
    texture_path: Option<&str>,
) -> Result<SceneObject, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_string(),
        source,
    })?;

    let mut mesh = ObjMesh::parse(&text);
    mesh.shift_and_scale([0.0, 0.0, 0.0], scale)?;
    let buffers = mesh.vertex_buffers();
    let vertices = Vertex3D::interleave(&buffers);

    let mut object = SceneObject::new("object", vertices, ShaderKind::Lit);
    object.model_matrix = Matrix4::from_translation(position.into());
    object.selectable = true;
    object.color = color;
    object.use_texture = texture_path.is_some();
    object.texture_path = texture_path.map(str::to_string);

    // Kept so the object can be exported and re-imported later.
    object.model_path = Some(path.to_string());
    object.initial_scale = Some(scale);
    object.position = Some(position);

    if let Some(texture_path) = texture_path {
        match TexturePixels::from_file(texture_path) {
            Ok(pixels) => object.set_texture(Some(Arc::new(pixels))),
            Err(err) => log::warn!("Failed to load texture {}: {}", texture_path, err),
        }
    }

    Ok(object)
}

/// Builds the object described by a saved furniture entry, restoring its
/// saved name, position, and rotation.
pub fn load_spawn(spawn: &FurnitureSpawn) -> Result<SceneObject, LoadError> {
    let mut object = load_obj(
        &spawn.model_path,
        [0.0; 3],
        spawn.scale,
        spawn.color,
        spawn.texture_path.as_deref(),
    )?;
    object.name = spawn.name.clone();

    if let Some(position) = spawn.position {
        let mut model = Matrix4::from_translation(position.into());
        if let Some([rx, ry, rz]) = spawn.rotation {
            model = model
                * Matrix4::from_angle_x(Rad(rx))
                * Matrix4::from_angle_y(Rad(ry))
                * Matrix4::from_angle_z(Rad(rz));
        }
        object.model_matrix = model;
        object.position = Some(position);
    }

    Ok(object)
}

/// Worker thread that loads furniture off the frame loop.
///
/// Requests go in through [`AssetLoader::request`]; the app polls
/// [`AssetLoader::drain`] every frame and pushes finished objects into the
/// scene. The worker exits when the loader is dropped and its request
/// channel disconnects.
pub struct AssetLoader {
    requests: Sender<FurnitureSpawn>,
    results: Receiver<Result<SceneObject, LoadError>>,
}

impl AssetLoader {
    pub fn new() -> Self {
        let (requests, request_rx) = mpsc::channel::<FurnitureSpawn>();
        let (result_tx, results) = mpsc::channel();
        thread::spawn(move || {
            while let Ok(spawn) = request_rx.recv() {
                if result_tx.send(load_spawn(&spawn)).is_err() {
                    break;
                }
            }
        });
        Self { requests, results }
    }

    /// Queues a load; the finished object arrives in a later [`drain`].
    ///
    /// [`drain`]: AssetLoader::drain
    pub fn request(&self, spawn: FurnitureSpawn) {
        if self.requests.send(spawn).is_err() {
            log::error!("Asset loader thread is gone, load request dropped");
        }
    }

    /// Collects every load finished since the last call without blocking.
    pub fn drain(&self) -> Vec<Result<SceneObject, LoadError>> {
        let mut finished = Vec::new();
        while let Ok(result) = self.results.try_recv() {
            finished.push(result);
        }
        finished
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// A furniture mesh shipped with the application
#[derive(Debug, Clone, Copy)]
pub struct CatalogItem {
    pub label: &'static str,
    pub model_path: &'static str,
    pub texture_path: Option<&'static str>,
    /// Normalization scale, roughly the object's largest dimension in meters
    pub scale: f32,
}

impl CatalogItem {
    /// Spawn request dropping the item one unit above the floor center
    pub fn to_spawn(&self) -> FurnitureSpawn {
        FurnitureSpawn {
            name: "object".to_string(),
            model_path: self.model_path.to_string(),
            texture_path: self.texture_path.map(str::to_string),
            scale: self.scale,
            color: [1.0, 1.0, 1.0],
            position: Some([0.0, 1.0, 0.0]),
            rotation: None,
        }
    }
}

pub const FURNITURE_CATALOG: [CatalogItem; 6] = [
    CatalogItem {
        label: "chair",
        model_path: "objects/office-chair/office_chair.obj",
        texture_path: Some("objects/office-chair/chair_normal.png"),
        scale: 1.5,
    },
    CatalogItem {
        label: "sofa",
        model_path: "objects/sofa/S01 M02.obj",
        texture_path: Some("objects/sofa/sofa.png.png"),
        scale: 2.5,
    },
    CatalogItem {
        label: "table",
        model_path: "objects/desk/Computer Desk.obj",
        texture_path: None,
        scale: 2.0,
    },
    CatalogItem {
        label: "bed",
        model_path: "objects/bed/Bed_01.obj",
        texture_path: Some("objects/bed/Cube.005_Bake1_cyclesbake_COMBINED.png"),
        scale: 3.0,
    },
    CatalogItem {
        label: "wardrobe",
        model_path: "objects/wardrobe/Wardrobe.obj",
        texture_path: None,
        scale: 3.0,
    },
    CatalogItem {
        label: "decorations",
        model_path: "objects/decorations/decorations.obj",
        texture_path: Some("objects/decorations/decorations.png"),
        scale: 2.0,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::SquareMatrix;
    use std::f32::consts::FRAC_PI_2;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    fn write_temp_obj(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    const TRIANGLE_OBJ: &str = "v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n";

    #[test]
    fn test_load_obj_normalizes_and_places() {
        let path = write_temp_obj("loader_triangle.obj", TRIANGLE_OBJ);
        let object = load_obj(path.to_str().unwrap(), [0.0, 1.0, 0.0], 2.0, [1.0; 3], None).unwrap();
        std::fs::remove_file(&path).ok();

        // Largest extent becomes 2, centered at the origin.
        assert_eq!(object.vertices.len(), 3);
        assert_eq!(object.vertices[0].position, [-1.0, -1.0, 0.0]);
        assert_eq!(object.vertices[2].position, [1.0, 1.0, 0.0]);

        assert_eq!(object.name, "object");
        assert!(object.selectable);
        assert_eq!(object.shader, ShaderKind::Lit);
        assert!(!object.use_texture);
        assert_eq!(object.initial_scale, Some(2.0));
        assert_eq!(object.position, Some([0.0, 1.0, 0.0]));
        assert_eq!(object.model_matrix.w.y, 1.0);
    }

    #[test]
    fn test_load_obj_empty_mesh_errors() {
        let path = write_temp_obj("loader_empty.obj", "o empty\n");
        let err = load_obj(path.to_str().unwrap(), [0.0; 3], 1.0, [1.0; 3], None).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.to_string(), "Mesh has no vertices to normalize.");
    }

    #[test]
    fn test_load_obj_missing_file_errors() {
        let err = load_obj("no/such/mesh.obj", [0.0; 3], 1.0, [1.0; 3], None).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("no/such/mesh.obj"));
    }

    #[test]
    fn test_load_obj_missing_texture_keeps_flag() {
        let path = write_temp_obj("loader_textured.obj", TRIANGLE_OBJ);
        let object = load_obj(
            path.to_str().unwrap(),
            [0.0; 3],
            1.0,
            [1.0; 3],
            Some("no/such/texture.png"),
        )
        .unwrap();
        std::fs::remove_file(&path).ok();

        // The flag follows the request; rendering falls back to white pixels.
        assert!(object.use_texture);
        assert!(object.texture().is_none());
        assert_eq!(object.texture_path.as_deref(), Some("no/such/texture.png"));
    }

    #[test]
    fn test_load_spawn_restores_saved_transform() {
        let path = write_temp_obj("loader_spawn.obj", TRIANGLE_OBJ);
        let spawn = FurnitureSpawn {
            name: "chair (1)".to_string(),
            model_path: path.to_str().unwrap().to_string(),
            texture_path: None,
            scale: 1.0,
            color: [0.5, 0.5, 0.5],
            position: Some([1.0, 0.0, 2.0]),
            rotation: Some([0.0, FRAC_PI_2, 0.0]),
        };
        let object = load_spawn(&spawn).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(object.name, "chair (1)");
        assert_eq!(object.position, Some([1.0, 0.0, 2.0]));
        let translation = object.model_matrix.w;
        assert_eq!([translation.x, translation.y, translation.z], [1.0, 0.0, 2.0]);
        // A quarter turn about Y maps local +X onto world -Z.
        assert!((object.model_matrix.x.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_spawn_without_position_keeps_factory_placement() {
        let path = write_temp_obj("loader_spawn_default.obj", TRIANGLE_OBJ);
        let spawn = FurnitureSpawn {
            name: "object".to_string(),
            model_path: path.to_str().unwrap().to_string(),
            texture_path: None,
            scale: 1.0,
            color: [1.0; 3],
            position: None,
            rotation: None,
        };
        let object = load_spawn(&spawn).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(object.position, Some([0.0, 0.0, 0.0]));
        assert_eq!(object.model_matrix, Matrix4::identity());
    }

    #[test]
    fn test_catalog_spawns_at_shared_drop_point() {
        assert_eq!(FURNITURE_CATALOG.len(), 6);
        for item in FURNITURE_CATALOG {
            let spawn = item.to_spawn();
            assert_eq!(spawn.name, "object");
            assert_eq!(spawn.position, Some([0.0, 1.0, 0.0]));
            assert_eq!(spawn.color, [1.0, 1.0, 1.0]);
            assert!(spawn.scale > 0.0);
            assert!(spawn.model_path.ends_with(".obj"));
        }
    }

    #[test]
    fn test_asset_loader_delivers_across_frames() {
        let path = write_temp_obj("loader_async.obj", TRIANGLE_OBJ);
        let loader = AssetLoader::new();
        loader.request(FurnitureSpawn {
            name: "object".to_string(),
            model_path: path.to_str().unwrap().to_string(),
            texture_path: None,
            scale: 1.0,
            color: [1.0; 3],
            position: None,
            rotation: None,
        });
        loader.request(FurnitureSpawn {
            name: "broken".to_string(),
            model_path: "no/such/mesh.obj".to_string(),
            texture_path: None,
            scale: 1.0,
            color: [1.0; 3],
            position: None,
            rotation: None,
        });

        let deadline = Instant::now() + Duration::from_secs(2);
        let mut results = Vec::new();
        while results.len() < 2 && Instant::now() < deadline {
            results.extend(loader.drain());
            thread::sleep(Duration::from_millis(5));
        }
        std::fs::remove_file(&path).ok();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
