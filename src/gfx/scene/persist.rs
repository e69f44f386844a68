//! Scene persistence
//!
//! Saves the object list as a JSON array and plans imports back from one.
//! Three entry shapes share a single record type: furniture entries carry the
//! mesh path and placement, the floor and wall entries carry their
//! restyleable color and texture, and everything else is a name-only marker.
//! Keys are camelCase in the file.
//!
//! Importing is split in two: [`plan_import`] is a pure classification of the
//! entries, and [`Scene::apply_import_plan`] mutates the scene and hands the
//! furniture loads back to the caller to run asynchronously.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use cgmath::Matrix4;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::scene::Scene;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("scene file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One object record in a saved scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
}

impl SceneEntry {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            model_path: None,
            texture_path: None,
            scale: None,
            color: None,
            position: None,
            rotation: None,
        }
    }
}

/// Restyle of a room surface found in a saved scene
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceRestyle {
    pub name: String,
    pub color: Option<[f32; 3]>,
    pub texture_path: Option<String>,
}

/// Furniture load requested by a saved scene
#[derive(Debug, Clone, PartialEq)]
pub struct FurnitureSpawn {
    pub name: String,
    pub model_path: String,
    pub texture_path: Option<String>,
    pub scale: f32,
    pub color: [f32; 3],
    pub position: Option<[f32; 3]>,
    pub rotation: Option<[f32; 3]>,
}

/// Classified contents of a saved scene
#[derive(Debug, Default)]
pub struct ImportPlan {
    pub restyles: Vec<SurfaceRestyle>,
    pub spawns: Vec<FurnitureSpawn>,
    /// Names of entries that carry neither a surface name nor a mesh path
    pub ignored: Vec<String>,
}

/// Serializes every scene object to an entry
pub fn export_entries(scene: &Scene) -> Vec<SceneEntry> {
    scene
        .objects
        .iter()
        .map(|object| {
            let mut entry = SceneEntry::named(&object.name);
            if let Some(model_path) = &object.model_path {
                entry.model_path = Some(model_path.clone());
                entry.texture_path = object.texture_path.clone();
                entry.scale = Some(object.initial_scale.unwrap_or(1.0));
                entry.color = Some(object.color);
                entry.position = Some(object.translation());
                entry.rotation = Some(extract_rotation(&object.model_matrix));
            } else if object.name == "floor" || object.name.starts_with("wall") {
                entry.color = Some(object.color);
                entry.texture_path = object.texture_path.clone();
            }
            entry
        })
        .collect()
}

/// Classifies saved entries into surface restyles, furniture loads, and
/// ignored markers
///
/// Surface names take precedence over a mesh path, so an entry named like a
/// wall restyles that wall even if it carries a `modelPath`.
pub fn plan_import(entries: Vec<SceneEntry>) -> ImportPlan {
    let mut plan = ImportPlan::default();
    for entry in entries {
        if entry.name == "floor" || entry.name.starts_with("wall") {
            plan.restyles.push(SurfaceRestyle {
                name: entry.name,
                color: entry.color,
                texture_path: entry.texture_path,
            });
        } else if let Some(model_path) = entry.model_path {
            plan.spawns.push(FurnitureSpawn {
                name: entry.name,
                model_path,
                texture_path: entry.texture_path,
                scale: entry.scale.unwrap_or(1.0),
                color: entry.color.unwrap_or([1.0, 1.0, 1.0]),
                position: entry.position,
                rotation: entry.rotation,
            });
        } else {
            plan.ignored.push(entry.name);
        }
    }
    plan
}

/// Writes the scene to a JSON file
pub fn save_scene(scene: &Scene, path: impl AsRef<Path>) -> Result<(), PersistError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| PersistError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let entries = export_entries(scene);
    serde_json::to_writer_pretty(BufWriter::new(file), &entries)?;
    Ok(())
}

/// Reads saved entries from a JSON file
pub fn load_entries(path: impl AsRef<Path>) -> Result<Vec<SceneEntry>, PersistError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PersistError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let entries = serde_json::from_reader(BufReader::new(file))?;
    Ok(entries)
}

/// Recovers per-axis rotation angles from a model matrix
///
/// This is the usual decomposition with the pitch limited to a quarter turn
/// either way; compound orientations outside that range will not round-trip
/// exactly.
pub fn extract_rotation(matrix: &Matrix4<f32>) -> [f32; 3] {
    let rotation_x = matrix.y.z.atan2(matrix.z.z);
    let rotation_y = (-matrix.x.z).atan2((matrix.y.z * matrix.y.z + matrix.z.z * matrix.z.z).sqrt());
    let rotation_z = matrix.x.y.atan2(matrix.x.x);
    [rotation_x, rotation_y, rotation_z]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{CameraController, CameraManager, OrbitCamera};
    use crate::gfx::scene::object::{SceneObject, ShaderKind};
    use cgmath::{Rad, Vector3};
    use serde_json::json;

    fn test_scene() -> Scene {
        let camera = OrbitCamera::new(800, 600);
        Scene::new(CameraManager::new(camera, CameraController::default()))
    }

    fn furniture(name: &str) -> SceneObject {
        let mut object = SceneObject::new(name, Vec::new(), ShaderKind::Lit);
        object.model_path = Some("objects/desk/Computer Desk.obj".to_string());
        object.initial_scale = Some(2.0);
        object.selectable = true;
        object.color = [1.0, 1.0, 1.0];
        object
    }

    #[test]
    fn test_marker_entries_serialize_to_name_only() {
        let scene = test_scene();
        let entries = export_entries(&scene);
        let door = entries.iter().find(|entry| entry.name == "door").unwrap();
        assert_eq!(serde_json::to_value(door).unwrap(), json!({"name": "door"}));
    }

    #[test]
    fn test_surface_entries_carry_style() {
        let mut scene = test_scene();
        scene.set_floor_color([0.1, 0.2, 0.3]);
        let entries = export_entries(&scene);
        let floor = entries.iter().find(|entry| entry.name == "floor").unwrap();
        assert_eq!(floor.color, Some([0.1, 0.2, 0.3]));
        assert!(floor.model_path.is_none());
    }

    #[test]
    fn test_furniture_entries_use_camel_case_keys() {
        let mut scene = test_scene();
        let mut object = furniture("object");
        object.translate(Vector3::new(1.0, 2.0, 3.0));
        scene.push_object(object);
        let entries = export_entries(&scene);
        let entry = entries.last().unwrap();
        let value = serde_json::to_value(entry).unwrap();
        assert_eq!(value["modelPath"], json!("objects/desk/Computer Desk.obj"));
        assert_eq!(value["scale"], json!(2.0));
        assert_eq!(value["position"], json!([1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_plan_import_classifies_entries() {
        let entries = vec![
            SceneEntry::named("floor"),
            SceneEntry::named("wall_0"),
            SceneEntry {
                model_path: Some("objects/bed/Bed_01.obj".to_string()),
                ..SceneEntry::named("object")
            },
            SceneEntry::named("door"),
            SceneEntry::named("mystery"),
        ];
        let plan = plan_import(entries);
        assert_eq!(plan.restyles.len(), 2);
        assert_eq!(plan.spawns.len(), 1);
        assert_eq!(plan.ignored, ["door", "mystery"]);
    }

    #[test]
    fn test_plan_import_fills_spawn_defaults() {
        let entries = vec![SceneEntry {
            model_path: Some("objects/wardrobe/Wardrobe.obj".to_string()),
            ..SceneEntry::named("object")
        }];
        let plan = plan_import(entries);
        let spawn = &plan.spawns[0];
        assert_eq!(spawn.scale, 1.0);
        assert_eq!(spawn.color, [1.0, 1.0, 1.0]);
        assert_eq!(spawn.position, None);
        assert_eq!(spawn.rotation, None);
    }

    #[test]
    fn test_extract_rotation_single_axis() {
        let about_x = Matrix4::from_angle_x(Rad(0.3_f32));
        let [rx, ry, rz] = extract_rotation(&about_x);
        assert!((rx - 0.3).abs() < 1e-6);
        assert!(ry.abs() < 1e-6 && rz.abs() < 1e-6);

        let about_y = Matrix4::from_angle_y(Rad(0.4_f32));
        let [rx, ry, rz] = extract_rotation(&about_y);
        assert!((ry - 0.4).abs() < 1e-6);
        assert!(rx.abs() < 1e-6 && rz.abs() < 1e-6);

        let about_z = Matrix4::from_angle_z(Rad(0.5_f32));
        let [rx, ry, rz] = extract_rotation(&about_z);
        assert!((rz - 0.5).abs() < 1e-6);
        assert!(rx.abs() < 1e-6 && ry.abs() < 1e-6);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let mut scene = test_scene();
        let mut object = furniture("object");
        object.translate(Vector3::new(1.0, 2.0, 3.0));
        object.rotate_y(Rad(0.4));
        scene.push_object(object);

        let path = std::env::temp_dir().join("alcove_persist_round_trip.json");
        save_scene(&scene, &path).unwrap();
        let entries = load_entries(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(entries, export_entries(&scene));
        let entry = entries.iter().find(|entry| entry.name == "object").unwrap();
        assert_eq!(entry.position, Some([1.0, 2.0, 3.0]));
        let rotation = entry.rotation.unwrap();
        assert!((rotation[1] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_load_missing_file_is_an_io_error() {
        let result = load_entries("does/not/exist.json");
        assert!(matches!(result, Err(PersistError::Io { .. })));
    }
}
