//! Scene state and behavior
//!
//! [`Scene`] owns the object list, the lighting state, the camera, and the
//! current selection. Per-frame behavior lives in [`Scene::update`]: the
//! point light marker follows its lamp, the window swaps between sky and
//! shutter textures with the directional lamp, and the door leaf sweeps
//! about its hinge.

use std::sync::Arc;

use cgmath::{Matrix4, Rad, Vector3, Vector4};

use super::object::{DoorState, SceneObject};
use super::persist::{FurnitureSpawn, ImportPlan, SurfaceRestyle};
use super::room::{self, DOOR_PIVOT};
use crate::gfx::camera::CameraManager;
use crate::gfx::resources::{
    procedural, BindingLayouts, Lighting, TexturePixels, TextureResource,
};

/// Radians per second the door leaf sweeps while animating
const DOOR_ANGULAR_RATE: f32 = 1.0;
/// Half-extent of the screen-space pick box in NDC units
const PICK_THRESHOLD: f32 = 0.1;

/// Default floor color restored when an import carries no explicit color
const DEFAULT_FLOOR_COLOR: [f32; 3] = [0.8, 0.8, 0.6];

/// Main scene containing objects, lighting, and camera
pub struct Scene {
    pub camera_manager: CameraManager,
    pub objects: Vec<SceneObject>,
    pub lighting: Lighting,
    /// Floor alignment grid, drawn in its own pass when enabled
    pub grid: SceneObject,
    pub grid_enabled: bool,
    /// Index into `objects` of the selected object, if any
    pub selected: Option<usize>,
    sky_texture: Arc<TexturePixels>,
    shutter_texture: Arc<TexturePixels>,
}

impl Scene {
    /// Creates a scene populated with the starting room
    pub fn new(camera_manager: CameraManager) -> Self {
        let lighting = Lighting::default();
        let sky_texture = Arc::new(procedural::sky_texture());
        let shutter_texture = Arc::new(procedural::shutter_texture());

        let mut objects = Vec::new();
        objects.push(room::build_floor());
        objects.extend(room::build_walls(&sky_texture));
        objects.push(room::build_door());
        objects.push(room::build_directional_helper(lighting.light_direction));
        objects.push(room::build_point_light_helper(lighting.point_light_pos));

        Self {
            camera_manager,
            objects,
            lighting,
            grid: room::build_grid(),
            grid_enabled: true,
            selected: None,
            sky_texture,
            shutter_texture,
        }
    }

    /// Advances per-frame scene state by `delta_time` seconds
    pub fn update(&mut self, delta_time: f32) {
        let point_light_pos = self.lighting.point_light_pos;
        let use_directional = self.lighting.use_directional;
        let sky = self.sky_texture.clone();
        let shutter = self.shutter_texture.clone();

        for object in &mut self.objects {
            match object.name.as_str() {
                "pointLightHelper" => {
                    object.model_matrix = Matrix4::from_translation(point_light_pos.into());
                }
                "window" => {
                    if use_directional {
                        object.set_texture(Some(sky.clone()));
                        object.color = [1.0, 1.0, 1.0];
                    } else {
                        object.set_texture(Some(shutter.clone()));
                        object.color = [0.8, 0.6, 0.4];
                    }
                    object.use_texture = true;
                }
                "door" => {
                    let Some(door) = object.door.as_mut() else {
                        continue;
                    };
                    if door.is_opening && door.open_angle < std::f32::consts::FRAC_PI_2 {
                        door.open_angle += delta_time * DOOR_ANGULAR_RATE;
                        if door.open_angle >= std::f32::consts::FRAC_PI_2 {
                            door.open_angle = std::f32::consts::FRAC_PI_2;
                            door.is_opening = false;
                            door.is_open = true;
                        }
                    } else if door.is_closing && door.open_angle > 0.0 {
                        door.open_angle -= delta_time * DOOR_ANGULAR_RATE;
                        if door.open_angle <= 0.0 {
                            door.open_angle = 0.0;
                            door.is_closing = false;
                            door.is_open = false;
                        }
                    }
                    let open_angle = door.open_angle;

                    // Rebuild the leaf matrix around the hinge every frame
                    let anchor = Vector3::from(object.position.unwrap_or([0.0; 3]));
                    let pivot = Vector3::from(DOOR_PIVOT);
                    object.model_matrix = Matrix4::from_translation(anchor)
                        * Matrix4::from_translation(pivot)
                        * Matrix4::from_angle_y(Rad(-open_angle))
                        * Matrix4::from_translation(-pivot);
                }
                _ => {}
            }
        }
    }

    /// Returns the index of the first selectable object whose projected
    /// center falls within a small screen-space box around the cursor
    pub fn pick_object(&self, screen_x: f32, screen_y: f32) -> Option<usize> {
        let camera = &self.camera_manager.camera;
        let (width, height) = camera.viewport;
        let ndc_x = 2.0 * screen_x / width - 1.0;
        let ndc_y = 1.0 - 2.0 * screen_y / height;
        let view_proj = camera.projection_matrix() * camera.view_matrix();

        for (index, object) in self.objects.iter().enumerate() {
            if !object.selectable {
                continue;
            }
            let [x, y, z] = object.translation();
            let clip = view_proj * Vector4::new(x, y, z, 1.0);
            let projected_x = clip.x / clip.w;
            let projected_y = clip.y / clip.w;
            if (ndc_x - projected_x).abs() < PICK_THRESHOLD
                && (ndc_y - projected_y).abs() < PICK_THRESHOLD
            {
                return Some(index);
            }
        }
        None
    }

    /// Adds an object, making its name unique among the current objects,
    /// and returns its index
    pub fn push_object(&mut self, mut object: SceneObject) -> usize {
        object.name = self.ensure_unique_name(&object.name);
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn ensure_unique_name(&self, desired_name: &str) -> String {
        let mut counter = 0;
        let mut test_name = desired_name.to_string();

        while self.objects.iter().any(|obj| obj.name == test_name) {
            counter += 1;
            test_name = format!("{} ({})", desired_name, counter);
        }

        test_name
    }

    /// Removes the selected object and clears the selection
    ///
    /// Dropping the object releases its GPU buffers with it.
    pub fn remove_selected(&mut self) {
        if let Some(index) = self.selected.take() {
            if index < self.objects.len() {
                self.objects.remove(index);
            }
        }
    }

    pub fn open_door(&mut self) {
        if let Some(door) = self.door_state_mut() {
            door.is_opening = true;
            door.is_closing = false;
        }
    }

    pub fn close_door(&mut self) {
        if let Some(door) = self.door_state_mut() {
            door.is_closing = true;
            door.is_opening = false;
        }
    }

    fn door_state_mut(&mut self) -> Option<&mut DoorState> {
        self.objects
            .iter_mut()
            .find(|object| object.name == "door")
            .and_then(|object| object.door.as_mut())
    }

    /// Moves the point light by the given offset; the marker follows on the
    /// next update
    pub fn nudge_point_light(&mut self, delta: [f32; 3]) {
        for (component, offset) in self.lighting.point_light_pos.iter_mut().zip(delta) {
            *component += offset;
        }
    }

    // Surface styling

    pub fn set_floor_color(&mut self, color: [f32; 3]) {
        if let Some(floor) = self.objects.iter_mut().find(|obj| obj.name == "floor") {
            floor.color = color;
        }
    }

    /// Binds a texture to the floor, or clears it when `path` is `None`
    ///
    /// A decode failure leaves the floor unchanged.
    pub fn set_floor_texture(&mut self, path: Option<&str>) -> Result<(), image::ImageError> {
        let pixels = Self::decode_texture(path)?;
        if let Some(floor) = self.objects.iter_mut().find(|obj| obj.name == "floor") {
            apply_texture(floor, pixels, path);
        }
        Ok(())
    }

    /// Recolors every wall surface, window excluded
    pub fn set_wall_color(&mut self, color: [f32; 3]) {
        for wall in self
            .objects
            .iter_mut()
            .filter(|obj| obj.name.starts_with("wall"))
        {
            wall.color = color;
        }
    }

    /// Textures every wall surface, window excluded
    pub fn set_wall_texture(&mut self, path: Option<&str>) -> Result<(), image::ImageError> {
        let pixels = Self::decode_texture(path)?;
        for wall in self
            .objects
            .iter_mut()
            .filter(|obj| obj.name.starts_with("wall"))
        {
            apply_texture(wall, pixels.clone(), path);
        }
        Ok(())
    }

    pub fn set_selected_color(&mut self, color: [f32; 3]) {
        if let Some(object) = self.selected_object_mut() {
            object.color = color;
        }
    }

    pub fn set_selected_texture(&mut self, path: Option<&str>) -> Result<(), image::ImageError> {
        let pixels = Self::decode_texture(path)?;
        if let Some(object) = self.selected_object_mut() {
            apply_texture(object, pixels, path);
        }
        Ok(())
    }

    fn decode_texture(path: Option<&str>) -> Result<Option<Arc<TexturePixels>>, image::ImageError> {
        match path {
            Some(path) => Ok(Some(Arc::new(TexturePixels::from_file(path)?))),
            None => Ok(None),
        }
    }

    // Import

    /// Applies an import plan: clears everything but the room, restyles the
    /// floor and walls, and returns the furniture loads to queue
    ///
    /// The selection is cleared since object indices shift.
    pub fn apply_import_plan(&mut self, plan: ImportPlan) -> Vec<FurnitureSpawn> {
        self.selected = None;
        self.objects.retain(|object| is_reserved_name(&object.name));
        for restyle in &plan.restyles {
            self.apply_restyle(restyle);
        }
        for name in &plan.ignored {
            log::warn!("Object \"{}\" ignored (no modelPath)", name);
        }
        plan.spawns
    }

    fn apply_restyle(&mut self, restyle: &SurfaceRestyle) {
        let is_floor = restyle.name == "floor";
        let Some(object) = self
            .objects
            .iter_mut()
            .find(|object| object.name == restyle.name)
        else {
            return;
        };

        object.color = match restyle.color {
            Some(color) => color,
            None if is_floor => DEFAULT_FLOOR_COLOR,
            None => object.color,
        };

        match &restyle.texture_path {
            Some(path) => match TexturePixels::from_file(path) {
                Ok(pixels) => {
                    object.set_texture(Some(Arc::new(pixels)));
                    object.use_texture = true;
                    object.texture_path = Some(path.clone());
                }
                Err(err) => {
                    log::warn!("Failed to load texture {}: {}", path, err);
                    object.use_texture = false;
                }
            },
            None => {
                object.set_texture(None);
                object.use_texture = false;
                object.texture_path = None;
            }
        }
    }

    // UI helper methods

    /// Gets all object names for UI display
    pub fn get_object_names(&self) -> Vec<String> {
        self.objects.iter().map(|obj| obj.name.clone()).collect()
    }

    pub fn get_object(&self, index: usize) -> Option<&SceneObject> {
        self.objects.get(index)
    }

    pub fn get_object_mut(&mut self, index: usize) -> Option<&mut SceneObject> {
        self.objects.get_mut(index)
    }

    pub fn selected_object_mut(&mut self) -> Option<&mut SceneObject> {
        let index = self.selected?;
        self.objects.get_mut(index)
    }

    /// Uploads dirty CPU state to the GPU ahead of rendering
    pub fn sync_gpu(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &BindingLayouts,
        white: &TextureResource,
    ) {
        let view = self.camera_manager.camera.view_matrix();
        let projection = self.camera_manager.camera.projection_matrix();
        for object in &mut self.objects {
            object.sync_gpu(device, queue, layouts, view, projection, white);
        }
        self.grid
            .sync_gpu(device, queue, layouts, view, projection, white);
    }
}

/// Room fixtures that survive a scene import
fn is_reserved_name(name: &str) -> bool {
    matches!(
        name,
        "floor" | "pointLightHelper" | "grid" | "door" | "window" | "directionalHelper"
    ) || name.starts_with("wall")
}

fn apply_texture(object: &mut SceneObject, pixels: Option<Arc<TexturePixels>>, path: Option<&str>) {
    object.use_texture = pixels.is_some();
    object.texture_path = path.map(str::to_string);
    object.set_texture(pixels);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{CameraController, CameraManager, OrbitCamera};
    use crate::gfx::scene::object::ShaderKind;
    use crate::gfx::scene::room::DOOR_POSITION;
    use std::f32::consts::FRAC_PI_2;

    fn test_scene() -> Scene {
        let camera = OrbitCamera::new(800, 600);
        Scene::new(CameraManager::new(camera, CameraController::default()))
    }

    fn door_state(scene: &Scene) -> DoorState {
        scene
            .objects
            .iter()
            .find(|object| object.name == "door")
            .and_then(|object| object.door)
            .unwrap()
    }

    #[test]
    fn test_starting_room_layout() {
        let scene = test_scene();
        let names = scene.get_object_names();
        assert_eq!(
            names,
            [
                "floor",
                "wall_0",
                "wall_1",
                "wall_segment",
                "wall_segment",
                "wall_segment",
                "wall_segment",
                "window",
                "wall_3",
                "door",
                "directionalHelper",
                "pointLightHelper",
            ]
        );
        assert!(scene.grid_enabled);
        assert_eq!(scene.grid.name, "grid");
    }

    #[test]
    fn test_door_opens_to_a_right_angle_and_stops() {
        let mut scene = test_scene();
        scene.open_door();
        for _ in 0..20 {
            scene.update(0.1);
        }
        let door = door_state(&scene);
        assert_eq!(door.open_angle, FRAC_PI_2);
        assert!(door.is_open);
        assert!(!door.is_opening);
    }

    #[test]
    fn test_door_closes_back_to_exactly_zero() {
        let mut scene = test_scene();
        scene.open_door();
        for _ in 0..20 {
            scene.update(0.1);
        }
        scene.close_door();
        for _ in 0..20 {
            scene.update(0.13);
        }
        let door = door_state(&scene);
        assert_eq!(door.open_angle, 0.0);
        assert!(!door.is_open);
        assert!(!door.is_closing);
    }

    #[test]
    fn test_open_door_swings_the_leaf_about_its_hinge() {
        let mut scene = test_scene();
        scene.open_door();
        for _ in 0..20 {
            scene.update(0.1);
        }
        let door = scene
            .objects
            .iter()
            .find(|object| object.name == "door")
            .unwrap();
        // Fully open, the anchor column has swung a quarter turn about the hinge
        let [x, y, z] = door.translation();
        assert!((x - (DOOR_POSITION[0] + DOOR_PIVOT[0])).abs() < 1e-5);
        assert!(y.abs() < 1e-5);
        assert!((z - (DOOR_POSITION[2] - DOOR_PIVOT[0])).abs() < 1e-5);
    }

    #[test]
    fn test_window_follows_directional_lamp() {
        let mut scene = test_scene();
        scene.update(0.016);
        let window = scene
            .objects
            .iter()
            .find(|object| object.name == "window")
            .unwrap();
        assert_eq!(window.color, [1.0, 1.0, 1.0]);
        let sky = window.texture().unwrap().clone();

        scene.lighting.use_directional = false;
        scene.update(0.016);
        let window = scene
            .objects
            .iter()
            .find(|object| object.name == "window")
            .unwrap();
        assert_eq!(window.color, [0.8, 0.6, 0.4]);
        assert!(window.use_texture);
        assert!(!Arc::ptr_eq(window.texture().unwrap(), &sky));
    }

    #[test]
    fn test_point_light_marker_tracks_nudges() {
        let mut scene = test_scene();
        scene.nudge_point_light([0.1, 0.0, -0.1]);
        scene.update(0.016);
        let helper = scene
            .objects
            .iter()
            .find(|object| object.name == "pointLightHelper")
            .unwrap();
        let [x, y, z] = helper.translation();
        assert!((x - 0.1).abs() < 1e-6);
        assert!((y - 2.0).abs() < 1e-6);
        assert!((z - 1.9).abs() < 1e-6);
    }

    #[test]
    fn test_pick_hits_object_at_screen_center() {
        let mut scene = test_scene();
        let mut cube = SceneObject::new("object", Vec::new(), ShaderKind::Lit);
        cube.selectable = true;
        let index = scene.push_object(cube);
        // Camera orbits the origin, so an object there projects to center
        assert_eq!(scene.pick_object(400.0, 300.0), Some(index));
        assert_eq!(scene.pick_object(10.0, 10.0), None);
    }

    #[test]
    fn test_pick_skips_unselectable_room_geometry() {
        let scene = test_scene();
        // The floor projects near center but nothing in the room is selectable
        assert_eq!(scene.pick_object(400.0, 300.0), None);
    }

    #[test]
    fn test_push_object_makes_names_unique() {
        let mut scene = test_scene();
        scene.push_object(SceneObject::new("object", Vec::new(), ShaderKind::Lit));
        scene.push_object(SceneObject::new("object", Vec::new(), ShaderKind::Lit));
        let names = scene.get_object_names();
        assert!(names.contains(&"object".to_string()));
        assert!(names.contains(&"object (1)".to_string()));
    }

    #[test]
    fn test_remove_selected_clears_selection() {
        let mut scene = test_scene();
        let index = scene.push_object(SceneObject::new("object", Vec::new(), ShaderKind::Lit));
        scene.selected = Some(index);
        let before = scene.objects.len();
        scene.remove_selected();
        assert_eq!(scene.objects.len(), before - 1);
        assert_eq!(scene.selected, None);
    }

    #[test]
    fn test_wall_styling_skips_the_window() {
        let mut scene = test_scene();
        scene.set_wall_color([0.2, 0.2, 0.9]);
        for object in &scene.objects {
            if object.name.starts_with("wall") {
                assert_eq!(object.color, [0.2, 0.2, 0.9]);
            }
        }
        let window = scene
            .objects
            .iter()
            .find(|object| object.name == "window")
            .unwrap();
        assert_eq!(window.color, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_import_plan_clears_furniture_and_restyles() {
        let mut scene = test_scene();
        scene.push_object(SceneObject::new("object", Vec::new(), ShaderKind::Lit));
        let plan = ImportPlan {
            restyles: vec![SurfaceRestyle {
                name: "floor".to_string(),
                color: Some([0.1, 0.2, 0.3]),
                texture_path: None,
            }],
            spawns: Vec::new(),
            ignored: vec!["ghost".to_string()],
        };
        let spawns = scene.apply_import_plan(plan);
        assert!(spawns.is_empty());
        assert_eq!(scene.objects.len(), 12);
        let floor = &scene.objects[0];
        assert_eq!(floor.color, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_import_restyle_without_color_restores_floor_default() {
        let mut scene = test_scene();
        scene.set_floor_color([0.0, 0.0, 0.0]);
        let plan = ImportPlan {
            restyles: vec![SurfaceRestyle {
                name: "floor".to_string(),
                color: None,
                texture_path: None,
            }],
            spawns: Vec::new(),
            ignored: Vec::new(),
        };
        scene.apply_import_plan(plan);
        assert_eq!(scene.objects[0].color, DEFAULT_FLOOR_COLOR);
    }
}
