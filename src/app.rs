use std::sync::Arc;
use std::time::Instant;

use cgmath::{Rad, Vector3};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes},
};

use crate::gfx::{
    camera::{CameraController, CameraManager, OrbitCamera},
    rendering::RenderEngine,
    scene::{
        load_entries, plan_import, save_scene, AssetLoader, FurnitureSpawn, Scene, SceneObject,
        FURNITURE_CATALOG,
    },
};

/// World units per nudge of an object or the point light
const MOVE_STEP: f32 = 0.1;
/// Radians per rotation key press (5 degrees)
const ROTATE_STEP: f32 = std::f32::consts::PI / 36.0;
/// Path used by the export and import keys
const SCENE_FILE: &str = "scene.json";

pub struct AlcoveApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    scene: Scene,
    loader: AssetLoader,
    last_frame: Instant,
}

impl AlcoveApp {
    /// Create a new application with the default room scene
    pub async fn new() -> Self {
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        let camera = OrbitCamera::new(1200, 800);
        let controller = CameraController::new();

        let camera_manager = CameraManager::new(camera, controller);
        let scene = Scene::new(camera_manager);

        Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                render_engine: None,
                scene,
                loader: AssetLoader::new(),
                last_frame: Instant::now(),
            },
        }
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) {
        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .expect("Failed to run event loop");
    }

    /// Queues an OBJ file for loading; the object joins the scene once the
    /// background load finishes
    pub fn add_object(&mut self, model_path: &str) {
        self.app_state.loader.request(FurnitureSpawn {
            name: "object".to_string(),
            model_path: model_path.to_string(),
            texture_path: None,
            scale: 0.5,
            color: [0.9, 0.5, 0.2],
            position: None,
            rotation: None,
        });
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Ok(window) = event_loop.create_window(
            WindowAttributes::default().with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            let window_handle = Arc::new(window);
            self.window = Some(window_handle.clone());

            let (width, height) = window_handle.inner_size().into();

            let window_clone = window_handle.clone();
            let renderer =
                pollster::block_on(
                    async move { RenderEngine::new(window_clone, width, height).await },
                );

            self.scene
                .camera_manager
                .camera
                .update_projection_matrix(width, height);

            self.render_engine = Some(renderer);
            self.last_frame = Instant::now();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if self.render_engine.is_none() {
            return;
        }

        self.scene.camera_manager.process_window_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.scene
                    .camera_manager
                    .camera
                    .update_projection_matrix(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Released,
                button: MouseButton::Left,
                ..
            } => {
                let (x, y) = self.scene.camera_manager.controller.cursor();
                let picked = self.scene.pick_object(x as f32, y as f32);
                if let Some(object) = picked.and_then(|index| self.scene.get_object(index)) {
                    log::info!("Selected: {}", object.name);
                }
                self.scene.selected = picked;
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.handle_key_pressed(event_loop, &logical_key);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

impl AppState {
    fn handle_key_pressed(&mut self, event_loop: &ActiveEventLoop, key: &Key) {
        match key {
            Key::Named(NamedKey::Escape) => event_loop.exit(),
            Key::Named(NamedKey::Delete) => self.scene.remove_selected(),
            Key::Character(text) => self.handle_character_key(text.as_str()),
            _ => (),
        }
    }

    /// Dispatches the single-letter bindings; keys are matched lowercase, so
    /// a shifted press does nothing
    fn handle_character_key(&mut self, text: &str) {
        match text {
            // Selected object: translate
            "i" => self.with_selected(|o| o.translate(Vector3::new(0.0, 0.0, -MOVE_STEP))),
            "k" => self.with_selected(|o| o.translate(Vector3::new(0.0, 0.0, MOVE_STEP))),
            "j" => self.with_selected(|o| o.translate(Vector3::new(-MOVE_STEP, 0.0, 0.0))),
            "l" => self.with_selected(|o| o.translate(Vector3::new(MOVE_STEP, 0.0, 0.0))),
            "u" => self.with_selected(|o| o.translate(Vector3::new(0.0, MOVE_STEP, 0.0))),
            "o" => self.with_selected(|o| o.translate(Vector3::new(0.0, -MOVE_STEP, 0.0))),
            // Selected object: rotate about each axis
            "q" => self.with_selected(|o| o.rotate_y(Rad(-ROTATE_STEP))),
            "e" => self.with_selected(|o| o.rotate_y(Rad(ROTATE_STEP))),
            "z" => self.with_selected(|o| o.rotate_x(Rad(-ROTATE_STEP))),
            "x" => self.with_selected(|o| o.rotate_x(Rad(ROTATE_STEP))),
            "n" => self.with_selected(|o| o.rotate_z(Rad(-ROTATE_STEP))),
            "m" => self.with_selected(|o| o.rotate_z(Rad(ROTATE_STEP))),
            // Point light ("r" also resets the camera; both actions fire)
            "t" => self.scene.nudge_point_light([0.0, MOVE_STEP, 0.0]),
            "g" => self.scene.nudge_point_light([0.0, -MOVE_STEP, 0.0]),
            "f" => self.scene.nudge_point_light([-MOVE_STEP, 0.0, 0.0]),
            "h" => self.scene.nudge_point_light([MOVE_STEP, 0.0, 0.0]),
            "r" => self.scene.nudge_point_light([0.0, 0.0, -MOVE_STEP]),
            "y" => self.scene.nudge_point_light([0.0, 0.0, MOVE_STEP]),
            // Room and lighting toggles
            "p" => self.scene.open_door(),
            "c" => self.scene.close_door(),
            "v" => self.scene.grid_enabled = !self.scene.grid_enabled,
            "7" => self.scene.lighting.use_directional = !self.scene.lighting.use_directional,
            "8" => self.scene.lighting.use_point = !self.scene.lighting.use_point,
            // Persistence and the furniture catalog
            "9" => self.export_scene(),
            "0" => self.import_scene(),
            "1" | "2" | "3" | "4" | "5" | "6" => self.spawn_catalog_item(text),
            _ => (),
        }
    }

    fn with_selected(&mut self, action: impl FnOnce(&mut SceneObject)) {
        if let Some(object) = self.scene.selected_object_mut() {
            action(object);
        }
    }

    fn spawn_catalog_item(&mut self, digit: &str) {
        let Ok(slot) = digit.parse::<usize>() else {
            return;
        };
        let Some(item) = FURNITURE_CATALOG.get(slot - 1) else {
            return;
        };
        log::info!("Adding {}: loading started", item.label);
        self.loader.request(item.to_spawn());
    }

    fn export_scene(&mut self) {
        match save_scene(&self.scene, SCENE_FILE) {
            Ok(()) => log::info!("Scene exported to {}", SCENE_FILE),
            Err(err) => log::error!("Error exporting scene: {}", err),
        }
    }

    fn import_scene(&mut self) {
        let entries = match load_entries(SCENE_FILE) {
            Ok(entries) => entries,
            Err(err) => {
                log::error!("Error importing scene: {}", err);
                return;
            }
        };

        let spawns = self.scene.apply_import_plan(plan_import(entries));
        let queued = spawns.len();
        for spawn in spawns {
            self.loader.request(spawn);
        }
        log::info!(
            "Scene imported from {} ({} loads queued)",
            SCENE_FILE,
            queued
        );
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.scene.camera_manager.update();

        for loaded in self.loader.drain() {
            match loaded {
                Ok(object) => {
                    let index = self.scene.push_object(object);
                    if let Some(object) = self.scene.get_object(index) {
                        log::info!("Object \"{}\" loaded", object.name);
                    }
                }
                Err(err) => log::error!("Error loading object: {}", err),
            }
        }

        self.scene.update(delta_time);

        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };
        match render_engine.render(&mut self.scene) {
            Ok(()) => (),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = render_engine.get_surface_size();
                render_engine.resize(width, height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Surface out of memory, exiting");
                event_loop.exit();
            }
            Err(err) => {
                log::warn!("Surface error: {:?}", err);
            }
        }
    }
}
