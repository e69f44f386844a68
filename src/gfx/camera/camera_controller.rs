use std::collections::HashSet;

use winit::{
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{Key, NamedKey, SmolStr},
};

use super::orbit_camera::OrbitCamera;

/// Scale from wheel delta (browser-style pixels) to zoom amount
const WHEEL_SENSITIVITY: f32 = 0.01;

/// Orbit delta applied per frame while an arrow key is held
const KEY_ORBIT_STEP: f32 = 5.0;

/// Zoom amount applied per frame while a zoom key is held
const KEY_ZOOM_STEP: f32 = 0.2;

/// Translates window events into orbit camera mutations
///
/// Dragging with the left button orbits, the wheel zooms, and a small set of
/// keys is tracked as held state and applied once per frame by [`update`]:
/// arrows orbit, `-`/`=` zoom out, `+`/`_` zoom in, `r` resets.
///
/// [`update`]: CameraController::update
pub struct CameraController {
    is_dragging: bool,
    cursor: (f64, f64),
    held_keys: HashSet<Key>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            is_dragging: false,
            cursor: (0.0, 0.0),
            held_keys: HashSet::new(),
        }
    }

    /// Last observed cursor position in physical pixels
    pub fn cursor(&self) -> (f64, f64) {
        self.cursor
    }

    pub fn process_window_event(&mut self, event: &WindowEvent, camera: &mut OrbitCamera) {
        match event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.is_dragging = *state == ElementState::Pressed;
            }
            WindowEvent::CursorLeft { .. } => {
                self.is_dragging = false;
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x, position.y, camera);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // LineDelta is in notches with up positive; browsers report
                // roughly 100 pixels per notch with down positive
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => scroll * 100.0,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32,
                };
                camera.zoom(scroll_amount * WHEEL_SENSITIVITY);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let key = normalize_key(&event.logical_key);
                match event.state {
                    ElementState::Pressed => {
                        self.held_keys.insert(key);
                    }
                    ElementState::Released => {
                        self.held_keys.remove(&key);
                    }
                }
            }
            _ => (),
        }
    }

    /// Apply held camera keys; called once per frame
    pub fn update(&self, camera: &mut OrbitCamera) {
        if self.is_named_held(NamedKey::ArrowLeft) {
            camera.orbit(KEY_ORBIT_STEP, 0.0);
        }
        if self.is_named_held(NamedKey::ArrowRight) {
            camera.orbit(-KEY_ORBIT_STEP, 0.0);
        }
        if self.is_named_held(NamedKey::ArrowUp) {
            camera.orbit(0.0, KEY_ORBIT_STEP);
        }
        if self.is_named_held(NamedKey::ArrowDown) {
            camera.orbit(0.0, -KEY_ORBIT_STEP);
        }
        if self.is_char_held("-") || self.is_char_held("=") {
            camera.zoom(-KEY_ZOOM_STEP);
        }
        if self.is_char_held("+") || self.is_char_held("_") {
            camera.zoom(KEY_ZOOM_STEP);
        }
        if self.is_char_held("r") {
            camera.reset();
        }
    }

    fn cursor_moved(&mut self, x: f64, y: f64, camera: &mut OrbitCamera) {
        if self.is_dragging {
            let dx = (x - self.cursor.0) as f32;
            let dy = (y - self.cursor.1) as f32;
            camera.orbit(dx, dy);
        }
        self.cursor = (x, y);
    }

    fn is_named_held(&self, key: NamedKey) -> bool {
        self.held_keys.contains(&Key::Named(key))
    }

    fn is_char_held(&self, ch: &str) -> bool {
        self.held_keys.contains(&Key::Character(SmolStr::new(ch)))
    }
}

/// Letters are tracked case-insensitively so shift state does not stick keys
fn normalize_key(key: &Key) -> Key {
    match key {
        Key::Character(c) => Key::Character(SmolStr::new(c.to_lowercase())),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn test_drag_orbits_and_preserves_radius() {
        let mut controller = CameraController::new();
        let mut camera = OrbitCamera::new(800, 600);
        let radius = (camera.position - camera.target).magnitude();
        let start = camera.position;

        controller.cursor_moved(100.0, 100.0, &mut camera);
        controller.is_dragging = true;
        controller.cursor_moved(160.0, 80.0, &mut camera);

        assert_ne!(camera.position, start);
        let after = (camera.position - camera.target).magnitude();
        assert!((after - radius).abs() < 1e-3);
    }

    #[test]
    fn test_motion_without_drag_leaves_camera_alone() {
        let mut controller = CameraController::new();
        let mut camera = OrbitCamera::new(800, 600);
        let start = camera.position;

        controller.cursor_moved(300.0, 300.0, &mut camera);

        assert_eq!(camera.position, start);
        assert_eq!(controller.cursor(), (300.0, 300.0));
    }

    #[test]
    fn test_held_arrow_key_orbits_each_frame() {
        let mut controller = CameraController::new();
        let mut camera = OrbitCamera::new(800, 600);
        controller
            .held_keys
            .insert(Key::Named(NamedKey::ArrowLeft));

        let start = camera.position;
        controller.update(&mut camera);
        let once = camera.position;
        controller.update(&mut camera);

        assert_ne!(start, once);
        assert_ne!(once, camera.position);
    }

    #[test]
    fn test_held_reset_key_restores_defaults() {
        let mut controller = CameraController::new();
        let mut camera = OrbitCamera::new(800, 600);
        camera.orbit(40.0, 20.0);
        camera.zoom(2.0);
        controller.held_keys.insert(Key::Character(SmolStr::new("r")));

        controller.update(&mut camera);

        assert_eq!(camera.position, super::super::orbit_camera::DEFAULT_POSITION);
    }

    #[test]
    fn test_key_normalization_is_case_insensitive() {
        let upper = normalize_key(&Key::Character(SmolStr::new("R")));
        assert_eq!(upper, Key::Character(SmolStr::new("r")));
    }
}
