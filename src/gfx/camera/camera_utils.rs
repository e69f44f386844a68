use cgmath::Matrix4;
use winit::event::WindowEvent;

use super::{camera_controller::CameraController, orbit_camera::OrbitCamera};

/// Bundles the camera with its input controller
pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    pub fn process_window_event(&mut self, event: &WindowEvent) {
        self.controller.process_window_event(event, &mut self.camera);
    }

    /// Apply held camera keys; called once per frame
    pub fn update(&mut self) {
        self.controller.update(&mut self.camera);
    }

    /// Get the view projection matrix from the camera
    pub fn view_proj_matrix(&self) -> Matrix4<f32> {
        self.camera.build_view_projection_matrix()
    }
}

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    let mut result = [[0.0; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            result[i][j] = matrix4[i][j];
        }
    }

    result
}
