use super::camera_utils::Camera;
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Default eye position, restored by [`OrbitCamera::reset`]
pub const DEFAULT_POSITION: Vector3<f32> = Vector3::new(6.0, 6.0, 6.0);

/// Default look-at target, restored by [`OrbitCamera::reset`]
pub const DEFAULT_TARGET: Vector3<f32> = Vector3::new(0.0, 0.0, 0.0);

/// Radians of orbit per pixel of drag
const ORBIT_SENSITIVITY: f32 = 0.005;

/// Keeps the polar angle away from the poles so the up vector never flips
const POLE_MARGIN: f32 = 0.1;

/// Orbiting look-at camera
///
/// The view matrix is re-derived synchronously by every mutating call, so
/// there is never a window where position and matrix disagree. The projection
/// matrix is rebuilt by [`update_projection_matrix`] whenever the viewport
/// changes size.
///
/// [`update_projection_matrix`]: OrbitCamera::update_projection_matrix
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub fovy: Rad<f32>,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
    /// Physical viewport size, kept for aspect and for screen-space picking
    pub viewport: (f32, f32),
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection * self.view
    }
}

impl OrbitCamera {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            position: DEFAULT_POSITION,
            target: DEFAULT_TARGET,
            up: Vector3::unit_y(),
            fovy: Rad(45.0 * std::f32::consts::PI / 180.0),
            aspect: 1.0,
            znear: 0.1,
            zfar: 100.0,
            viewport: (width as f32, height as f32),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
        };
        camera.update_view_matrix();
        camera.update_projection_matrix(width, height);
        camera
    }

    /// Rotate the eye around the target on a sphere of constant radius
    ///
    /// `dx`/`dy` are drag deltas in pixels. The polar angle is clamped away
    /// from the poles; the azimuthal angle is unbounded.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        let offset = self.position - self.target;
        let radius = offset.magnitude();

        let mut theta = offset.z.atan2(offset.x);
        let mut phi = (offset.y / radius).acos();

        theta -= dx * ORBIT_SENSITIVITY;
        phi = (phi - dy * ORBIT_SENSITIVITY)
            .clamp(POLE_MARGIN, std::f32::consts::PI - POLE_MARGIN);

        self.position = self.target
            + Vector3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.cos(),
                radius * phi.sin() * theta.sin(),
            );
        self.update_view_matrix();
    }

    /// Translate the eye along the view direction
    ///
    /// Positive amounts move toward the target. There is no minimum-radius
    /// guard: a large enough amount overshoots the target, so callers keep
    /// their steps small.
    pub fn zoom(&mut self, amount: f32) {
        let direction = (self.target - self.position).normalize();
        self.position += direction * amount;
        self.update_view_matrix();
    }

    /// Restore the default eye position and target
    pub fn reset(&mut self) {
        self.position = DEFAULT_POSITION;
        self.target = DEFAULT_TARGET;
        self.update_view_matrix();
    }

    /// Rebuild the projection matrix for a new viewport size
    pub fn update_projection_matrix(&mut self, width: u32, height: u32) {
        self.viewport = (width as f32, height as f32);
        self.aspect = width as f32 / height as f32;
        self.projection =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection
    }

    fn update_view_matrix(&mut self) {
        self.view = Matrix4::look_at_rh(
            Point3::from_vec(self.position),
            Point3::from_vec(self.target),
            self.up,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radius(camera: &OrbitCamera) -> f32 {
        (camera.position - camera.target).magnitude()
    }

    fn polar_angle(camera: &OrbitCamera) -> f32 {
        let offset = camera.position - camera.target;
        (offset.y / offset.magnitude()).acos()
    }

    #[test]
    fn test_orbit_preserves_radius() {
        let mut camera = OrbitCamera::new(800, 600);
        let before = radius(&camera);

        for _ in 0..50 {
            camera.orbit(13.0, -7.0);
        }

        assert!((radius(&camera) - before).abs() < 1e-3);
    }

    #[test]
    fn test_orbit_polar_angle_stays_clamped() {
        let mut camera = OrbitCamera::new(800, 600);

        // drag hard toward the top pole, then the bottom pole
        for _ in 0..500 {
            camera.orbit(0.0, 50.0);
        }
        assert!(polar_angle(&camera) >= POLE_MARGIN - 1e-4);

        for _ in 0..1000 {
            camera.orbit(0.0, -50.0);
        }
        assert!(polar_angle(&camera) <= std::f32::consts::PI - POLE_MARGIN + 1e-4);
    }

    #[test]
    fn test_orbit_is_target_relative() {
        let mut camera = OrbitCamera::new(800, 600);
        camera.target = Vector3::new(1.0, 2.0, 3.0);
        camera.position = Vector3::new(4.0, 2.0, 3.0);

        let before = radius(&camera);
        camera.orbit(40.0, 10.0);

        assert!((radius(&camera) - before).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_round_trip_returns_to_start() {
        let mut camera = OrbitCamera::new(800, 600);
        let start = camera.position;

        camera.zoom(2.5);
        camera.zoom(-2.5);

        assert!((camera.position - start).magnitude() < 1e-4);
    }

    #[test]
    fn test_zoom_moves_toward_target() {
        let mut camera = OrbitCamera::new(800, 600);
        let before = radius(&camera);
        camera.zoom(1.0);
        assert!((before - radius(&camera) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut camera = OrbitCamera::new(800, 600);
        camera.orbit(123.0, 45.0);
        camera.zoom(3.0);
        camera.target = Vector3::new(2.0, 0.0, -1.0);

        camera.reset();

        assert_eq!(camera.position, DEFAULT_POSITION);
        assert_eq!(camera.target, DEFAULT_TARGET);
    }

    #[test]
    fn test_projection_tracks_viewport() {
        let mut camera = OrbitCamera::new(800, 600);
        camera.update_projection_matrix(1920, 1080);
        assert!((camera.aspect - 1920.0 / 1080.0).abs() < 1e-6);
        assert_eq!(camera.viewport, (1920.0, 1080.0));
    }

    #[test]
    fn test_view_matrix_tracks_mutation() {
        let mut camera = OrbitCamera::new(800, 600);
        let before = camera.view_matrix();
        camera.orbit(25.0, 0.0);
        let after = camera.view_matrix();
        assert_ne!(
            super::super::camera_utils::convert_matrix4_to_array(before),
            super::super::camera_utils::convert_matrix4_to_array(after)
        );
    }
}
