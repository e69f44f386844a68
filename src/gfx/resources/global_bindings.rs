//! Global uniform bindings for camera and lighting data
//!
//! Defines the uniform buffer contents shared by the shader programs and the
//! bind group layouts every pipeline is built against. The lit program binds
//! globals at group 0, per-object data at group 1 and the surface texture at
//! group 2; the flat program binds its single uniform block at group 0.

use cgmath::{Matrix, Matrix4, SquareMatrix};

use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Scene-wide lighting state
///
/// Mirrors the fragment shading inputs one-to-one: an always-on ambient term,
/// a directional lamp, and an attenuated point lamp.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Lighting {
    pub ambient: [f32; 3],
    pub light_color: [f32; 3],
    pub light_direction: [f32; 3],
    pub point_light_pos: [f32; 3],
    pub shininess: f32,
    pub use_directional: bool,
    pub use_point: bool,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: [0.3, 0.3, 0.3],
            light_color: [1.0, 1.0, 1.0],
            light_direction: [1.0, -1.0, 0.0],
            point_light_pos: [0.0, 2.0, 2.0],
            shininess: 32.0,
            use_directional: true,
            use_point: true,
        }
    }
}

/// Per-frame global uniform content
///
/// MUST match the `Globals` struct in `lit.wgsl` exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct GlobalUniforms {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    ambient: [f32; 4],
    light_color: [f32; 4],
    light_direction: [f32; 4],
    point_light_pos: [f32; 4],
    // x: directional lamp enabled, y: point lamp enabled, z: shininess
    params: [f32; 4],
}
// Total: 64 + 64 + 5 * 16 = 208 bytes

unsafe impl bytemuck::Pod for GlobalUniforms {}
unsafe impl bytemuck::Zeroable for GlobalUniforms {}

impl GlobalUniforms {
    pub fn new(view: Matrix4<f32>, projection: Matrix4<f32>, lighting: &Lighting) -> Self {
        let [ax, ay, az] = lighting.ambient;
        let [lr, lg, lb] = lighting.light_color;
        let [dx, dy, dz] = lighting.light_direction;
        let [px, py, pz] = lighting.point_light_pos;
        Self {
            view: view.into(),
            projection: projection.into(),
            ambient: [ax, ay, az, 0.0],
            light_color: [lr, lg, lb, 0.0],
            light_direction: [dx, dy, dz, 0.0],
            point_light_pos: [px, py, pz, 0.0],
            params: [
                if lighting.use_directional { 1.0 } else { 0.0 },
                if lighting.use_point { 1.0 } else { 0.0 },
                lighting.shininess,
                0.0,
            ],
        }
    }
}

/// Per-object uniform content for the lit program
///
/// MUST match the `ObjectData` struct in `lit.wgsl` exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct ObjectUniforms {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    // rgb: surface color, w: texture sampling enabled
    color_flags: [f32; 4],
}
// Total: 64 + 64 + 16 = 144 bytes

unsafe impl bytemuck::Pod for ObjectUniforms {}
unsafe impl bytemuck::Zeroable for ObjectUniforms {}

impl ObjectUniforms {
    /// Builds per-object data from a model matrix
    ///
    /// The normal matrix is the inverse-transpose of the model matrix; a
    /// non-invertible model falls back to the identity.
    pub fn new(model: Matrix4<f32>, color: [f32; 3], use_texture: bool) -> Self {
        let normal_matrix = model
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);
        Self {
            model: model.into(),
            normal_matrix: normal_matrix.into(),
            color_flags: [
                color[0],
                color[1],
                color[2],
                if use_texture { 1.0 } else { 0.0 },
            ],
        }
    }
}

/// Uniform content for the flat program
///
/// MUST match the `FlatData` struct in `flat.wgsl` exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct FlatUniforms {
    model_view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    color: [f32; 4],
}
// Total: 64 + 64 + 16 = 144 bytes

unsafe impl bytemuck::Pod for FlatUniforms {}
unsafe impl bytemuck::Zeroable for FlatUniforms {}

impl FlatUniforms {
    pub fn new(model_view: Matrix4<f32>, projection: Matrix4<f32>, color: [f32; 3]) -> Self {
        Self {
            model_view: model_view.into(),
            projection: projection.into(),
            color: [color[0], color[1], color[2], 1.0],
        }
    }
}

/// Bind group layouts shared by all pipelines
pub struct BindingLayouts {
    pub globals: BindGroupLayoutWithDesc,
    pub object: BindGroupLayoutWithDesc,
    pub texture: BindGroupLayoutWithDesc,
    pub flat: BindGroupLayoutWithDesc,
}

impl BindingLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let globals = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");

        let object = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Object Bind Group Layout");

        let texture = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Texture Bind Group Layout");

        let flat = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Flat Bind Group Layout");

        Self {
            globals,
            object,
            texture,
            flat,
        }
    }
}

/// Global uniform buffer with its bind group, bound at slot 0 of the lit
/// pipelines
pub struct GlobalBindings {
    ubo: UniformBuffer<GlobalUniforms>,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, layouts: &BindingLayouts) -> Self {
        let ubo = UniformBuffer::new(device);
        let bind_group = BindGroupBuilder::new(&layouts.globals)
            .resource(ubo.binding_resource())
            .create(device, "Global Bind Group");

        Self { ubo, bind_group }
    }

    /// Pushes fresh per-frame content, skipping the write when unchanged
    pub fn update(&mut self, queue: &wgpu::Queue, content: GlobalUniforms) {
        self.ubo.update_content(queue, content);
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<GlobalUniforms>(), 208);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 144);
        assert_eq!(std::mem::size_of::<FlatUniforms>(), 144);
    }

    #[test]
    fn test_lighting_defaults() {
        let lighting = Lighting::default();
        assert_eq!(lighting.ambient, [0.3, 0.3, 0.3]);
        assert_eq!(lighting.light_direction, [1.0, -1.0, 0.0]);
        assert_eq!(lighting.point_light_pos, [0.0, 2.0, 2.0]);
        assert_eq!(lighting.shininess, 32.0);
        assert!(lighting.use_directional);
        assert!(lighting.use_point);
    }

    #[test]
    fn test_global_params_packing() {
        let mut lighting = Lighting::default();
        lighting.use_point = false;
        lighting.shininess = 64.0;
        let globals = GlobalUniforms::new(
            Matrix4::identity(),
            Matrix4::identity(),
            &lighting,
        );
        assert_eq!(globals.params, [1.0, 0.0, 64.0, 0.0]);
    }

    #[test]
    fn test_object_uniforms_normal_matrix_inverse_transpose() {
        // Uniform scale by 2: inverse-transpose scales by 0.5 on the diagonal
        let model = Matrix4::from_scale(2.0);
        let uniforms = ObjectUniforms::new(model, [1.0, 1.0, 1.0], false);
        assert!((uniforms.normal_matrix[0][0] - 0.5).abs() < 1e-6);
        assert!((uniforms.normal_matrix[1][1] - 0.5).abs() < 1e-6);
        assert!((uniforms.normal_matrix[2][2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_object_uniforms_singular_model_falls_back_to_identity() {
        let singular = Matrix4::from_scale(0.0);
        let uniforms = ObjectUniforms::new(singular, [1.0, 0.0, 0.0], true);
        let identity: [[f32; 4]; 4] = Matrix4::identity().into();
        assert_eq!(uniforms.normal_matrix, identity);
        assert_eq!(uniforms.color_flags, [1.0, 0.0, 0.0, 1.0]);
    }
}
