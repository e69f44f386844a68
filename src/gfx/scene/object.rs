//! Scene objects
//!
//! [`SceneObject`] keeps all authoritative state on the CPU side: geometry,
//! transform, material settings, and bookkeeping for persistence. GPU buffers
//! and bind groups live in a lazily created [`GpuObject`] that is refreshed
//! once per frame before rendering.

use std::sync::Arc;

use cgmath::{Matrix4, Rad, SquareMatrix, Vector3};
use wgpu::util::DeviceExt;

use crate::gfx::resources::{
    BindingLayouts, FlatUniforms, ObjectUniforms, TexturePixels, TextureResource,
};
use crate::gfx::scene::vertex::Vertex3D;
use crate::wgpu_utils::binding_builder::BindGroupBuilder;
use crate::wgpu_utils::uniform_buffer::UniformBuffer;

/// Shader program an object is drawn with
///
/// The set of programs is closed, so a lookup against the pipeline manager
/// can report an unregistered program explicitly instead of failing late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// Textured Blinn-Phong shading
    Lit,
    /// Unlit flat color
    Flat,
}

/// Hinge animation state carried by the door object
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DoorState {
    pub is_opening: bool,
    pub is_closing: bool,
    pub is_open: bool,
    /// Current hinge angle in radians, 0 closed to PI/2 open
    pub open_angle: f32,
}

/// A drawable object in the scene
#[derive(Debug)]
pub struct SceneObject {
    pub name: String,
    pub vertices: Vec<Vertex3D>,
    pub model_matrix: Matrix4<f32>,
    pub shader: ShaderKind,
    pub color: [f32; 3],
    pub visible: bool,
    pub selectable: bool,
    pub transparent: bool,
    /// Whether the lit shader samples the bound texture
    pub use_texture: bool,
    /// Source path of the bound texture, kept for persistence
    pub texture_path: Option<String>,
    /// Source path of an imported mesh, kept for persistence
    pub model_path: Option<String>,
    /// Normalization scale the mesh was imported with
    pub initial_scale: Option<f32>,
    /// Anchor position for the door hinge and imported objects
    pub position: Option<[f32; 3]>,
    /// Hinge animation state, present only on the door
    pub door: Option<DoorState>,
    texture: Option<Arc<TexturePixels>>,
    texture_generation: u64,
    pub(crate) gpu: Option<GpuObject>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex3D>, shader: ShaderKind) -> Self {
        Self {
            name: name.into(),
            vertices,
            model_matrix: Matrix4::identity(),
            shader,
            color: [0.6, 0.6, 0.6],
            visible: true,
            selectable: false,
            transparent: false,
            use_texture: false,
            texture_path: None,
            model_path: None,
            initial_scale: None,
            position: None,
            door: None,
            texture: None,
            texture_generation: 0,
            gpu: None,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Swaps the bound texture, bumping the generation counter so the GPU
    /// side re-uploads on the next sync. Setting the same pixel buffer again
    /// is a no-op.
    pub fn set_texture(&mut self, texture: Option<Arc<TexturePixels>>) {
        let unchanged = match (&self.texture, &texture) {
            (Some(current), Some(new)) => Arc::ptr_eq(current, new),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        self.texture = texture;
        self.texture_generation += 1;
    }

    pub fn texture(&self) -> Option<&Arc<TexturePixels>> {
        self.texture.as_ref()
    }

    /// Translates in the object's local frame
    pub fn translate(&mut self, offset: Vector3<f32>) {
        self.model_matrix = self.model_matrix * Matrix4::from_translation(offset);
    }

    pub fn rotate_x(&mut self, angle: Rad<f32>) {
        self.model_matrix = self.model_matrix * Matrix4::from_angle_x(angle);
    }

    pub fn rotate_y(&mut self, angle: Rad<f32>) {
        self.model_matrix = self.model_matrix * Matrix4::from_angle_y(angle);
    }

    pub fn rotate_z(&mut self, angle: Rad<f32>) {
        self.model_matrix = self.model_matrix * Matrix4::from_angle_z(angle);
    }

    /// World-space translation taken from the model matrix
    pub fn translation(&self) -> [f32; 3] {
        [
            self.model_matrix.w.x,
            self.model_matrix.w.y,
            self.model_matrix.w.z,
        ]
    }

    /// Creates or refreshes the GPU-side resources for this object
    ///
    /// The vertex buffer is uploaded once; uniform contents follow the CPU
    /// state every frame and the texture bind group is rebuilt only when the
    /// texture generation changed.
    pub(crate) fn sync_gpu(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &BindingLayouts,
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        white: &TextureResource,
    ) {
        if self.gpu.is_none() {
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Vertex Buffer", self.name)),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let bindings = match self.shader {
                ShaderKind::Lit => {
                    let uniforms = UniformBuffer::new(device);
                    let bind_group = BindGroupBuilder::new(&layouts.object)
                        .resource(uniforms.binding_resource())
                        .create(device, &format!("{} Bind Group", self.name));
                    let texture_bind_group = create_texture_bind_group(
                        device,
                        queue,
                        layouts,
                        self.texture.as_deref(),
                        white,
                        &self.name,
                    );
                    ObjectBindings::Lit {
                        uniforms,
                        bind_group,
                        texture_bind_group,
                        texture_generation: self.texture_generation,
                    }
                }
                ShaderKind::Flat => {
                    let uniforms = UniformBuffer::new(device);
                    let bind_group = BindGroupBuilder::new(&layouts.flat)
                        .resource(uniforms.binding_resource())
                        .create(device, &format!("{} Bind Group", self.name));
                    ObjectBindings::Flat {
                        uniforms,
                        bind_group,
                    }
                }
            };
            self.gpu = Some(GpuObject {
                vertex_buffer,
                vertex_count: self.vertices.len() as u32,
                bindings,
            });
        }

        if let Some(gpu) = self.gpu.as_mut() {
            match &mut gpu.bindings {
                ObjectBindings::Lit {
                    uniforms,
                    texture_bind_group,
                    texture_generation,
                    ..
                } => {
                    uniforms.update_content(
                        queue,
                        ObjectUniforms::new(self.model_matrix, self.color, self.use_texture),
                    );
                    if *texture_generation != self.texture_generation {
                        *texture_bind_group = create_texture_bind_group(
                            device,
                            queue,
                            layouts,
                            self.texture.as_deref(),
                            white,
                            &self.name,
                        );
                        *texture_generation = self.texture_generation;
                    }
                }
                ObjectBindings::Flat { uniforms, .. } => {
                    uniforms.update_content(
                        queue,
                        FlatUniforms::new(view * self.model_matrix, projection, self.color),
                    );
                }
            }
        }
    }
}

/// GPU-side companion of a [`SceneObject`]
///
/// Dropping this releases the vertex buffer and bind groups, so removing an
/// object from the scene frees its GPU memory with it.
#[derive(Debug)]
pub(crate) struct GpuObject {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
    pub bindings: ObjectBindings,
}

#[derive(Debug)]
pub(crate) enum ObjectBindings {
    Lit {
        uniforms: UniformBuffer<ObjectUniforms>,
        bind_group: wgpu::BindGroup,
        texture_bind_group: wgpu::BindGroup,
        texture_generation: u64,
    },
    Flat {
        uniforms: UniformBuffer<FlatUniforms>,
        bind_group: wgpu::BindGroup,
    },
}

fn create_texture_bind_group(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layouts: &BindingLayouts,
    pixels: Option<&TexturePixels>,
    white: &TextureResource,
    name: &str,
) -> wgpu::BindGroup {
    let label = format!("{} Texture Bind Group", name);
    match pixels {
        Some(pixels) => {
            let resource =
                TextureResource::from_pixels(device, queue, pixels, &format!("{} Texture", name));
            BindGroupBuilder::new(&layouts.texture)
                .texture(&resource.view)
                .sampler(&resource.sampler)
                .create(device, &label)
        }
        None => BindGroupBuilder::new(&layouts.texture)
            .texture(&white.view)
            .sampler(&white.sampler)
            .create(device, &label),
    }
}
