//! wgpu-based rendering engine
//!
//! Owns the surface, device, depth buffer, and pipelines, and draws the
//! scene in a single pass: objects first, then the grid overlay, then the
//! selection outline. Per-frame uniform uploads happen before the pass is
//! recorded.

use std::sync::Arc;
use std::time::Instant;

use cgmath::Matrix4;
use wgpu::TextureFormat;

use crate::gfx::resources::{
    BindingLayouts, GlobalBindings, GlobalUniforms, ObjectUniforms, TexturePixels, TextureResource,
};
use crate::gfx::scene::object::ObjectBindings;
use crate::gfx::scene::{Scene, ShaderKind};
use crate::wgpu_utils::binding_builder::BindGroupBuilder;
use crate::wgpu_utils::uniform_buffer::UniformBuffer;

use super::fps::FpsCounter;
use super::pipeline_manager::{PipelineKind, PipelineManager};

/// Uniform enlargement applied to the selected object's model matrix so the
/// outline shell pokes out past the surface
const OUTLINE_SCALE: f32 = 1.03;
const OUTLINE_COLOR: [f32; 3] = [1.0, 1.0, 0.0];

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    format: TextureFormat,
    depth_texture: TextureResource,
    pub pipeline_manager: PipelineManager,
    layouts: BindingLayouts,
    global_bindings: GlobalBindings,
    /// 1x1 fallback bound wherever an object has no texture of its own
    white_texture: TextureResource,
    outline_uniforms: UniformBuffer<ObjectUniforms>,
    outline_bind_group: wgpu::BindGroup,
    outline_texture_bind_group: wgpu::BindGroup,
    fps: FpsCounter,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Initializes wgpu, configures the surface with a non-sRGB format,
    /// creates the depth buffer, and builds every pipeline up front.
    ///
    /// # Panics
    /// Panics if unable to create a wgpu adapter or device.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> RenderEngine {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to request adapter!");

        let (device, queue) = {
            adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("WGPU Device"),
                    required_features: wgpu::Features::default(),
                    required_limits: wgpu::Limits {
                        max_texture_dimension_2d: 4096,
                        ..wgpu::Limits::downlevel_defaults()
                    },
                    memory_hints: wgpu::MemoryHints::default(),
                    trace: wgpu::Trace::Off,
                })
                .await
                .expect("Failed to request a device!")
        };

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Immediate,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let layouts = BindingLayouts::new(&device);
        let global_bindings = GlobalBindings::new(&device, &layouts);
        let white_texture =
            TextureResource::from_pixels(&device, &queue, &TexturePixels::white(), "White");

        let pipeline_manager = PipelineManager::new(&device, format, &layouts);

        let outline_uniforms = UniformBuffer::new(&device);
        let outline_bind_group = BindGroupBuilder::new(&layouts.object)
            .resource(outline_uniforms.binding_resource())
            .create(&device, "Outline Bind Group");
        let outline_texture_bind_group = BindGroupBuilder::new(&layouts.texture)
            .texture(&white_texture.view)
            .sampler(&white_texture.sampler)
            .create(&device, "Outline Texture Bind Group");

        RenderEngine {
            surface,
            device: device.into(),
            queue: queue.into(),
            config,
            format,
            depth_texture,
            pipeline_manager,
            layouts,
            global_bindings,
            white_texture,
            outline_uniforms,
            outline_bind_group,
            outline_texture_bind_group,
            fps: FpsCounter::new(Instant::now()),
        }
    }

    /// Renders one frame of the scene
    ///
    /// Uploads per-frame uniform state, then records a single pass: visible
    /// objects in list order, the grid overlay when enabled, and the
    /// depth-biased outline around the selected object.
    pub fn render(&mut self, scene: &mut Scene) -> Result<(), wgpu::SurfaceError> {
        let view = scene.camera_manager.camera.view_matrix();
        let projection = scene.camera_manager.camera.projection_matrix();
        self.global_bindings.update(
            &self.queue,
            GlobalUniforms::new(view, projection, &scene.lighting),
        );
        scene.sync_gpu(&self.device, &self.queue, &self.layouts, &self.white_texture);

        if let Some(object) = scene.selected.and_then(|index| scene.get_object(index)) {
            let outline_model = object.model_matrix * Matrix4::from_scale(OUTLINE_SCALE);
            self.outline_uniforms.update_content(
                &self.queue,
                ObjectUniforms::new(outline_model, OUTLINE_COLOR, false),
            );
        }

        let surface_texture = self.surface.get_current_texture()?;
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.1,
                            b: 0.1,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for object in &scene.objects {
                if !object.visible {
                    continue;
                }
                let Some(gpu) = object.gpu.as_ref() else {
                    continue;
                };
                let kind = match object.shader {
                    ShaderKind::Lit if object.transparent => PipelineKind::LitBlend,
                    ShaderKind::Lit => PipelineKind::Lit,
                    ShaderKind::Flat => PipelineKind::Flat,
                };
                let Some(pipeline) = self.pipeline_manager.get(kind) else {
                    log::debug!(
                        "No pipeline registered for {:?}, skipping \"{}\"",
                        kind,
                        object.name
                    );
                    continue;
                };

                render_pass.set_pipeline(pipeline);
                match &gpu.bindings {
                    ObjectBindings::Lit {
                        bind_group,
                        texture_bind_group,
                        ..
                    } => {
                        render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
                        render_pass.set_bind_group(1, bind_group, &[]);
                        render_pass.set_bind_group(2, texture_bind_group, &[]);
                    }
                    ObjectBindings::Flat { bind_group, .. } => {
                        render_pass.set_bind_group(0, bind_group, &[]);
                    }
                }
                render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                render_pass.draw(0..gpu.vertex_count, 0..1);
            }

            if scene.grid_enabled {
                if let Some(gpu) = scene.grid.gpu.as_ref() {
                    match self.pipeline_manager.get(PipelineKind::FlatLines) {
                        Some(pipeline) => {
                            if let ObjectBindings::Flat { bind_group, .. } = &gpu.bindings {
                                render_pass.set_pipeline(pipeline);
                                render_pass.set_bind_group(0, bind_group, &[]);
                                render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                                render_pass.draw(0..gpu.vertex_count, 0..1);
                            }
                        }
                        None => log::warn!("Grid pipeline not found"),
                    }
                }
            }

            // The outline has no visibility check; a hidden selection still
            // shows its highlight shell.
            if let Some(object) = scene.selected.and_then(|index| scene.get_object(index)) {
                if let (Some(gpu), Some(pipeline)) = (
                    object.gpu.as_ref(),
                    self.pipeline_manager.get(PipelineKind::Outline),
                ) {
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
                    render_pass.set_bind_group(1, &self.outline_bind_group, &[]);
                    render_pass.set_bind_group(2, &self.outline_texture_bind_group, &[]);
                    render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                    render_pass.draw(0..gpu.vertex_count, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();

        self.fps.tick(Instant::now());
        Ok(())
    }

    /// Resizes the render engine surface and recreates the depth buffer
    ///
    /// Zero-sized dimensions are ignored so minimizing the window never
    /// reconfigures the surface with an invalid extent.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Returns current surface dimensions
    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}
