//! Render pipeline management
//!
//! The renderer draws with a closed set of pipelines keyed by
//! [`PipelineKind`]. All of them share the interleaved [`Vertex3D`] layout
//! and the single depth buffer; they differ only in shader, topology,
//! blending, and depth bias. A lookup miss is reported to the caller so it
//! can log and skip instead of failing mid-frame.

use std::collections::HashMap;

use wgpu::*;

use crate::gfx::resources::{BindingLayouts, TextureResource};
use crate::gfx::scene::vertex::Vertex3D;

/// One of the fixed pipelines the renderer draws with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// Opaque Blinn-Phong geometry
    Lit,
    /// Blinn-Phong geometry with alpha blending
    LitBlend,
    /// Unlit flat-color triangles
    Flat,
    /// Unlit flat-color lines, used by the grid overlay
    FlatLines,
    /// Selection outline, depth-biased to sit behind the object it wraps
    Outline,
}

/// Render state for one pipeline
///
/// Only the parameters that actually vary across the pipeline set are
/// configurable; everything else (vertex layout, depth format, multisampling)
/// is shared.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub topology: PrimitiveTopology,
    pub blend: BlendState,
    pub depth_bias: DepthBiasState,
    pub cull_mode: Option<Face>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Pipeline".to_string(),
            topology: PrimitiveTopology::TriangleList,
            blend: BlendState::REPLACE,
            depth_bias: DepthBiasState::default(),
            cull_mode: Some(Face::Back),
        }
    }
}

impl PipelineConfig {
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    pub fn with_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_blend(mut self, blend: BlendState) -> Self {
        self.blend = blend;
        self
    }

    pub fn with_depth_bias(mut self, bias: DepthBiasState) -> Self {
        self.depth_bias = bias;
        self
    }
}

/// Builds and caches the renderer's pipelines
pub struct PipelineManager {
    pipelines: HashMap<PipelineKind, RenderPipeline>,
}

impl PipelineManager {
    /// Compiles both shaders and creates every pipeline up front
    ///
    /// The lit pipelines bind globals, per-object uniforms, and the texture;
    /// the flat pipelines bind a single combined uniform block.
    pub fn new(device: &Device, surface_format: TextureFormat, layouts: &BindingLayouts) -> Self {
        let lit_shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("lit"),
            source: ShaderSource::Wgsl(include_str!("lit.wgsl").into()),
        });
        let flat_shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("flat"),
            source: ShaderSource::Wgsl(include_str!("flat.wgsl").into()),
        });

        let lit_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Lit Pipeline Layout"),
            bind_group_layouts: &[
                &layouts.globals.layout,
                &layouts.object.layout,
                &layouts.texture.layout,
            ],
            push_constant_ranges: &[],
        });
        let flat_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Flat Pipeline Layout"),
            bind_group_layouts: &[&layouts.flat.layout],
            push_constant_ranges: &[],
        });

        let configs = [
            (
                PipelineKind::Lit,
                &lit_shader,
                &lit_layout,
                PipelineConfig::default().with_label("Lit Pipeline"),
            ),
            (
                PipelineKind::LitBlend,
                &lit_shader,
                &lit_layout,
                PipelineConfig::default()
                    .with_label("Lit Blend Pipeline")
                    .with_blend(BlendState::ALPHA_BLENDING),
            ),
            (
                PipelineKind::Outline,
                &lit_shader,
                &lit_layout,
                // The bias matches glPolygonOffset(1, 1): the enlarged shell
                // loses the depth fight everywhere the real surface is drawn.
                PipelineConfig::default()
                    .with_label("Outline Pipeline")
                    .with_depth_bias(DepthBiasState {
                        constant: 1,
                        slope_scale: 1.0,
                        clamp: 0.0,
                    }),
            ),
            (
                PipelineKind::Flat,
                &flat_shader,
                &flat_layout,
                PipelineConfig::default().with_label("Flat Pipeline"),
            ),
            (
                PipelineKind::FlatLines,
                &flat_shader,
                &flat_layout,
                PipelineConfig::default()
                    .with_label("Grid Pipeline")
                    .with_topology(PrimitiveTopology::LineList),
            ),
        ];

        let mut pipelines = HashMap::new();
        for (kind, shader, layout, config) in configs {
            let pipeline = create_pipeline(device, shader, layout, surface_format, &config);
            pipelines.insert(kind, pipeline);
        }

        Self { pipelines }
    }

    /// Looks up a pipeline by kind
    ///
    /// # Returns
    /// Reference to the pipeline, or None if it was never registered
    pub fn get(&self, kind: PipelineKind) -> Option<&RenderPipeline> {
        self.pipelines.get(&kind)
    }

    /// Number of registered pipelines
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

fn create_pipeline(
    device: &Device,
    shader: &ShaderModule,
    layout: &PipelineLayout,
    surface_format: TextureFormat,
    config: &PipelineConfig,
) -> RenderPipeline {
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(&config.label),
        layout: Some(layout),
        vertex: VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex3D::desc()],
            compilation_options: PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: surface_format,
                blend: Some(config.blend),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: PipelineCompilationOptions::default(),
        }),
        primitive: PrimitiveState {
            topology: config.topology,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: config.cull_mode,
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: TextureResource::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: config.depth_bias,
        }),
        multisample: MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_opaque_triangles() {
        let config = PipelineConfig::default();
        assert_eq!(config.topology, PrimitiveTopology::TriangleList);
        assert_eq!(config.blend, BlendState::REPLACE);
        assert_eq!(config.cull_mode, Some(Face::Back));
        assert_eq!(config.depth_bias, DepthBiasState::default());
    }

    #[test]
    fn test_config_builder_chains() {
        let config = PipelineConfig::default()
            .with_label("Grid Pipeline")
            .with_topology(PrimitiveTopology::LineList)
            .with_blend(BlendState::ALPHA_BLENDING);
        assert_eq!(config.label, "Grid Pipeline");
        assert_eq!(config.topology, PrimitiveTopology::LineList);
        assert_eq!(config.blend, BlendState::ALPHA_BLENDING);
    }
}
