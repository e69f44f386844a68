//! # Vertex Data Structures
//!
//! This module defines the vertex format shared by every render pipeline in
//! the engine. All drawable geometry is uploaded as a single interleaved
//! stream of [`Vertex3D`] values.

use crate::gfx::mesh::VertexBuffers;

/// A 3D vertex with position, normal, and texture coordinate data.
///
/// # Memory Layout
///
/// The `#[repr(C)]` attribute ensures the struct has a C-compatible memory
/// layout, which is required for GPU buffer operations.
///
/// # Examples
///
/// ```no_run
/// use alcove::gfx::scene::vertex::Vertex3D;
///
/// let vertex = Vertex3D {
///     position: [0.0, 1.0, 0.0],
///     normal: [0.0, 1.0, 0.0],
///     tex_coords: [0.5, 0.5],
/// };
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    /// 3D position coordinates [x, y, z]
    pub position: [f32; 3],
    /// 3D normal vector [nx, ny, nz] for lighting calculations
    pub normal: [f32; 3],
    /// Texture coordinates [u, v]
    pub tex_coords: [f32; 2],
}

impl Vertex3D {
    /// Returns the vertex buffer layout for wgpu rendering.
    ///
    /// # Returns
    ///
    /// A [`wgpu::VertexBufferLayout`] that describes:
    /// - Attribute 0: Position (Float32x3) at shader location 0
    /// - Attribute 1: Normal (Float32x3) at shader location 1
    /// - Attribute 2: Texture coordinates (Float32x2) at shader location 2
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }

    /// Interleaves flattened attribute streams into vertex records.
    ///
    /// Missing normal or texture coordinate streams are zero-filled so meshes
    /// without those attributes still fit the shared vertex layout.
    pub fn interleave(buffers: &VertexBuffers) -> Vec<Vertex3D> {
        let count = buffers.vertex_count() as usize;
        let mut vertices = Vec::with_capacity(count);
        for i in 0..count {
            let position = [
                buffers.positions[i * 3],
                buffers.positions[i * 3 + 1],
                buffers.positions[i * 3 + 2],
            ];
            let normal = buffers
                .normals
                .as_ref()
                .map(|normals| [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]])
                .unwrap_or([0.0; 3]);
            let tex_coords = buffers
                .tex_coords
                .as_ref()
                .map(|coords| [coords[i * 2], coords[i * 2 + 1]])
                .unwrap_or([0.0; 2]);
            vertices.push(Vertex3D {
                position,
                normal,
                tex_coords,
            });
        }
        vertices
    }
}
