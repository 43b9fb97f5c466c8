//! Uploaded text meshes.

use crate::error::GpuError;
use crate::params::MsdfParams;
use crate::pipeline::{MsdfMaterial, MsdfTextPipeline};
use crate::texture::AtlasTexture;
use arcglyph_atlas::AtlasId;
use arcglyph_mesh::TextMesh;
use std::collections::HashMap;
use std::ops::Range;
use tracing::info;
use wgpu::util::DeviceExt;

struct DrawRange {
    atlas: AtlasId,
    indices: Range<u32>,
    material: MsdfMaterial,
}

/// GPU buffers for one [`TextMesh`] plus one material per atlas range.
///
/// Owned by whoever uploaded it and released with [`GpuTextMesh::destroy`].
pub struct GpuTextMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_format: wgpu::IndexFormat,
    draws: Vec<DrawRange>,
}

impl GpuTextMesh {
    /// Upload `mesh`, binding each atlas range to its texture in `textures`.
    #[tracing::instrument(skip_all)]
    pub fn upload(
        device: &wgpu::Device,
        pipeline: &MsdfTextPipeline,
        mesh: &TextMesh,
        textures: &HashMap<AtlasId, AtlasTexture>,
    ) -> Result<Self, GpuError> {
        if mesh.is_empty() {
            return Err(GpuError::EmptyMesh);
        }

        let draws = mesh
            .ranges
            .iter()
            .map(|range| {
                let texture = textures
                    .get(&range.atlas)
                    .ok_or(GpuError::MissingAtlasTexture(range.atlas))?;
                Ok(DrawRange {
                    atlas: range.atlas,
                    indices: range.start..range.start + range.count,
                    material: pipeline.material(device, texture, &MsdfParams::for_atlas(texture)),
                })
            })
            .collect::<Result<Vec<_>, GpuError>>()?;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Text Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Text Index Buffer"),
            contents: mesh.indices.as_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });
        let index_format = if mesh.indices.is_u32() {
            wgpu::IndexFormat::Uint32
        } else {
            wgpu::IndexFormat::Uint16
        };

        info!(
            "Uploaded text mesh: {} vertices, {} indices ({:?}), {} materials",
            mesh.vertex_count(),
            mesh.index_count(),
            index_format,
            draws.len()
        );

        Ok(Self {
            vertex_buffer,
            index_buffer,
            index_format,
            draws,
        })
    }

    /// One indexed draw per atlas range. The pipeline must already be bound.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), self.index_format);
        for draw in &self.draws {
            pass.set_bind_group(1, &draw.material.bind_group, &[]);
            pass.draw_indexed(draw.indices.clone(), 0, 0..1);
        }
    }

    /// Update the shader parameters of every range, e.g. to pin the screen
    /// pixel range.
    pub fn set_params(&self, queue: &wgpu::Queue, textures: &HashMap<AtlasId, AtlasTexture>, screen_px_range: f32) {
        for draw in &self.draws {
            let Some(texture) = textures.get(&draw.atlas) else {
                continue;
            };
            let params = MsdfParams::for_atlas(texture).with_screen_px_range(screen_px_range);
            draw.material.update(queue, &params);
        }
    }

    pub fn index_format(&self) -> wgpu::IndexFormat {
        self.index_format
    }

    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    /// Release buffers and materials.
    pub fn destroy(self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        for draw in self.draws {
            draw.material.destroy();
        }
    }
}
