//! Uniform blocks shared with `msdf_text.wgsl`.

use crate::texture::AtlasTexture;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Per-atlas material parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MsdfParams {
    /// Distance range across the edge, atlas pixels.
    pub px_range: f32,
    /// Fixed distance range in screen pixels. 0 derives it per fragment from
    /// UV derivatives.
    pub screen_px_range: f32,
    pub atlas_size: [f32; 2],
}

impl MsdfParams {
    pub fn for_atlas(texture: &AtlasTexture) -> Self {
        Self {
            px_range: texture.px_range(),
            screen_px_range: 0.0,
            atlas_size: [texture.width() as f32, texture.height() as f32],
        }
    }

    pub fn with_screen_px_range(mut self, screen_px_range: f32) -> Self {
        self.screen_px_range = screen_px_range;
        self
    }
}

/// Camera uniform.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(view_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}
