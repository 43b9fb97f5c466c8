//! Atlas textures.

use arcglyph_atlas::FontAtlas;
use tracing::debug;

/// GPU copy of one atlas pixel buffer (RGBA8, no mipmaps).
///
/// Uploads are always whole-texture; there is no partial update path.
pub struct AtlasTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    px_range: f32,
}

impl AtlasTexture {
    /// Create a texture sized to `atlas` and upload its pixels.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, atlas: &mut FontAtlas) -> Self {
        let (texture, view) = create_texture(device, atlas.name(), atlas.width(), atlas.height());
        let mut this = Self {
            texture,
            view,
            width: atlas.width(),
            height: atlas.height(),
            px_range: atlas.px_range() as f32,
        };
        this.upload(queue, atlas);
        this
    }

    /// Re-upload `atlas` if it changed since the last upload, recreating the
    /// texture when the atlas has grown. Returns true if anything was written.
    ///
    /// After a regrow, bind groups referencing the old view are stale and the
    /// meshes using them must be rebuilt.
    pub fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, atlas: &mut FontAtlas) -> bool {
        if !atlas.is_dirty() {
            return false;
        }
        if atlas.width() != self.width || atlas.height() != self.height {
            self.texture.destroy();
            let (texture, view) = create_texture(device, atlas.name(), atlas.width(), atlas.height());
            self.texture = texture;
            self.view = view;
            self.width = atlas.width();
            self.height = atlas.height();
        }
        self.upload(queue, atlas);
        true
    }

    fn upload(&mut self, queue: &wgpu::Queue, atlas: &mut FontAtlas) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            atlas.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.width * 4),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        atlas.mark_clean();
        debug!("Uploaded atlas '{}' ({}x{})", atlas.name(), self.width, self.height);
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Full distance range in atlas pixels, as the shader expects it.
    pub fn px_range(&self) -> f32 {
        self.px_range
    }

    /// Release the GPU texture.
    pub fn destroy(self) {
        self.texture.destroy();
    }
}

fn create_texture(
    device: &wgpu::Device,
    name: &str,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(&format!("MSDF Atlas {name}")),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
