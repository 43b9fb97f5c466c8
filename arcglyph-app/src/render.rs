//! Headless upload and single-frame render.

use crate::config::RenderConfig;
use arcglyph_atlas::{AtlasId, FontManager};
use arcglyph_gpu::{
    AtlasTexture, CameraUniform, GpuContext, GpuTextMesh, MsdfTextPipeline, OffscreenTarget,
};
use arcglyph_mesh::{Aabb, TextMesh};
use glam::{Mat4, Vec3};
use std::collections::HashMap;
use std::error::Error;
use std::path::Path;
use tracing::info;

/// Upload every atlas and `mesh`, render one frame and optionally save it.
#[tracing::instrument(skip_all)]
pub fn render_offscreen(
    fonts: &mut FontManager,
    mesh: &TextMesh,
    config: &RenderConfig,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let ctx = GpuContext::new_headless_blocking()?;
    let device = &ctx.device;
    let queue = &ctx.queue;

    let ids: Vec<AtlasId> = fonts.chain().map(|(id, _)| id).collect();
    let mut textures = HashMap::new();
    for id in ids {
        if let Some(atlas) = fonts.atlas_mut(id) {
            textures.insert(id, AtlasTexture::new(device, queue, atlas));
        }
    }

    let target = OffscreenTarget::new(device, config.width, config.height);
    let pipeline = MsdfTextPipeline::new(device, target.format(), None);
    let camera = CameraUniform::new(frame_bounds(&mesh.bounds, config.fov_y, target.aspect()));
    let camera_buffer = pipeline.camera_buffer(device, &camera);
    let camera_bind_group = pipeline.camera_bind_group(device, &camera_buffer);
    let gpu_mesh = GpuTextMesh::upload(device, &pipeline, mesh, &textures)?;

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Text Render Encoder"),
    });
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Text Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.02,
                        g: 0.02,
                        b: 0.025,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        pipeline.bind(&mut pass, &camera_bind_group);
        gpu_mesh.draw(&mut pass);
    }
    queue.submit(Some(encoder.finish()));
    info!(
        "Rendered {} draw(s) into {}x{} target",
        gpu_mesh.draw_count(),
        target.width(),
        target.height()
    );

    if let Some(path) = output {
        let pixels = target.read_rgba(device, queue)?;
        let image = image::RgbaImage::from_raw(target.width(), target.height(), pixels)
            .ok_or("readback size does not match the target")?;
        image.save(path)?;
        info!("Wrote {}", path.display());
    }

    gpu_mesh.destroy();
    camera_buffer.destroy();
    target.destroy();
    for texture in textures.into_values() {
        texture.destroy();
    }
    Ok(())
}

/// View-projection that frames `bounds` from the +Z side.
fn frame_bounds(bounds: &Aabb, fov_y_degrees: f32, aspect: f32) -> Mat4 {
    let fov_y = fov_y_degrees.to_radians();
    let radius = bounds.half_extent.length().max(1e-3);
    // Fit the bounding sphere in the narrower of the two fields of view.
    let half_fov = (fov_y * 0.5).min((aspect * (fov_y * 0.5).tan()).atan());
    let distance = radius / half_fov.sin();
    let eye = bounds.center + Vec3::Z * distance;
    let projection = Mat4::perspective_rh(fov_y, aspect, distance * 0.01, distance + radius * 2.0);
    let view = Mat4::look_at_rh(eye, bounds.center, Vec3::Y);
    projection * view
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_frame_bounds_keeps_corners_in_view() {
        let bounds = Aabb::from_min_max(Vec3::new(-2.0, -0.5, -0.1), Vec3::new(3.0, 1.0, 0.1));
        let view_proj = frame_bounds(&bounds, 45.0, 2.0);
        for corner in [bounds.min(), bounds.max(), Vec3::new(-2.0, 1.0, 0.1)] {
            let clip = view_proj * Vec4::from((corner, 1.0));
            let ndc = clip.truncate() / clip.w;
            assert!(clip.w > 0.0);
            assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0, "{corner:?} -> {ndc:?}");
            assert!((0.0..=1.0).contains(&ndc.z));
        }
    }
}
