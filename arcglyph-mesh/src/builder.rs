//! Text mesh construction.

use crate::error::MeshBuildError;
use crate::layout::{LayoutGlyph, layout};
use crate::mesh::{Aabb, AtlasRange, IndexData, TextMesh, TextVertex};
use crate::surface::{FlatSurface, TextSurface};
use arcglyph_atlas::{AtlasId, FontManager, GlyphMetrics, argb_to_rgba};
use glam::Vec3;
use tracing::{debug, info};

/// Padding added to every side of the mesh bounds.
const BOUNDS_EPSILON: f32 = 0.001;

/// Builds a [`TextMesh`] for one string on one surface.
///
/// ```ignore
/// let mesh = TextMeshBuilder::new()
///     .text("Hello")
///     .font_manager(&mut fonts)
///     .font_size(0.5)
///     .color(0xFFFF_FFFF)
///     .surface(CylindricalSurface::new(Vec3::ZERO, Vec3::Y, 2.0, Vec3::Z))
///     .build()?;
/// ```
pub struct TextMeshBuilder<'a> {
    text: Option<String>,
    fonts: Option<&'a mut FontManager>,
    font_size: f32,
    color: u32,
    surface: Box<dyn TextSurface + 'a>,
}

impl Default for TextMeshBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TextMeshBuilder<'a> {
    /// Size 1, opaque white, flat XY plane.
    pub fn new() -> Self {
        Self {
            text: None,
            fonts: None,
            font_size: 1.0,
            color: 0xFFFF_FFFF,
            surface: Box::new(FlatSurface::default()),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// The fallback chain glyphs are resolved (and generated) through.
    pub fn font_manager(mut self, fonts: &'a mut FontManager) -> Self {
        self.fonts = Some(fonts);
        self
    }

    /// World units per em.
    pub fn font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Text color as ARGB.
    pub fn color(mut self, argb: u32) -> Self {
        self.color = argb;
        self
    }

    pub fn surface(mut self, surface: impl TextSurface + 'a) -> Self {
        self.surface = Box::new(surface);
        self
    }

    /// Lay out, tessellate and assemble the mesh.
    ///
    /// Fails only when the text or the font manager is missing. Text without
    /// visible glyphs yields an empty mesh.
    #[tracing::instrument(skip_all)]
    pub fn build(self) -> Result<TextMesh, MeshBuildError> {
        let text = self
            .text
            .filter(|t| !t.is_empty())
            .ok_or(MeshBuildError::EmptyText)?;
        let fonts = self.fonts.ok_or(MeshBuildError::MissingFontManager)?;
        let surface = self.surface.as_ref();
        let font_size = self.font_size;

        let mut glyphs = layout(fonts, &text, font_size, argb_to_rgba(self.color));

        // Generation during layout may have grown an atlas and moved UVs.
        for glyph in &mut glyphs {
            if let Some(current) = fonts
                .atlas_by_id(glyph.atlas)
                .and_then(|a| a.metrics(glyph.metrics.key))
            {
                glyph.metrics = *current;
            }
        }

        let groups = group_by_atlas(glyphs);
        let subdivisions = surface.subdivisions_per_em();

        let (vertex_total, index_total) = groups
            .iter()
            .flat_map(|(_, g)| g)
            .map(|g| grid_size(&g.metrics, subdivisions))
            .fold((0usize, 0usize), |(v, i), (cols, rows)| {
                (v + (cols + 1) * (rows + 1), i + cols * rows * 6)
            });

        if vertex_total == 0 {
            debug!("No visible glyphs in {:?}", text);
            return Ok(TextMesh::empty());
        }

        let mut vertices = Vec::with_capacity(vertex_total);
        let mut indices = IndexData::for_vertex_count(vertex_total, index_total);
        let mut ranges = Vec::with_capacity(groups.len());
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);

        for (atlas, group) in &groups {
            let start = indices.len();
            for glyph in group {
                let (cols, rows) = grid_size(&glyph.metrics, subdivisions);
                let base = vertices.len() as u32;

                let plane = glyph.metrics.plane;
                let left = glyph.cursor_x + plane.left as f32 * font_size;
                let right = glyph.cursor_x + plane.right as f32 * font_size;
                let bottom = glyph.cursor_y + plane.bottom as f32 * font_size;
                let top = glyph.cursor_y + plane.top as f32 * font_size;

                let uv = glyph.metrics.uv;
                let (uv_left, uv_right) = (uv.left as f32, uv.right as f32);
                // Atlas UVs have V = 0 at the top; vertices want it at the bottom.
                let v_bottom = 1.0 - uv.bottom as f32;
                let v_top = 1.0 - uv.top as f32;

                for row in 0..=rows {
                    let fv = row as f32 / rows as f32;
                    let y = bottom + fv * (top - bottom);
                    for col in 0..=cols {
                        let fu = col as f32 / cols as f32;
                        let x = left + fu * (right - left);
                        let position = surface.position(x, y);
                        min = min.min(position);
                        max = max.max(position);
                        vertices.push(TextVertex {
                            position: position.to_array(),
                            normal: surface.normal(x, y).to_array(),
                            color: glyph.color,
                            uv: [
                                uv_left + fu * (uv_right - uv_left),
                                v_bottom + fv * (v_top - v_bottom),
                            ],
                        });
                    }
                }

                let stride = cols as u32 + 1;
                for row in 0..rows as u32 {
                    for col in 0..cols as u32 {
                        let tl = base + row * stride + col;
                        let tr = tl + 1;
                        let bl = tl + stride;
                        let br = bl + 1;
                        for index in [tl, tr, bl, bl, tr, br] {
                            indices.push(index);
                        }
                    }
                }
            }
            ranges.push(AtlasRange {
                atlas: *atlas,
                start: start as u32,
                count: (indices.len() - start) as u32,
            });
        }

        let bounds = Aabb::from_min_max(min - BOUNDS_EPSILON, max + BOUNDS_EPSILON);
        info!(
            "Built text mesh: {} vertices, {} indices, {} atlas ranges",
            vertices.len(),
            indices.len(),
            ranges.len()
        );

        Ok(TextMesh {
            vertices,
            indices,
            ranges,
            bounds,
        })
    }
}

/// Group glyphs by atlas, keeping first-encounter order of atlases and
/// layout order within each group.
fn group_by_atlas(glyphs: Vec<LayoutGlyph>) -> Vec<(AtlasId, Vec<LayoutGlyph>)> {
    let mut groups: Vec<(AtlasId, Vec<LayoutGlyph>)> = Vec::new();
    for glyph in glyphs {
        match groups.iter_mut().find(|(id, _)| *id == glyph.atlas) {
            Some((_, group)) => group.push(glyph),
            None => groups.push((glyph.atlas, vec![glyph])),
        }
    }
    groups
}

/// Grid cells `(cols, rows)` for one glyph quad.
fn grid_size(metrics: &GlyphMetrics, subdivisions_per_em: u32) -> (usize, usize) {
    if subdivisions_per_em == 0 {
        return (1, 1);
    }
    let per_em = f64::from(subdivisions_per_em);
    let cols = (metrics.plane.width() * per_em).round().max(1.0) as usize;
    let rows = (metrics.plane.height() * per_em).round().max(1.0) as usize;
    (cols, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::CylindricalSurface;
    use arcglyph_atlas::testing::FakeFont;
    use arcglyph_atlas::{AtlasConfig, Bounds};

    fn config() -> AtlasConfig {
        AtlasConfig::default().with_cell_size(16).with_initial_charset("")
    }

    fn font() -> FakeFont {
        FakeFont::new(1000.0)
            .with_glyph('A', 600.0, Bounds::new(0.0, 0.0, 600.0, 700.0))
            .with_glyph('B', 500.0, Bounds::new(50.0, 0.0, 450.0, 700.0))
            .with_empty_glyph(' ', 250.0)
    }

    fn fonts() -> FontManager {
        let mut fonts = FontManager::new(config()).unwrap();
        fonts.register_source("test", Box::new(font()));
        fonts
    }

    #[test]
    fn test_missing_text_fails() {
        let mut fonts = fonts();
        let err = TextMeshBuilder::new().font_manager(&mut fonts).build();
        assert_eq!(err.unwrap_err(), MeshBuildError::EmptyText);
        let err = TextMeshBuilder::new().text("").font_manager(&mut fonts).build();
        assert_eq!(err.unwrap_err(), MeshBuildError::EmptyText);
    }

    #[test]
    fn test_missing_font_manager_fails() {
        let err = TextMeshBuilder::new().text("A").build();
        assert_eq!(err.unwrap_err(), MeshBuildError::MissingFontManager);
    }

    #[test]
    fn test_whitespace_builds_empty_mesh() {
        let mut fonts = fonts();
        let mesh = TextMeshBuilder::new()
            .text("  \n ")
            .font_manager(&mut fonts)
            .build()
            .unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh.index_count(), 0);
        assert!(mesh.ranges.is_empty());
    }

    #[test]
    fn test_flat_glyph_is_one_quad() {
        let mut fonts = fonts();
        let mesh = TextMeshBuilder::new()
            .text("A")
            .font_manager(&mut fonts)
            .font_size(2.0)
            .color(0xFF10_2030)
            .build()
            .unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, IndexData::U16(vec![0, 1, 2, 2, 1, 3]));
        assert_eq!(mesh.ranges.len(), 1);

        let metrics = *fonts.atlas("test").unwrap().glyph('A').unwrap();
        let bottom_left = mesh.vertices[0];
        let expected = Vec3::new(metrics.plane.left as f32 * 2.0, metrics.plane.bottom as f32 * 2.0, 0.0);
        assert!((Vec3::from(bottom_left.position) - expected).length() < 1e-5);
        assert!((bottom_left.uv[0] - metrics.uv.left as f32).abs() < 1e-6);
        assert!((bottom_left.uv[1] - (1.0 - metrics.uv.bottom as f32)).abs() < 1e-6);
        assert_eq!(bottom_left.normal, [0.0, 0.0, 1.0]);
        assert_eq!(bottom_left.color, [0x10, 0x20, 0x30, 0xFF]);

        let top_right = mesh.vertices[3];
        assert!((top_right.uv[1] - (1.0 - metrics.uv.top as f32)).abs() < 1e-6);
        assert!(top_right.uv[1] > bottom_left.uv[1]);
    }

    #[test]
    fn test_cylinder_subdivides_glyphs() {
        let mut fonts = fonts();
        let mesh = TextMeshBuilder::new()
            .text("A")
            .font_manager(&mut fonts)
            .surface(CylindricalSurface::new(Vec3::ZERO, Vec3::Y, 0.5, Vec3::Z))
            .build()
            .unwrap();

        // Plane is 1.3 x 1.4 em at 2 subdivisions per em -> 3 x 3 cells.
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.index_count(), 54);
        for v in &mesh.vertices {
            let p = Vec3::from(v.position);
            assert!((Vec3::new(p.x, 0.0, p.z).length() - 0.5).abs() < 1e-4);
            assert!(mesh.bounds.contains(p));
        }
    }

    #[test]
    fn test_ranges_grouped_by_atlas() {
        let mut fonts = FontManager::new(config()).unwrap();
        let first = fonts.register_source("first", Box::new(font()));
        let second = fonts.register_source(
            "second",
            Box::new(FakeFont::new(1000.0).with_glyph('x', 500.0, Bounds::new(0.0, 0.0, 400.0, 500.0))),
        );

        let mesh = TextMeshBuilder::new()
            .text("AxB")
            .font_manager(&mut fonts)
            .build()
            .unwrap();

        assert_eq!(
            mesh.ranges,
            vec![
                AtlasRange { atlas: first, start: 0, count: 12 },
                AtlasRange { atlas: second, start: 12, count: 6 },
            ]
        );
        // The second group's quad uses the last four vertices.
        assert_eq!(mesh.indices.get(12), Some(8));
    }

    #[test]
    fn test_uvs_follow_atlas_growth() {
        let config = AtlasConfig {
            cell_size: 16,
            min_slots: 1,
            slot_slack: 0,
            initial_charset: String::new(),
            ..AtlasConfig::default()
        };
        let mut fonts = FontManager::new(config).unwrap();
        fonts.register_source("test", Box::new(font()));

        let mesh = TextMeshBuilder::new()
            .text("AB")
            .font_manager(&mut fonts)
            .build()
            .unwrap();

        let atlas = fonts.atlas("test").unwrap();
        assert!(atlas.generation() > 0);
        let a = atlas.glyph('A').unwrap();
        assert!((mesh.vertices[0].uv[0] - a.uv.left as f32).abs() < 1e-6);
        assert!((mesh.vertices[0].uv[1] - (1.0 - a.uv.bottom as f32)).abs() < 1e-6);
    }
}
