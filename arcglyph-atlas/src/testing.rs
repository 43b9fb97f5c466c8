//! In-memory shape source for tests.
//!
//! Every glyph is a rectangle with the given bounds. Rasterization writes
//! the exact signed distance to that rectangle into all four channels, so the
//! atlas sees real texels without a font file.

use crate::error::RasterError;
use crate::raster::allocate;
use crate::shape::Bounds;
use crate::source::{
    DistanceBitmap, FontMetrics, GlyphKey, GlyphOutline, GlyphShapeSource, GlyphTransform,
    LayerRecord,
};
use glam::DVec2;
use std::collections::HashMap;

/// A scripted font.
#[derive(Debug, Clone, Default)]
pub struct FakeFont {
    metrics: FontMetrics,
    glyphs: HashMap<char, GlyphOutline>,
    indexed: HashMap<u32, GlyphOutline>,
    failing: Vec<u32>,
    palette: Option<Vec<u32>>,
    color_glyphs: HashMap<u32, Vec<LayerRecord>>,
}

impl FakeFont {
    /// An empty font with ascent 0.8 em and line height 1.2 em.
    pub fn new(units_per_em: f64) -> Self {
        Self {
            metrics: FontMetrics {
                units_per_em,
                ascent: 0.8,
                line_height: 1.2,
            },
            ..Default::default()
        }
    }

    pub fn with_metrics(mut self, ascent: f64, line_height: f64) -> Self {
        self.metrics.ascent = ascent;
        self.metrics.line_height = line_height;
        self
    }

    /// A rectangular glyph for `c`; bounds and advance in font units.
    pub fn with_glyph(mut self, c: char, advance: f64, bounds: Bounds) -> Self {
        self.glyphs.insert(
            c,
            GlyphOutline {
                glyph_index: u32::from(c),
                bounds,
                advance,
            },
        );
        self
    }

    /// A mapped glyph without contours (a space).
    pub fn with_empty_glyph(mut self, c: char, advance: f64) -> Self {
        self.glyphs.insert(
            c,
            GlyphOutline {
                glyph_index: u32::from(c),
                bounds: Bounds::ZERO,
                advance,
            },
        );
        self
    }

    /// A glyph reachable only by index, as color layers are.
    pub fn with_indexed_glyph(mut self, glyph_index: u32, advance: f64, bounds: Bounds) -> Self {
        self.indexed.insert(
            glyph_index,
            GlyphOutline {
                glyph_index,
                bounds,
                advance,
            },
        );
        self
    }

    /// Make rasterization of `c` fail. The glyph must already be defined.
    pub fn with_failing_glyph(mut self, c: char) -> Self {
        if self.glyphs.contains_key(&c) {
            self.failing.push(u32::from(c));
        }
        self
    }

    pub fn with_palette(mut self, palette: Vec<u32>) -> Self {
        self.palette = Some(palette);
        self
    }

    /// Declare `c` a color glyph made of `(glyph_index, palette_index)` layers.
    pub fn with_color_glyph(mut self, c: char, layers: &[(u32, u16)]) -> Self {
        let records = layers
            .iter()
            .map(|&(glyph_index, palette_index)| LayerRecord {
                glyph_index,
                palette_index,
            })
            .collect();
        self.color_glyphs.insert(u32::from(c), records);
        self
    }
}

impl GlyphShapeSource for FakeFont {
    fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    fn has_glyph(&self, codepoint: char) -> bool {
        self.glyphs.contains_key(&codepoint)
    }

    fn glyph_index(&self, codepoint: char) -> Option<u32> {
        self.has_glyph(codepoint).then_some(u32::from(codepoint))
    }

    fn load_outline(&self, key: GlyphKey) -> Option<GlyphOutline> {
        match key {
            GlyphKey::Codepoint(c) => self.glyphs.get(&c).copied(),
            GlyphKey::Index(i) => self.indexed.get(&i).copied(),
        }
    }

    fn rasterize(
        &self,
        outline: &GlyphOutline,
        transform: &GlyphTransform,
        cell_size: u32,
    ) -> Result<DistanceBitmap, RasterError> {
        if self.failing.contains(&outline.glyph_index) {
            return Err(RasterError::Failed("scripted failure".into()));
        }
        if outline.bounds.is_degenerate() {
            return Err(RasterError::EmptyShape);
        }
        let mut bitmap = allocate(cell_size)?;
        for y in 0..cell_size {
            for x in 0..cell_size {
                let sample = transform.to_shape(DVec2::new(f64::from(x) + 0.5, f64::from(y) + 0.5));
                let value = transform.range.map(box_distance(&outline.bounds, sample)) as f32;
                bitmap.set_texel(x, y, [value.clamp(0.0, 1.0); 4]);
            }
        }
        Ok(bitmap)
    }

    fn has_color_table(&self) -> bool {
        !self.color_glyphs.is_empty()
    }

    fn palette_entries(&self) -> Option<Vec<u32>> {
        self.palette.clone()
    }

    fn color_layers(&self, base_glyph: u32) -> Vec<LayerRecord> {
        self.color_glyphs.get(&base_glyph).cloned().unwrap_or_default()
    }
}

/// Signed distance from `p` to the outline of `bounds`, positive inside.
fn box_distance(bounds: &Bounds, p: DVec2) -> f64 {
    let half = DVec2::new(bounds.width(), bounds.height()) / 2.0;
    let q = (p - bounds.center()).abs() - half;
    let outside = q.max(DVec2::ZERO).length();
    let inside = q.x.max(q.y).min(0.0);
    -(outside + inside)
}
