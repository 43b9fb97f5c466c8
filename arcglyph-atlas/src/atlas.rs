//! MSDF font atlas: one packed RGBA texture per font.

use crate::color::{ColorGlyph, ColorLayer, resolve_palette_color};
use crate::config::{AtlasConfig, OverflowPolicy};
use crate::error::AtlasError;
use crate::packer::AtlasPacker;
use crate::shape::Bounds;
use crate::source::{DistanceBitmap, FontMetrics, GlyphKey, GlyphShapeSource, GlyphTransform};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Rendering metrics for one glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    pub key: GlyphKey,
    /// Horizontal advance in em units.
    pub advance: f64,
    /// Quad extent in em units, relative to the pen position.
    pub plane: Bounds,
    /// Atlas UVs (0-1), image space: V = 0 is the top row of the texture.
    /// `uv.top` is therefore numerically smaller than `uv.bottom`.
    pub uv: Bounds,
}

impl GlyphMetrics {
    /// Whether the glyph has any geometry to draw.
    pub fn is_visible(&self) -> bool {
        self.plane.left != self.plane.right && self.plane.bottom != self.plane.top
    }
}

/// Where a glyph's bitmap sits: its slot and the tight region inside the cell
/// (bitmap pixels, y up from the bottom of the cell).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    slot: u32,
    region: Bounds,
}

#[derive(Debug, Clone, Copy)]
struct GlyphEntry {
    metrics: GlyphMetrics,
    placement: Option<Placement>,
}

/// A font's glyph atlas.
///
/// Owns the font's shape source, an RGBA pixel buffer and two append-only
/// metrics tables: one keyed by codepoint and one keyed by glyph index for
/// color layers. Slots are never reused. Single writer: generation takes
/// `&mut self`.
pub struct FontAtlas {
    name: String,
    source: Box<dyn GlyphShapeSource>,
    config: AtlasConfig,
    packer: AtlasPacker,
    pixels: Vec<u8>,
    next_slot: u32,
    glyphs: HashMap<char, GlyphEntry>,
    glyphs_by_index: HashMap<u32, GlyphEntry>,
    font_metrics: FontMetrics,
    palette: Option<Vec<u32>>,
    dirty: bool,
    generation: u32,
}

impl FontAtlas {
    /// Create an atlas for a font and generate the configured initial charset.
    #[tracing::instrument(level = "info", skip_all, fields(font = %name.as_ref()))]
    pub fn new(name: impl AsRef<str>, source: Box<dyn GlyphShapeSource>, config: AtlasConfig) -> Self {
        let charset = config.initial_charset.clone();
        let estimated = charset.chars().count() as u32;
        let packer = AtlasPacker::for_estimate(estimated, &config);
        let font_metrics = source.metrics();
        let palette = load_palette(source.as_ref());

        info!(
            "Font metrics: unitsPerEm={:.0}, ascent={:.3}, lineHeight={:.3}",
            font_metrics.units_per_em, font_metrics.ascent, font_metrics.line_height
        );

        let mut atlas = Self {
            name: name.as_ref().to_string(),
            source,
            pixels: vec![0; packer.byte_len()],
            packer,
            config,
            next_slot: 0,
            glyphs: HashMap::new(),
            glyphs_by_index: HashMap::new(),
            font_metrics,
            palette,
            dirty: true,
            generation: 0,
        };

        for c in charset.chars() {
            atlas.generate(GlyphKey::Codepoint(c));
        }

        info!(
            "MSDF atlas generated: {}x{} ({} glyphs, {} slots)",
            atlas.width(),
            atlas.height(),
            atlas.glyphs.len(),
            atlas.next_slot
        );

        atlas
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Metrics for a codepoint that has already been generated.
    pub fn glyph(&self, codepoint: char) -> Option<&GlyphMetrics> {
        self.glyphs.get(&codepoint).map(|e| &e.metrics)
    }

    /// Metrics for a glyph index that has already been generated.
    pub fn glyph_by_index(&self, glyph_index: u32) -> Option<&GlyphMetrics> {
        self.glyphs_by_index.get(&glyph_index).map(|e| &e.metrics)
    }

    /// Current metrics for either kind of key. UVs change when the atlas
    /// grows, so holders of older copies should look them up again.
    pub fn metrics(&self, key: GlyphKey) -> Option<&GlyphMetrics> {
        self.lookup(key).map(|e| &e.metrics)
    }

    /// Generate `codepoint` if needed and return its metrics.
    ///
    /// `None` when the font lacks the glyph or generation failed.
    pub fn generate_glyph(&mut self, codepoint: char) -> Option<GlyphMetrics> {
        self.generate(GlyphKey::Codepoint(codepoint))
    }

    /// Generate a glyph by index (color layers) if needed and return its metrics.
    pub fn generate_glyph_by_index(&mut self, glyph_index: u32) -> Option<GlyphMetrics> {
        self.generate(GlyphKey::Index(glyph_index))
    }

    /// Generate every missing codepoint of `text`.
    ///
    /// Returns true if any slot was allocated, i.e. the pixel buffer needs a
    /// re-upload.
    pub fn ensure_glyphs(&mut self, text: &str) -> bool {
        let before = self.next_slot;
        for c in text.chars() {
            if !self.glyphs.contains_key(&c) {
                self.generate(GlyphKey::Codepoint(c));
            }
        }
        self.next_slot != before
    }

    /// Sum of advances of already generated glyphs, em units.
    pub fn measure_width(&self, text: &str) -> f64 {
        text.chars()
            .filter_map(|c| self.glyph(c))
            .map(|g| g.advance)
            .sum()
    }

    /// Layers of a color glyph, `None` for plain glyphs or fonts without a
    /// usable color table.
    pub fn color_layers(&self, codepoint: char) -> Option<ColorGlyph> {
        let palette = self.palette.as_deref()?;
        let base = self.source.glyph_index(codepoint).filter(|&g| g != 0)?;

        let layers: Vec<ColorLayer> = self
            .source
            .color_layers(base)
            .into_iter()
            .map(|record| ColorLayer {
                glyph_index: record.glyph_index,
                argb: resolve_palette_color(palette, record.palette_index),
            })
            .collect();

        (!layers.is_empty()).then_some(ColorGlyph { layers })
    }

    /// Whether the font has a COLR table and a readable palette.
    pub fn has_color_table(&self) -> bool {
        self.palette.is_some()
    }

    /// ARGB entries of the first palette.
    pub fn palette(&self) -> Option<&[u32]> {
        self.palette.as_deref()
    }

    pub fn units_per_em(&self) -> f64 {
        self.font_metrics.units_per_em
    }

    /// Ascent in em units.
    pub fn ascent(&self) -> f64 {
        self.font_metrics.ascent
    }

    /// Line height in em units.
    pub fn line_height(&self) -> f64 {
        self.font_metrics.line_height
    }

    /// Full distance range across the edge, in pixels, as the shader expects it.
    pub fn px_range(&self) -> f64 {
        2.0 * self.config.px_range
    }

    pub fn cell_size(&self) -> u32 {
        self.packer.cell_size()
    }

    pub fn width(&self) -> u32 {
        self.packer.width()
    }

    pub fn height(&self) -> u32 {
        self.packer.height()
    }

    pub fn packer(&self) -> &AtlasPacker {
        &self.packer
    }

    /// RGBA pixel data, top row first.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Slots handed out so far. Under [`OverflowPolicy::Drop`] this includes
    /// slots past capacity; it is not a glyph count.
    pub fn slots_used(&self) -> u32 {
        self.next_slot
    }

    /// Entries in both metrics tables.
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len() + self.glyphs_by_index.len()
    }

    /// Bumped each time the buffer is reallocated and UVs change.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Check if the atlas has been modified since the last upload.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the atlas as clean (after uploading to GPU).
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Write the RGB channels to a PNG for inspection.
    pub fn dump_png(&self, path: impl AsRef<Path>) -> Result<(), AtlasError> {
        let width = self.width();
        let img = image::RgbImage::from_fn(width, self.height(), |x, y| {
            let i = ((y * width + x) * 4) as usize;
            image::Rgb([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
        });
        img.save(path.as_ref())?;
        info!(
            "Atlas dumped to: {} ({}x{}, {} glyphs)",
            path.as_ref().display(),
            width,
            self.height(),
            self.glyph_count()
        );
        Ok(())
    }

    fn lookup(&self, key: GlyphKey) -> Option<&GlyphEntry> {
        match key {
            GlyphKey::Codepoint(c) => self.glyphs.get(&c),
            GlyphKey::Index(i) => self.glyphs_by_index.get(&i),
        }
    }

    fn record(&mut self, entry: GlyphEntry) -> GlyphMetrics {
        match entry.metrics.key {
            GlyphKey::Codepoint(c) => self.glyphs.insert(c, entry),
            GlyphKey::Index(i) => self.glyphs_by_index.insert(i, entry),
        };
        entry.metrics
    }

    fn generate(&mut self, key: GlyphKey) -> Option<GlyphMetrics> {
        if let Some(entry) = self.lookup(key) {
            return Some(entry.metrics);
        }

        // An unmapped codepoint would otherwise render as .notdef.
        if let GlyphKey::Codepoint(c) = key {
            if !self.source.has_glyph(c) {
                return None;
            }
        }

        let outline = self.source.load_outline(key)?;
        let em_scale = 1.0 / self.font_metrics.units_per_em;
        let advance = outline.advance * em_scale;
        let bounds = outline.bounds;

        if bounds.is_degenerate() {
            return Some(self.record(GlyphEntry {
                metrics: GlyphMetrics {
                    key,
                    advance,
                    plane: Bounds::ZERO,
                    uv: Bounds::ZERO,
                },
                placement: None,
            }));
        }

        let cell = self.packer.cell_size();
        let transform = GlyphTransform::fit(&bounds, cell, self.config.px_range);
        if !(transform.scale.is_finite() && transform.scale > 0.0) {
            warn!(
                "Cell of {}px cannot hold {:?} with a {}px distance range",
                cell, key, self.config.px_range
            );
            return None;
        }

        let mut bitmap = match self.source.rasterize(&outline, &transform, cell) {
            Ok(bitmap) => bitmap,
            Err(e) => {
                warn!("Failed to generate MTSDF for {:?}: {}", key, e);
                return None;
            }
        };
        self.source.error_correct(&mut bitmap, &outline, &transform);

        let slot = self.allocate_slot(key)?;
        self.blit(slot, &bitmap);

        // Tight bounds: the outline plus the distance-field padding, not the
        // whole cell, so neighbouring quads do not overlap.
        let tight = bounds.expand(transform.padding_in_shape_units());
        let low = transform.to_bitmap(glam::DVec2::new(tight.left, tight.bottom));
        let high = transform.to_bitmap(glam::DVec2::new(tight.right, tight.top));
        let size = f64::from(cell);
        let placement = Placement {
            slot,
            region: Bounds::new(low.x.max(0.0), low.y.max(0.0), high.x.min(size), high.y.min(size)),
        };

        let metrics = GlyphMetrics {
            key,
            advance,
            plane: tight.scaled(em_scale),
            uv: self.uv_bounds(&placement),
        };
        debug!("Generated {:?} in slot {}", key, slot);

        Some(self.record(GlyphEntry {
            metrics,
            placement: Some(placement),
        }))
    }

    fn allocate_slot(&mut self, key: GlyphKey) -> Option<u32> {
        if self.next_slot >= self.packer.capacity() {
            match self.config.overflow {
                OverflowPolicy::Grow => {
                    if !self.grow() {
                        warn!(
                            "Atlas '{}' is full at {}x{}, dropping {:?}",
                            self.name,
                            self.width(),
                            self.height(),
                            key
                        );
                        return None;
                    }
                }
                OverflowPolicy::Drop => {
                    warn!(
                        "Atlas '{}' slot {} exceeds capacity {}, texels for {:?} dropped",
                        self.name,
                        self.next_slot,
                        self.packer.capacity(),
                        key
                    );
                }
            }
        }
        let slot = self.next_slot;
        self.next_slot += 1;
        Some(slot)
    }

    /// Copy a bottom-up float bitmap into the top-down byte buffer.
    fn blit(&mut self, slot: u32, bitmap: &DistanceBitmap) {
        let rect = self.packer.cell_rect(slot);
        let (width, height) = (self.width(), self.height());
        let rows = bitmap.height().min(rect.size);
        let cols = bitmap.width().min(rect.size);

        for y in 0..rows {
            let atlas_y = rect.y + (rect.size - 1 - y);
            if atlas_y >= height {
                continue;
            }
            for x in 0..cols {
                let atlas_x = rect.x + x;
                if atlas_x >= width {
                    continue;
                }
                let dst = ((atlas_y * width + atlas_x) * 4) as usize;
                let texel = bitmap.texel(x, y);
                for (channel, value) in texel.iter().enumerate() {
                    self.pixels[dst + channel] = quantize(*value);
                }
            }
        }
        self.dirty = true;
    }

    /// UVs of a placement, inset by half a texel so bilinear filtering never
    /// reaches into the neighbouring cell.
    fn uv_bounds(&self, placement: &Placement) -> Bounds {
        let rect = self.packer.cell_rect(placement.slot);
        let width = f64::from(self.width());
        let height = f64::from(self.height());
        let cell = f64::from(rect.size);
        let half_x = 0.5 / width;
        let half_y = 0.5 / height;
        let region = placement.region;

        Bounds {
            left: (f64::from(rect.x) + region.left) / width + half_x,
            right: (f64::from(rect.x) + region.right) / width - half_x,
            top: (f64::from(rect.y) + (cell - region.top)) / height + half_y,
            bottom: (f64::from(rect.y) + (cell - region.bottom)) / height - half_y,
        }
    }

    /// Reallocate into a larger grid. Returns false at the maximum size.
    fn grow(&mut self) -> bool {
        let Some(next) = self.packer.grown() else {
            return false;
        };

        let mut pixels = vec![0; next.byte_len()];
        let row_bytes = (self.packer.cell_size() * 4) as usize;
        let live = self.next_slot.min(self.packer.capacity());
        for slot in 0..live {
            let from = self.packer.cell_rect(slot);
            let to = next.cell_rect(slot);
            for row in 0..from.size {
                let src = (((from.y + row) * self.packer.width() + from.x) * 4) as usize;
                let dst = (((to.y + row) * next.width() + to.x) * 4) as usize;
                pixels[dst..dst + row_bytes].copy_from_slice(&self.pixels[src..src + row_bytes]);
            }
        }

        info!(
            "Atlas '{}' grown from {}x{} to {}x{}",
            self.name,
            self.packer.width(),
            self.packer.height(),
            next.width(),
            next.height()
        );

        self.packer = next;
        self.pixels = pixels;
        self.refresh_uvs();
        self.generation += 1;
        self.dirty = true;
        true
    }

    fn refresh_uvs(&mut self) {
        let mut glyphs = std::mem::take(&mut self.glyphs);
        let mut by_index = std::mem::take(&mut self.glyphs_by_index);
        for entry in glyphs.values_mut().chain(by_index.values_mut()) {
            if let Some(placement) = entry.placement {
                entry.metrics.uv = self.uv_bounds(&placement);
            }
        }
        self.glyphs = glyphs;
        self.glyphs_by_index = by_index;
    }
}

/// A missing or empty palette downgrades the font to "no color table".
fn load_palette(source: &dyn GlyphShapeSource) -> Option<Vec<u32>> {
    if !source.has_color_table() {
        return None;
    }
    match source.palette_entries() {
        Some(entries) if !entries.is_empty() => {
            info!("Loaded CPAL palette: {} entries", entries.len());
            Some(entries)
        }
        _ => {
            warn!("Color table present but palette unreadable, ignoring color glyphs");
            None
        }
    }
}

fn quantize(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

impl std::fmt::Debug for FontAtlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontAtlas")
            .field("name", &self.name)
            .field("width", &self.width())
            .field("height", &self.height())
            .field("slots_used", &self.next_slot)
            .field("glyphs", &self.glyph_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFont;

    fn small_config() -> AtlasConfig {
        AtlasConfig::default()
            .with_cell_size(16)
            .with_initial_charset("")
    }

    fn font() -> FakeFont {
        FakeFont::new(1000.0)
            .with_glyph('A', 600.0, Bounds::new(20.0, 0.0, 580.0, 700.0))
            .with_glyph('B', 550.0, Bounds::new(60.0, 0.0, 500.0, 700.0))
            .with_glyph('g', 500.0, Bounds::new(40.0, -200.0, 460.0, 500.0))
            .with_empty_glyph(' ', 250.0)
    }

    #[test]
    fn test_initial_charset_is_generated() {
        let config = small_config().with_initial_charset("AB ");
        let atlas = FontAtlas::new("test", Box::new(font()), config);
        assert!(atlas.glyph('A').is_some());
        assert!(atlas.glyph('B').is_some());
        assert!(atlas.glyph(' ').is_some());
        // Spaces do not take a slot.
        assert_eq!(atlas.slots_used(), 2);
    }

    #[test]
    fn test_cell_without_room_for_outline_skips_glyph() {
        let mut atlas = FontAtlas::new("test", Box::new(font()), small_config().with_cell_size(8));
        assert!(atlas.generate_glyph('A').is_none());
        assert_eq!(atlas.slots_used(), 0);
    }

    #[test]
    fn test_advance_in_em_units() {
        let mut atlas = FontAtlas::new("test", Box::new(font()), small_config());
        let a = atlas.generate_glyph('A').unwrap();
        assert!((a.advance - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_missing_glyph_is_skipped() {
        let mut atlas = FontAtlas::new("test", Box::new(font()), small_config());
        assert!(atlas.generate_glyph('Z').is_none());
        assert_eq!(atlas.slots_used(), 0);
        assert_eq!(atlas.glyph_count(), 0);
    }

    #[test]
    fn test_space_has_zero_bounds() {
        let mut atlas = FontAtlas::new("test", Box::new(font()), small_config());
        let space = atlas.generate_glyph(' ').unwrap();
        assert_eq!(space.plane, Bounds::ZERO);
        assert_eq!(space.uv, Bounds::ZERO);
        assert!((space.advance - 0.25).abs() < 1e-12);
        assert!(!space.is_visible());
    }

    #[test]
    fn test_plane_bounds_are_tight() {
        let mut atlas = FontAtlas::new("test", Box::new(font()), small_config());
        let g = atlas.generate_glyph('g').unwrap();
        // 16 px cell, 4 px range: scale = 8 / 700, padding = 4 / scale = 350 units
        let pad = 350.0 / 1000.0;
        assert!((g.plane.left - (0.04 - pad)).abs() < 1e-9);
        assert!((g.plane.bottom - (-0.2 - pad)).abs() < 1e-9);
        assert!((g.plane.right - (0.46 + pad)).abs() < 1e-9);
        assert!((g.plane.top - (0.5 + pad)).abs() < 1e-9);
    }

    #[test]
    fn test_uvs_inset_by_half_texel() {
        let mut atlas = FontAtlas::new("test", Box::new(font()), small_config());
        for c in ['A', 'B', 'g'] {
            let m = atlas.generate_glyph(c).unwrap();
            let hx = 0.5 / f64::from(atlas.width());
            let hy = 0.5 / f64::from(atlas.height());
            for u in [m.uv.left, m.uv.right] {
                assert!(u >= hx - 1e-12 && u <= 1.0 - hx + 1e-12);
            }
            for v in [m.uv.top, m.uv.bottom] {
                assert!(v >= hy - 1e-12 && v <= 1.0 - hy + 1e-12);
            }
            assert!(m.uv.left < m.uv.right);
            assert!(m.uv.top < m.uv.bottom);
        }
    }

    #[test]
    fn test_tall_glyph_fills_cell_vertically() {
        let mut atlas = FontAtlas::new("test", Box::new(font()), small_config());
        let a = atlas.generate_glyph('A').unwrap();
        // Slot 0, height-limited glyph: tight region spans the whole cell height.
        let h = f64::from(atlas.height());
        assert!((a.uv.top - 0.5 / h).abs() < 1e-12);
        assert!((a.uv.bottom - (16.0 / h - 0.5 / h)).abs() < 1e-12);
    }

    #[test]
    fn test_pixels_written_top_down() {
        let mut atlas = FontAtlas::new("test", Box::new(font()), small_config());
        atlas.generate_glyph('A').unwrap();
        let w = atlas.width() as usize;
        // Cell center is inside the glyph, cell corner is outside.
        let center = (8 * w + 8) * 4;
        assert!(atlas.pixels()[center] > 128);
        assert!(atlas.pixels()[0] < 128);
    }

    #[test]
    fn test_ensure_glyphs_is_idempotent() {
        let mut atlas = FontAtlas::new("test", Box::new(font()), small_config());
        assert!(atlas.ensure_glyphs("AB g"));
        let slots = atlas.slots_used();
        assert!(!atlas.ensure_glyphs("AB g"));
        assert_eq!(atlas.slots_used(), slots);
    }

    #[test]
    fn test_measure_width() {
        let mut atlas = FontAtlas::new("test", Box::new(font()), small_config());
        atlas.ensure_glyphs("AB");
        assert!((atlas.measure_width("ABZ") - 1.15).abs() < 1e-12);
    }

    #[test]
    fn test_raster_failure_leaves_atlas_untouched() {
        let source = font().with_failing_glyph('B');
        let mut atlas = FontAtlas::new("test", Box::new(source), small_config());
        atlas.mark_clean();
        assert!(atlas.generate_glyph('B').is_none());
        assert_eq!(atlas.slots_used(), 0);
        assert!(!atlas.is_dirty());
    }

    #[test]
    fn test_grow_keeps_uvs_pointing_at_same_pixels() {
        let config = AtlasConfig {
            cell_size: 16,
            min_slots: 1,
            slot_slack: 0,
            max_dimension: 64,
            initial_charset: String::new(),
            ..AtlasConfig::default()
        };
        let mut source = FakeFont::new(1000.0);
        let chars: Vec<char> = ('a'..='p').collect();
        for &c in &chars {
            source = source.with_glyph(c, 500.0, Bounds::new(0.0, 0.0, 400.0, 600.0));
        }
        let mut atlas = FontAtlas::new("grow", Box::new(source), config);
        assert_eq!(atlas.packer().capacity(), 1);

        let first = atlas.generate_glyph('a').unwrap();
        // A few texels in from the top-left corner of the glyph's region.
        let texel_at = |atlas: &FontAtlas, uv: &Bounds| {
            let x = (uv.left * f64::from(atlas.width()) + 2.0) as usize;
            let y = (uv.top * f64::from(atlas.height()) + 4.0) as usize;
            atlas.pixels()[(y * atlas.width() as usize + x) * 4]
        };
        let before = texel_at(&atlas, &first.uv);

        for &c in &chars[1..] {
            assert!(atlas.generate_glyph(c).is_some());
        }
        assert_eq!(atlas.width(), 64);
        assert_eq!(atlas.height(), 64);
        assert!(atlas.generation() > 0);

        let moved = *atlas.glyph('a').unwrap();
        assert_eq!(moved.plane, first.plane);
        assert_eq!(texel_at(&atlas, &moved.uv), before);
    }

    #[test]
    fn test_grow_stops_at_max_dimension() {
        let config = AtlasConfig {
            cell_size: 16,
            min_slots: 1,
            slot_slack: 0,
            max_dimension: 32,
            initial_charset: String::new(),
            ..AtlasConfig::default()
        };
        let mut source = FakeFont::new(1000.0);
        for c in 'a'..='e' {
            source = source.with_glyph(c, 500.0, Bounds::new(0.0, 0.0, 400.0, 600.0));
        }
        let mut atlas = FontAtlas::new("full", Box::new(source), config);
        for c in 'a'..='d' {
            assert!(atlas.generate_glyph(c).is_some());
        }
        assert!(atlas.generate_glyph('e').is_none());
        assert_eq!(atlas.slots_used(), 4);
    }

    #[test]
    fn test_drop_policy_records_metrics_past_capacity() {
        let config = AtlasConfig {
            cell_size: 16,
            min_slots: 1,
            slot_slack: 0,
            max_dimension: 16,
            overflow: OverflowPolicy::Drop,
            initial_charset: String::new(),
            ..AtlasConfig::default()
        };
        let source = font();
        let mut atlas = FontAtlas::new("drop", Box::new(source), config);
        let pixels_len = atlas.pixels().len();

        assert!(atlas.generate_glyph('A').is_some());
        let b = atlas.generate_glyph('B').unwrap();
        assert_eq!(atlas.slots_used(), 2);
        assert_eq!(atlas.pixels().len(), pixels_len);
        // Slot 1 lives one row below a one-cell atlas.
        assert!(b.uv.top > 1.0);
        assert!((b.advance - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_color_layers_resolved_from_palette() {
        let source = font()
            .with_indexed_glyph(10, 600.0, Bounds::new(0.0, 0.0, 600.0, 600.0))
            .with_indexed_glyph(11, 600.0, Bounds::new(100.0, 100.0, 500.0, 500.0))
            .with_palette(vec![0xFFFF_0000, 0xFF00_FF00])
            .with_color_glyph('A', &[(10, 1), (11, 0xFFFF)]);
        let mut atlas = FontAtlas::new("color", Box::new(source), small_config());
        assert!(atlas.has_color_table());

        let glyph = atlas.color_layers('A').unwrap();
        assert_eq!(glyph.layers.len(), 2);
        assert_eq!(glyph.layers[0].argb, 0xFF00_FF00);
        assert!(glyph.layers[1].is_foreground());
        assert!(atlas.color_layers('B').is_none());

        let layer = atlas.generate_glyph_by_index(10).unwrap();
        assert_eq!(layer.key, GlyphKey::Index(10));
        assert!(atlas.glyph_by_index(10).is_some());
        assert!(atlas.glyph('A').is_none());
    }

    #[test]
    fn test_bad_palette_disables_color() {
        let source = font()
            .with_indexed_glyph(10, 600.0, Bounds::new(0.0, 0.0, 600.0, 600.0))
            .with_palette(Vec::new())
            .with_color_glyph('A', &[(10, 0)]);
        let atlas = FontAtlas::new("color", Box::new(source), small_config());
        assert!(!atlas.has_color_table());
        assert!(atlas.color_layers('A').is_none());
    }
}
