//! The glyph shape source capability.
//!
//! A [`GlyphShapeSource`] stands in for one parsed font plus its distance-field
//! generator. The atlas asks it for outlines, metrics and color tables and
//! hands outlines back to it for rasterization.

use crate::error::RasterError;
use crate::shape::Bounds;
use glam::DVec2;

/// Key of a glyph inside an atlas.
///
/// Codepoints and glyph indices are separate namespaces; color layer glyphs
/// are addressed by index because they have no codepoint of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlyphKey {
    Codepoint(char),
    Index(u32),
}

/// Font-wide vertical metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Font units per em (2048 for most TrueType fonts, 1000 for CFF).
    pub units_per_em: f64,
    /// Baseline to top of the tallest glyph, em units.
    pub ascent: f64,
    /// Baseline-to-baseline distance, em units.
    pub line_height: f64,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            units_per_em: 1.0,
            ascent: 0.8,
            line_height: 1.0,
        }
    }
}

/// A loaded glyph: which outline to rasterize, its tight bounds and its
/// horizontal advance. Bounds and advance are in font units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphOutline {
    pub glyph_index: u32,
    /// Degenerate for glyphs without contours.
    pub bounds: Bounds,
    pub advance: f64,
}

/// Maps a raw signed distance onto a channel value.
///
/// `lower` maps to 0, `upper` to 1 and the midpoint to 0.5.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceRange {
    pub lower: f64,
    pub upper: f64,
}

impl DistanceRange {
    /// A range centred on zero so the outline edge lands on 0.5.
    pub fn symmetric(radius: f64) -> Self {
        Self {
            lower: -radius,
            upper: radius,
        }
    }

    pub fn map(&self, distance: f64) -> f64 {
        (distance - self.lower) / (self.upper - self.lower)
    }
}

/// Shape space to bitmap space: `bitmap = scale * (shape + translate)`.
///
/// `translate` is expressed in shape units, not pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphTransform {
    pub scale: f64,
    pub translate: DVec2,
    pub range: DistanceRange,
}

impl GlyphTransform {
    /// Center `bounds` in a square cell of `cell_size` pixels, leaving
    /// `px_range` pixels of distance field on every side.
    ///
    /// `cell_size` must exceed `2 * px_range`; [`AtlasConfig::validate`]
    /// rejects configurations where it does not.
    ///
    /// [`AtlasConfig::validate`]: crate::AtlasConfig::validate
    pub fn fit(bounds: &Bounds, cell_size: u32, px_range: f64) -> Self {
        let cell = f64::from(cell_size);
        let scale = (cell - 2.0 * px_range) / bounds.width().max(bounds.height());
        let translate = DVec2::splat(cell / (2.0 * scale)) - bounds.center();
        Self {
            scale,
            translate,
            range: DistanceRange::symmetric(px_range / scale),
        }
    }

    pub fn to_bitmap(&self, p: DVec2) -> DVec2 {
        self.scale * (p + self.translate)
    }

    pub fn to_shape(&self, p: DVec2) -> DVec2 {
        p / self.scale - self.translate
    }

    /// The distance-field padding expressed in shape units.
    pub fn padding_in_shape_units(&self) -> f64 {
        self.range.upper
    }

    /// Width of the whole distance range in bitmap pixels.
    pub fn px_range(&self) -> f64 {
        (self.range.upper - self.range.lower) * self.scale
    }
}

/// A four channel float bitmap: three multi-channel distances plus the true
/// signed distance. Row 0 is the bottom row.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceBitmap {
    width: u32,
    height: u32,
    texels: Vec<[f32; 4]>,
}

impl DistanceBitmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            texels: vec![[0.0; 4]; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Texel at column `x`, row `y` counted from the bottom.
    pub fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        self.texels[(y * self.width + x) as usize]
    }

    pub fn set_texel(&mut self, x: u32, y: u32, value: [f32; 4]) {
        self.texels[(y * self.width + x) as usize] = value;
    }
}

/// One layer of a COLRv0 glyph as stored in the font: an outline glyph index
/// and a palette slot (`0xFFFF` means foreground).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerRecord {
    pub glyph_index: u32,
    pub palette_index: u16,
}

/// Outline, metrics and rasterization for one font.
///
/// Implementations are used from a single thread; the atlas that owns one is
/// the only caller.
pub trait GlyphShapeSource {
    /// Font-wide metrics.
    fn metrics(&self) -> FontMetrics;

    /// Whether the font maps `codepoint` to a real glyph (not `.notdef`).
    fn has_glyph(&self, codepoint: char) -> bool;

    /// Glyph index for `codepoint`, `None` when unmapped.
    fn glyph_index(&self, codepoint: char) -> Option<u32>;

    /// Outline bounds and advance, `None` when the glyph cannot be loaded.
    fn load_outline(&self, key: GlyphKey) -> Option<GlyphOutline>;

    /// Render a four channel distance field of `cell_size` square pixels.
    fn rasterize(
        &self,
        outline: &GlyphOutline,
        transform: &GlyphTransform,
        cell_size: u32,
    ) -> Result<DistanceBitmap, RasterError>;

    /// Fix channel artifacts in a freshly rasterized bitmap.
    fn error_correct(
        &self,
        _bitmap: &mut DistanceBitmap,
        _outline: &GlyphOutline,
        _transform: &GlyphTransform,
    ) {
    }

    /// Whether the font carries a COLR table.
    fn has_color_table(&self) -> bool {
        false
    }

    /// ARGB entries of the first CPAL palette. `None` when the palette is
    /// missing or unreadable.
    fn palette_entries(&self) -> Option<Vec<u32>> {
        None
    }

    /// Ordered layers for a base glyph, empty when it is not a color glyph.
    fn color_layers(&self, _base_glyph: u32) -> Vec<LayerRecord> {
        Vec::new()
    }
}
