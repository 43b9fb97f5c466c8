//! COLR layers and the first CPAL palette, read through `ttf-parser`.
//!
//! Layers come from painting the glyph with a [`Painter`] that records every
//! solid fill. Painted colors are mapped back to palette slots; the
//! foreground is recognised by painting with a color the palette lacks.

use crate::color::FOREGROUND_PALETTE_INDEX;
use crate::source::LayerRecord;
use tracing::debug;
use ttf_parser::colr::{ClipBox, CompositeMode, Paint, Painter};
use ttf_parser::{Face, GlyphId, RgbaColor, Tag, Transform, cpal};

/// Entries of the first CPAL palette as ARGB.
///
/// `None` when the font has no CPAL table or it cannot be parsed.
pub fn first_palette(face: &Face<'_>) -> Option<Vec<u32>> {
    let data = face.raw_face().table(Tag::from_bytes(b"CPAL"))?;
    let table = cpal::Table::parse(data)?;
    // numPaletteEntries; ttf-parser resolves entries but does not expose the count.
    let entries = u16::from_be_bytes(data.get(2..4)?.try_into().ok()?);
    (0..entries).map(|i| table.get(0, i).map(to_argb)).collect()
}

/// Whether the font has a parseable COLR table.
pub fn has_colr(face: &Face<'_>) -> bool {
    face.tables().colr.is_some()
}

/// Layers of `base_glyph` against the first palette, back to front.
pub fn color_layers(face: &Face<'_>, palette: &[u32], base_glyph: u32) -> Vec<LayerRecord> {
    let Ok(id) = u16::try_from(base_glyph) else {
        return Vec::new();
    };
    let glyph = GlyphId(id);
    if !face.is_color_glyph(glyph) {
        return Vec::new();
    }

    let mut collector = LayerCollector::new(palette);
    let foreground = from_argb(collector.foreground);
    if face
        .paint_color_glyph(glyph, 0, foreground, &mut collector)
        .is_none()
    {
        debug!("Color glyph {} could not be painted", base_glyph);
        return Vec::new();
    }
    collector.layers
}

fn to_argb(color: RgbaColor) -> u32 {
    u32::from_be_bytes([color.alpha, color.red, color.green, color.blue])
}

fn from_argb(argb: u32) -> RgbaColor {
    let [a, r, g, b] = argb.to_be_bytes();
    RgbaColor::new(r, g, b, a)
}

/// Records `(glyph, palette slot)` pairs for solid fills.
///
/// COLRv1 graphs are flattened to the glyph clips their solid fills land in;
/// gradients, transforms and composite modes are dropped.
struct LayerCollector<'p> {
    palette: &'p [u32],
    foreground: u32,
    outline: Option<GlyphId>,
    clips: Vec<Option<GlyphId>>,
    layers: Vec<LayerRecord>,
}

impl<'p> LayerCollector<'p> {
    fn new(palette: &'p [u32]) -> Self {
        Self {
            palette,
            foreground: foreground_marker(palette),
            outline: None,
            clips: Vec::new(),
            layers: Vec::new(),
        }
    }

    fn palette_index(&self, argb: u32) -> Option<u16> {
        if argb == self.foreground {
            return Some(FOREGROUND_PALETTE_INDEX);
        }
        self.palette
            .iter()
            .position(|&entry| entry == argb)
            .and_then(|i| u16::try_from(i).ok())
    }
}

/// The first ARGB value that is not a palette entry.
fn foreground_marker(palette: &[u32]) -> u32 {
    (0u32..)
        .find(|candidate| !palette.contains(candidate))
        .unwrap_or_default()
}

impl<'a> Painter<'a> for LayerCollector<'_> {
    fn outline_glyph(&mut self, glyph_id: GlyphId) {
        self.outline = Some(glyph_id);
    }

    fn paint(&mut self, paint: Paint<'a>) {
        let Some(glyph) = self.clips.last().copied().flatten().or(self.outline) else {
            return;
        };
        let Paint::Solid(color) = paint else {
            debug!("Skipping gradient fill of glyph {}", glyph.0);
            return;
        };
        match self.palette_index(to_argb(color)) {
            Some(palette_index) => self.layers.push(LayerRecord {
                glyph_index: u32::from(glyph.0),
                palette_index,
            }),
            None => debug!("Fill of glyph {} is not a palette color", glyph.0),
        }
    }

    fn push_clip(&mut self) {
        self.clips.push(self.outline.take());
    }

    fn push_clip_box(&mut self, _clipbox: ClipBox) {
        self.clips.push(None);
    }

    fn pop_clip(&mut self) {
        self.clips.pop();
    }

    fn push_layer(&mut self, _mode: CompositeMode) {}

    fn pop_layer(&mut self) {}

    fn push_transform(&mut self, _transform: Transform) {}

    fn pop_transform(&mut self) {}
}
