//! TrueType/OpenType shape source backed by `ttf-parser` and `fdsm`.

use super::colr;
use crate::error::{AtlasError, RasterError};
use crate::raster::{correct_channel_clashes, rasterize_mtsdf};
use crate::shape::Bounds;
use crate::source::{
    DistanceBitmap, FontMetrics, GlyphKey, GlyphOutline, GlyphShapeSource, GlyphTransform,
    LayerRecord,
};
use owned_ttf_parser::{AsFaceRef, OwnedFace};
use tracing::debug;
use ttf_parser::{Face, GlyphId};

/// A parsed font face that owns its file data.
pub struct TtfFont {
    face: OwnedFace,
    metrics: FontMetrics,
    has_colr: bool,
    palette: Option<Vec<u32>>,
}

impl TtfFont {
    /// Parse face 0 of a font file.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, AtlasError> {
        Self::from_collection(data, 0)
    }

    /// Parse face `index` of a font file or collection.
    pub fn from_collection(data: Vec<u8>, index: u32) -> Result<Self, AtlasError> {
        let face = OwnedFace::from_vec(data, index)?;
        let parsed = face.as_face_ref();

        let units_per_em = f64::from(parsed.units_per_em().max(1));
        let ascender = f64::from(parsed.ascender());
        let descender = f64::from(parsed.descender());
        let line_gap = f64::from(parsed.line_gap());
        let metrics = FontMetrics {
            units_per_em,
            ascent: ascender / units_per_em,
            line_height: (ascender - descender + line_gap) / units_per_em,
        };
        let has_colr = colr::has_colr(parsed);
        let palette = colr::first_palette(parsed);

        Ok(Self {
            face,
            metrics,
            has_colr,
            palette,
        })
    }

    fn face(&self) -> &Face<'_> {
        self.face.as_face_ref()
    }

    fn glyph_id(&self, key: GlyphKey) -> Option<GlyphId> {
        let face = self.face();
        match key {
            GlyphKey::Codepoint(c) => face.glyph_index(c),
            GlyphKey::Index(i) => u16::try_from(i)
                .ok()
                .filter(|&i| i < face.number_of_glyphs())
                .map(GlyphId),
        }
    }
}

impl GlyphShapeSource for TtfFont {
    fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    fn has_glyph(&self, codepoint: char) -> bool {
        self.glyph_index(codepoint).is_some_and(|g| g != 0)
    }

    fn glyph_index(&self, codepoint: char) -> Option<u32> {
        self.face().glyph_index(codepoint).map(|g| u32::from(g.0))
    }

    fn load_outline(&self, key: GlyphKey) -> Option<GlyphOutline> {
        let id = self.glyph_id(key)?;
        let face = self.face();
        // Glyphs without contours (spaces) have no bounding box.
        let bounds = face
            .glyph_bounding_box(id)
            .map(Bounds::from)
            .unwrap_or(Bounds::ZERO);

        Some(GlyphOutline {
            glyph_index: u32::from(id.0),
            bounds,
            advance: f64::from(face.glyph_hor_advance(id).unwrap_or(0)),
        })
    }

    fn rasterize(
        &self,
        outline: &GlyphOutline,
        transform: &GlyphTransform,
        cell_size: u32,
    ) -> Result<DistanceBitmap, RasterError> {
        if outline.bounds.is_degenerate() {
            return Err(RasterError::EmptyShape);
        }
        let id = u16::try_from(outline.glyph_index)
            .map(GlyphId)
            .map_err(|_| RasterError::Failed(format!("glyph index {} out of range", outline.glyph_index)))?;
        rasterize_mtsdf(self.face(), id, transform, cell_size)
    }

    fn error_correct(
        &self,
        bitmap: &mut DistanceBitmap,
        outline: &GlyphOutline,
        _transform: &GlyphTransform,
    ) {
        let corrected = correct_channel_clashes(bitmap);
        if corrected > 0 {
            debug!(
                "Corrected {} clashing texels in glyph {}",
                corrected, outline.glyph_index
            );
        }
    }

    fn has_color_table(&self) -> bool {
        self.has_colr
    }

    fn palette_entries(&self) -> Option<Vec<u32>> {
        self.palette.clone()
    }

    fn color_layers(&self, base_glyph: u32) -> Vec<LayerRecord> {
        match &self.palette {
            Some(palette) if self.has_colr => colr::color_layers(self.face(), palette, base_glyph),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    /// Two glyphs: `.notdef` and a straight-edged `A` (advance 540, 1000 upem).
    const DEMO_FONT: &[u8] = include_bytes!("../../tests/fonts/demo.ttf");

    fn demo() -> TtfFont {
        TtfFont::from_bytes(DEMO_FONT.to_vec()).unwrap()
    }

    fn median(t: [f32; 4]) -> f32 {
        t[0].max(t[1]).min(t[0].min(t[1]).max(t[2]))
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        assert!(matches!(
            TtfFont::from_bytes(vec![0; 16]),
            Err(AtlasError::FontParse(_))
        ));
    }

    #[test]
    fn test_outline_bounds_and_advance() {
        let font = demo();
        assert!((font.metrics().units_per_em - 1000.0).abs() < 1e-12);
        assert!(font.has_glyph('A'));
        assert!(!font.has_glyph('B'));

        let outline = font.load_outline(GlyphKey::Codepoint('A')).unwrap();
        assert_eq!(outline.glyph_index, 1);
        assert_eq!(outline.bounds, Bounds::new(6.0, 0.0, 541.0, 656.0));
        assert!((outline.advance - 540.0).abs() < 1e-12);

        assert_eq!(font.load_outline(GlyphKey::Index(1)), Some(outline));
        assert!(font.load_outline(GlyphKey::Index(2)).is_none());
        assert!(font.load_outline(GlyphKey::Index(70_000)).is_none());
    }

    #[test]
    fn test_rasterize_is_multi_channel() {
        let font = demo();
        let outline = font.load_outline(GlyphKey::Codepoint('A')).unwrap();
        let transform = GlyphTransform::fit(&outline.bounds, 64, 4.0);
        let mut bitmap = font.rasterize(&outline, &transform, 64).unwrap();
        font.error_correct(&mut bitmap, &outline, &transform);

        let mut distinct = 0;
        for y in 0..64 {
            for x in 0..64 {
                let [r, g, b, _] = bitmap.texel(x, y);
                if (r - g).abs() > 0.02 || (g - b).abs() > 0.02 || (r - b).abs() > 0.02 {
                    distinct += 1;
                }
            }
        }
        assert!(distinct > 0, "every texel has equal color channels");

        // Left leg of the A, then the gap between the legs under the bar.
        let texel_at = |p: DVec2| {
            let b = transform.to_bitmap(p);
            bitmap.texel(b.x as u32, b.y as u32)
        };
        let inside = texel_at(DVec2::new(80.0, 100.0));
        assert!(median(inside) > 0.5 && inside[3] > 0.5, "{inside:?}");
        let outside = texel_at(DVec2::new(270.0, 100.0));
        assert!(median(outside) < 0.5 && outside[3] < 0.5, "{outside:?}");
    }

    #[test]
    fn test_rasterize_rejects_empty_outline() {
        let font = demo();
        let outline = GlyphOutline {
            glyph_index: 1,
            bounds: Bounds::ZERO,
            advance: 0.0,
        };
        let transform = GlyphTransform::fit(&Bounds::new(0.0, 0.0, 1.0, 1.0), 16, 2.0);
        assert!(matches!(
            font.rasterize(&outline, &transform, 16),
            Err(RasterError::EmptyShape)
        ));
    }

    #[test]
    fn test_plain_font_has_no_color_layers() {
        let font = demo();
        assert!(!font.has_color_table());
        assert!(font.palette_entries().is_none());
        assert!(font.color_layers(1).is_empty());
    }
}
