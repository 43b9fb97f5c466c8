//! Single-pass text layout.

use arcglyph_atlas::{AtlasId, FontManager, GlyphMetrics, argb_to_rgba};
use tracing::trace;

/// A visible glyph placed at a pen position (world units, baseline origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutGlyph {
    pub atlas: AtlasId,
    pub metrics: GlyphMetrics,
    pub cursor_x: f32,
    pub cursor_y: f32,
    /// RGBA vertex color.
    pub color: [u8; 4],
}

/// Walk `text`, resolving glyphs through `fonts`, and place every visible one.
///
/// Line breaks use the line height of the first font in the chain.
/// Unresolvable codepoints are skipped without advancing; whitespace
/// advances without producing a glyph. Color glyphs expand to one entry per
/// layer at the same pen position.
pub fn layout(fonts: &mut FontManager, text: &str, font_size: f32, color: [u8; 4]) -> Vec<LayoutGlyph> {
    let mut glyphs = Vec::new();
    let mut cursor_x = 0.0f32;
    let mut cursor_y = 0.0f32;

    for c in text.chars() {
        if c == '\n' {
            let line_height = fonts.default_atlas().map_or(1.0, |a| a.line_height());
            cursor_x = 0.0;
            cursor_y -= (line_height * f64::from(font_size)) as f32;
            continue;
        }

        let Some(resolved) = fonts.resolve_glyph(c) else {
            trace!("No font has {:?}", c);
            continue;
        };

        let layers = push_color_layers(fonts, resolved.atlas, c, cursor_x, cursor_y, color, &mut glyphs);
        if layers == 0 && resolved.metrics.is_visible() {
            glyphs.push(LayoutGlyph {
                atlas: resolved.atlas,
                metrics: resolved.metrics,
                cursor_x,
                cursor_y,
                color,
            });
        }

        cursor_x += (resolved.metrics.advance * f64::from(font_size)) as f32;
    }

    glyphs
}

/// Emit the layers of a color glyph. Returns how many were pushed; 0 means
/// the glyph should be drawn as a plain outline.
fn push_color_layers(
    fonts: &mut FontManager,
    atlas_id: AtlasId,
    c: char,
    cursor_x: f32,
    cursor_y: f32,
    foreground: [u8; 4],
    out: &mut Vec<LayoutGlyph>,
) -> usize {
    let Some(atlas) = fonts.atlas_mut(atlas_id) else {
        return 0;
    };
    let Some(color_glyph) = atlas.color_layers(c) else {
        return 0;
    };

    let before = out.len();
    for layer in &color_glyph.layers {
        let Some(metrics) = atlas.generate_glyph_by_index(layer.glyph_index) else {
            continue;
        };
        if !metrics.is_visible() {
            continue;
        }
        out.push(LayoutGlyph {
            atlas: atlas_id,
            metrics,
            cursor_x,
            cursor_y,
            color: if layer.is_foreground() {
                foreground
            } else {
                argb_to_rgba(layer.argb)
            },
        });
    }
    out.len() - before
}
