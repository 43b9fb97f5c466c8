//! COLRv0 color glyph support.
//!
//! A color glyph is a stack of ordinary outline glyphs, each painted with one
//! palette color. Layers are addressed by glyph index.

/// ARGB value meaning "paint this layer with the caller's foreground color".
pub const FOREGROUND_COLOR: u32 = 0x0000_0000;

/// Palette slot that selects the foreground color.
pub const FOREGROUND_PALETTE_INDEX: u16 = 0xFFFF;

/// Used when a layer references a palette slot that does not exist.
const FALLBACK_COLOR: u32 = 0xFF00_0000;

/// One layer of a color glyph, with its palette color already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorLayer {
    pub glyph_index: u32,
    /// ARGB, or [`FOREGROUND_COLOR`].
    pub argb: u32,
}

impl ColorLayer {
    pub fn is_foreground(&self) -> bool {
        self.argb == FOREGROUND_COLOR
    }
}

/// The layers of one color glyph, back to front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorGlyph {
    pub layers: Vec<ColorLayer>,
}

/// Resolve a palette slot to an ARGB color.
pub fn resolve_palette_color(palette: &[u32], palette_index: u16) -> u32 {
    if palette_index == FOREGROUND_PALETTE_INDEX {
        FOREGROUND_COLOR
    } else {
        palette
            .get(usize::from(palette_index))
            .copied()
            .unwrap_or(FALLBACK_COLOR)
    }
}

/// Split an ARGB value into RGBA bytes.
pub fn argb_to_rgba(argb: u32) -> [u8; 4] {
    let [a, r, g, b] = argb.to_be_bytes();
    [r, g, b, a]
}
