//! Runtime MSDF glyph atlases and font fallback.
//!
//! Glyphs are generated on demand from a [`GlyphShapeSource`], packed into a
//! fixed grid of square cells and described by [`GlyphMetrics`] (em-space
//! plane bounds plus half-texel-inset UVs). A [`FontManager`] chains atlases
//! so missing codepoints fall through to later fonts.

pub mod atlas;
pub mod color;
pub mod config;
pub mod error;
pub mod loader;
pub mod manager;
pub mod packer;
pub mod raster;
pub mod shape;
pub mod source;
pub mod ttf;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use atlas::{FontAtlas, GlyphMetrics};
pub use color::{ColorGlyph, ColorLayer, FOREGROUND_COLOR, argb_to_rgba};
pub use config::{AtlasConfig, OverflowPolicy};
pub use error::{AtlasError, RasterError};
pub use loader::{FsResourceLoader, MemoryResourceLoader, ResourceLoader};
pub use manager::{AtlasId, FontManager, ResolvedGlyph};
pub use packer::AtlasPacker;
pub use shape::Bounds;
pub use source::{FontMetrics, GlyphKey, GlyphShapeSource};
pub use ttf::TtfFont;
