//! Font fallback chain.
//!
//! The [`FontManager`] owns every atlas, in registration order, and resolves
//! codepoints against them. It is an ordinary value passed to whoever needs
//! glyphs; there is no global instance.

use crate::atlas::{FontAtlas, GlyphMetrics};
use crate::config::AtlasConfig;
use crate::error::AtlasError;
use crate::loader::ResourceLoader;
use crate::source::GlyphShapeSource;
use crate::ttf::TtfFont;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Primary monospace candidates, most preferred first.
pub const DEFAULT_FONT_PATHS: &[&str] = &[
    "~/.local/share/fonts/FiraCode/FiraCodeNerdFontMono-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/freefont/FreeMono.ttf",
];

/// Nerd Font symbols, looked up relative to the loader's search roots.
pub const SYMBOL_FONT_PATHS: &[&str] = &["fonts/SymbolsNerdFontMono-Regular.ttf"];

pub const EMOJI_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/ancient-scripts/Symbola_hint.ttf",
    "/usr/share/fonts/truetype/ancient-scripts/Symbola.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansSymbols2-Regular.ttf",
];

pub const UNICODE_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
];

/// Position of an atlas in the chain. Lower ids have priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtlasId(usize);

impl AtlasId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Result of a chain lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedGlyph {
    pub atlas: AtlasId,
    pub metrics: GlyphMetrics,
}

/// Ordered, append-only list of font atlases.
pub struct FontManager {
    config: AtlasConfig,
    atlases: Vec<FontAtlas>,
    names: HashMap<String, AtlasId>,
}

impl Default for FontManager {
    fn default() -> Self {
        Self {
            config: AtlasConfig::default(),
            atlases: Vec::new(),
            names: HashMap::new(),
        }
    }
}

impl FontManager {
    /// An empty chain whose atlases will use `config`.
    pub fn new(config: AtlasConfig) -> Result<Self, AtlasError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    /// Append an atlas for `source` at the end of the chain.
    ///
    /// Registering a name twice keeps the first font and returns its id.
    pub fn register_source(&mut self, name: &str, source: Box<dyn GlyphShapeSource>) -> AtlasId {
        if let Some(&id) = self.names.get(name) {
            warn!("Font '{}' already registered, keeping the existing one", name);
            return id;
        }
        let id = AtlasId(self.atlases.len());
        self.atlases.push(FontAtlas::new(name, source, self.config.clone()));
        self.names.insert(name.to_string(), id);
        info!("Registered font '{}' at chain position {}", name, id.0);
        id
    }

    /// Parse a font file and append it to the chain.
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    pub fn register_font(&mut self, name: &str, data: Vec<u8>) -> Result<AtlasId, AtlasError> {
        let font = TtfFont::from_bytes(data)?;
        Ok(self.register_source(name, Box::new(font)))
    }

    /// Load and register a font through `loader`. Missing or unparsable files
    /// are logged and yield `None`.
    pub fn register_font_from(
        &mut self,
        name: &str,
        loader: &dyn ResourceLoader,
        path: &str,
    ) -> Option<AtlasId> {
        let data = match loader.load(path) {
            Ok(data) => data,
            Err(e) => {
                warn!("Font '{}' not loaded from {}: {}", name, path, e);
                return None;
            }
        };
        match self.register_font(name, data) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Font '{}' at {} rejected: {}", name, path, e);
                None
            }
        }
    }

    /// Register the first candidate path that exists and parses.
    pub fn load_first_available(
        &mut self,
        name: &str,
        loader: &dyn ResourceLoader,
        paths: &[&str],
    ) -> Option<AtlasId> {
        for path in paths {
            if !loader.exists(path) {
                continue;
            }
            if let Some(id) = self.register_font_from(name, loader, path) {
                info!("Font '{}' loaded from {}", name, path);
                return Some(id);
            }
        }
        debug!("No candidate for font '{}' found ({} paths tried)", name, paths.len());
        None
    }

    /// Build the standard chain: default, symbols, emoji, unicode.
    ///
    /// Returns the number of fonts registered.
    pub fn load_default_fonts(&mut self, loader: &dyn ResourceLoader) -> usize {
        let slots: [(&str, &[&str]); 4] = [
            ("default", DEFAULT_FONT_PATHS),
            ("symbols", SYMBOL_FONT_PATHS),
            ("emoji", EMOJI_FONT_PATHS),
            ("unicode", UNICODE_FONT_PATHS),
        ];
        let loaded = slots
            .iter()
            .filter_map(|(name, paths)| self.load_first_available(name, loader, paths))
            .count();

        if self.atlases.is_empty() {
            warn!("No fonts found, text will not render");
        } else {
            info!("Font chain: {} fonts", self.atlases.len());
        }
        loaded
    }

    /// Find `codepoint` in the chain.
    ///
    /// Already generated glyphs win, in chain order. Otherwise generation is
    /// attempted atlas by atlas until one succeeds.
    pub fn resolve_glyph(&mut self, codepoint: char) -> Option<ResolvedGlyph> {
        if let Some(found) = self.resolve_existing(codepoint) {
            return Some(found);
        }
        self.atlases
            .iter_mut()
            .enumerate()
            .find_map(|(i, atlas)| {
                atlas.generate_glyph(codepoint).map(|metrics| ResolvedGlyph {
                    atlas: AtlasId(i),
                    metrics,
                })
            })
    }

    /// Lookup without generation.
    pub fn resolve_existing(&self, codepoint: char) -> Option<ResolvedGlyph> {
        self.atlases.iter().enumerate().find_map(|(i, atlas)| {
            atlas.glyph(codepoint).map(|metrics| ResolvedGlyph {
                atlas: AtlasId(i),
                metrics: *metrics,
            })
        })
    }

    /// Resolve every distinct codepoint of `text` so layout finds them ready.
    ///
    /// Returns true if any atlas allocated new slots.
    pub fn ensure_glyphs(&mut self, text: &str) -> bool {
        let before = self.slots_used();
        let mut seen = HashSet::new();
        for c in text.chars().filter(|&c| c != '\n') {
            if seen.insert(c) {
                self.resolve_glyph(c);
            }
        }
        self.slots_used() != before
    }

    /// Width of a single line of `text` at `font_size`, in world units.
    /// Unresolvable codepoints contribute nothing.
    pub fn measure_width(&mut self, text: &str, font_size: f64) -> f64 {
        text.chars()
            .filter_map(|c| self.resolve_glyph(c))
            .map(|g| g.metrics.advance * font_size)
            .sum()
    }

    pub fn atlas(&self, name: &str) -> Option<&FontAtlas> {
        self.names.get(name).and_then(|id| self.atlas_by_id(*id))
    }

    pub fn atlas_id(&self, name: &str) -> Option<AtlasId> {
        self.names.get(name).copied()
    }

    pub fn atlas_by_id(&self, id: AtlasId) -> Option<&FontAtlas> {
        self.atlases.get(id.0)
    }

    pub fn atlas_mut(&mut self, id: AtlasId) -> Option<&mut FontAtlas> {
        self.atlases.get_mut(id.0)
    }

    /// The first atlas in the chain; its line height drives line breaks.
    pub fn default_atlas(&self) -> Option<&FontAtlas> {
        self.atlases.first()
    }

    /// Atlases in priority order.
    pub fn chain(&self) -> impl Iterator<Item = (AtlasId, &FontAtlas)> {
        self.atlases.iter().enumerate().map(|(i, a)| (AtlasId(i), a))
    }

    pub fn len(&self) -> usize {
        self.atlases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atlases.is_empty()
    }

    /// Drop every atlas and its pixel buffer. Ids handed out before are
    /// invalid afterwards.
    pub fn destroy(&mut self) {
        info!("Destroying font chain ({} atlases)", self.atlases.len());
        self.atlases.clear();
        self.names.clear();
    }

    fn slots_used(&self) -> u64 {
        self.atlases.iter().map(|a| u64::from(a.slots_used())).sum()
    }
}

impl std::fmt::Debug for FontManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontManager")
            .field("atlases", &self.atlases)
            .finish()
    }
}
