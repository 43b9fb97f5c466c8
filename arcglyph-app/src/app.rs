//! Font chain setup, mesh building and reporting.

use crate::config::{AppConfig, LoggingConfig};
use crate::render;
use arcglyph_atlas::{AtlasError, FontManager, FsResourceLoader};
use arcglyph_mesh::{TextMesh, TextMeshBuilder};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What to do once the mesh is built.
#[derive(Debug, Default)]
pub struct Outputs {
    /// Directory atlas PNGs are written to.
    pub dump_atlas: Option<PathBuf>,
    /// Upload to a headless device and render one frame.
    pub gpu: bool,
    /// Where the rendered frame is saved. Implies `gpu`.
    pub render_output: Option<PathBuf>,
}

pub fn run(config: AppConfig, outputs: Outputs) -> Result<(), Box<dyn Error>> {
    init_logging(&config.logging);

    let mut fonts = load_fonts(&config)?;
    if fonts.is_empty() {
        return Err("no fonts could be loaded".into());
    }

    let mesh = build_mesh(&config, &mut fonts)?;
    report(&fonts, &mesh);

    if let Some(dir) = &outputs.dump_atlas {
        dump_atlases(&fonts, dir)?;
    }

    if outputs.gpu || outputs.render_output.is_some() {
        if mesh.is_empty() {
            warn!("Mesh has no geometry, skipping GPU upload");
        } else {
            render::render_offscreen(
                &mut fonts,
                &mesh,
                &config.render,
                outputs.render_output.as_deref(),
            )?;
        }
    }

    fonts.destroy();
    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    #[cfg(feature = "tracy")]
    {
        if logging.enable_tracy {
            tracing_subscriber::registry()
                .with(tracing_tracy::TracyLayer::default())
                .with(console_layer(std::io::stdout).with_filter(filter))
                .init();
            return;
        }
    }

    tracing_subscriber::registry()
        .with(console_layer(std::io::stdout).with_filter(filter))
        .init();
}

/// Human-readable log lines, shared by every subscriber setup.
fn console_layer<S, W>(writer: W) -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(writer)
}

/// Build the font chain from the configured slots, or the system defaults
/// when none are configured. Fails only on an invalid atlas config.
pub fn load_fonts(config: &AppConfig) -> Result<FontManager, AtlasError> {
    let loader = config
        .search_roots
        .iter()
        .fold(FsResourceLoader::new(), |loader, root| loader.with_search_root(root.clone()));
    let mut fonts = FontManager::new(config.atlas.clone())?;

    if config.fonts.is_empty() {
        fonts.load_default_fonts(&loader);
        return Ok(fonts);
    }

    for slot in &config.fonts {
        let paths: Vec<&str> = slot.paths.iter().map(String::as_str).collect();
        if fonts.load_first_available(&slot.name, &loader, &paths).is_none() {
            warn!("Font slot '{}' has no loadable candidate", slot.name);
        }
    }
    Ok(fonts)
}

pub fn build_mesh(config: &AppConfig, fonts: &mut FontManager) -> Result<TextMesh, Box<dyn Error>> {
    let mesh = TextMeshBuilder::new()
        .text(config.text.as_str())
        .font_manager(fonts)
        .font_size(config.font_size)
        .color(config.argb()?)
        .surface(config.surface.to_surface())
        .build()?;
    Ok(mesh)
}

fn report(fonts: &FontManager, mesh: &TextMesh) {
    info!(
        "Mesh: {} vertices, {} triangles ({} indices), {} atlas ranges",
        mesh.vertex_count(),
        mesh.triangle_count(),
        if mesh.indices.is_u32() { "32-bit" } else { "16-bit" },
        mesh.ranges.len()
    );
    info!("Bounds: min {:?} max {:?}", mesh.bounds.min(), mesh.bounds.max());
    for (id, atlas) in fonts.chain() {
        info!(
            "Atlas {} '{}': {}x{} px, {} glyphs in {} slots, generation {}",
            id.index(),
            atlas.name(),
            atlas.width(),
            atlas.height(),
            atlas.glyph_count(),
            atlas.slots_used(),
            atlas.generation()
        );
    }
}

fn dump_atlases(fonts: &FontManager, dir: &Path) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;
    for (_, atlas) in fonts.chain() {
        let path = dir.join(format!("{}.png", atlas.name()));
        atlas.dump_png(&path)?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FontSlot;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_missing_font_slots_leave_chain_empty() {
        let config = AppConfig {
            fonts: vec![FontSlot {
                name: "mono".to_string(),
                paths: vec!["/nonexistent/arcglyph/font.ttf".to_string()],
            }],
            ..Default::default()
        };
        let fonts = load_fonts(&config).unwrap();
        assert!(fonts.is_empty());
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_console_layer_omits_target() {
        use tracing_subscriber::layer::SubscriberExt;

        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry().with(console_layer(capture.clone()));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "arcglyph_atlas::atlas", "atlas grown");
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("atlas grown"));
        assert!(!output.contains("arcglyph_atlas::atlas"));
    }

    #[test]
    fn test_cell_smaller_than_range_is_rejected() {
        let mut config = AppConfig::default();
        config.atlas = config.atlas.with_cell_size(8);
        assert!(matches!(load_fonts(&config), Err(AtlasError::InvalidConfig(_))));
    }

    #[test]
    fn test_build_mesh_rejects_bad_color() {
        let config = AppConfig {
            color: "#12".to_string(),
            ..Default::default()
        };
        let mut fonts = FontManager::default();
        assert!(build_mesh(&config, &mut fonts).is_err());
    }
}
