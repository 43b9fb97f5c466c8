//! arcglyph
//!
//! Builds MSDF text meshes on flat, cylindrical and spherical surfaces from
//! a chain of fonts, reports what was generated and optionally dumps the
//! atlases or renders a frame on a headless GPU device.

mod app;
mod config;
mod render;

use clap::Parser;
use config::{AppConfig, FontSlot, SurfaceConfig, SurfaceKind};
use std::path::PathBuf;

/// arcglyph - MSDF text on curved surfaces
#[derive(Parser, Debug)]
#[command(name = "arcglyph")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Text to lay out
    #[arg(short, long)]
    text: Option<String>,

    /// Font file; repeat to build a fallback chain in order
    #[arg(short, long)]
    font: Vec<PathBuf>,

    /// Surface to project onto
    #[arg(short, long, value_enum)]
    surface: Option<SurfaceKind>,

    /// Radius of cylinder or sphere surfaces
    #[arg(short, long)]
    radius: Option<f32>,

    /// Em size in world units
    #[arg(long)]
    font_size: Option<f32>,

    /// Text color, #RRGGBB or #AARRGGBB
    #[arg(long)]
    color: Option<String>,

    /// Write every atlas as PNG into this directory
    #[arg(long)]
    dump_atlas: Option<PathBuf>,

    /// Upload to a headless GPU device and render one frame
    #[arg(long)]
    gpu: bool,

    /// Save the rendered frame as PNG (implies --gpu)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(text) = &self.text {
            config.text = text.clone();
        }
        if !self.font.is_empty() {
            config.fonts = self
                .font
                .iter()
                .enumerate()
                .map(|(i, path)| FontSlot {
                    name: font_name(i, path),
                    paths: vec![path.to_string_lossy().into_owned()],
                })
                .collect();
        }
        if let Some(kind) = self.surface {
            config.surface = SurfaceConfig::for_kind(kind);
        }
        if let Some(radius) = self.radius {
            config.surface = config.surface.with_radius(radius);
        }
        if let Some(font_size) = self.font_size {
            config.font_size = font_size;
        }
        if let Some(color) = &self.color {
            config.color = color.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

/// Atlas name for the `index`-th `--font`: the file stem, made unique by index.
fn font_name(index: usize, path: &std::path::Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "font".to_string());
    format!("{index}-{stem}")
}

fn main() {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match AppConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Application error: {}", e);
                std::process::exit(1);
            }
        },
        None => AppConfig::default(),
    };
    args.apply(&mut config);

    let outputs = app::Outputs {
        dump_atlas: args.dump_atlas,
        gpu: args.gpu,
        render_output: args.output,
    };
    if let Err(e) = app::run(config, outputs) {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "arcglyph",
            "--text",
            "ring",
            "--font",
            "fonts/Mono.ttf",
            "--font",
            "/usr/share/fonts/Emoji.ttf",
            "--surface",
            "cylinder",
            "--radius",
            "0.75",
            "--color",
            "#00FF00",
            "--log-level",
            "debug",
        ]);
        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert_eq!(config.text, "ring");
        assert_eq!(config.fonts.len(), 2);
        assert_eq!(config.fonts[0].name, "0-Mono");
        assert_eq!(config.fonts[1].paths, vec!["/usr/share/fonts/Emoji.ttf".to_string()]);
        assert!(matches!(
            config.surface,
            SurfaceConfig::Cylinder { radius, .. } if (radius - 0.75).abs() < 1e-6
        ));
        assert_eq!(config.argb().unwrap(), 0xFF00_FF00);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = Args::parse_from(["arcglyph"]);
        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config, AppConfig::default());
        assert!(!args.gpu);
    }
}
