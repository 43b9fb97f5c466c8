//! Application configuration, loaded from JSON and overridden by CLI flags.

use arcglyph_atlas::AtlasConfig;
use arcglyph_mesh::{CylindricalSurface, FlatSurface, SphericalSurface, Surface};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid color '{0}', expected #RRGGBB or #AARRGGBB")]
    Color(String),
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub enable_tracy: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_tracy: false,
        }
    }
}

/// One slot of the font chain: the first path that loads wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSlot {
    pub name: String,
    pub paths: Vec<String>,
}

/// Surface kinds selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SurfaceKind {
    Flat,
    Cylinder,
    Sphere,
}

/// Surface description. Angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceConfig {
    Flat {
        #[serde(default)]
        origin: [f32; 3],
        #[serde(default = "unit_x")]
        right: [f32; 3],
        #[serde(default = "unit_y")]
        up: [f32; 3],
    },
    Cylinder {
        #[serde(default)]
        center: [f32; 3],
        #[serde(default = "unit_y")]
        axis: [f32; 3],
        #[serde(default = "unit_radius")]
        radius: f32,
        #[serde(default = "unit_z")]
        start_direction: [f32; 3],
    },
    Sphere {
        #[serde(default)]
        center: [f32; 3],
        #[serde(default = "unit_radius")]
        radius: f32,
        #[serde(default)]
        base_latitude: f32,
        #[serde(default)]
        start_longitude: f32,
    },
}

fn unit_x() -> [f32; 3] {
    [1.0, 0.0, 0.0]
}

fn unit_y() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

fn unit_z() -> [f32; 3] {
    [0.0, 0.0, 1.0]
}

fn unit_radius() -> f32 {
    1.0
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self::for_kind(SurfaceKind::Flat)
    }
}

impl SurfaceConfig {
    /// Default parameters for `kind`.
    pub fn for_kind(kind: SurfaceKind) -> Self {
        match kind {
            SurfaceKind::Flat => SurfaceConfig::Flat {
                origin: [0.0; 3],
                right: unit_x(),
                up: unit_y(),
            },
            SurfaceKind::Cylinder => SurfaceConfig::Cylinder {
                center: [0.0; 3],
                axis: unit_y(),
                radius: unit_radius(),
                start_direction: unit_z(),
            },
            SurfaceKind::Sphere => SurfaceConfig::Sphere {
                center: [0.0; 3],
                radius: unit_radius(),
                base_latitude: 0.0,
                start_longitude: 0.0,
            },
        }
    }

    /// Replace the radius of curved surfaces; flat surfaces are unchanged.
    pub fn with_radius(self, new_radius: f32) -> Self {
        match self {
            SurfaceConfig::Cylinder {
                center,
                axis,
                start_direction,
                ..
            } => SurfaceConfig::Cylinder {
                center,
                axis,
                radius: new_radius,
                start_direction,
            },
            SurfaceConfig::Sphere {
                center,
                base_latitude,
                start_longitude,
                ..
            } => SurfaceConfig::Sphere {
                center,
                radius: new_radius,
                base_latitude,
                start_longitude,
            },
            flat => flat,
        }
    }

    pub fn to_surface(&self) -> Surface {
        match *self {
            SurfaceConfig::Flat { origin, right, up } => {
                Surface::Flat(FlatSurface::new(origin.into(), right.into(), up.into()))
            }
            SurfaceConfig::Cylinder {
                center,
                axis,
                radius,
                start_direction,
            } => Surface::Cylinder(CylindricalSurface::new(
                center.into(),
                axis.into(),
                radius,
                Vec3::from(start_direction),
            )),
            SurfaceConfig::Sphere {
                center,
                radius,
                base_latitude,
                start_longitude,
            } => Surface::Sphere(SphericalSurface::new(
                center.into(),
                radius,
                base_latitude,
                start_longitude,
            )),
        }
    }
}

/// Offscreen render settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 512,
            fov_y: 45.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub text: String,
    pub font_size: f32,
    /// `#RRGGBB` or `#AARRGGBB`.
    pub color: String,
    pub surface: SurfaceConfig,
    /// Font chain in fallback order. Empty uses the system default chain.
    pub fonts: Vec<FontSlot>,
    /// Directories relative font paths are looked up in.
    pub search_roots: Vec<PathBuf>,
    pub logging: LoggingConfig,
    pub atlas: AtlasConfig,
    pub render: RenderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            text: "Hello, arcglyph!".to_string(),
            font_size: 1.0,
            color: "#FFFFFFFF".to_string(),
            surface: SurfaceConfig::default(),
            fonts: Vec::new(),
            search_roots: Vec::new(),
            logging: LoggingConfig::default(),
            atlas: AtlasConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The configured color as ARGB.
    pub fn argb(&self) -> Result<u32, ConfigError> {
        parse_color(&self.color)
    }
}

/// Parse `#RRGGBB` (opaque) or `#AARRGGBB` into ARGB. The `#` is optional.
pub fn parse_color(s: &str) -> Result<u32, ConfigError> {
    let hex = s.trim().trim_start_matches('#');
    let value = u32::from_str_radix(hex, 16).map_err(|_| ConfigError::Color(s.to_string()))?;
    match hex.len() {
        6 => Ok(0xFF00_0000 | value),
        8 => Ok(value),
        _ => Err(ConfigError::Color(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcglyph_atlas::OverflowPolicy;
    use arcglyph_mesh::TextSurface;

    #[test]
    fn test_empty_json_is_default() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = AppConfig::from_json(
            r##"{
                "text": "curved",
                "font_size": 0.25,
                "color": "#FF8000",
                "surface": { "type": "cylinder", "radius": 2.0 },
                "fonts": [{ "name": "mono", "paths": ["a.ttf", "b.ttf"] }],
                "atlas": { "cell_size": 32, "overflow": "drop" },
                "logging": { "level": "debug" }
            }"##,
        )
        .unwrap();

        assert_eq!(config.text, "curved");
        assert!((config.font_size - 0.25).abs() < 1e-6);
        assert_eq!(config.argb().unwrap(), 0xFFFF_8000);
        assert_eq!(
            config.surface,
            SurfaceConfig::Cylinder {
                center: [0.0; 3],
                axis: [0.0, 1.0, 0.0],
                radius: 2.0,
                start_direction: [0.0, 0.0, 1.0],
            }
        );
        assert_eq!(config.fonts[0].paths.len(), 2);
        assert_eq!(config.atlas.cell_size, 32);
        assert_eq!(config.atlas.overflow, OverflowPolicy::Drop);
        assert_eq!(config.atlas.max_dimension, AtlasConfig::default().max_dimension);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.enable_tracy);
    }

    #[test]
    fn test_unknown_surface_is_rejected() {
        let err = AppConfig::from_json(r#"{ "surface": { "type": "torus" } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#80102030").unwrap(), 0x8010_2030);
        assert_eq!(parse_color("102030").unwrap(), 0xFF10_2030);
        assert!(parse_color("#123").is_err());
        assert!(parse_color("#GG0000").is_err());
    }

    #[test]
    fn test_with_radius() {
        let sphere = SurfaceConfig::for_kind(SurfaceKind::Sphere).with_radius(3.0);
        assert!(matches!(sphere, SurfaceConfig::Sphere { radius, .. } if (radius - 3.0).abs() < 1e-6));
        let flat = SurfaceConfig::default();
        assert_eq!(flat.with_radius(3.0), flat);
    }

    #[test]
    fn test_surface_conversion() {
        let surface = SurfaceConfig::for_kind(SurfaceKind::Cylinder)
            .with_radius(0.5)
            .to_surface();
        // Start of the unrolled arc sits at radius along +Z.
        let p = surface.position(0.0, 0.0);
        assert!((p - Vec3::new(0.0, 0.0, 0.5)).length() < 1e-4);
        assert_eq!(surface.subdivisions_per_em(), 2);

        let flat = SurfaceConfig::default().to_surface();
        assert!((flat.position(1.0, 2.0) - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-4);
    }
}
