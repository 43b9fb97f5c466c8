//! Error types for atlas operations.

use thiserror::Error;

/// Errors surfaced by font registration and atlas I/O.
///
/// Per-glyph problems never show up here; they are logged and the glyph is
/// skipped.
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("Font parse error: {0}")]
    FontParse(#[from] ttf_parser::FaceParsingError),

    #[error("Invalid atlas config: {0}")]
    InvalidConfig(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Image encode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure reported by a shape source while rasterizing a glyph.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Cannot allocate a {width}x{height} distance bitmap")]
    Allocation { width: u32, height: u32 },

    #[error("Glyph has no outline")]
    EmptyShape,

    #[error("Rasterization failed: {0}")]
    Failed(String),
}
