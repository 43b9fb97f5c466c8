//! Error types for mesh building.

use thiserror::Error;

/// Misuse of [`TextMeshBuilder`](crate::TextMeshBuilder). Missing glyphs are
/// not errors; they are skipped during layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshBuildError {
    #[error("Text is empty or not set")]
    EmptyText,

    #[error("No font manager supplied")]
    MissingFontManager,
}
