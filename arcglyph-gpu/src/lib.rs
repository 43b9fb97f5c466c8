//! wgpu sink for arcglyph atlases and text meshes.
//!
//! Atlases become [`AtlasTexture`]s that are re-uploaded whole whenever the
//! CPU atlas is dirty. A [`GpuTextMesh`] owns the vertex and index buffers of
//! one [`TextMesh`](arcglyph_mesh::TextMesh) and binds each atlas range to
//! its texture through an [`MsdfMaterial`].

pub mod context;
pub mod error;
pub mod mesh;
pub mod params;
pub mod pipeline;
pub mod target;
pub mod texture;

pub use context::GpuContext;
pub use error::GpuError;
pub use mesh::GpuTextMesh;
pub use params::{CameraUniform, MsdfParams};
pub use pipeline::{MsdfMaterial, MsdfTextPipeline, vertex_layout};
pub use target::OffscreenTarget;
pub use texture::AtlasTexture;
