//! Text meshes on flat and curved surfaces.
//!
//! Layout resolves each codepoint through a [`FontManager`](arcglyph_atlas::FontManager),
//! then every glyph quad is tessellated into a grid fine enough to follow
//! the target [`TextSurface`] and projected onto it. The resulting
//! [`TextMesh`] carries one index range per atlas so each can be drawn with
//! its own texture.

pub mod builder;
pub mod error;
pub mod layout;
pub mod mesh;
pub mod surface;

pub use builder::TextMeshBuilder;
pub use error::MeshBuildError;
pub use layout::{LayoutGlyph, layout};
pub use mesh::{Aabb, AtlasRange, IndexData, TextMesh, TextVertex};
pub use surface::{CylindricalSurface, FlatSurface, SphericalSurface, Surface, TextSurface};
