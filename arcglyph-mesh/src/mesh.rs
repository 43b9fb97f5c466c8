//! CPU-side text mesh.

use arcglyph_atlas::AtlasId;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex layout shared with the GPU pipeline.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TextVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// RGBA, normalized in the shader.
    pub color: [u8; 4],
    /// Atlas UV with V = 0 at the bottom of the texture.
    pub uv: [f32; 2],
}

/// Index buffer contents, 16-bit whenever the vertex count allows it.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexData {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexData {
    /// Pick the narrowest format able to address `vertex_count` vertices.
    pub fn for_vertex_count(vertex_count: usize, capacity: usize) -> Self {
        if vertex_count <= usize::from(u16::MAX) {
            IndexData::U16(Vec::with_capacity(capacity))
        } else {
            IndexData::U32(Vec::with_capacity(capacity))
        }
    }

    pub fn push(&mut self, index: u32) {
        match self {
            // U16 is only chosen when every index fits.
            IndexData::U16(v) => v.push(index as u16),
            IndexData::U32(v) => v.push(index),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IndexData::U16(v) => v.len(),
            IndexData::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_u32(&self) -> bool {
        matches!(self, IndexData::U32(_))
    }

    /// Raw bytes for buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexData::U16(v) => bytemuck::cast_slice(v),
            IndexData::U32(v) => bytemuck::cast_slice(v),
        }
    }

    /// Index value at `i`, widened.
    pub fn get(&self, i: usize) -> Option<u32> {
        match self {
            IndexData::U16(v) => v.get(i).map(|&x| u32::from(x)),
            IndexData::U32(v) => v.get(i).copied(),
        }
    }
}

/// The indices drawn with one atlas texture bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasRange {
    pub atlas: AtlasId,
    /// First index of the range.
    pub start: u32,
    /// Number of indices.
    pub count: u32,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec3,
    pub half_extent: Vec3,
}

impl Aabb {
    pub const EMPTY: Self = Self {
        center: Vec3::ZERO,
        half_extent: Vec3::ZERO,
    };

    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            half_extent: (max - min) * 0.5,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.half_extent
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_extent
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min()).all() && p.cmple(self.max()).all()
    }
}

/// A built text mesh, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMesh {
    pub vertices: Vec<TextVertex>,
    pub indices: IndexData,
    /// One entry per atlas, in first-use order.
    pub ranges: Vec<AtlasRange>,
    pub bounds: Aabb,
}

impl TextMesh {
    /// A mesh without geometry.
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: IndexData::U16(Vec::new()),
            ranges: Vec::new(),
            bounds: Aabb::EMPTY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_stride() {
        assert_eq!(std::mem::size_of::<TextVertex>(), 36);
        assert_eq!(std::mem::offset_of!(TextVertex, color), 24);
        assert_eq!(std::mem::offset_of!(TextVertex, uv), 28);
    }

    #[test]
    fn test_index_format_threshold() {
        assert!(!IndexData::for_vertex_count(65535, 0).is_u32());
        assert!(IndexData::for_vertex_count(65536, 0).is_u32());
    }

    #[test]
    fn test_index_bytes() {
        let mut indices = IndexData::for_vertex_count(4, 3);
        for i in [0, 1, 2] {
            indices.push(i);
        }
        assert_eq!(indices.as_bytes().len(), 6);
        assert_eq!(indices.get(2), Some(2));
    }

    #[test]
    fn test_aabb_contains() {
        let aabb = Aabb::from_min_max(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 0.5));
        assert!((aabb.center - Vec3::new(0.0, 1.0, 0.25)).length() < 1e-6);
        assert!(aabb.contains(Vec3::new(0.5, 1.5, 0.1)));
        assert!(!aabb.contains(Vec3::new(0.5, 2.5, 0.1)));
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = TextMesh::empty();
        assert!(mesh.is_empty());
        assert_eq!(mesh.index_count(), 0);
        assert!(mesh.ranges.is_empty());
    }
}
