//! Surfaces that text can be wrapped onto.
//!
//! A surface maps 2D text space (x along the baseline, y up, world units) to
//! a 3D position and outward normal, and says how finely glyph quads must be
//! subdivided to follow its curvature.

use glam::Vec3;

/// Projection from text space onto a 3D surface.
pub trait TextSurface {
    /// World position of text-space point `(x, y)`.
    fn position(&self, x: f32, y: f32) -> Vec3;

    /// Unit normal at text-space point `(x, y)`.
    fn normal(&self, x: f32, y: f32) -> Vec3;

    /// Grid cells per em along each axis. 0 means one flat quad per glyph.
    fn subdivisions_per_em(&self) -> u32;
}

/// A plane spanned by two basis vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatSurface {
    origin: Vec3,
    right: Vec3,
    up: Vec3,
    normal: Vec3,
}

impl FlatSurface {
    pub fn new(origin: Vec3, right: Vec3, up: Vec3) -> Self {
        Self {
            origin,
            right,
            up,
            normal: right.cross(up).normalize_or(Vec3::Z),
        }
    }
}

impl Default for FlatSurface {
    /// The XY plane facing +Z.
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::X, Vec3::Y)
    }
}

impl TextSurface for FlatSurface {
    fn position(&self, x: f32, y: f32) -> Vec3 {
        self.origin + x * self.right + y * self.up
    }

    fn normal(&self, _x: f32, _y: f32) -> Vec3 {
        self.normal
    }

    fn subdivisions_per_em(&self) -> u32 {
        0
    }
}

/// Text wrapped around the outside of a cylinder.
///
/// x is arc length around the axis starting at `start_direction`, y runs
/// along the axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylindricalSurface {
    center: Vec3,
    axis: Vec3,
    radius: f32,
    start: Vec3,
    binormal: Vec3,
}

impl CylindricalSurface {
    /// `start_direction` is projected onto the plane orthogonal to `axis`. If
    /// it is parallel to the axis an arbitrary orthogonal direction is used.
    pub fn new(center: Vec3, axis: Vec3, radius: f32, start_direction: Vec3) -> Self {
        let axis = axis.normalize_or(Vec3::Y);
        let projected = start_direction - axis * start_direction.dot(axis);
        let start = projected
            .try_normalize()
            .unwrap_or_else(|| axis.any_orthonormal_vector());
        Self {
            center,
            axis,
            radius,
            start,
            binormal: axis.cross(start),
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    fn radial(&self, x: f32) -> Vec3 {
        let theta = x / self.radius;
        theta.cos() * self.start + theta.sin() * self.binormal
    }
}

impl TextSurface for CylindricalSurface {
    fn position(&self, x: f32, y: f32) -> Vec3 {
        self.center + self.radius * self.radial(x) + y * self.axis
    }

    fn normal(&self, x: f32, _y: f32) -> Vec3 {
        self.radial(x)
    }

    fn subdivisions_per_em(&self) -> u32 {
        (1.0 / self.radius).ceil().clamp(1.0, 8.0) as u32
    }
}

/// Text on the outside of a sphere.
///
/// y moves along meridians, x along the parallel of the current latitude, so
/// letter widths stay constant in world units. Angles are in radians;
/// longitude 0 at latitude 0 faces +Z and +Y is north.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalSurface {
    center: Vec3,
    radius: f32,
    base_latitude: f32,
    start_longitude: f32,
}

impl SphericalSurface {
    pub fn new(center: Vec3, radius: f32, base_latitude: f32, start_longitude: f32) -> Self {
        Self {
            center,
            radius,
            base_latitude,
            start_longitude,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    fn direction(&self, x: f32, y: f32) -> Vec3 {
        let lat = self.base_latitude + y / self.radius;
        let cos_lat = lat.cos();
        // At the poles every longitude is the same point.
        let lon_offset = if cos_lat.abs() < 1e-6 {
            0.0
        } else {
            x / (self.radius * cos_lat)
        };
        let lon = self.start_longitude + lon_offset;
        Vec3::new(cos_lat * lon.sin(), lat.sin(), cos_lat * lon.cos())
    }
}

impl TextSurface for SphericalSurface {
    fn position(&self, x: f32, y: f32) -> Vec3 {
        self.center + self.radius * self.direction(x, y)
    }

    fn normal(&self, x: f32, y: f32) -> Vec3 {
        self.direction(x, y)
    }

    fn subdivisions_per_em(&self) -> u32 {
        (2.0 / self.radius).ceil().clamp(1.0, 10.0) as u32
    }
}

/// Any of the built-in surfaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface {
    Flat(FlatSurface),
    Cylinder(CylindricalSurface),
    Sphere(SphericalSurface),
}

impl Default for Surface {
    fn default() -> Self {
        Surface::Flat(FlatSurface::default())
    }
}

impl TextSurface for Surface {
    fn position(&self, x: f32, y: f32) -> Vec3 {
        match self {
            Surface::Flat(s) => s.position(x, y),
            Surface::Cylinder(s) => s.position(x, y),
            Surface::Sphere(s) => s.position(x, y),
        }
    }

    fn normal(&self, x: f32, y: f32) -> Vec3 {
        match self {
            Surface::Flat(s) => s.normal(x, y),
            Surface::Cylinder(s) => s.normal(x, y),
            Surface::Sphere(s) => s.normal(x, y),
        }
    }

    fn subdivisions_per_em(&self) -> u32 {
        match self {
            Surface::Flat(s) => s.subdivisions_per_em(),
            Surface::Cylinder(s) => s.subdivisions_per_em(),
            Surface::Sphere(s) => s.subdivisions_per_em(),
        }
    }
}
