//! Per-query ray state.
//!
//! Every ray in a basis travels along -Z from `base`, so a ray is fully
//! described by its origin. `RayInfo` doubles as the scratch record the
//! spatial index fills in and the shading code reads back.

use raylite_math::{Vec2, Vec3};

/// Direction shared by all rays in a basis.
pub const RAY_DIRECTION: Vec3 = Vec3::NEG_Z;

/// Result of a single ray-primitive test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Distance from the ray origin along -Z
    pub dist: f32,
    /// Point the surface normal radiates from (sphere center, closest axis
    /// point of a cylinder, the hit point itself for triangles)
    pub center: Vec3,
    /// Interpolation parameters (axis fraction for cylinders, barycentric
    /// u/v for triangles)
    pub interp: Vec2,
}

/// Ray origin, nearest hit and surface data for one traversal step.
#[derive(Debug, Clone, Copy)]
pub struct RayInfo {
    /// Origin of the ray
    pub base: Vec3,
    /// Distance to the recorded hit
    pub dist: f32,
    /// Hit point
    pub impact: Vec3,
    /// See `SurfaceHit::center`
    pub center: Vec3,
    /// Unit surface normal at the hit, after texturing
    pub surface_normal: Vec3,
    /// Mirror direction of the incoming ray
    pub reflect: Vec3,
    /// See `SurfaceHit::interp`
    pub interp: Vec2,
    /// Index of the hit primitive
    pub prim: Option<usize>,
    /// Cosine between the normal and the incoming ray (negative when the
    /// surface faces the viewer)
    pub dotgle: f32,
}

impl RayInfo {
    /// Create a ray with no hit recorded.
    pub fn new(base: Vec3) -> Self {
        Self {
            base,
            dist: 0.0,
            impact: base,
            center: Vec3::ZERO,
            surface_normal: Vec3::ZERO,
            reflect: RAY_DIRECTION,
            interp: Vec2::ZERO,
            prim: None,
            dotgle: 0.0,
        }
    }

    /// Point along the ray at distance `dist`.
    #[inline]
    pub fn at(&self, dist: f32) -> Vec3 {
        self.base + RAY_DIRECTION * dist
    }

    /// Store a hit reported by the spatial index.
    pub fn record(&mut self, prim: usize, hit: &SurfaceHit) {
        self.prim = Some(prim);
        self.dist = hit.dist;
        self.impact = self.at(hit.dist);
        self.center = hit.center;
        self.interp = hit.interp;
    }

    /// Set the surface normal and derive the cosine and reflection terms.
    pub fn set_surface(&mut self, normal: Vec3) {
        self.surface_normal = normal;
        self.dotgle = RAY_DIRECTION.dot(normal);
        self.reflect = RAY_DIRECTION - 2.0 * self.dotgle * normal;
    }
}
