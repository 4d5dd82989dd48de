//! Ray-triangle intersection for rays travelling along -Z.
//!
//! Every ray in a basis shares the same direction, so the barycentric solve
//! collapses to a 2D problem in XY that is set up once per triangle when the
//! basis is built.

use raylite_math::{Interval, Vec2, Vec3};

use crate::ray::SurfaceHit;

/// Determinants smaller than this mean the triangle is seen edge-on.
const EDGE_ON_DET: f32 = 1e-12;

/// Barycentric setup for one triangle in one basis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrianglePrecompute {
    /// First vertex
    pub origin: Vec3,
    /// v2 - v1
    pub edge1: Vec3,
    /// v3 - v1
    pub edge2: Vec3,
    /// 1 / (edge1 x edge2).z, or 0 for an edge-on triangle
    pub inv_det: f32,
}

impl TrianglePrecompute {
    pub fn new(v1: Vec3, v2: Vec3, v3: Vec3) -> Self {
        let edge1 = v2 - v1;
        let edge2 = v3 - v1;
        let det = edge1.x * edge2.y - edge1.y * edge2.x;
        let inv_det = if det.abs() < EDGE_ON_DET { 0.0 } else { 1.0 / det };

        Self {
            origin: v1,
            edge1,
            edge2,
            inv_det,
        }
    }

    /// True when the triangle has no area in XY and can never be hit.
    pub fn is_edge_on(&self) -> bool {
        self.inv_det == 0.0
    }
}

/// Intersect a -Z ray starting at `base` with a precomputed triangle.
///
/// `interp` of the result holds (u, v): the weights of the second and third
/// vertex. The first vertex weight is `1 - u - v`.
pub fn hit_triangle(base: Vec3, tri: &TrianglePrecompute, range: Interval) -> Option<SurfaceHit> {
    if tri.is_edge_on() {
        return None;
    }

    let w = base - tri.origin;
    let (e1, e2) = (tri.edge1, tri.edge2);

    let u = (w.x * e2.y - w.y * e2.x) * tri.inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let v = (e1.x * w.y - e1.y * w.x) * tri.inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let z = tri.origin.z + u * e1.z + v * e2.z;
    let dist = base.z - z;
    if !range.surrounds(dist) {
        return None;
    }

    Some(SurfaceHit {
        dist,
        center: Vec3::new(base.x, base.y, z),
        interp: Vec2::new(u, v),
    })
}
