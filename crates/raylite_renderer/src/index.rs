//! Spatial index contract for nearest-hit queries.
//!
//! An index is built over one basis and answers "which primitive does a -Z
//! ray from this origin hit first". `Frame` bundles the basis with the
//! topology and source primitives so intersection code can be shared by
//! every index implementation.

use raylite_core::{Primitive, PrimitiveKind};
use raylite_math::{Interval, Vec2, Vec3};

use crate::basis::{Basis, Topology};
use crate::cylinder::hit_cylinder;
use crate::ray::{RayInfo, SurfaceHit};
use crate::sphere::hit_sphere;
use crate::triangle::hit_triangle;

/// One basis together with what is needed to intersect its primitives.
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    pub basis: &'a Basis,
    pub topology: &'a Topology,
    pub primitives: &'a [Primitive],
}

impl<'a> Frame<'a> {
    pub fn new(basis: &'a Basis, topology: &'a Topology, primitives: &'a [Primitive]) -> Self {
        Self {
            basis,
            topology,
            primitives,
        }
    }

    pub fn len(&self) -> usize {
        self.topology.primitive_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Intersect a single primitive.
    ///
    /// Backface-culled triangles are invisible to primary queries but still
    /// block light.
    pub fn hit_primitive(&self, prim: usize, base: Vec3, query: &HitQuery) -> Option<SurfaceHit> {
        let v = self.topology.first_vertex(prim);
        let basis = self.basis;

        match &self.primitives[prim] {
            Primitive::Sphere(_) => hit_sphere(base, basis.vertices[v], basis.radii_sq[v], query.range),
            Primitive::Cylinder(cylinder) => {
                let axis = basis.vert2normal[v].map(|n| basis.normals[n])?;
                hit_cylinder(
                    base,
                    basis.vertices[v],
                    axis,
                    cylinder.length,
                    basis.radii[v],
                    query.range,
                )
            }
            Primitive::Triangle(_) => {
                if basis.culled[prim] && !query.shadow {
                    return None;
                }
                let pre = basis.precomp[prim].as_ref()?;
                hit_triangle(base, pre, query.range)
            }
        }
    }

    /// Axis-aligned XY bounds of a primitive as (min, max).
    ///
    /// Every ray hitting the primitive has its origin inside this box.
    pub fn footprint(&self, prim: usize) -> (Vec2, Vec2) {
        let v = self.topology.first_vertex(prim);
        let basis = self.basis;

        match self.topology.kind(prim) {
            PrimitiveKind::Sphere => {
                let center = basis.vertices[v].truncate();
                let r = Vec2::splat(basis.radii[v]);
                (center - r, center + r)
            }
            PrimitiveKind::Cylinder => {
                let start = basis.vertices[v];
                let axis = basis.vert2normal[v].map_or(Vec3::ZERO, |n| basis.normals[n]);
                let length = match &self.primitives[prim] {
                    Primitive::Cylinder(cylinder) => cylinder.length,
                    _ => 0.0,
                };
                let end = start + axis * length;
                let r = Vec2::splat(basis.radii[v]);
                (
                    start.truncate().min(end.truncate()) - r,
                    start.truncate().max(end.truncate()) + r,
                )
            }
            PrimitiveKind::Triangle => {
                let a = basis.vertices[v].truncate();
                let b = basis.vertices[v + 1].truncate();
                let c = basis.vertices[v + 2].truncate();
                (a.min(b).min(c), a.max(b).max(c))
            }
        }
    }
}

/// Parameters of one nearest-hit query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitQuery {
    /// Primitive to ignore (the surface the ray is leaving)
    pub exclude: Option<usize>,
    /// Shadow queries also see backface-culled triangles
    pub shadow: bool,
    /// Accepted hit distances, exclusive at both ends
    pub range: Interval,
}

impl HitQuery {
    /// Camera ray between the front and back clip distances.
    pub fn primary(exclude: Option<usize>, front: f32, back: f32) -> Self {
        Self {
            exclude,
            shadow: false,
            range: Interval::new(front, back),
        }
    }

    /// Light ray with no clipping beyond the ray origin.
    pub fn shadow(exclude: Option<usize>) -> Self {
        Self {
            exclude,
            shadow: true,
            range: Interval::FORWARD,
        }
    }
}

/// Acceleration structure answering nearest-hit queries on one basis.
pub trait SpatialIndex: Send + Sync {
    /// Build the index for a frame.
    fn build(frame: &Frame<'_>) -> Self
    where
        Self: Sized;

    /// Find the nearest primitive hit by a -Z ray from `ray.base`.
    ///
    /// On a hit the ray's hit fields are filled in and the primitive index
    /// is returned. Equal distances resolve to the lowest primitive index.
    fn nearest_hit(&self, frame: &Frame<'_>, ray: &mut RayInfo, query: &HitQuery) -> Option<usize>;
}

/// Test `candidates` and record the closest hit in `ray`.
pub(crate) fn closest<I>(frame: &Frame<'_>, candidates: I, ray: &mut RayInfo, query: &HitQuery) -> Option<usize>
where
    I: IntoIterator<Item = usize>,
{
    let mut best: Option<(usize, SurfaceHit)> = None;

    for prim in candidates {
        if query.exclude == Some(prim) {
            continue;
        }
        let Some(hit) = frame.hit_primitive(prim, ray.base, query) else {
            continue;
        };
        let closer = match &best {
            None => true,
            Some((best_prim, best_hit)) => {
                hit.dist < best_hit.dist || (hit.dist == best_hit.dist && prim < *best_prim)
            }
        };
        if closer {
            best = Some((prim, hit));
        }
    }

    let (prim, hit) = best?;
    ray.record(prim, &hit);
    Some(prim)
}

/// Brute-force index: tests every primitive on every query.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearIndex {
    count: usize,
}

impl SpatialIndex for LinearIndex {
    fn build(frame: &Frame<'_>) -> Self {
        Self { count: frame.len() }
    }

    fn nearest_hit(&self, frame: &Frame<'_>, ray: &mut RayInfo, query: &HitQuery) -> Option<usize> {
        closest(frame, 0..self.count, ray, query)
    }
}
