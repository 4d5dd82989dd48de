//! Ray-cylinder intersection for rays travelling along -Z.
//!
//! Cylinders are capped with hemispheres of the same radius so that chains
//! of cylinders join without visible seams.

use raylite_math::{Interval, Vec2, Vec3};

use crate::ray::{SurfaceHit, RAY_DIRECTION};
use crate::sphere::hit_sphere;

/// Below this the ray is treated as parallel to the axis.
const PARALLEL_EPSILON: f32 = 1e-12;

/// Intersect a -Z ray with a capped cylinder.
///
/// `axis` must be unit length. The reported `interp.x` is the fraction
/// along the axis (0 at `start`, 1 at the far end) clamped to the caps.
pub fn hit_cylinder(
    base: Vec3,
    start: Vec3,
    axis: Vec3,
    length: f32,
    radius: f32,
    range: Interval,
) -> Option<SurfaceHit> {
    let radius_sq = radius * radius;
    let mut best = hit_body(base, start, axis, length, radius_sq, range);

    let end = start + axis * length;
    for (cap, fraction) in [(start, 0.0), (end, 1.0)] {
        if let Some(mut hit) = hit_sphere(base, cap, radius_sq, range) {
            if best.map_or(true, |b| hit.dist < b.dist) {
                hit.interp = Vec2::new(fraction, 0.0);
                best = Some(hit);
            }
        }
    }

    best
}

/// Near intersection with the open tube between the two caps.
fn hit_body(
    base: Vec3,
    start: Vec3,
    axis: Vec3,
    length: f32,
    radius_sq: f32,
    range: Interval,
) -> Option<SurfaceHit> {
    let oc = base - start;

    // Project ray direction and origin offset onto the plane perpendicular
    // to the axis
    let d_perp = RAY_DIRECTION - RAY_DIRECTION.dot(axis) * axis;
    let oc_perp = oc - oc.dot(axis) * axis;

    let a = d_perp.length_squared();
    if a < PARALLEL_EPSILON {
        return None;
    }
    let b = 2.0 * oc_perp.dot(d_perp);
    let c = oc_perp.length_squared() - radius_sq;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let dist = (-b - discriminant.sqrt()) / (2.0 * a);
    if !range.surrounds(dist) {
        return None;
    }

    let along = (oc + RAY_DIRECTION * dist).dot(axis);
    if along < 0.0 || along > length {
        return None;
    }

    let fraction = if length > 0.0 { along / length } else { 0.0 };
    Some(SurfaceHit {
        dist,
        center: start + axis * along,
        interp: Vec2::new(fraction, 0.0),
    })
}
