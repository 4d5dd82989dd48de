//! Ray-sphere intersection for rays travelling along -Z.

use raylite_math::{Interval, Vec2, Vec3};

use crate::ray::SurfaceHit;

/// Intersect a -Z ray starting at `base` with the front of a sphere.
///
/// Only the near surface is reported: a ray starting inside the sphere, or
/// one whose near hit falls outside `range`, misses.
pub fn hit_sphere(base: Vec3, center: Vec3, radius_sq: f32, range: Interval) -> Option<SurfaceHit> {
    let dx = center.x - base.x;
    let dy = center.y - base.y;
    let d2 = dx * dx + dy * dy;
    if d2 > radius_sq {
        return None;
    }

    let dz = (radius_sq - d2).sqrt();
    let dist = base.z - (center.z + dz);
    if !range.surrounds(dist) {
        return None;
    }

    Some(SurfaceHit {
        dist,
        center,
        interp: Vec2::ZERO,
    })
}
