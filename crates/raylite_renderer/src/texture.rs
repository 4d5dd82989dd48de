//! Procedural normal perturbation for spheres and cylinders.

use raylite_core::Texture;
use raylite_math::Vec3;
use rand::RngCore;

/// Uniform float in [0, 1) from any RNG.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() >> 8) as f32 / (1u32 << 24) as f32
}

/// Random unit vector, uniformly distributed on the sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    // Rejection sampling inside the unit cube
    loop {
        let v = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Apply `texture` to a unit surface normal at `impact`.
///
/// The result is renormalized; untextured normals pass through unchanged.
pub fn perturb_normal(normal: Vec3, impact: Vec3, texture: Texture, rng: &mut dyn RngCore) -> Vec3 {
    match texture {
        Texture::None => normal,
        Texture::Scatter { weight } => (normal + random_unit_vector(rng) * weight).normalize_or_zero(),
        Texture::Wiggle { amplitude, frequency } => {
            let Vec3 { x, y, z } = impact;
            let offset = Vec3::new(
                ((x + y + z) * frequency).cos(),
                ((x - y + z) * frequency).cos(),
                ((x + y - z) * frequency).cos(),
            ) * amplitude;
            (normal + offset).normalize_or_zero()
        }
    }
}
