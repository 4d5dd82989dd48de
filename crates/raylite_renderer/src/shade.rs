//! Surface reconstruction and the local lighting model.

use raylite_core::{Color, Primitive, RenderSettings, Triangle};
use raylite_math::{Interval, Vec3, R_SMALL4};
use rand::RngCore;

use crate::basis::{Basis, Topology};
use crate::ray::RayInfo;
use crate::texture::perturb_normal;

/// Lighting coefficients resolved from `RenderSettings`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: f32,
    pub direct: f32,
    pub reflect: f32,
    pub power: f32,
    pub spec_power: f32,
    pub spec_reflect: f32,
}

impl Lighting {
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            ambient: settings.ambient,
            direct: settings.direct,
            reflect: settings.reflect,
            power: settings.power,
            spec_power: settings.spec_power,
            spec_reflect: settings.spec_reflect,
        }
    }

    /// Head-on light from the viewer, `(d + d^power) / 2` with `d = max(0, n.z)`.
    pub fn direct_component(&self, normal: Vec3) -> f32 {
        let d = normal.z.max(0.0);
        (d + d.powf(self.power)) * 0.5
    }

    /// Shade a surface color.
    ///
    /// `light_normal` is the unit direction the light travels (zero for no
    /// light) and `lit` the shadow factor in [0, 1].
    pub fn shade(&self, color: Color, normal: Vec3, light_normal: Vec3, lit: f32) -> Color {
        let direct_cmp = self.direct_component(normal);

        let dl = (-normal.dot(light_normal)).max(0.0);
        let (reflect_cmp, excess) = if lit > 0.0 && dl > 0.0 {
            (
                lit * (dl + dl.powf(self.power)) * 0.5,
                dl.powf(self.spec_power) * self.spec_reflect * lit,
            )
        } else {
            (0.0, 0.0)
        };

        let bright = self.ambient
            + (1.0 - self.ambient)
                * (self.direct * direct_cmp
                    + (1.0 - self.direct) * direct_cmp * self.reflect * reflect_cmp);
        let bright = Interval::UNIT.clamp(bright);

        color * bright + Vec3::splat(excess)
    }
}

/// Scale a color so its mean intensity follows `avg^exponent`.
///
/// Hue is preserved; near-black colors are left alone.
pub fn gamma_correct(color: Color, exponent: f32) -> Color {
    if exponent == 1.0 {
        return color;
    }
    let avg = (color.x + color.y + color.z) / 3.0;
    if avg < R_SMALL4 {
        return color;
    }
    color * (avg.powf(exponent) / avg)
}

/// Normal and color for a sphere or cylinder hit.
///
/// The normal radiates from `ray.center` and is then textured.
pub fn reflect_round(ray: &mut RayInfo, primitive: &Primitive, rng: &mut dyn RngCore) -> Color {
    let normal = (ray.impact - ray.center).normalize_or_zero();
    ray.set_surface(perturb_normal(normal, ray.impact, primitive.texture(), rng));

    match primitive {
        Primitive::Cylinder(cylinder) => cylinder.color_at(ray.interp.x),
        _ => primitive.material().color(),
    }
}

/// Interpolated normal and color for a triangle hit.
pub fn reflect_triangle(
    ray: &mut RayInfo,
    basis: &Basis,
    topology: &Topology,
    prim: usize,
    triangle: &Triangle,
) -> Color {
    let (u, v) = (ray.interp.x, ray.interp.y);
    let w = 1.0 - u - v;

    let [n1, n2, n3] = basis.vertex_normals(topology, prim);
    ray.set_surface((n1 * w + n2 * u + n3 * v).normalize_or_zero());

    let [c1, c2, c3] = triangle.colors;
    c1 * w + c2 * u + c3 * v
}
