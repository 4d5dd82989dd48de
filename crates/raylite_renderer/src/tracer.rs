//! Per-pixel ray tracing over prepared bases.
//!
//! `SceneTracer` owns the view and light bases plus one spatial index for
//! each, built once per render and then shared read-only by every worker.

use raylite_core::{Color, Fog, Primitive, RenderSettings};
use raylite_math::{Interval, Vec3, R_SMALL4};
use rand::RngCore;

use crate::basis::{Basis, LightFrame, Topology};
use crate::camera::ViewVolume;
use crate::compositor::Rgba8;
use crate::grid::GridIndex;
use crate::index::{Frame, HitQuery, SpatialIndex};
use crate::ray::RayInfo;
use crate::shade::{gamma_correct, reflect_round, reflect_triangle, Lighting};

/// Upper bound on surfaces composited into one pixel.
pub const MAX_PASSES: u32 = 25;

/// Persistence at or below which compositing stops.
const MIN_PERSIST: f32 = R_SMALL4;

/// Persistence above which a surface counts as the first one seen.
const FIRST_SURFACE_PERSIST: f32 = 0.9999;

/// Final color of one pixel and how many surfaces contributed to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSample {
    pub color: Rgba8,
    pub passes: u32,
}

/// Background pixel for the given settings.
///
/// Opaque backgrounds get alpha 255, transparent ones alpha 0.
pub fn background_pixel(settings: &RenderSettings) -> Rgba8 {
    let alpha = if settings.ray_opaque_background { 1.0 } else { 0.0 };
    Rgba8::from_color(settings.background(), alpha)
}

/// Geometry, indices and shading state for one render.
pub struct SceneTracer<'a, I = GridIndex> {
    primitives: &'a [Primitive],
    topology: Topology,
    view: Basis,
    light: Basis,
    light_frame: LightFrame,
    view_index: I,
    light_index: I,
    volume: ViewVolume,
    lighting: Lighting,
    gamma_exponent: f32,
    fog: Option<Fog>,
    background: Color,
    background_pixel: Rgba8,
    opaque_background: bool,
    backface_cull: bool,
}

impl<'a, I: SpatialIndex> SceneTracer<'a, I> {
    /// Expand `primitives`, move them into view and light space and index
    /// both bases.
    pub fn new(primitives: &'a [Primitive], volume: &ViewVolume, settings: &RenderSettings) -> Self {
        let (object, topology) = Basis::expand(primitives);
        let view = object.transform_to_view(&topology, &volume.matrix, settings.backface_cull);

        let light_frame = LightFrame::new(settings.light_direction());
        let light = view.transform_to_basis(&topology, &light_frame.rotation);

        let view_index = I::build(&Frame::new(&view, &topology, primitives));
        let light_index = I::build(&Frame::new(&light, &topology, primitives));

        log::debug!(
            "Scene prepared: {} primitives, max sphere radius {:.3}, min voxel {:.4}, {} culled",
            primitives.len(),
            view.max_radius,
            view.min_voxel,
            view.culled.iter().filter(|c| **c).count()
        );

        Self {
            primitives,
            topology,
            view,
            light,
            light_frame,
            view_index,
            light_index,
            volume: *volume,
            lighting: Lighting::from_settings(settings),
            gamma_exponent: settings.gamma_exponent(),
            fog: settings.fog(),
            background: settings.background(),
            background_pixel: background_pixel(settings),
            opaque_background: settings.ray_opaque_background,
            backface_cull: settings.backface_cull,
        }
    }


    fn view_frame(&self) -> Frame<'_> {
        Frame::new(&self.view, &self.topology, self.primitives)
    }

    fn light_frame(&self) -> Frame<'_> {
        Frame::new(&self.light, &self.topology, self.primitives)
    }

    /// Trace pixel (x, y) of a `width` x `height` image.
    ///
    /// Surfaces are peeled front to back: each pass starts at the previous
    /// hit distance, skips the previous primitive and is composited over the
    /// pixel so far with the remaining persistence.
    pub fn trace_pixel(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        clip: Interval,
        rng: &mut dyn RngCore,
    ) -> PixelSample {
        let base = self.volume.ray_origin(x, y, width, height);
        let frame = self.view_frame();

        let mut pixel = self.background_pixel;
        let mut last = pixel;
        let mut persist = 1.0f32;
        let mut front = clip.min;
        let mut exclude = None;
        let mut passes = 0;

        while persist > MIN_PERSIST && passes < MAX_PASSES {
            let mut ray = RayInfo::new(base);
            let query = HitQuery::primary(exclude, front, clip.max);
            let hit = self.view_index.nearest_hit(&frame, &mut ray, &query);

            pixel = match hit {
                Some(prim) => self.shade_hit(prim, &mut ray, clip, rng),
                None => self.background_pixel,
            };
            if passes > 0 {
                pixel = pixel.blend(last, persist);
            }

            let Some(prim) = hit else {
                break;
            };
            front = ray.dist;

            let transparency = self.primitives[prim].transparency();
            if self.backface_cull && persist < FIRST_SURFACE_PERSIST && transparency != 0.0 {
                // Stacked transparent surfaces are not combined when culling
                pixel = last;
            } else {
                persist *= transparency;
            }

            last = pixel;
            exclude = Some(prim);
            passes += 1;
        }

        PixelSample { color: pixel, passes }
    }

    /// Surface color of a recorded hit, lit, fogged and gamma corrected.
    fn shade_hit(&self, prim: usize, ray: &mut RayInfo, clip: Interval, rng: &mut dyn RngCore) -> Rgba8 {
        let primitive = &self.primitives[prim];
        let color = match primitive {
            Primitive::Triangle(triangle) => {
                reflect_triangle(ray, &self.view, &self.topology, prim, triangle)
            }
            Primitive::Sphere(_) | Primitive::Cylinder(_) => reflect_round(ray, primitive, rng),
        };

        let lit = self.shadow(prim, ray.impact);
        let mut color = self
            .lighting
            .shade(color, ray.surface_normal, self.light_frame.normal, lit);

        let mut alpha = 1.0;
        if let Some(fog) = &self.fog {
            let f = fog.factor(ray.dist, clip);
            if self.opaque_background {
                color = self.background * f + color * (1.0 - f);
            } else {
                alpha = 1.0 - f;
            }
        }

        Rgba8::from_color(gamma_correct(color, self.gamma_exponent), alpha)
    }

    /// Fraction of light reaching a view-space point on primitive `prim`.
    ///
    /// 1 when unobstructed, otherwise the square root of the first
    /// blocker's transparency.
    pub fn shadow(&self, prim: usize, impact: Vec3) -> f32 {
        if self.light_frame.normal == Vec3::ZERO {
            return 1.0;
        }

        let mut ray = RayInfo::new(self.light_frame.to_light_space(impact));
        let query = HitQuery::shadow(Some(prim));
        match self.light_index.nearest_hit(&self.light_frame(), &mut ray, &query) {
            Some(blocker) => self.primitives[blocker].transparency().sqrt(),
            None => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::LinearIndex;
    use raylite_core::{Material, PrimitiveStore};
    use raylite_math::Mat4;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn volume() -> ViewVolume {
        ViewVolume::new([-5.0, 5.0, -5.0, 5.0, 0.0, 50.0], Mat4::IDENTITY.to_cols_array())
    }

    fn flat_settings() -> RenderSettings {
        RenderSettings {
            ambient: 1.0,
            direct: 0.0,
            reflect: 0.0,
            spec_reflect: 0.0,
            bg_rgb: [0.0, 0.0, 1.0],
            ..Default::default()
        }
    }

    /// Pixel (5, 5) of a 10x10 image looks down the origin.
    fn trace_center<I: SpatialIndex>(tracer: &SceneTracer<'_, I>) -> PixelSample {
        let mut rng = StdRng::seed_from_u64(0);
        tracer.trace_pixel(5, 5, 10, 10, Interval::new(0.0, 50.0), &mut rng)
    }

    #[test]
    fn test_background_pixel() {
        let mut settings = flat_settings();
        assert_eq!(background_pixel(&settings), Rgba8::new(0, 0, 255, 255));

        settings.ray_opaque_background = false;
        assert_eq!(background_pixel(&settings), Rgba8::new(0, 0, 255, 0));
    }

    #[test]
    fn test_opaque_hit_is_one_pass() {
        let mut store = PrimitiveStore::new();
        store.add_sphere(Vec3::new(0.0, 0.0, -10.0), 2.0, Material::new(Color::new(1.0, 0.0, 0.0)));
        store.add_sphere(Vec3::new(0.0, 0.0, -20.0), 2.0, Material::default());
        let tracer: SceneTracer<'_, LinearIndex> = SceneTracer::new(store.primitives(), &volume(), &flat_settings());

        let sample = trace_center(&tracer);
        assert_eq!(sample.passes, 1);
        assert_eq!(sample.color, Rgba8::new(255, 0, 0, 255));
    }

    #[test]
    fn test_miss_is_background() {
        let store = PrimitiveStore::new();
        let tracer: SceneTracer<'_, LinearIndex> = SceneTracer::new(store.primitives(), &volume(), &flat_settings());

        let sample = trace_center(&tracer);
        assert_eq!(sample.passes, 0);
        assert_eq!(sample.color, background_pixel(&flat_settings()));
    }

    #[test]
    fn test_transparent_surface_composites() {
        let mut store = PrimitiveStore::new();
        let white = Material::default().with_transparency(0.5);
        store.add_sphere(Vec3::new(0.0, 0.0, -10.0), 2.0, white);
        store.add_sphere(Vec3::new(0.0, 0.0, -20.0), 2.0, Material::new(Color::ZERO));
        let tracer: SceneTracer<'_, LinearIndex> = SceneTracer::new(store.primitives(), &volume(), &flat_settings());

        let sample = trace_center(&tracer);
        assert_eq!(sample.passes, 2);
        // Black at half persistence over white
        assert_eq!(sample.color, Rgba8::new(127, 127, 127, 255));
    }

    #[test]
    fn test_backface_cull_keeps_first_transparent_surface() {
        let mut store = PrimitiveStore::new();
        let glass = Material::default().with_transparency(0.5);
        store.add_sphere(Vec3::new(0.0, 0.0, -10.0), 2.0, glass);
        store.add_sphere(Vec3::new(0.0, 0.0, -20.0), 2.0, glass.with_color(Color::ZERO));
        store.add_sphere(Vec3::new(0.0, 0.0, -30.0), 2.0, Material::new(Color::ZERO));

        let settings = RenderSettings {
            backface_cull: true,
            ..flat_settings()
        };
        let tracer: SceneTracer<'_, LinearIndex> = SceneTracer::new(store.primitives(), &volume(), &settings);

        let sample = trace_center(&tracer);
        // The second transparent sphere is skipped; the opaque one still blends
        assert_eq!(sample.passes, 3);
        assert_eq!(sample.color, Rgba8::new(127, 127, 127, 255));
    }

    #[test]
    fn test_shadow_from_blocker() {
        let mut store = PrimitiveStore::new();
        store.add_sphere(Vec3::new(0.0, 0.0, -20.0), 3.0, Material::default());
        store.add_sphere(Vec3::new(0.0, 0.0, -10.0), 1.0, Material::default());
        store.add_sphere(Vec3::new(8.0, 0.0, -10.0), 1.0, Material::default().with_transparency(0.25));

        let settings = RenderSettings {
            light: [0.0, 0.0, -1.0],
            ..flat_settings()
        };
        let tracer: SceneTracer<'_, LinearIndex> = SceneTracer::new(store.primitives(), &volume(), &settings);

        // Front of the large sphere, behind the small opaque one
        assert_eq!(tracer.shadow(0, Vec3::new(0.0, 0.0, -17.0)), 0.0);
        // Front of the small sphere sees the light
        assert_eq!(tracer.shadow(1, Vec3::new(0.0, 0.0, -9.0)), 1.0);
        // Point behind the transparent sphere
        assert_eq!(tracer.shadow(0, Vec3::new(8.0, 0.0, -25.0)), 0.5);
    }

    #[test]
    fn test_fog_transparent_background_writes_alpha() {
        let mut store = PrimitiveStore::new();
        store.add_sphere(Vec3::new(0.0, 0.0, -27.0), 2.0, Material::default());

        let settings = RenderSettings {
            ray_opaque_background: false,
            ray_trace_fog: 1.0,
            ..flat_settings()
        };
        let tracer: SceneTracer<'_, LinearIndex> = SceneTracer::new(store.primitives(), &volume(), &settings);

        let sample = trace_center(&tracer);
        // Hit at 25 of a 0..50 clip range
        assert_eq!(sample.color, Rgba8::new(255, 255, 255, 127));
    }

    #[test]
    fn test_fog_opaque_background_blends_color() {
        let mut store = PrimitiveStore::new();
        store.add_sphere(Vec3::new(0.0, 0.0, -27.0), 2.0, Material::default());

        let settings = RenderSettings {
            ray_trace_fog: 1.0,
            ..flat_settings()
        };
        let tracer: SceneTracer<'_, LinearIndex> = SceneTracer::new(store.primitives(), &volume(), &settings);

        let sample = trace_center(&tracer);
        assert_eq!(sample.color, Rgba8::new(127, 127, 255, 255));
    }
}
