//! Render session: primitive store, view volume and settings.
//!
//! A `RayTracer` collects primitives between `prepare()` calls and turns
//! them into an image on `render()`. Bases and spatial indices are rebuilt
//! on every render, so the store can be edited freely in between.

use std::time::Instant;

use raylite_core::{Color, Material, PrimitiveKind, PrimitiveStore, RenderSettings};
use raylite_math::{Interval, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bucket::render_buckets;
use crate::camera::ViewVolume;
use crate::compositor::Image;
use crate::error::{RenderError, RenderResult};
use crate::grid::GridIndex;
use crate::index::SpatialIndex;
use crate::pov;
use crate::tracer::{background_pixel, PixelSample, SceneTracer};

/// Progress callback receiving (buckets done, buckets total).
pub type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// Output size, clip distances and RNG seed for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub width: u32,
    pub height: u32,
    /// Near clip distance along the view ray
    pub front: f32,
    /// Far clip distance along the view ray
    pub back: f32,
    /// Seed for the scatter texture
    pub seed: u64,
}

impl RenderRequest {
    pub fn new(width: u32, height: u32, front: f32, back: f32) -> Self {
        Self {
            width,
            height,
            front,
            back,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Accepted hit distances.
    pub fn clip(&self) -> Interval {
        Interval::new(self.front, self.back)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// A ray tracing session.
pub struct RayTracer {
    store: PrimitiveStore,
    volume: ViewVolume,
    settings: RenderSettings,
    progress: Option<Box<ProgressFn>>,
}

impl RayTracer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            store: PrimitiveStore::new(),
            volume: ViewVolume::default(),
            settings,
            progress: None,
        }
    }

    /// Report bucket progress during renders.
    pub fn with_progress(mut self, progress: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Set the view volume and the column-major object-to-view matrix.
    pub fn prepare(&mut self, volume: [f32; 6], view: [f32; 16]) {
        self.volume = ViewVolume::new(volume, view);
    }

    pub fn add_sphere(&mut self, center: Vec3, radius: f32, material: Material) -> usize {
        self.store.add_sphere(center, radius, material)
    }

    pub fn add_cylinder(
        &mut self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        colors: [Color; 2],
        material: Material,
    ) -> usize {
        self.store.add_cylinder(start, end, radius, colors, material)
    }

    pub fn add_triangle(
        &mut self,
        vertices: [Vec3; 3],
        normals: [Vec3; 3],
        colors: [Color; 3],
        material: Material,
    ) -> usize {
        self.store.add_triangle(vertices, normals, colors, material)
    }

    pub fn store(&self) -> &PrimitiveStore {
        &self.store
    }

    /// Remove every primitive.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: RenderSettings) {
        self.settings = settings;
    }

    /// Build the bases and indices the renderer traces against.
    pub fn scene<I: SpatialIndex>(&self) -> SceneTracer<'_, I> {
        SceneTracer::new(self.store.primitives(), &self.volume, &self.settings)
    }

    /// Render with the default grid index.
    pub fn render(&self, request: &RenderRequest) -> RenderResult<Image> {
        self.render_with::<GridIndex>(request)
    }

    /// Render with a chosen spatial index.
    ///
    /// With antialiasing enabled the scene is traced at twice the requested
    /// size and filtered down.
    pub fn render_with<I: SpatialIndex>(&self, request: &RenderRequest) -> RenderResult<Image> {
        let start = Instant::now();
        let scale = if self.settings.antialias_enabled() { 2 } else { 1 };
        let (width, height) = (request.width * scale, request.height * scale);

        log::info!(
            "Rendering {}x{} ({} spheres, {} cylinders, {} triangles){}",
            request.width,
            request.height,
            self.store.count(PrimitiveKind::Sphere),
            self.store.count(PrimitiveKind::Cylinder),
            self.store.count(PrimitiveKind::Triangle),
            if scale > 1 { ", antialiased" } else { "" }
        );

        let mut image = Image::filled(width, height, background_pixel(&self.settings))?;

        if !self.store.is_empty() {
            let tracer = self.scene::<I>();
            log::info!(
                "Processed {} primitives in {:.2?}",
                self.store.len(),
                start.elapsed()
            );
            render_buckets(
                &tracer,
                &mut image,
                request.clip(),
                request.seed,
                self.progress.as_deref(),
            );
        }

        if scale > 1 {
            image = image.downsample_2x()?;
        }

        log::info!("Render finished in {:.2?}", start.elapsed());
        Ok(image)
    }

    /// Render and write packed RGBA words into `out`.
    ///
    /// `out` must hold exactly `width * height` words.
    pub fn render_into(&self, request: &RenderRequest, out: &mut [u32]) -> RenderResult<()> {
        if out.len() != request.pixel_count() {
            return Err(RenderError::BufferSize {
                expected: request.pixel_count(),
                actual: out.len(),
            });
        }
        self.render(request)?.write_packed(out)
    }

    /// Trace a single pixel of `request` without antialiasing.
    ///
    /// Builds the scene from scratch, so it is meant for inspection rather
    /// than for rendering many pixels.
    pub fn trace_pixel(&self, request: &RenderRequest, x: u32, y: u32) -> PixelSample {
        let tracer = self.scene::<GridIndex>();
        let mut rng = StdRng::seed_from_u64(request.seed);
        tracer.trace_pixel(x, y, request.width, request.height, request.clip(), &mut rng)
    }

    /// POV-Ray description of the current spheres.
    pub fn export_pov(&self, front: f32, fov: f32) -> String {
        pov::export_pov(self.store.primitives(), &self.volume, front, fov)
    }
}

impl Default for RayTracer {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::Rgba8;
    use raylite_math::Mat4;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn session(settings: RenderSettings) -> RayTracer {
        let mut tracer = RayTracer::new(settings);
        tracer.prepare([-4.0, 4.0, -4.0, 4.0, 0.0, 100.0], Mat4::IDENTITY.to_cols_array());
        tracer
    }

    #[test]
    fn test_request_clip() {
        let request = RenderRequest::new(10, 20, 1.0, 50.0).with_seed(9);
        assert_eq!(request.clip(), Interval::new(1.0, 50.0));
        assert_eq!(request.pixel_count(), 200);
        assert_eq!(request.seed, 9);
    }

    #[test]
    fn test_empty_scene_is_background() {
        let settings = RenderSettings {
            bg_rgb: [1.0, 0.0, 0.0],
            ..Default::default()
        };
        let image = session(settings).render(&RenderRequest::new(7, 5, 0.0, 100.0)).unwrap();

        assert_eq!((image.width(), image.height()), (7, 5));
        assert!(image.pixels().iter().all(|p| *p == Rgba8::new(255, 0, 0, 255)));
    }

    #[test]
    fn test_antialias_keeps_requested_size() {
        let settings = RenderSettings {
            antialias: 1,
            ..Default::default()
        };
        let mut tracer = session(settings);
        tracer.add_sphere(Vec3::new(0.0, 0.0, -10.0), 2.0, Material::default());

        let image = tracer.render(&RenderRequest::new(16, 12, 0.0, 100.0)).unwrap();
        assert_eq!((image.width(), image.height()), (16, 12));
    }

    #[test]
    fn test_render_into_checks_buffer() {
        let tracer = session(RenderSettings::default());
        let request = RenderRequest::new(4, 4, 0.0, 100.0);

        let mut short = vec![0u32; 15];
        assert!(matches!(
            tracer.render_into(&request, &mut short),
            Err(RenderError::BufferSize { expected: 16, actual: 15 })
        ));

        let mut out = vec![1u32; 16];
        tracer.render_into(&request, &mut out).unwrap();
        assert!(out.iter().all(|w| w.to_ne_bytes() == [0, 0, 0, 255]));
    }

    #[test]
    fn test_progress_reports_every_bucket() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut tracer = session(RenderSettings::default()).with_progress(move |done, total| {
            assert!(done <= total);
            seen.fetch_add(1, Ordering::Relaxed);
        });
        tracer.add_sphere(Vec3::new(0.0, 0.0, -10.0), 1.0, Material::default());

        // 130x70 splits into 3x2 buckets of 64 pixels
        tracer.render(&RenderRequest::new(130, 70, 0.0, 100.0)).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn test_trace_pixel_counts_passes() {
        let mut tracer = session(RenderSettings::default());
        tracer.add_sphere(Vec3::new(0.0, 0.0, -10.0), 2.0, Material::default().with_transparency(0.5));
        tracer.add_sphere(Vec3::new(0.0, 0.0, -20.0), 2.0, Material::default());

        let request = RenderRequest::new(8, 8, 0.0, 100.0);
        assert_eq!(tracer.trace_pixel(&request, 4, 4).passes, 2);
        assert_eq!(tracer.trace_pixel(&request, 0, 0).passes, 0);
    }

    #[test]
    fn test_clear_and_settings() {
        let mut tracer = session(RenderSettings::default());
        tracer.add_sphere(Vec3::ZERO, 1.0, Material::default());
        assert_eq!(tracer.store().len(), 1);

        tracer.clear();
        assert!(tracer.store().is_empty());

        let settings = RenderSettings {
            ambient: 0.5,
            ..Default::default()
        };
        tracer.set_settings(settings.clone());
        assert_eq!(tracer.settings(), &settings);
    }
}
