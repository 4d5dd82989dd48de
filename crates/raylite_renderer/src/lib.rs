//! raylite renderer - CPU ray tracing of spheres, cylinders and triangles.
//!
//! Rendering runs in three stages:
//!
//! 1. **Bases**: primitives are flattened and moved into view space and
//!    into the light's frame (`Basis`, `LightFrame`)
//! 2. **Tracing**: one orthographic -Z ray per pixel peels surfaces front to
//!    back, shading each with ambient, direct, reflected and specular terms
//!    plus a shadow ray (`SceneTracer`), bucket by bucket in parallel
//! 3. **Compositing**: pixels are blended by transparency, fogged, gamma
//!    corrected and optionally antialiased (`Image`, `Rgba8`)
//!
//! `RayTracer` ties the stages together behind a small session API.
//!
//! # Example
//!
//! ```ignore
//! use raylite_core::{Material, RenderSettings};
//! use raylite_math::{Mat4, Vec3};
//! use raylite_renderer::{RayTracer, RenderRequest};
//!
//! let mut tracer = RayTracer::new(RenderSettings::default());
//! tracer.prepare([-5.0, 5.0, -5.0, 5.0, 0.0, 50.0], Mat4::IDENTITY.to_cols_array());
//! tracer.add_sphere(Vec3::new(0.0, 0.0, -10.0), 2.0, Material::default());
//!
//! let image = tracer.render(&RenderRequest::new(640, 640, 0.0, 50.0))?;
//! ```

mod basis;
mod bucket;
mod camera;
mod compositor;
mod cylinder;
mod error;
mod grid;
mod index;
mod pov;
mod ray;
mod renderer;
mod shade;
mod sphere;
mod texture;
mod tracer;
mod triangle;

pub use basis::{Basis, LightFrame, Topology, MIN_VOXEL};
pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::ViewVolume;
pub use compositor::{Image, Rgba8};
pub use error::{RenderError, RenderResult};
pub use grid::GridIndex;
pub use index::{Frame, HitQuery, LinearIndex, SpatialIndex};
pub use pov::export_pov;
pub use ray::{RayInfo, SurfaceHit, RAY_DIRECTION};
pub use renderer::{ProgressFn, RayTracer, RenderRequest};
pub use shade::{gamma_correct, Lighting};
pub use texture::perturb_normal;
pub use tracer::{background_pixel, PixelSample, SceneTracer, MAX_PASSES};
pub use triangle::TrianglePrecompute;

/// Re-export math types from raylite_math
pub use raylite_math::{Interval, Vec3};
