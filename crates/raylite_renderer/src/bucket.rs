//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are traced independently and
//! in parallel using rayon. Each bucket seeds its own RNG from the render
//! seed and its index, so results do not depend on thread scheduling.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use raylite_math::Interval;

use crate::compositor::{Image, Rgba8};
use crate::index::SpatialIndex;
use crate::tracer::SceneTracer;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of the bucket's lower-left corner
    pub x: u32,
    /// Y coordinate of the bucket's lower-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position of this bucket in render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Split an image into buckets, ordered from the center outward.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, buckets.len()));
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from the image center.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let dist = |b: &Bucket| {
        let bx = b.x as f32 + b.width as f32 / 2.0;
        let by = b.y as f32 + b.height as f32 / 2.0;
        (bx - center_x).powi(2) + (by - center_y).powi(2)
    };

    // Stable sort keeps row-major order between equidistant buckets
    buckets.sort_by(|a, b| dist(a).total_cmp(&dist(b)));
}

/// RNG seed for one bucket.
pub fn bucket_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Traced pixels of one bucket, row-major within the bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    pub pixels: Vec<Rgba8>,
    /// Largest pass count of any pixel in the bucket
    pub max_passes: u32,
}

/// Trace every pixel of a bucket.
pub fn render_bucket<I: SpatialIndex>(
    bucket: &Bucket,
    tracer: &SceneTracer<'_, I>,
    width: u32,
    height: u32,
    clip: Interval,
    seed: u64,
) -> BucketResult {
    let mut rng = StdRng::seed_from_u64(bucket_seed(seed, bucket.index));
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);
    let mut max_passes = 0;

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let sample = tracer.trace_pixel(
                bucket.x + local_x,
                bucket.y + local_y,
                width,
                height,
                clip,
                &mut rng,
            );
            max_passes = max_passes.max(sample.passes);
            pixels.push(sample.color);
        }
    }

    BucketResult {
        bucket: *bucket,
        pixels,
        max_passes,
    }
}

/// Trace the whole image in parallel and write the result into `image`.
///
/// `progress` receives (buckets done, buckets total) from worker threads.
pub fn render_buckets<I: SpatialIndex>(
    tracer: &SceneTracer<'_, I>,
    image: &mut Image,
    clip: Interval,
    seed: u64,
    progress: Option<&(dyn Fn(usize, usize) + Send + Sync)>,
) {
    let (width, height) = (image.width(), image.height());
    let buckets = generate_buckets(width, height, DEFAULT_BUCKET_SIZE);
    let total = buckets.len();
    let done = AtomicUsize::new(0);

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let result = render_bucket(bucket, tracer, width, height, clip, seed);
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            log::trace!(
                "Bucket {} at ({}, {}) done, {}/{}",
                bucket.index,
                bucket.x,
                bucket.y,
                finished,
                total
            );
            if let Some(report) = progress {
                report(finished, total);
            }
            result
        })
        .collect();

    let mut max_passes = 0;
    for result in &results {
        let bucket = &result.bucket;
        for (i, pixel) in result.pixels.iter().enumerate() {
            let i = i as u32;
            image.set(bucket.x + i % bucket.width, bucket.y + i / bucket.width, *pixel);
        }
        max_passes = max_passes.max(result.max_passes);
    }

    log::debug!("Traced {} buckets, deepest pixel took {} passes", total, max_passes);
}
