//! 8-bit pixels, image buffers and antialias downsampling.

use bytemuck::{Pod, Zeroable};
use raylite_core::Color;

use crate::error::{RenderError, RenderResult};

/// One output pixel.
///
/// Laid out as R, G, B, A bytes so that `pack()` yields a word whose
/// in-memory byte order is R, G, B, A on every host.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Scale a unit channel to 0..=255, truncating and saturating.
#[inline]
pub fn channel_to_u8(c: f32) -> u8 {
    (c * 255.0) as u8
}

impl Rgba8 {
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Convert a linear color and alpha in [0, 1].
    pub fn from_color(color: Color, alpha: f32) -> Self {
        Self::new(
            channel_to_u8(color.x),
            channel_to_u8(color.y),
            channel_to_u8(color.z),
            channel_to_u8(alpha),
        )
    }

    /// Native-endian word with memory bytes R, G, B, A.
    #[inline]
    pub fn pack(self) -> u32 {
        bytemuck::cast(self)
    }

    /// Composite this pixel over `under` with weight `persist`, per channel.
    pub fn blend(self, under: Rgba8, persist: f32) -> Rgba8 {
        let keep = 1.0 - persist;
        let mix = |top: u8, bottom: u8| (top as f32 * persist + bottom as f32 * keep) as u8;
        Rgba8::new(
            mix(self.r, under.r),
            mix(self.g, under.g),
            mix(self.b, under.b),
            mix(self.a, under.a),
        )
    }

    #[inline]
    fn channels(self) -> [u32; 4] {
        [self.r as u32, self.g as u32, self.b as u32, self.a as u32]
    }
}

/// Row-major pixel buffer. Row 0 is the bottom of the view volume.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
}

impl Image {
    /// Create an image filled with one pixel value.
    ///
    /// Fails instead of aborting when the buffer cannot be allocated.
    pub fn filled(width: u32, height: u32, fill: Rgba8) -> RenderResult<Self> {
        let count = width as usize * height as usize;
        let allocation = RenderError::Allocation {
            width,
            height,
            bytes: count.saturating_mul(std::mem::size_of::<Rgba8>()),
        };

        let mut pixels = Vec::new();
        pixels.try_reserve_exact(count).map_err(|_| allocation)?;
        pixels.resize(count, fill);

        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Rgba8 {
        self.pixels[self.offset(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, pixel: Rgba8) {
        let offset = self.offset(x, y);
        self.pixels[offset] = pixel;
    }

    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    /// Raw R, G, B, A bytes in row order.
    pub fn to_rgba_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Write packed 32-bit pixels into a caller-provided buffer.
    pub fn write_packed(&self, out: &mut [u32]) -> RenderResult<()> {
        if out.len() != self.pixels.len() {
            return Err(RenderError::BufferSize {
                expected: self.pixels.len(),
                actual: out.len(),
            });
        }
        for (word, pixel) in out.iter_mut().zip(&self.pixels) {
            *word = pixel.pack();
        }
        Ok(())
    }

    /// Halve both dimensions with the antialias filter.
    ///
    /// Interior pixels weight the 4x4 window starting at (2x-1, 2y-1), with
    /// the central 2x2 counted five times (sum 32). Border pixels average the
    /// 2x2 block at (2x, 2y). Every channel, alpha included, is filtered the
    /// same way.
    pub fn downsample_2x(&self) -> RenderResult<Image> {
        let (width, height) = (self.width / 2, self.height / 2);
        let mut out = Image::filled(width, height, Rgba8::TRANSPARENT)?;

        for y in 0..height {
            for x in 0..width {
                let border = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
                let pixel = if border {
                    self.box_2x2(x, y)
                } else {
                    self.filter_4x4(x, y)
                };
                out.set(x, y, pixel);
            }
        }

        Ok(out)
    }

    fn box_2x2(&self, x: u32, y: u32) -> Rgba8 {
        let (sx, sy) = (2 * x, 2 * y);
        let mut sum = [0u32; 4];
        for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            accumulate(&mut sum, self.get(sx + dx, sy + dy), 1);
        }
        from_sum(sum, 2)
    }

    fn filter_4x4(&self, x: u32, y: u32) -> Rgba8 {
        let (sx, sy) = (2 * x - 1, 2 * y - 1);
        let mut sum = [0u32; 4];
        for dy in 0..4 {
            for dx in 0..4 {
                let center = (1..=2).contains(&dx) && (1..=2).contains(&dy);
                let weight = if center { 5 } else { 1 };
                accumulate(&mut sum, self.get(sx + dx, sy + dy), weight);
            }
        }
        from_sum(sum, 5)
    }
}

#[inline]
fn accumulate(sum: &mut [u32; 4], pixel: Rgba8, weight: u32) {
    for (total, channel) in sum.iter_mut().zip(pixel.channels()) {
        *total += channel * weight;
    }
}

#[inline]
fn from_sum(sum: [u32; 4], shift: u32) -> Rgba8 {
    let [r, g, b, a] = sum.map(|total| (total >> shift).min(255) as u8);
    Rgba8::new(r, g, b, a)
}
