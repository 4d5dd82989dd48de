//! Surface materials.
//!
//! A `Material` is captured by value when a primitive is added to the store,
//! so changing the material used for later primitives never touches the ones
//! already stored.

use raylite_math::{Interval, Vec3};

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Procedural normal perturbation applied before lighting.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Texture {
    /// Smooth surface.
    #[default]
    None,
    /// Add a random unit vector scaled by `weight` to the normal.
    Scatter { weight: f32 },
    /// Add a cosine ripple of the hit position to the normal.
    Wiggle { amplitude: f32, frequency: f32 },
}

/// Color, transparency and texture of a primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    color: Color,
    /// 0 = opaque, 1 = fully transparent
    transparency: f32,
    texture: Texture,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::ONE,
            transparency: 0.0,
            texture: Texture::None,
        }
    }
}

impl Material {
    /// Create an opaque, untextured material.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set transparency, clamped to [0, 1].
    pub fn with_transparency(mut self, transparency: f32) -> Self {
        self.transparency = if transparency.is_nan() {
            0.0
        } else {
            Interval::UNIT.clamp(transparency)
        };
        self
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = texture;
        self
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn transparency(&self) -> f32 {
        self.transparency
    }

    pub fn texture(&self) -> Texture {
        self.texture
    }

    /// True when nothing behind this surface can show through.
    pub fn is_opaque(&self) -> bool {
        self.transparency == 0.0
    }
}
