/// A closed or open range of scalar values along a ray.
///
/// Used for clip ranges (front/back planes) and for clamping shading terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns the size of the interval (max - min).
    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// Returns true if x is within the interval [min, max] (inclusive).
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Returns true if x is strictly within the interval (min, max) (exclusive).
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    /// Clamps x to be within the interval [min, max].
    pub fn clamp(&self, x: f32) -> f32 {
        x.clamp(self.min, self.max)
    }

    /// Position of x inside the interval, 0 at min and 1 at max.
    ///
    /// Not clamped. A zero-sized interval maps everything to 0.
    pub fn fraction(&self, x: f32) -> f32 {
        let size = self.size();
        if size == 0.0 {
            0.0
        } else {
            (x - self.min) / size
        }
    }

    /// The unit interval [0, 1].
    pub const UNIT: Interval = Interval { min: 0.0, max: 1.0 };

    /// Everything strictly in front of the ray origin.
    pub const FORWARD: Interval = Interval {
        min: crate::RAY_SMALL,
        max: f32::INFINITY,
    };
}
