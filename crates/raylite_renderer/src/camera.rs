//! Orthographic view volume for primary ray generation.

use raylite_math::{Mat4, Vec2, Vec3};

/// Visible box in view space plus the object-to-view transform.
///
/// Primary rays are orthographic: one -Z ray per pixel, starting on the
/// z = 0 plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewVolume {
    /// x min, x max, y min, y max, z min, z max
    pub bounds: [f32; 6],
    /// Column-major object-to-view matrix
    pub matrix: Mat4,
}

impl Default for ViewVolume {
    fn default() -> Self {
        Self {
            bounds: [-1.0, 1.0, -1.0, 1.0, -1.0, 1.0],
            matrix: Mat4::IDENTITY,
        }
    }
}

impl ViewVolume {
    /// Create from six bounds and a column-major 4x4 matrix.
    pub fn new(bounds: [f32; 6], view: [f32; 16]) -> Self {
        Self {
            bounds,
            matrix: Mat4::from_cols_array(&view),
        }
    }

    /// Width and height of the visible area.
    pub fn range(&self) -> Vec2 {
        Vec2::new(self.bounds[1] - self.bounds[0], self.bounds[3] - self.bounds[2])
    }

    /// Origin of the primary ray for pixel (x, y) of a `width` x `height` image.
    ///
    /// Pixel (0, 0) maps to the lower-left corner of the volume.
    pub fn ray_origin(&self, x: u32, y: u32, width: u32, height: u32) -> Vec3 {
        let range = self.range();
        Vec3::new(
            (x as f32 / width as f32) * range.x + self.bounds[0],
            (y as f32 / height as f32) * range.y + self.bounds[2],
            0.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range() {
        let volume = ViewVolume::new([-2.0, 2.0, -1.0, 3.0, 0.0, 10.0], Mat4::IDENTITY.to_cols_array());
        assert_eq!(volume.range(), Vec2::new(4.0, 4.0));
        assert_eq!(volume.matrix, Mat4::IDENTITY);
    }

    #[test]
    fn test_ray_origin_corners() {
        let volume = ViewVolume::new([-2.0, 2.0, -1.0, 3.0, 0.0, 10.0], Mat4::IDENTITY.to_cols_array());

        assert_eq!(volume.ray_origin(0, 0, 100, 50), Vec3::new(-2.0, -1.0, 0.0));
        assert_eq!(volume.ray_origin(50, 25, 100, 50), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_matrix_is_column_major() {
        let mut view = Mat4::IDENTITY.to_cols_array();
        // Translation lives in elements 12..15
        view[12] = 5.0;
        let volume = ViewVolume::new([-1.0, 1.0, -1.0, 1.0, -1.0, 1.0], view);
        assert_eq!(volume.matrix.transform_point3(Vec3::ZERO), Vec3::new(5.0, 0.0, 0.0));
    }
}
