// Transform utilities for Mat4
//
// Extends glam::Mat4 with the batch point/normal transforms used when a scene
// is moved into view space. Matrices are column-major, matching the 16-float
// layout handed in by the host application.

use glam::{Mat3, Mat4, Quat, Vec3, Vec4};

/// Extension trait for Mat4 to apply a view transform to flattened geometry.
pub trait Mat4Ext {
    /// True when the bottom row is (0, 0, 0, 1), i.e. no projective part.
    fn has_affine_bottom_row(&self) -> bool;

    /// Transform points assuming an affine matrix (no perspective divide).
    fn transform_points_affine(&self, points: &[Vec3]) -> Vec<Vec3>;

    /// Transform points through the full 4x4 matrix, dividing by w when it
    /// is neither 0 nor 1.
    fn transform_points_projective(&self, points: &[Vec3]) -> Vec<Vec3>;

    /// Transform points, taking the affine fast path when possible.
    fn transform_points(&self, points: &[Vec3]) -> Vec<Vec3> {
        if self.has_affine_bottom_row() {
            self.transform_points_affine(points)
        } else {
            self.transform_points_projective(points)
        }
    }

    /// Rotate/scale normals by the upper 3x3 (no translation) and renormalize.
    ///
    /// Zero-length results stay zero.
    fn transform_normals(&self, normals: &[Vec3]) -> Vec<Vec3>;
}

impl Mat4Ext for Mat4 {
    fn has_affine_bottom_row(&self) -> bool {
        self.row(3) == Vec4::W
    }

    fn transform_points_affine(&self, points: &[Vec3]) -> Vec<Vec3> {
        points.iter().map(|&p| self.transform_point3(p)).collect()
    }

    fn transform_points_projective(&self, points: &[Vec3]) -> Vec<Vec3> {
        points
            .iter()
            .map(|&p| {
                let q = *self * p.extend(1.0);
                if q.w == 0.0 || q.w == 1.0 {
                    q.truncate()
                } else {
                    q.truncate() / q.w
                }
            })
            .collect()
    }

    fn transform_normals(&self, normals: &[Vec3]) -> Vec<Vec3> {
        normals
            .iter()
            .map(|&n| self.transform_vector3(n).normalize_or_zero())
            .collect()
    }
}

/// Rotation that maps `direction` onto +Z.
///
/// Rays are always cast along -Z, so rotating a scene by this matrix turns
/// "towards the light" into "along the ray". A zero direction gives the
/// identity.
pub fn rotation_onto_z(direction: Vec3) -> Mat3 {
    let unit = direction.normalize_or_zero();
    if unit == Vec3::ZERO {
        return Mat3::IDENTITY;
    }
    Mat3::from_quat(Quat::from_rotation_arc(unit, Vec3::Z))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<Vec3> {
        vec![
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-4.5, 0.25, 8.0),
            Vec3::new(0.0, -7.0, -2.0),
        ]
    }

    #[test]
    fn test_identity_is_exact() {
        let points = sample_points();
        let moved = Mat4::IDENTITY.transform_points(&points);
        assert_eq!(moved, points);
    }

    #[test]
    fn test_translation_points_only() {
        let mat = Mat4::from_translation(Vec3::new(10.0, 20.0, 30.0));
        let moved = mat.transform_points(&[Vec3::new(1.0, 2.0, 3.0)]);
        assert_eq!(moved[0], Vec3::new(11.0, 22.0, 33.0));

        // Translation should NOT affect normals
        let normals = mat.transform_normals(&[Vec3::X]);
        assert_eq!(normals[0], Vec3::X);
    }

    #[test]
    fn test_fast_path_matches_general_path() {
        let mat = Mat4::from_rotation_translation(
            Quat::from_euler(glam::EulerRot::XYZ, 0.3, -1.1, 2.0),
            Vec3::new(-3.0, 4.0, -50.0),
        );
        assert!(mat.has_affine_bottom_row());

        let points = sample_points();
        let fast = mat.transform_points_affine(&points);
        let general = mat.transform_points_projective(&points);
        for (a, b) in fast.iter().zip(&general) {
            assert!((*a - *b).length() < 1e-5, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn test_projective_matrix_uses_general_path() {
        let mat = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
        assert!(!mat.has_affine_bottom_row());

        let points = [Vec3::new(0.0, 0.0, -10.0)];
        let projected = mat.transform_points(&points);
        assert_eq!(projected, mat.transform_points_projective(&points));
    }

    #[test]
    fn test_normals_renormalized() {
        let mat = Mat4::from_scale(Vec3::new(3.0, 3.0, 3.0));
        let normals = mat.transform_normals(&[Vec3::Y, Vec3::ZERO]);
        assert!((normals[0].length() - 1.0).abs() < 1e-6);
        assert_eq!(normals[1], Vec3::ZERO);
    }

    #[test]
    fn test_rotation_onto_z() {
        let light = Vec3::new(-0.4, -0.4, -1.0);
        let rot = rotation_onto_z(light);
        let mapped = rot * light.normalize();
        assert!((mapped - Vec3::Z).length() < 1e-5);

        // Antiparallel input still produces a valid rotation
        let back = rotation_onto_z(-Vec3::Z) * -Vec3::Z;
        assert!((back - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_rotation_onto_z_zero_light() {
        assert_eq!(rotation_onto_z(Vec3::ZERO), Mat3::IDENTITY);
    }
}
