//! Sphere, cylinder and triangle primitives.
//!
//! Primitives are plain data in object space. The renderer flattens them
//! into a basis before tracing; nothing here knows about rays.

use raylite_math::{Vec3, RAY_SMALL};

use crate::material::{Color, Material, Texture};

/// Fraction of the longest triangle edge stored as its bounding radius.
const TRIANGLE_RADIUS_SCALE: f32 = 0.6;

/// Discriminant of `Primitive`, handy for tables that only need the kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Sphere,
    Cylinder,
    Triangle,
}

/// A sphere primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: Material,
}

/// A cylinder between two points, with round end caps.
#[derive(Clone, Debug, PartialEq)]
pub struct Cylinder {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
    /// Cached |end - start|
    pub length: f32,
    /// Colors at `start` and `end`, blended along the axis
    pub colors: [Color; 2],
    pub material: Material,
}

/// A smooth-shaded triangle.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
    /// Per-vertex normals used for interpolation
    pub normals: [Vec3; 3],
    pub colors: [Color; 3],
    /// Geometric normal, unit length, on the same side as the vertex normals
    pub face_normal: Vec3,
    /// Coarse size estimate used to size the spatial index
    pub bounding_radius: f32,
    pub material: Material,
}

/// Closed set of renderable primitives.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Sphere(Sphere),
    Cylinder(Cylinder),
    Triangle(Triangle),
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }
}

impl Cylinder {
    pub fn new(start: Vec3, end: Vec3, radius: f32, colors: [Color; 2], material: Material) -> Self {
        Self {
            start,
            end,
            radius: radius.max(0.0),
            length: (end - start).length(),
            colors,
            material,
        }
    }

    /// Color at fraction `t` along the axis (0 at start, 1 at end).
    pub fn color_at(&self, t: f32) -> Color {
        self.colors[0] * (1.0 - t) + self.colors[1] * t
    }
}

impl Triangle {
    /// Create a triangle, deriving the face normal and bounding radius.
    pub fn new(vertices: [Vec3; 3], normals: [Vec3; 3], colors: [Color; 3], material: Material) -> Self {
        let [v1, v2, v3] = vertices;
        let averaged = normals[0] + normals[1] + normals[2];

        let s1 = v1 - v2;
        let s2 = v3 - v2;
        let s3 = v1 - v3;

        let mut face = s1.cross(s2);
        if face.abs().max_element() < RAY_SMALL {
            // Degenerate: trust the vertex normals
            face = averaged;
        } else if face.dot(averaged) < 0.0 {
            face = -face;
        }

        let longest = s1.length().max(s2.length()).max(s3.length());

        Self {
            vertices,
            normals,
            colors,
            face_normal: face.normalize_or_zero(),
            bounding_radius: longest * TRIANGLE_RADIUS_SCALE,
            material,
        }
    }
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Sphere(_) => PrimitiveKind::Sphere,
            Primitive::Cylinder(_) => PrimitiveKind::Cylinder,
            Primitive::Triangle(_) => PrimitiveKind::Triangle,
        }
    }

    pub fn material(&self) -> &Material {
        match self {
            Primitive::Sphere(s) => &s.material,
            Primitive::Cylinder(c) => &c.material,
            Primitive::Triangle(t) => &t.material,
        }
    }

    pub fn transparency(&self) -> f32 {
        self.material().transparency()
    }

    pub fn texture(&self) -> Texture {
        self.material().texture()
    }

    /// Number of flattened vertices this primitive occupies in a basis.
    pub fn vertex_count(&self) -> usize {
        match self {
            Primitive::Sphere(_) | Primitive::Cylinder(_) => 1,
            Primitive::Triangle(_) => 3,
        }
    }

    /// Number of flattened normals this primitive occupies in a basis.
    ///
    /// Cylinders store their axis; triangles store the face normal followed
    /// by the three vertex normals.
    pub fn normal_count(&self) -> usize {
        match self {
            Primitive::Sphere(_) => 0,
            Primitive::Cylinder(_) => 1,
            Primitive::Triangle(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_triangle(normals: [Vec3; 3]) -> Triangle {
        Triangle::new(
            [Vec3::ZERO, Vec3::X, Vec3::Y],
            normals,
            [Color::ONE; 3],
            Material::default(),
        )
    }

    #[test]
    fn test_face_normal_follows_vertex_normals() {
        let up = flat_triangle([Vec3::Z; 3]);
        assert!((up.face_normal - Vec3::Z).length() < 1e-6);

        let down = flat_triangle([-Vec3::Z; 3]);
        assert!((down.face_normal + Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_face_normal_unit_and_consistent() {
        let normals = [
            Vec3::new(0.3, 0.1, 1.0),
            Vec3::new(-0.2, 0.4, 0.9),
            Vec3::new(0.0, -0.5, 0.7),
        ];
        let tri = Triangle::new(
            [Vec3::new(1.0, 2.0, 0.5), Vec3::new(4.0, 2.5, 0.0), Vec3::new(2.0, 5.0, 1.0)],
            normals,
            [Color::ONE; 3],
            Material::default(),
        );
        let averaged = normals[0] + normals[1] + normals[2];

        assert!((tri.face_normal.length() - 1.0).abs() < 1e-5);
        assert!(tri.face_normal.dot(averaged) >= 0.0);
    }

    #[test]
    fn test_degenerate_triangle_falls_back() {
        // All three vertices on a line
        let tri = Triangle::new(
            [Vec3::ZERO, Vec3::X, Vec3::X * 2.0],
            [Vec3::new(0.0, 2.0, 0.0); 3],
            [Color::ONE; 3],
            Material::default(),
        );
        assert!((tri.face_normal - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_bounding_radius_uses_longest_edge() {
        let tri = flat_triangle([Vec3::Z; 3]);
        let hypotenuse = 2.0f32.sqrt();
        assert!((tri.bounding_radius - hypotenuse * 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_negative_radius_clamped() {
        let sphere = Sphere::new(Vec3::ZERO, -1.0, Material::default());
        assert_eq!(sphere.radius, 0.0);

        let cyl = Cylinder::new(Vec3::ZERO, Vec3::X * 2.0, -0.5, [Color::ONE; 2], Material::default());
        assert_eq!(cyl.radius, 0.0);
        assert_eq!(cyl.length, 2.0);
    }

    #[test]
    fn test_cylinder_color_blend() {
        let cyl = Cylinder::new(
            Vec3::ZERO,
            Vec3::X,
            0.1,
            [Color::new(1.0, 0.0, 0.0), Color::new(0.0, 0.0, 1.0)],
            Material::default(),
        );
        assert_eq!(cyl.color_at(0.0), Color::new(1.0, 0.0, 0.0));
        assert_eq!(cyl.color_at(0.5), Color::new(0.5, 0.0, 0.5));
    }

    #[test]
    fn test_flattened_sizes() {
        let sphere = Primitive::Sphere(Sphere::new(Vec3::ZERO, 1.0, Material::default()));
        let tri = Primitive::Triangle(flat_triangle([Vec3::Z; 3]));
        assert_eq!((sphere.vertex_count(), sphere.normal_count()), (1, 0));
        assert_eq!((tri.vertex_count(), tri.normal_count()), (3, 4));
        assert_eq!(tri.kind(), PrimitiveKind::Triangle);
    }
}
