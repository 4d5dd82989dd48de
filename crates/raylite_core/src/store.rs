//! Append-only primitive storage.

use raylite_math::Vec3;

use crate::material::{Color, Material};
use crate::primitive::{Cylinder, Primitive, PrimitiveKind, Sphere, Triangle};

/// Owns every primitive submitted for the next render.
///
/// Indices returned by the `add_*` methods are stable until `clear()` and
/// are the primitive indices reported by hit queries.
#[derive(Clone, Debug, Default)]
pub struct PrimitiveStore {
    primitives: Vec<Primitive>,
}

impl PrimitiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sphere colored by `material`.
    pub fn add_sphere(&mut self, center: Vec3, radius: f32, material: Material) -> usize {
        self.push(Primitive::Sphere(Sphere::new(center, radius, material)))
    }

    /// Add a cylinder whose color blends from `colors[0]` at `start` to
    /// `colors[1]` at `end`. The material supplies transparency and texture.
    pub fn add_cylinder(
        &mut self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        colors: [Color; 2],
        material: Material,
    ) -> usize {
        self.push(Primitive::Cylinder(Cylinder::new(start, end, radius, colors, material)))
    }

    /// Add a triangle with per-vertex normals and colors.
    pub fn add_triangle(
        &mut self,
        vertices: [Vec3; 3],
        normals: [Vec3; 3],
        colors: [Color; 3],
        material: Material,
    ) -> usize {
        self.push(Primitive::Triangle(Triangle::new(vertices, normals, colors, material)))
    }

    fn push(&mut self, primitive: Primitive) -> usize {
        let index = self.primitives.len();
        self.primitives.push(primitive);
        index
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn get(&self, index: usize) -> Option<&Primitive> {
        self.primitives.get(index)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Number of primitives of one kind.
    pub fn count(&self, kind: PrimitiveKind) -> usize {
        self.primitives.iter().filter(|p| p.kind() == kind).count()
    }

    /// Remove every primitive.
    pub fn clear(&mut self) {
        self.primitives.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_returns_sequential_indices() {
        let mut store = PrimitiveStore::new();
        let mat = Material::default();

        assert_eq!(store.add_sphere(Vec3::ZERO, 1.0, mat), 0);
        assert_eq!(store.add_cylinder(Vec3::ZERO, Vec3::X, 0.2, [Color::ONE; 2], mat), 1);
        assert_eq!(
            store.add_triangle([Vec3::ZERO, Vec3::X, Vec3::Y], [Vec3::Z; 3], [Color::ONE; 3], mat),
            2
        );

        assert_eq!(store.len(), 3);
        assert_eq!(store.count(PrimitiveKind::Sphere), 1);
        assert_eq!(store.count(PrimitiveKind::Cylinder), 1);
        assert_eq!(store.count(PrimitiveKind::Triangle), 1);
    }

    #[test]
    fn test_material_captured_by_value() {
        let mut store = PrimitiveStore::new();
        let mut mat = Material::new(Color::new(1.0, 0.0, 0.0));
        store.add_sphere(Vec3::ZERO, 1.0, mat);

        // Later changes only affect later primitives
        mat = mat.with_color(Color::new(0.0, 1.0, 0.0)).with_transparency(0.5);
        store.add_sphere(Vec3::X, 1.0, mat);

        let first = store.get(0).unwrap().material();
        assert_eq!(first.color(), Color::new(1.0, 0.0, 0.0));
        assert!(first.is_opaque());
        assert_eq!(store.get(1).unwrap().transparency(), 0.5);
    }

    #[test]
    fn test_clear() {
        let mut store = PrimitiveStore::new();
        store.add_sphere(Vec3::ZERO, 1.0, Material::default());
        assert!(!store.is_empty());

        store.clear();
        assert!(store.is_empty());
        assert!(store.get(0).is_none());
    }
}
