//! POV-Ray scene export.
//!
//! Only spheres are written; cylinders and triangles are skipped.

use raylite_core::Primitive;

use crate::basis::Basis;
use crate::camera::ViewVolume;

/// Describe the view-space spheres of a scene as POV-Ray source.
///
/// The camera sits at `<0, 0, front>` looking down -Z with a horizontal
/// angle of `0.75 * fov`. X is negated for POV-Ray's left-handed axes.
pub fn export_pov(primitives: &[Primitive], volume: &ViewVolume, front: f32, fov: f32) -> String {
    let (object, topology) = Basis::expand(primitives);
    let view = object.transform_to_view(&topology, &volume.matrix, false);

    let mut pov = String::from("#include \"colors.inc\"\n");
    pov.push_str(&format!(
        "  camera {{location <0.0 , 0.0 , {:10.6}>\nlook_at  <0.0 , 0.0 , -1.0> angle {:10.6}}}\n",
        front,
        fov * 0.75
    ));
    pov.push_str("    light_source{<-400,400,1000> color White}\n");

    let mut spheres = 0;
    for (prim, primitive) in primitives.iter().enumerate() {
        let Primitive::Sphere(sphere) = primitive else {
            continue;
        };
        let center = view.vertices[topology.first_vertex(prim)];
        let color = sphere.material.color();
        pov.push_str(&format!(
            "sphere{{<{:10.6},{:10.6},{:10.6}>, {:10.6}\n",
            -center.x, center.y, center.z, sphere.radius
        ));
        pov.push_str(&format!(
            "pigment{{color rgb<{},{},{}>}}}}\n",
            color.x, color.y, color.z
        ));
        spheres += 1;
    }

    log::debug!(
        "Exported {} of {} primitives to POV-Ray",
        spheres,
        primitives.len()
    );
    pov
}

#[cfg(test)]
mod tests {
    use super::*;
    use raylite_core::{Color, Material, PrimitiveStore};
    use raylite_math::{Mat4, Vec3};

    #[test]
    fn test_header_and_spheres_only() {
        let mut store = PrimitiveStore::new();
        let red = Material::new(Color::new(1.0, 0.0, 0.0));
        store.add_sphere(Vec3::new(1.0, 2.0, -3.0), 0.5, red);
        store.add_cylinder(Vec3::ZERO, Vec3::X, 0.1, [Color::ONE; 2], red);
        store.add_triangle([Vec3::ZERO, Vec3::X, Vec3::Y], [Vec3::Z; 3], [Color::ONE; 3], red);

        let volume = ViewVolume::new([-1.0, 1.0, -1.0, 1.0, 0.0, 10.0], Mat4::IDENTITY.to_cols_array());
        let pov = export_pov(store.primitives(), &volume, 5.0, 40.0);

        assert!(pov.starts_with("#include \"colors.inc\"\n"));
        assert!(pov.contains("location <0.0 , 0.0 ,   5.000000>"));
        assert!(pov.contains("angle  30.000000}"));
        assert!(pov.contains("light_source{<-400,400,1000> color White}"));
        assert_eq!(pov.matches("sphere{").count(), 1);
        assert!(pov.contains("sphere{< -1.000000,  2.000000, -3.000000>,   0.500000"));
        assert!(pov.contains("pigment{color rgb<1,0,0>}}"));
    }

    #[test]
    fn test_uses_view_space() {
        let mut store = PrimitiveStore::new();
        store.add_sphere(Vec3::ZERO, 1.0, Material::default());

        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -20.0));
        let volume = ViewVolume::new([-1.0, 1.0, -1.0, 1.0, 0.0, 10.0], view.to_cols_array());
        let pov = export_pov(store.primitives(), &volume, 0.0, 20.0);

        assert!(pov.contains("-20.000000>"));
    }
}
