//! Flattened scene geometry in one reference frame.
//!
//! A render builds three bases from the primitive store:
//!
//! - basis 0: object space, straight from the store (`Basis::expand`)
//! - basis 1: view space (`Basis::transform_to_view`)
//! - basis 2: light space, rotated so the light travels along +Z
//!   (`Basis::transform_to_basis`)
//!
//! Expansion fixes the topology (which flattened vertex and normal belongs
//! to which primitive) once; the transforms only move geometry, so the same
//! topology serves every basis.

use raylite_core::{Primitive, PrimitiveKind};
use raylite_math::{rotation_onto_z, Mat3, Mat4, Mat4Ext, Vec3};

use crate::triangle::TrianglePrecompute;

/// Smallest cell size handed to a spatial index.
pub const MIN_VOXEL: f32 = 0.001;

/// Index tables linking flattened vertices back to primitives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    /// Owning primitive of each flattened vertex
    vert2prim: Vec<usize>,
    /// First flattened vertex of each primitive
    first_vertex: Vec<usize>,
    kinds: Vec<PrimitiveKind>,
}

impl Topology {
    pub fn vert2prim(&self) -> &[usize] {
        &self.vert2prim
    }

    pub fn first_vertex(&self, prim: usize) -> usize {
        self.first_vertex[prim]
    }

    pub fn kind(&self, prim: usize) -> PrimitiveKind {
        self.kinds[prim]
    }

    pub fn primitive_count(&self) -> usize {
        self.kinds.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vert2prim.len()
    }

    fn triangles(&self) -> impl Iterator<Item = usize> + '_ {
        self.kinds
            .iter()
            .enumerate()
            .filter(|(_, kind)| **kind == PrimitiveKind::Triangle)
            .map(|(index, _)| index)
    }
}

/// Geometry of every primitive in one reference frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Basis {
    /// One entry per flattened vertex
    pub vertices: Vec<Vec3>,
    pub radii: Vec<f32>,
    pub radii_sq: Vec<f32>,
    /// First normal of the owning primitive, for cylinders and triangles
    pub vert2normal: Vec<Option<usize>>,
    /// Cylinder axes; triangle face normal followed by its vertex normals
    pub normals: Vec<Vec3>,
    /// Barycentric setup, one slot per primitive (`None` for non-triangles)
    pub precomp: Vec<Option<TrianglePrecompute>>,
    /// Backface-culled triangles, one slot per primitive
    pub culled: Vec<bool>,
    /// Largest sphere radius
    pub max_radius: f32,
    /// Suggested smallest spatial index cell
    pub min_voxel: f32,
}

impl Basis {
    /// Flatten primitives into basis 0 and build the shared topology.
    pub fn expand(primitives: &[Primitive]) -> (Basis, Topology) {
        let vertex_count: usize = primitives.iter().map(Primitive::vertex_count).sum();
        let normal_count: usize = primitives.iter().map(Primitive::normal_count).sum();

        let mut basis = Basis {
            vertices: Vec::with_capacity(vertex_count),
            radii: Vec::with_capacity(vertex_count),
            radii_sq: Vec::with_capacity(vertex_count),
            vert2normal: Vec::with_capacity(vertex_count),
            normals: Vec::with_capacity(normal_count),
            precomp: vec![None; primitives.len()],
            culled: vec![false; primitives.len()],
            max_radius: 0.0,
            min_voxel: 0.0,
        };
        let mut topology = Topology {
            vert2prim: Vec::with_capacity(vertex_count),
            first_vertex: Vec::with_capacity(primitives.len()),
            kinds: Vec::with_capacity(primitives.len()),
        };

        for (index, primitive) in primitives.iter().enumerate() {
            topology.first_vertex.push(basis.vertices.len());
            topology.kinds.push(primitive.kind());

            match primitive {
                Primitive::Sphere(sphere) => {
                    basis.push_vertex(sphere.center, sphere.radius, None);
                    topology.vert2prim.push(index);
                    basis.max_radius = basis.max_radius.max(sphere.radius);
                }
                Primitive::Cylinder(cylinder) => {
                    let normal = basis.normals.len();
                    basis.normals.push((cylinder.end - cylinder.start).normalize_or_zero());
                    basis.push_vertex(cylinder.start, cylinder.radius, Some(normal));
                    topology.vert2prim.push(index);
                    basis.min_voxel = basis.min_voxel.max(cylinder.radius);
                }
                Primitive::Triangle(triangle) => {
                    let normal = basis.normals.len();
                    basis.normals.push(triangle.face_normal);
                    basis.normals.extend_from_slice(&triangle.normals);
                    for vertex in triangle.vertices {
                        basis.push_vertex(vertex, triangle.bounding_radius, Some(normal));
                        topology.vert2prim.push(index);
                    }
                }
            }
        }

        basis.min_voxel = basis.min_voxel.max(MIN_VOXEL);
        basis.precompute_triangles(&topology);

        log::debug!(
            "Expanded {} primitives into {} vertices, {} normals",
            primitives.len(),
            basis.vertices.len(),
            basis.normals.len()
        );

        (basis, topology)
    }

    fn push_vertex(&mut self, position: Vec3, radius: f32, normal: Option<usize>) {
        self.vertices.push(position);
        self.radii.push(radius);
        self.radii_sq.push(radius * radius);
        self.vert2normal.push(normal);
    }

    /// Move this basis into view space.
    ///
    /// Positions go through the full 4x4 matrix, normals through its upper
    /// 3x3 followed by renormalization. With `backface_cull`, triangles whose
    /// three vertex normals all point away from the viewer are flagged.
    pub fn transform_to_view(&self, topology: &Topology, view: &Mat4, backface_cull: bool) -> Basis {
        let mut basis = self.with_geometry(
            view.transform_points(&self.vertices),
            view.transform_normals(&self.normals),
        );
        basis.precompute_triangles(topology);

        if backface_cull {
            for prim in topology.triangles() {
                let vertex_normals = basis.vertex_normals(topology, prim);
                basis.culled[prim] = vertex_normals.iter().all(|n| n.z < 0.0);
            }
        }

        basis
    }

    /// Rotate an already view-transformed basis into another frame.
    ///
    /// Culling flags are view-specific and are not carried over.
    pub fn transform_to_basis(&self, topology: &Topology, rotation: &Mat3) -> Basis {
        let mut basis = self.with_geometry(
            self.vertices.iter().map(|&v| *rotation * v).collect(),
            self.normals.iter().map(|&n| *rotation * n).collect(),
        );
        basis.precompute_triangles(topology);
        basis
    }

    /// Copy of the per-vertex tables with new positions and normals.
    fn with_geometry(&self, vertices: Vec<Vec3>, normals: Vec<Vec3>) -> Basis {
        Basis {
            vertices,
            normals,
            radii: self.radii.clone(),
            radii_sq: self.radii_sq.clone(),
            vert2normal: self.vert2normal.clone(),
            precomp: vec![None; self.precomp.len()],
            culled: vec![false; self.culled.len()],
            max_radius: self.max_radius,
            min_voxel: self.min_voxel,
        }
    }

    fn precompute_triangles(&mut self, topology: &Topology) {
        for prim in topology.triangles() {
            let v = topology.first_vertex(prim);
            self.precomp[prim] = Some(TrianglePrecompute::new(
                self.vertices[v],
                self.vertices[v + 1],
                self.vertices[v + 2],
            ));
        }
    }

    /// First normal slot of a primitive (cylinder axis or triangle face normal).
    pub fn normal_index(&self, topology: &Topology, prim: usize) -> Option<usize> {
        self.vert2normal[topology.first_vertex(prim)]
    }

    /// The three interpolation normals of a triangle.
    ///
    /// Returns zeros for primitives that are not triangles.
    pub fn vertex_normals(&self, topology: &Topology, prim: usize) -> [Vec3; 3] {
        match (topology.kind(prim), self.normal_index(topology, prim)) {
            (PrimitiveKind::Triangle, Some(n)) => {
                [self.normals[n + 1], self.normals[n + 2], self.normals[n + 3]]
            }
            _ => [Vec3::ZERO; 3],
        }
    }
}

/// Direction of the single directional light and its shadow frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightFrame {
    /// Unit direction the light travels, or zero when no light is configured
    pub normal: Vec3,
    /// Rotation from view space into light space
    pub rotation: Mat3,
}

impl LightFrame {
    pub fn new(direction: Vec3) -> Self {
        Self {
            normal: direction.normalize_or_zero(),
            rotation: rotation_onto_z(direction),
        }
    }

    /// Rotate a view-space point into light space.
    pub fn to_light_space(&self, point: Vec3) -> Vec3 {
        self.rotation * point
    }
}
