//! Uniform XY grid acceleration structure.
//!
//! Every ray in a basis travels along -Z, so a ray only ever visits the one
//! grid column containing its origin. Primitives are binned by their XY
//! footprint; a query tests the primitives of a single cell.

use raylite_math::{Vec2, Vec3};

use crate::index::{closest, Frame, HitQuery, SpatialIndex};
use crate::ray::RayInfo;

/// Target number of cells along the longer side of the scene.
const TARGET_CELLS: f32 = 64.0;

/// Hard cap on cells per axis.
const MAX_CELLS: usize = 512;

/// Uniform grid over the XY extent of a basis.
#[derive(Debug, Clone, Default)]
pub struct GridIndex {
    origin: Vec2,
    cell: f32,
    dims: (usize, usize),
    /// Primitive indices per cell, row-major, ascending within a cell
    cells: Vec<Vec<u32>>,
}

impl GridIndex {
    /// Cell edge length.
    pub fn cell_size(&self) -> f32 {
        self.cell
    }

    /// Number of cells along X and Y.
    pub fn dims(&self) -> (usize, usize) {
        self.dims
    }

    /// Cell coordinates containing an XY point, if inside the grid.
    fn cell_of(&self, point: Vec2) -> Option<(usize, usize)> {
        let rel = (point - self.origin) / self.cell;
        if !(rel.x >= 0.0 && rel.y >= 0.0) {
            return None;
        }
        let (ix, iy) = (rel.x as usize, rel.y as usize);
        (ix < self.dims.0 && iy < self.dims.1).then_some((ix, iy))
    }

    /// Cell coordinates for a footprint corner, clamped into the grid.
    fn clamped_cell(&self, point: Vec2) -> (usize, usize) {
        let rel = ((point - self.origin) / self.cell).max(Vec2::ZERO);
        (
            (rel.x as usize).min(self.dims.0 - 1),
            (rel.y as usize).min(self.dims.1 - 1),
        )
    }
}

fn cells_along(size: f32, cell: f32) -> usize {
    ((size / cell) as usize + 1).clamp(1, MAX_CELLS)
}

impl SpatialIndex for GridIndex {
    fn build(frame: &Frame<'_>) -> Self {
        if frame.is_empty() {
            return Self::default();
        }

        let footprints: Vec<(Vec2, Vec2)> = (0..frame.len()).map(|prim| frame.footprint(prim)).collect();
        let (lo, hi) = footprints.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(lo, hi), (min, max)| (lo.min(*min), hi.max(*max)),
        );

        let size = hi - lo;
        let extent = size.max_element();
        let mut cell = (extent / TARGET_CELLS).max(frame.basis.min_voxel);
        if !cell.is_finite() {
            // Non-finite geometry: fall back to one cell holding everything
            cell = f32::MAX;
        }
        let dims = (cells_along(size.x, cell), cells_along(size.y, cell));
        // Re-derive the cell if the cap kicked in so the grid still covers the extent
        let cell = cell.max(size.x / dims.0 as f32).max(size.y / dims.1 as f32);

        let mut grid = Self {
            origin: if lo.is_finite() { lo } else { Vec2::ZERO },
            cell,
            dims,
            cells: vec![Vec::new(); dims.0 * dims.1],
        };

        let mut entries = 0usize;
        for (prim, (min, max)) in footprints.iter().enumerate() {
            let (x0, y0) = grid.clamped_cell(*min);
            let (x1, y1) = grid.clamped_cell(*max);
            for iy in y0..=y1 {
                for ix in x0..=x1 {
                    grid.cells[iy * dims.0 + ix].push(prim as u32);
                    entries += 1;
                }
            }
        }

        log::debug!(
            "Grid index: {}x{} cells of {:.4}, {} entries for {} primitives",
            dims.0,
            dims.1,
            cell,
            entries,
            frame.len()
        );

        grid
    }

    fn nearest_hit(&self, frame: &Frame<'_>, ray: &mut RayInfo, query: &HitQuery) -> Option<usize> {
        let (ix, iy) = self.cell_of(ray_xy(ray.base))?;
        let cell = &self.cells[iy * self.dims.0 + ix];
        closest(frame, cell.iter().map(|&prim| prim as usize), ray, query)
    }
}

#[inline]
fn ray_xy(base: Vec3) -> Vec2 {
    base.truncate()
}
