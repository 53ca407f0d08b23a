//! Lattice indexing: grid coordinates to particle indices and rest positions.

use crate::config::{LatticeShape, LatticeSpec};
use crate::float::Float;
use crate::vec::{Vec3, Vec4};
use core::fmt;
use serde::{Deserialize, Serialize};

/// One of the three lattice axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// Mass counts along each axis of a lattice.
///
/// Particle `(x, y, z)` has index `x + y * nx + z * nx * ny`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LatticeDims {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl LatticeDims {
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        LatticeDims { nx, ny, nz }
    }

    pub fn particle_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    #[inline]
    pub fn linear_index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.nx + z * self.nx * self.ny
    }

    /// Inverse of [`LatticeDims::linear_index`].
    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize, usize) {
        let x = index % self.nx;
        let y = (index / self.nx) % self.ny;
        let z = index / (self.nx * self.ny);
        (x, y, z)
    }

    /// Whether signed coordinates fall inside the lattice.
    pub fn contains(&self, x: isize, y: isize, z: isize) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.nx
            && (y as usize) < self.ny
            && (z as usize) < self.nz
    }

    /// Index of the particle at `(x, y, z) + offset`, if that lies in range.
    pub fn neighbor(&self, x: usize, y: usize, z: usize, offset: [isize; 3]) -> Option<usize> {
        let nx = x as isize + offset[0];
        let ny = y as isize + offset[1];
        let nz = z as isize + offset[2];
        if self.contains(nx, ny, nz) {
            Some(self.linear_index(nx as usize, ny as usize, nz as usize))
        } else {
            None
        }
    }

    /// Whether the particle lies on the exterior shell.
    pub fn is_boundary(&self, x: usize, y: usize, z: usize) -> bool {
        x == 0 || y == 0 || z == 0 || x == self.nx - 1 || y == self.ny - 1 || z == self.nz - 1
    }

    /// All coordinates in linear-index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (0..self.particle_count()).map(move |i| self.coords(i))
    }
}

/// Rest position of lattice point `(x, y, z)` for the spec's shape.
pub fn place<F: Float>(spec: &LatticeSpec<F>, x: usize, y: usize, z: usize) -> Vec4<F> {
    match spec.shape {
        LatticeShape::Cuboid => cuboid_position(spec, x, y, z),
        LatticeShape::Sphere => sphere_position(spec, x, y, z),
    }
}

/// Regular grid placement centered on the spec offset.
pub fn cuboid_position<F: Float>(spec: &LatticeSpec<F>, x: usize, y: usize, z: usize) -> Vec4<F> {
    let cell = spec.cell_size();
    let half = spec.extents().scale(F::half());
    let grid = Vec3::new(F::from_usize(x), F::from_usize(y), F::from_usize(z));
    Vec4::point(grid.component_mul(cell) + spec.offset - half)
}

/// Sphere-mapped placement.
///
/// The center-relative direction of each lattice point is normalized and
/// scaled by its Chebyshev distance from the lattice center (in unit-lattice
/// terms, at most one half), then stretched by the extents. Boundary points
/// therefore land on the ellipsoid with semi-axes `extents / 2`.
pub fn sphere_position<F: Float>(spec: &LatticeSpec<F>, x: usize, y: usize, z: usize) -> Vec4<F> {
    let [nx, ny, nz] = spec.masses;
    let centered = |c: usize, n: usize| F::from_usize(c) - F::from_usize(n - 1) * F::half();
    let fraction = |c: usize, n: usize| (F::from_usize(c) / F::from_usize(n - 1) - F::half()).abs();

    let relative = Vec3::new(centered(x, nx), centered(y, ny), centered(z, nz));
    let scale = fraction(x, nx).max(fraction(y, ny)).max(fraction(z, nz));
    let mapped = relative.normalize().scale(scale);
    Vec4::point(mapped.component_mul(spec.extents()) + spec.offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_index_round_trips() {
        let dims = LatticeDims::new(3, 4, 5);
        for (i, (x, y, z)) in dims.iter().enumerate() {
            assert_eq!(dims.linear_index(x, y, z), i);
        }
        assert_eq!(dims.linear_index(2, 3, 4), 59);
    }

    #[test]
    fn neighbor_out_of_range_is_none() {
        let dims = LatticeDims::new(2, 2, 2);
        assert_eq!(dims.neighbor(0, 0, 0, [-1, 0, 0]), None);
        assert_eq!(dims.neighbor(1, 1, 1, [0, 0, -2]), None);
        assert_eq!(dims.neighbor(1, 0, 0, [-1, 1, 0]), Some(2));
    }

    #[test]
    fn cuboid_corners_span_extents() {
        let spec = LatticeSpec::<f64>::cuboid(3, 3, 3).with_extents(2.0, 4.0, 6.0);
        let lo = cuboid_position(&spec, 0, 0, 0);
        let hi = cuboid_position(&spec, 2, 2, 2);
        assert!((hi.x - lo.x - 2.0).abs() < 1e-12);
        assert!((hi.y - lo.y - 4.0).abs() < 1e-12);
        assert!((hi.z - lo.z - 6.0).abs() < 1e-12);
        assert_eq!(lo.w, 1.0);
    }

    #[test]
    fn sphere_center_maps_to_offset() {
        let spec = LatticeSpec::<f64>::cuboid(5, 5, 5).sphere();
        let c = sphere_position(&spec, 2, 2, 2);
        assert_eq!(c.xyz(), spec.offset);
    }
}
