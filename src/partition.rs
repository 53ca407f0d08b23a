//! Block partition of the dense spring array into eight race-free batches.
//!
//! The lattice is tiled by cubes of side `2 * radius`. Each cube splits into
//! eight octants of side `radius`, and every particle owns twelve consecutive
//! spring slots inside its octant's *cell*:
//!
//! ```text
//! cell(block, octant) = springs[(block * 8 + octant) * cell_len ..][..cell_len]
//! cell_len            = 12 * radius^3
//! ```
//!
//! Batch `b` is the set of cells whose octant is `b`. Cells of one batch sit
//! at least `radius` lattice steps apart on every axis, while a particle's
//! springs reach at most two steps toward lower coordinates (one step higher
//! only on the lattice's lower boundary). With `radius >= 2` no particle is
//! touched by two cells of the same batch, so cells in a batch can be
//! accumulated concurrently with plain, unsynchronized writes as long as the
//! springs inside each cell are handled by a single worker.

use crate::lattice::LatticeDims;
use crate::spring::SLOTS_PER_PARTICLE;

/// Number of batches (one per octant parity combination).
pub const BATCH_COUNT: usize = 8;

/// Layout of springs into blocks, octant cells and batches.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockPartition {
    radius: usize,
    length: usize,
    blocks: [usize; 3],
}

impl BlockPartition {
    /// Partition for a lattice. `radius` must already be validated (>= 2).
    pub fn new(dims: LatticeDims, radius: usize) -> Self {
        let length = radius * 2;
        BlockPartition {
            radius,
            length,
            blocks: [dims.nx.div_ceil(length), dims.ny.div_ceil(length), dims.nz.div_ceil(length)],
        }
    }

    pub fn radius(&self) -> usize { self.radius }

    /// Side of one block cube, `2 * radius`.
    pub fn block_length(&self) -> usize { self.length }

    /// Blocks along x, y and z.
    pub fn blocks(&self) -> [usize; 3] { self.blocks }

    pub fn block_count(&self) -> usize {
        self.blocks[0] * self.blocks[1] * self.blocks[2]
    }

    /// Spring slots in one octant cell.
    pub fn cell_len(&self) -> usize {
        SLOTS_PER_PARTICLE * self.radius * self.radius * self.radius
    }

    /// Slots in the dense spring array, including padding for partial blocks.
    pub fn spring_capacity(&self) -> usize {
        self.block_count() * BATCH_COUNT * self.cell_len()
    }

    /// [`BlockPartition::spring_capacity`] for a lattice and radius, or
    /// `None` when the slot count does not fit in a `usize`.
    ///
    /// Every other index computed by the partition is below the capacity, so
    /// once this succeeds none of them can overflow.
    pub fn checked_spring_capacity(dims: LatticeDims, radius: usize) -> Option<usize> {
        let length = radius.checked_mul(2)?;
        let cell_len = [radius, radius, radius]
            .into_iter()
            .try_fold(SLOTS_PER_PARTICLE, |acc, r| acc.checked_mul(r))?;
        [dims.nx, dims.ny, dims.nz]
            .into_iter()
            .map(|n| n.div_ceil(length))
            .try_fold(BATCH_COUNT * cell_len, |acc, b| acc.checked_mul(b))
    }

    /// Index of the first of the twelve slots owned by particle `(x, y, z)`.
    pub fn spring_base(&self, x: usize, y: usize, z: usize) -> usize {
        let r = self.radius;
        let local = (x % r) + r * ((y % r) + r * (z % r));
        let cell = self.octant(x, y, z) + BATCH_COUNT * self.block(x, y, z);
        SLOTS_PER_PARTICLE * (local + r * r * r * cell)
    }

    /// Octant (and therefore batch) of a particle: parity of its half-block
    /// coordinate along each axis.
    pub fn octant(&self, x: usize, y: usize, z: usize) -> usize {
        let r = self.radius;
        ((x / r) % 2) + 2 * ((y / r) % 2) + 4 * ((z / r) % 2)
    }

    /// Linear block index of a particle.
    pub fn block(&self, x: usize, y: usize, z: usize) -> usize {
        let l = self.length;
        (x / l) + self.blocks[0] * ((y / l) + self.blocks[1] * (z / l))
    }

    /// Cell that owns a spring slot.
    pub fn cell_of(&self, spring_index: usize) -> usize {
        spring_index / self.cell_len()
    }

    /// Batch of a spring slot.
    pub fn batch_of(&self, spring_index: usize) -> usize {
        self.cell_of(spring_index) % BATCH_COUNT
    }

    /// Slot range of the cell `(block, batch)`.
    pub fn cell_range(&self, block: usize, batch: usize) -> core::ops::Range<usize> {
        let start = (block * BATCH_COUNT + batch) * self.cell_len();
        start..start + self.cell_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_capacity_matches_layout() {
        let dims = LatticeDims::new(7, 5, 6);
        for radius in [2, 3, 5, 9] {
            let partition = BlockPartition::new(dims, radius);
            assert_eq!(BlockPartition::checked_spring_capacity(dims, radius), Some(partition.spring_capacity()));
        }
    }

    #[test]
    fn checked_capacity_detects_overflow() {
        let dims = LatticeDims::new(2, 2, 2);
        assert_eq!(BlockPartition::checked_spring_capacity(dims, 1 << 22), None);
        assert_eq!(BlockPartition::checked_spring_capacity(dims, usize::MAX), None);
    }

    #[test]
    fn bases_are_unique_and_in_range() {
        let dims = LatticeDims::new(7, 5, 6);
        let partition = BlockPartition::new(dims, 2);
        let mut bases: Vec<usize> = dims.iter().map(|(x, y, z)| partition.spring_base(x, y, z)).collect();
        assert!(bases.iter().all(|&b| b + SLOTS_PER_PARTICLE <= partition.spring_capacity()));
        assert!(bases.iter().all(|&b| b % SLOTS_PER_PARTICLE == 0));
        bases.sort_unstable();
        bases.dedup();
        assert_eq!(bases.len(), dims.particle_count());
    }

    #[test]
    fn base_lands_in_its_octant_cell() {
        let dims = LatticeDims::new(9, 9, 9);
        let partition = BlockPartition::new(dims, 3);
        for (x, y, z) in dims.iter() {
            let base = partition.spring_base(x, y, z);
            let range = partition.cell_range(partition.block(x, y, z), partition.octant(x, y, z));
            assert!(range.contains(&base) && range.contains(&(base + 11)));
            assert_eq!(partition.batch_of(base), partition.octant(x, y, z));
        }
    }

    #[test]
    fn capacity_matches_block_grid() {
        let partition = BlockPartition::new(LatticeDims::new(8, 8, 8), 2);
        assert_eq!(partition.blocks(), [2, 2, 2]);
        assert_eq!(partition.spring_capacity(), 8 * 8 * 12 * 8);
    }
}
