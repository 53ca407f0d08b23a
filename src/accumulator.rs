//! Per-particle vector accumulators shared by parallel stage workers.

use crate::error::PhysicsError;
use crate::float::Float;
use crate::topology::allocate;
use crate::vec::Vec3;
use core::marker::PhantomData;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// How spring contributions are added to an accumulator entry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccumulationMode {
    /// Plain read-then-write. Correct only when no two concurrent workers
    /// touch the same entry, which the block partition guarantees.
    #[default]
    Exclusive,
    /// Compare-and-swap loop; correct under any schedule.
    Atomic,
}

/// A `Vec3` per particle, stored as float bit patterns in atomics so the
/// stage workers can share it by reference.
pub struct Accumulator<F: Float> {
    cells: Vec<[AtomicU64; 3]>,
    _float: PhantomData<F>,
}

impl<F: Float> Accumulator<F> {
    /// An accumulator of `len` zero vectors; `buffer` names it in errors.
    pub fn new(buffer: &'static str, len: usize) -> Result<Self, PhysicsError> {
        let zero = F::zero().to_bits_u64();
        let mut cells = allocate(buffer, len)?;
        cells.extend((0..len).map(|_| [AtomicU64::new(zero), AtomicU64::new(zero), AtomicU64::new(zero)]));
        Ok(Accumulator { cells, _float: PhantomData })
    }

    pub fn len(&self) -> usize { self.cells.len() }
    pub fn is_empty(&self) -> bool { self.cells.is_empty() }

    /// Set every entry to `value`.
    pub fn fill(&self, value: Vec3<F>) {
        let bits = [value.x.to_bits_u64(), value.y.to_bits_u64(), value.z.to_bits_u64()];
        self.cells.par_iter().for_each(|cell| {
            for (c, b) in cell.iter().zip(bits) {
                c.store(b, Ordering::Relaxed);
            }
        });
    }

    pub fn get(&self, index: usize) -> Vec3<F> {
        let [x, y, z] = &self.cells[index];
        Vec3::new(
            F::from_bits_u64(x.load(Ordering::Relaxed)),
            F::from_bits_u64(y.load(Ordering::Relaxed)),
            F::from_bits_u64(z.load(Ordering::Relaxed)),
        )
    }

    /// Add `value` to entry `index`.
    #[inline]
    pub fn add(&self, index: usize, value: Vec3<F>, mode: AccumulationMode) {
        let cell = &self.cells[index];
        for (c, v) in cell.iter().zip([value.x, value.y, value.z]) {
            match mode {
                AccumulationMode::Exclusive => {
                    let current = F::from_bits_u64(c.load(Ordering::Relaxed));
                    c.store((current + v).to_bits_u64(), Ordering::Relaxed);
                }
                AccumulationMode::Atomic => {
                    // The closure always returns Some, so this cannot fail.
                    let _ = c.fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                        Some((F::from_bits_u64(bits) + v).to_bits_u64())
                    });
                }
            }
        }
    }

    /// Copy of every entry.
    pub fn snapshot(&self) -> Vec<Vec3<F>> {
        (0..self.cells.len()).map(|i| self.get(i)).collect()
    }
}

impl<F: Float> core::fmt::Debug for Accumulator<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Accumulator").field("len", &self.cells.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_then_add() {
        let acc: Accumulator<f32> = Accumulator::new("force", 3).unwrap();
        acc.fill(Vec3::new(0.0, -9.5, 0.0));
        acc.add(1, Vec3::new(1.0, 1.0, 1.0), AccumulationMode::Exclusive);
        assert_eq!(
            acc.snapshot(),
            vec![Vec3::new(0.0, -9.5, 0.0), Vec3::new(1.0, -8.5, 1.0), Vec3::new(0.0, -9.5, 0.0)]
        );
    }

    #[test]
    fn atomic_mode_survives_contention() {
        let acc: Accumulator<f64> = Accumulator::new("force", 1).unwrap();
        (0..1000).into_par_iter().for_each(|_| {
            acc.add(0, Vec3::new(1.0, 2.0, 0.5), AccumulationMode::Atomic);
        });
        assert_eq!(acc.get(0), Vec3::new(1000.0, 2000.0, 500.0));
    }

    #[test]
    fn oversized_accumulator_is_an_error() {
        let err = Accumulator::<f32>::new("force", usize::MAX).unwrap_err();
        assert_eq!(err, PhysicsError::Allocation { buffer: "force", len: usize::MAX });
    }
}
