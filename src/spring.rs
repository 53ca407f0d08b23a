//! Lattice springs and the fixed per-particle spring slot layout.

use crate::float::Float;
use serde::{Deserialize, Serialize};

/// Spring category, by neighbour distance and direction.
///
/// The discriminants match the type tags expected by GPU-side consumers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum SpringKind {
    /// Placeholder occupying an unused slot.
    Null = 0,
    /// Axis-aligned neighbour one step away; resists stretching.
    Structural = 1,
    /// Face-diagonal neighbour; resists shearing.
    Shear = 2,
    /// Axis-aligned neighbour two steps away; resists bending.
    Bend = 3,
}

impl SpringKind {
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// A spring between two particles.
///
/// Immutable once the topology is built. A null spring has both ends on the
/// same particle and zero rest length, so it never produces a force.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spring<F: Float> {
    pub index1: u32,
    pub index2: u32,
    pub kind: SpringKind,
    pub rest_length: F,
}

impl<F: Float> Spring<F> {
    pub fn new(index1: u32, index2: u32, kind: SpringKind, rest_length: F) -> Self {
        Spring { index1, index2, kind, rest_length }
    }

    /// Harmless filler for an unused slot, anchored at `index`.
    pub fn null(index: u32) -> Self {
        Spring { index1: index, index2: index, kind: SpringKind::Null, rest_length: F::zero() }
    }

    pub fn is_null(&self) -> bool {
        self.kind == SpringKind::Null || self.index1 == self.index2
    }

    /// Both particle indices as `usize`.
    #[inline]
    pub fn ends(&self) -> (usize, usize) {
        (self.index1 as usize, self.index2 as usize)
    }
}

/// Number of spring slots reserved per particle.
pub const SLOTS_PER_PARTICLE: usize = 12;

/// One of the twelve candidate springs of a particle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpringSlot {
    /// Position of the slot within the particle's twelve.
    pub slot: usize,
    /// Grid offset from the owning particle to the other end.
    pub offset: [isize; 3],
    pub kind: SpringKind,
}

const fn slot(slot: usize, offset: [isize; 3], kind: SpringKind) -> SpringSlot {
    SpringSlot { slot, offset, kind }
}

/// Springs every particle attempts toward lower neighbours.
///
/// Shear slots are listed with the "minus" diagonal; see [`SHEAR_FALLBACKS`]
/// for the mirrored slot used when the minus diagonal leaves the lattice.
pub const PRIMARY_SLOTS: [SpringSlot; 9] = [
    slot(0, [-1, 0, 0], SpringKind::Structural),
    slot(1, [0, -1, 0], SpringKind::Structural),
    slot(2, [0, 0, -1], SpringKind::Structural),
    slot(3, [-1, -1, 0], SpringKind::Shear),
    slot(4, [-1, 0, -1], SpringKind::Shear),
    slot(5, [0, -1, -1], SpringKind::Shear),
    slot(9, [-2, 0, 0], SpringKind::Bend),
    slot(10, [0, -2, 0], SpringKind::Bend),
    slot(11, [0, 0, -2], SpringKind::Bend),
];

/// Mirrored shear slots, keyed by the primary slot they replace.
///
/// Each fallback flips exactly one axis of its primary diagonal: the one the
/// primary needs to step below zero on. The other (shared) minus step is kept.
pub const SHEAR_FALLBACKS: [(usize, SpringSlot); 3] = [
    (3, slot(6, [1, -1, 0], SpringKind::Shear)),
    (4, slot(7, [-1, 0, 1], SpringKind::Shear)),
    (5, slot(8, [0, 1, -1], SpringKind::Shear)),
];

/// Fallback slot for a primary shear slot, if any.
pub fn shear_fallback(primary: usize) -> Option<SpringSlot> {
    SHEAR_FALLBACKS
        .iter()
        .find(|(p, _)| *p == primary)
        .map(|(_, s)| *s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_spring_is_inert() {
        let s: Spring<f32> = Spring::null(7);
        assert!(s.is_null());
        assert_eq!(s.ends(), (7, 7));
        assert_eq!(s.kind.as_u32(), 0);
        assert_eq!(s.rest_length, 0.0);
    }

    #[test]
    fn slots_cover_all_twelve_once() {
        let mut seen = [false; SLOTS_PER_PARTICLE];
        for s in PRIMARY_SLOTS.iter().chain(SHEAR_FALLBACKS.iter().map(|(_, s)| s)) {
            assert!(!seen[s.slot], "slot {} listed twice", s.slot);
            seen[s.slot] = true;
        }
        assert!(seen.iter().all(|&b| b));
    }

    #[test]
    fn fallbacks_flip_one_axis() {
        for (primary, fallback) in SHEAR_FALLBACKS {
            let p = PRIMARY_SLOTS.iter().find(|s| s.slot == primary).unwrap();
            let flipped = p.offset.iter().zip(fallback.offset.iter()).filter(|(a, b)| a != b).count();
            assert_eq!(flipped, 1);
            assert_eq!(shear_fallback(primary), Some(fallback));
        }
        assert_eq!(shear_fallback(0), None);
    }
}
