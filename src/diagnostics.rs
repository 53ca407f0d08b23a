//! Divergence detection for periodic external monitoring.
//!
//! The step pipeline never checks its own output. Callers that want to catch
//! an exploding body run a [`SanityCheck`] every so often and decide what to
//! do about it (reset, lower the time step, stiffen the correction).

use crate::float::Float;
use crate::particle::Particles;
use crate::vec::Vec3;
use core::fmt;
use serde::{Deserialize, Serialize};

/// What went wrong with a diverged particle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DivergenceKind<F: Float> {
    /// A coordinate is NaN or infinite.
    NonFinite,
    /// The particle is this far from the reference point.
    TooFar { distance: F },
}

/// First particle found in a degenerate state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Divergence<F: Float> {
    pub index: usize,
    pub kind: DivergenceKind<F>,
}

impl<F: Float> fmt::Display for Divergence<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DivergenceKind::NonFinite => write!(f, "particle {} has a non-finite position", self.index),
            DivergenceKind::TooFar { distance } => {
                write!(f, "particle {} is {} away from the reference point", self.index, distance)
            }
        }
    }
}

/// Bounds a healthy body stays within.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SanityCheck<F: Float> {
    pub max_distance: F,
}

impl<F: Float> SanityCheck<F> {
    pub fn new(max_distance: F) -> Self {
        SanityCheck { max_distance }
    }

    /// The lowest-indexed particle that is non-finite or farther than
    /// `max_distance` from `reference`, if any.
    pub fn inspect(&self, particles: &Particles<F>, reference: Vec3<F>) -> Option<Divergence<F>> {
        particles.iter().enumerate().find_map(|(index, p)| {
            let pos = p.pos.xyz();
            if !pos.is_finite() || !p.prev_pos.is_finite() {
                return Some(Divergence { index, kind: DivergenceKind::NonFinite });
            }
            let distance = pos.distance(reference);
            (distance > self.max_distance).then_some(Divergence { index, kind: DivergenceKind::TooFar { distance } })
        })
    }
}

impl<F: Float> Default for SanityCheck<F> {
    fn default() -> Self {
        SanityCheck { max_distance: F::from_f32(1000.0) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec::Vec4;

    fn particles(points: &[[f32; 3]]) -> Particles<f32> {
        let positions: Vec<_> = points.iter().map(|&[x, y, z]| Vec4::point(Vec3::new(x, y, z))).collect();
        Particles::from_positions(&positions).unwrap()
    }

    #[test]
    fn healthy_body_passes() {
        let check = SanityCheck::new(5.0);
        assert_eq!(check.inspect(&particles(&[[0.0, 1.0, 0.0], [1.0, 0.0, 0.0]]), Vec3::zero()), None);
    }

    #[test]
    fn reports_first_offender() {
        let check = SanityCheck::new(5.0);
        let body = particles(&[[0.0, 1.0, 0.0], [0.0, f32::NAN, 0.0], [10.0, 0.0, 0.0]]);
        let found = check.inspect(&body, Vec3::zero()).unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.kind, DivergenceKind::NonFinite);
    }

    #[test]
    fn reports_distance() {
        let check = SanityCheck::new(5.0);
        let found = check.inspect(&particles(&[[0.0, 0.0, 6.0]]), Vec3::zero()).unwrap();
        assert_eq!(found.kind, DivergenceKind::TooFar { distance: 6.0 });
    }
}
