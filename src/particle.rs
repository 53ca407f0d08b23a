//! Verlet particles with implicit velocity and unit mass.

use crate::error::PhysicsError;
use crate::float::Float;
use crate::topology::allocate;
use crate::vec::{Vec3, Vec4};
use core::ops::{Index, IndexMut};

/// A lattice mass with position-based dynamics and implicit velocity.
///
/// Velocity is never stored: it is `pos - prev_pos` per step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle<F: Float> {
    pub pos: Vec4<F>,
    pub prev_pos: Vec4<F>,
}

impl<F: Float> Particle<F> {
    /// A particle at rest at `pos`.
    pub fn new(pos: Vec4<F>) -> Self {
        Particle { pos, prev_pos: pos }
    }

    /// Advance one step under `force` (unit mass).
    ///
    /// `next = pos + (pos - prev_pos) * damping + force * dt^2`
    pub fn integrate(&mut self, force: Vec3<F>, dt: F, damping: F) {
        let velocity = self.velocity_raw().scale(damping);
        let next = self.pos.translate(velocity + force.scale(dt * dt));
        self.prev_pos = self.pos;
        self.pos = next;
    }

    /// Displacement over the last step.
    pub fn velocity_raw(&self) -> Vec3<F> {
        (self.pos - self.prev_pos).xyz()
    }

    /// Replace the per-step displacement without moving the particle.
    pub fn set_velocity_raw(&mut self, velocity: Vec3<F>) {
        self.prev_pos = self.pos.translate(-velocity);
    }

    /// Move position and history together, preserving velocity.
    pub fn translate(&mut self, offset: Vec3<F>) {
        self.pos = self.pos.translate(offset);
        self.prev_pos = self.prev_pos.translate(offset);
    }
}

/// The body's particle array, fixed in size after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Particles<F: Float> {
    items: Vec<Particle<F>>,
}

impl<F: Float> Particles<F> {
    /// Particles at rest at the given positions.
    pub fn from_positions(positions: &[Vec4<F>]) -> Result<Self, PhysicsError> {
        let mut items = allocate("particle", positions.len())?;
        items.extend(positions.iter().copied().map(Particle::new));
        Ok(Particles { items })
    }

    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn as_slice(&self) -> &[Particle<F>] { &self.items }
    pub fn as_mut_slice(&mut self) -> &mut [Particle<F>] { &mut self.items }

    pub fn iter(&self) -> core::slice::Iter<'_, Particle<F>> { self.items.iter() }

    /// Current positions, in particle order.
    pub fn positions(&self) -> Vec<Vec4<F>> {
        self.items.iter().map(|p| p.pos).collect()
    }

    /// Copy current positions into `out` (which must match in length).
    pub fn write_positions(&self, out: &mut [Vec4<F>]) {
        for (dst, p) in out.iter_mut().zip(self.items.iter()) {
            *dst = p.pos;
        }
    }

    /// Average position.
    pub fn centroid(&self) -> Vec3<F> {
        if self.items.is_empty() {
            return Vec3::zero();
        }
        let n = F::from_usize(self.items.len());
        let mut sum = Vec3::zero();
        for p in &self.items {
            sum += p.pos.xyz();
        }
        sum.scale(F::one() / n)
    }

    /// Apply an impulse to one particle by adjusting its history.
    pub fn kick(&mut self, index: usize, impulse: Vec3<F>) {
        let p = &mut self.items[index];
        p.prev_pos = p.prev_pos.translate(-impulse);
    }

    /// Give every particle the same per-step displacement.
    pub fn set_velocity_raw(&mut self, velocity: Vec3<F>) {
        for p in self.items.iter_mut() {
            p.set_velocity_raw(velocity);
        }
    }

    /// Put every particle back at rest at `positions`.
    pub fn reset(&mut self, positions: &[Vec4<F>]) {
        for (p, &pos) in self.items.iter_mut().zip(positions.iter()) {
            *p = Particle::new(pos);
        }
    }
}

impl<F: Float> Index<usize> for Particles<F> {
    type Output = Particle<F>;
    fn index(&self, index: usize) -> &Particle<F> { &self.items[index] }
}

impl<F: Float> IndexMut<usize> for Particles<F> {
    fn index_mut(&mut self, index: usize) -> &mut Particle<F> { &mut self.items[index] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrate_keeps_homogeneous_coordinate() {
        let mut p = Particle::new(Vec4::point(Vec3::new(0.0f32, 1.0, 0.0)));
        p.integrate(Vec3::new(0.0, -10.0, 0.0), 0.1, 1.0);
        assert_eq!(p.pos.w, 1.0);
        assert!((p.pos.y - 0.9).abs() < 1e-6);
        assert!((p.velocity_raw().y + 0.1).abs() < 1e-6);
    }

    #[test]
    fn kick_changes_velocity_only() {
        let mut particles = Particles::from_positions(&[Vec4::point(Vec3::new(1.0f64, 2.0, 3.0))]).unwrap();
        particles.kick(0, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(particles[0].pos.x, 1.0);
        assert_eq!(particles[0].velocity_raw().x, 0.5);
    }
}
