//! The per-tick step pipeline.
//!
//! Each sub-step runs fixed stages, every one a rayon pass that finishes
//! before the next begins:
//!
//! 1. gravity: reset the force accumulator to the gravity vector
//! 2. spring forces: eight batches, see [`crate::partition`]
//! 3. integration
//! 4. collision: planes, then spheres
//! 5. stretch correction, repeated `correction_iterations` times
//!
//! Spring work is split into one rayon task per block cell; the springs of
//! a cell are handled in slot order by that task. This keeps the result
//! independent of the thread schedule.

use crate::accumulator::{AccumulationMode, Accumulator};
use crate::collision::{CollisionScene, ContactResponse};
use crate::config::SolverConfig;
use crate::error::PhysicsError;
use crate::float::Float;
use crate::observer::StepObserver;
use crate::partition::BATCH_COUNT;
use crate::particle::{Particle, Particles};
use crate::spring::Spring;
use crate::topology::Topology;
use crate::vec::Vec3;
use rayon::prelude::*;

/// Scratch state for stepping one body.
///
/// Holds the force and correction accumulators so no tick allocates.
#[derive(Debug)]
pub struct StepPipeline<F: Float> {
    forces: Accumulator<F>,
    corrections: Accumulator<F>,
}

impl<F: Float> StepPipeline<F> {
    pub fn new(particle_count: usize) -> Result<Self, PhysicsError> {
        Ok(StepPipeline {
            forces: Accumulator::new("force", particle_count)?,
            corrections: Accumulator::new("correction", particle_count)?,
        })
    }

    pub fn particle_count(&self) -> usize {
        self.forces.len()
    }

    /// Forces accumulated during the last sub-step (unit mass, so also accelerations).
    pub fn forces(&self) -> &Accumulator<F> {
        &self.forces
    }

    /// Advance `particles` by `dt`.
    ///
    /// There is no error channel: a non-finite or non-positive `dt` leaves
    /// the particles untouched, and numerical divergence is left for the
    /// caller to detect (see [`crate::diagnostics`]).
    pub fn step<O: StepObserver>(
        &mut self,
        dt: F,
        particles: &mut Particles<F>,
        topology: &Topology<F>,
        scene: &CollisionScene<F>,
        config: &SolverConfig<F>,
        observer: &mut O,
    ) {
        if !is_valid_dt(dt) {
            ftlog::debug!("skipping step with dt = {}", dt);
            return;
        }
        debug_assert_eq!(particles.len(), self.particle_count());
        debug_assert_eq!(particles.len(), topology.particle_count());

        let sub_steps = config.sub_steps.max(1);
        let sub_dt = dt / F::from_usize(sub_steps);
        let mut contacts = 0;

        for _sub in 0..sub_steps {
            self.forces.fill(config.gravity);
            observer.on_gravity();

            for batch in 0..BATCH_COUNT {
                self.accumulate_spring_batch(batch, particles.as_slice(), topology, config, sub_dt);
                observer.on_spring_batch(batch);
            }

            self.integrate(particles, sub_dt, config.damping);
            observer.on_integrate();

            let hits = collide(particles, scene, &config.contact);
            contacts += hits;
            observer.on_collide(hits);

            for i in 0..config.correction_iterations {
                self.correct(particles, topology, config);
                observer.on_correction_iteration(i);
            }
        }

        ftlog::trace!("stepped {} particles by {} in {} sub-steps, {} contacts", particles.len(), dt, sub_steps, contacts);
        observer.on_step_complete();
    }

    fn accumulate_spring_batch(
        &self,
        batch: usize,
        particles: &[Particle<F>],
        topology: &Topology<F>,
        config: &SolverConfig<F>,
        dt: F,
    ) {
        let inv_dt = F::one() / dt;
        let forces = &self.forces;
        for_each_cell(topology, batch, config.accumulation, |spring, mode| {
            if let Some(force) = spring_force(spring, particles, config, inv_dt) {
                let (a, b) = spring.ends();
                forces.add(a, force, mode);
                forces.add(b, -force, mode);
            }
        });
    }

    fn integrate(&self, particles: &mut Particles<F>, dt: F, damping: F) {
        let forces = &self.forces;
        particles
            .as_mut_slice()
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, p)| p.integrate(forces.get(i), dt, damping));
    }

    /// One stretch-limiting pass: gather the excess of every over- or
    /// under-stretched spring, then move each particle by its share.
    fn correct(&self, particles: &mut Particles<F>, topology: &Topology<F>, config: &SolverConfig<F>) {
        self.corrections.fill(Vec3::zero());
        let corrections = &self.corrections;
        for batch in 0..BATCH_COUNT {
            let current = particles.as_slice();
            for_each_cell(topology, batch, config.accumulation, |spring, mode| {
                if let Some(shift) = stretch_correction(spring, current, config.max_stretch) {
                    let (a, b) = spring.ends();
                    corrections.add(a, shift, mode);
                    corrections.add(b, -shift, mode);
                }
            });
        }

        let degree = topology.degree();
        particles.as_mut_slice().par_iter_mut().enumerate().for_each(|(i, p)| {
            if degree[i] > 0 {
                let shift = corrections.get(i).scale(F::one() / F::from_usize(degree[i] as usize));
                p.pos = p.pos.translate(shift);
            }
        });
    }
}

/// Whether a time step would advance the body at all.
pub fn is_valid_dt<F: Float>(dt: F) -> bool {
    dt.is_finite() && dt > F::zero()
}

/// Run `visit` over every spring of one batch, one rayon task per cell.
fn for_each_cell<F, V>(topology: &Topology<F>, batch: usize, mode: AccumulationMode, visit: V)
where
    F: Float,
    V: Fn(&Spring<F>, AccumulationMode) + Sync,
{
    let partition = topology.partition();
    let springs = topology.springs();
    (0..partition.block_count()).into_par_iter().for_each(|block| {
        for spring in &springs[partition.cell_range(block, batch)] {
            visit(spring, mode);
        }
    });
}

fn collide<F: Float>(particles: &mut Particles<F>, scene: &CollisionScene<F>, response: &ContactResponse<F>) -> usize {
    if scene.is_empty() {
        return 0;
    }
    particles
        .as_mut_slice()
        .par_iter_mut()
        .map(|p| scene.resolve(p, response) as usize)
        .sum()
}

/// Damped Hooke force on `index1` of a spring; `index2` receives the negation.
///
/// `-(k (L - L0) + c ((v1 - v2) . d)) d` with `d` the unit vector from
/// `index2` to `index1`. Null and collapsed springs have no force.
pub fn spring_force<F: Float>(
    spring: &Spring<F>,
    particles: &[Particle<F>],
    config: &SolverConfig<F>,
    inv_dt: F,
) -> Option<Vec3<F>> {
    if spring.is_null() {
        return None;
    }
    let (a, b) = spring.ends();
    let (pa, pb) = (&particles[a], &particles[b]);
    let delta = pa.pos.xyz() - pb.pos.xyz();
    let length = delta.length();
    if length.is_near_zero(F::from_f32(1e-12)) {
        return None;
    }
    let direction = delta.scale(F::one() / length);
    let relative_velocity = (pa.velocity_raw() - pb.velocity_raw()).scale(inv_dt);
    let magnitude = config.stiffness(spring.kind) * (length - spring.rest_length)
        + config.spring_damping * relative_velocity.dot(direction);
    Some(direction.scale(-magnitude))
}

/// Displacement of `index1` that brings a spring back inside
/// `[L0 (1 - s), L0 (1 + s)]`, half of the excess per end.
pub fn stretch_correction<F: Float>(spring: &Spring<F>, particles: &[Particle<F>], max_stretch: F) -> Option<Vec3<F>> {
    if spring.is_null() {
        return None;
    }
    let (a, b) = spring.ends();
    let delta = particles[a].pos.xyz() - particles[b].pos.xyz();
    let length = delta.length();
    if length.is_near_zero(F::from_f32(1e-12)) {
        return None;
    }
    let low = spring.rest_length * (F::one() - max_stretch);
    let high = spring.rest_length * (F::one() + max_stretch);
    let target = length.clamp(low, high);
    if target == length {
        return None;
    }
    let excess = length - target;
    Some(delta.scale(-(excess * F::half()) / length))
}
