//! Owning façade over one body and its scene.

use crate::collision::CollisionScene;
use crate::config::{LatticeSpec, SolverConfig};
use crate::diagnostics::{Divergence, SanityCheck};
use crate::error::PhysicsError;
use crate::float::Float;
use crate::normals::recompute_normals_into;
use crate::observer::{NoOpStepObserver, StepObserver};
use crate::particle::Particles;
use crate::pipeline::{self, StepPipeline};
use crate::scenery::{RenderMesh, SceneryConfig};
use crate::topology::{allocate, Topology};
use crate::vec::Vec4;

/// A lattice body in a static collision scene.
///
/// Owns the topology, the particle state, the pipeline scratch buffers and
/// the body normals. Nothing is allocated after construction.
///
/// ```
/// use jello::{CollisionScene, LatticeSpec, Simulator, SolverConfig};
///
/// let mut sim: Simulator<f32> = Simulator::new(
///     &LatticeSpec::cuboid(4, 4, 4),
///     CollisionScene::new(),
///     SolverConfig::new(),
/// ).unwrap();
/// sim.step(1.0 / 60.0);
/// assert_eq!(sim.tick_count(), 1);
/// assert_eq!(sim.normals().len(), 3 * 64);
/// ```
#[derive(Debug)]
pub struct Simulator<F: Float> {
    topology: Topology<F>,
    particles: Particles<F>,
    pipeline: StepPipeline<F>,
    scene: CollisionScene<F>,
    config: SolverConfig<F>,
    positions: Vec<Vec4<F>>,
    normals: Vec<Vec4<F>>,
    ticks: u64,
}

impl<F: Float> Simulator<F> {
    /// Validate everything, then build the body at rest.
    pub fn new(spec: &LatticeSpec<F>, scene: CollisionScene<F>, config: SolverConfig<F>) -> Result<Self, PhysicsError> {
        config.validate()?;
        scene.validate()?;
        let topology = Topology::build(spec)?;
        let particles = Particles::from_positions(topology.positions())?;
        let pipeline = StepPipeline::new(topology.particle_count())?;
        let mut positions = allocate("position mirror", topology.particle_count())?;
        positions.extend_from_slice(topology.positions());
        let mut normals = allocate("normal", topology.vertex_count())?;
        normals.resize(topology.vertex_count(), Vec4::zero());
        let mut sim = Simulator {
            pipeline,
            positions,
            normals,
            topology,
            particles,
            scene,
            config,
            ticks: 0,
        };
        sim.recompute_normals();
        ftlog::info!(
            "simulator ready: {} particles, {} planes, {} spheres, {} sub-steps",
            sim.particles.len(),
            sim.scene.planes.len(),
            sim.scene.spheres.len(),
            sim.config.sub_steps,
        );
        Ok(sim)
    }

    /// Advance one tick and refresh the normals.
    pub fn step(&mut self, dt: F) {
        self.step_observed(dt, &mut NoOpStepObserver);
    }

    pub fn step_observed<O: StepObserver>(&mut self, dt: F, observer: &mut O) {
        if !pipeline::is_valid_dt(dt) {
            ftlog::debug!("tick {} ignored: dt = {}", self.ticks, dt);
            return;
        }
        self.pipeline.step(dt, &mut self.particles, &self.topology, &self.scene, &self.config, observer);
        self.recompute_normals();
        self.ticks += 1;
    }

    /// Recompute the body normals from the current particle positions.
    pub fn recompute_normals(&mut self) {
        self.particles.write_positions(&mut self.positions);
        recompute_normals_into(&mut self.normals, &self.positions, self.topology.faces());
    }

    /// Put every particle back at its initial lattice position, at rest.
    pub fn reset(&mut self) {
        self.particles.reset(self.topology.positions());
        self.ticks = 0;
        self.recompute_normals();
        ftlog::debug!("simulator reset");
    }

    /// Check the body for divergence, measured from the lattice center.
    pub fn sanity_check(&self, check: &SanityCheck<F>) -> Option<Divergence<F>> {
        let divergence = check.inspect(&self.particles, self.topology.spec().offset);
        if let Some(d) = &divergence {
            ftlog::warn!("body diverged after {} ticks: {}", self.ticks, d);
        }
        divergence
    }

    /// Render buffers for the body in its current state plus the scene.
    pub fn render_mesh(&self, scenery: &SceneryConfig<F>) -> Result<RenderMesh<F>, PhysicsError> {
        RenderMesh::assemble(&self.topology, &self.positions, &self.scene, scenery)
    }

    /// Current particle positions, as of the last tick.
    pub fn positions(&self) -> &[Vec4<F>] { &self.positions }

    /// Body vertex normals (one per duplicated vertex, not normalized).
    pub fn normals(&self) -> &[Vec4<F>] { &self.normals }

    pub fn particles(&self) -> &Particles<F> { &self.particles }

    /// Mutable access for impulses and teleports. Call
    /// [`Simulator::recompute_normals`] afterwards if the normals are read
    /// before the next tick.
    pub fn particles_mut(&mut self) -> &mut Particles<F> { &mut self.particles }

    pub fn topology(&self) -> &Topology<F> { &self.topology }
    pub fn scene(&self) -> &CollisionScene<F> { &self.scene }
    pub fn config(&self) -> &SolverConfig<F> { &self.config }
    pub fn tick_count(&self) -> u64 { self.ticks }
}
