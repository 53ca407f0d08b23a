//! Mass-spring lattice soft bodies with race-free parallel stepping.
//!
//! `jello` builds a deformable body from a 3-D lattice of unit masses joined
//! by structural, shear and bend springs, and advances it with Verlet
//! integration. Spring forces are accumulated on the rayon thread pool in
//! eight batches laid out so that no two concurrent workers ever write the
//! same particle.
//!
//! # Features
//!
//! - **Cuboid or sphere-mapped lattices**: same connectivity, rounded shell
//! - **Block-partitioned springs**: eight race-free batches per tick
//! - **Verlet integration**: position-based dynamics with implicit velocity
//! - **Static collisions**: planes and spheres with restitution and friction
//! - **Stretch correction**: Provot-style relaxation after each sub-step
//! - **Render buffers**: outward-wound faces, vertex normals, tessellated scenery
//! - **Observable**: monitor pipeline stages via the `StepObserver` trait
//!
//! # Example
//!
//! ```
//! use jello::{CollisionScene, LatticeSpec, SanityCheck, Simulator, SolverConfig};
//!
//! let spec: LatticeSpec<f32> = LatticeSpec::default().sphere();
//! let mut sim = Simulator::new(&spec, CollisionScene::showcase(), SolverConfig::new()).unwrap();
//! for _ in 0..10 {
//!     sim.step(1.0 / 60.0);
//! }
//! assert!(sim.sanity_check(&SanityCheck::default()).is_none());
//! ```

pub mod float;
pub mod vec;
pub mod lattice;
pub mod spring;
pub mod partition;
pub mod topology;
pub mod particle;
pub mod accumulator;
pub mod collision;
pub mod pipeline;
pub mod normals;
pub mod scenery;
pub mod simulator;
pub mod diagnostics;
pub mod observer;
pub mod config;
pub mod error;

// Re-export primary API
pub use float::Float;
pub use vec::{Vec3, Vec4};
pub use lattice::{Axis, LatticeDims};
pub use spring::{Spring, SpringKind};
pub use partition::{BlockPartition, BATCH_COUNT};
pub use topology::{build_topology, Face, Topology};
pub use particle::{Particle, Particles};
pub use accumulator::{AccumulationMode, Accumulator};
pub use collision::{CollisionScene, ContactResponse, Plane, Sphere};
pub use pipeline::StepPipeline;
pub use normals::{recompute_normals, recompute_normals_into};
pub use scenery::{RenderMesh, SceneryConfig};
pub use simulator::Simulator;
pub use diagnostics::{Divergence, DivergenceKind, SanityCheck};
pub use config::{LatticeShape, LatticeSpec, SolverConfig};
pub use observer::{StepObserver, NoOpStepObserver};
pub use error::PhysicsError;
