//! Error types for topology construction and configuration.

use crate::lattice::Axis;
use thiserror::Error;

/// Errors reported while building a body or validating its configuration.
///
/// Stepping a simulation never produces one of these: every check happens
/// before the first tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// Each lattice axis needs at least two layers of masses.
    #[error("lattice needs at least 2 masses along {axis}, got {count}")]
    InvalidMassCount { axis: Axis, count: usize },
    /// Physical extents must be positive and finite.
    #[error("lattice extent along {axis} must be positive and finite, got {value}")]
    InvalidExtent { axis: Axis, value: f64 },
    /// Lattice placement offset must be finite.
    #[error("lattice offset must be finite")]
    InvalidOffset,
    /// Block radius below 2 cannot isolate bend springs between cells.
    #[error("block radius must be at least 2, got {radius}")]
    InvalidBlockRadius { radius: usize },
    /// The dense spring array for this radius would not fit in a `usize`.
    #[error("block radius {radius} needs more spring slots than can be addressed")]
    SpringCapacityOverflow { radius: usize },
    /// Vertex indices are stored as `u32`.
    #[error("lattice would need {count} vertices, more than a u32 index can address")]
    TooManyVertices { count: usize },
    /// Storage for a topology or simulation buffer could not be reserved.
    #[error("failed to allocate {len} entries for the {buffer} buffer")]
    Allocation { buffer: &'static str, len: usize },
    /// Stiffness and damping coefficients must be non-negative and finite.
    #[error("spring coefficients must be non-negative and finite")]
    InvalidStiffness,
    /// Gravity must be a finite vector.
    #[error("gravity must be finite")]
    InvalidGravity,
    /// The stretch limit must be non-negative and finite.
    #[error("max stretch must be non-negative and finite, got {value}")]
    InvalidMaxStretch { value: f64 },
    /// Damping factors must be in [0, 1].
    #[error("damping factor must be in [0, 1]")]
    InvalidDamping,
    /// At least one sub-step per tick.
    #[error("sub-step count must be at least 1")]
    InvalidSubSteps,
    /// Restitution must be in [0, 1) and friction in [0, 1].
    #[error("contact restitution must be in [0, 1) and friction in [0, 1]")]
    InvalidContactResponse,
    /// A plane normal was zero or not finite.
    #[error("plane {index} has a degenerate normal or offset")]
    InvalidPlane { index: usize },
    /// A sphere radius was not positive, or its center not finite.
    #[error("sphere {index} has a non-positive radius or non-finite center")]
    InvalidSphere { index: usize },
    /// Scenery spheres need at least a 2x2x2 tessellation lattice.
    #[error("sphere tessellation precision must be at least 2, got {precision}")]
    InvalidSceneryPrecision { precision: usize },
    /// Scenery plane quads need a positive, finite half-width.
    #[error("scenery plane extent must be positive and finite, got {value}")]
    InvalidSceneryExtent { value: f64 },
}
