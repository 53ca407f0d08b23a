//! Configuration values for lattice construction and the step pipeline.

use crate::accumulator::AccumulationMode;
use crate::collision::ContactResponse;
use crate::error::PhysicsError;
use crate::float::Float;
use crate::lattice::{Axis, LatticeDims};
use crate::partition::BlockPartition;
use crate::spring::SpringKind;
use crate::vec::Vec3;
use serde::{Deserialize, Serialize};

/// Shape of the body's rest configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LatticeShape {
    /// Regular box of `width x height x depth`.
    #[default]
    Cuboid,
    /// Outer shell projected onto the ellipsoid inscribed in the box.
    Sphere,
}

/// Description of a lattice body.
///
/// # Builder Pattern
/// ```
/// use jello::config::LatticeSpec;
/// use jello::vec::Vec3;
///
/// let spec: LatticeSpec<f32> = LatticeSpec::cuboid(6, 4, 4)
///     .with_extents(3.0, 2.0, 2.0)
///     .with_offset(Vec3::new(0.0, 1.0, 0.0))
///     .with_block_radius(3);
/// assert!(spec.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatticeSpec<F: Float> {
    /// Mass counts along x, y and z. Each must be at least 2.
    pub masses: [usize; 3],
    pub width: F,
    pub height: F,
    pub depth: F,
    /// Center of the body.
    pub offset: Vec3<F>,
    pub shape: LatticeShape,
    /// Half-width of the partition cube. Must be at least 2.
    pub block_radius: usize,
}

impl<F: Float> LatticeSpec<F> {
    /// A cuboid lattice with 2x2x2 extents at the origin and block radius 2.
    pub fn cuboid(nx: usize, ny: usize, nz: usize) -> Self {
        LatticeSpec {
            masses: [nx, ny, nz],
            width: F::two(),
            height: F::two(),
            depth: F::two(),
            offset: Vec3::zero(),
            shape: LatticeShape::Cuboid,
            block_radius: 2,
        }
    }

    pub fn with_extents(mut self, width: F, height: F, depth: F) -> Self {
        self.width = width;
        self.height = height;
        self.depth = depth;
        self
    }

    pub fn with_offset(mut self, offset: Vec3<F>) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_shape(mut self, shape: LatticeShape) -> Self {
        self.shape = shape;
        self
    }

    /// Switch to the sphere-mapped shape.
    pub fn sphere(self) -> Self {
        self.with_shape(LatticeShape::Sphere)
    }

    pub fn with_block_radius(mut self, radius: usize) -> Self {
        self.block_radius = radius;
        self
    }

    pub fn dims(&self) -> LatticeDims {
        LatticeDims::new(self.masses[0], self.masses[1], self.masses[2])
    }

    pub fn extents(&self) -> Vec3<F> {
        Vec3::new(self.width, self.height, self.depth)
    }

    /// Distance between neighbouring masses along each axis.
    pub fn cell_size(&self) -> Vec3<F> {
        let step = |extent: F, n: usize| extent / F::from_usize(n.saturating_sub(1).max(1));
        Vec3::new(
            step(self.width, self.masses[0]),
            step(self.height, self.masses[1]),
            step(self.depth, self.masses[2]),
        )
    }

    /// Check every invariant before anything is allocated.
    pub fn validate(&self) -> Result<LatticeDims, PhysicsError> {
        let axes = [Axis::X, Axis::Y, Axis::Z];
        for (axis, &count) in axes.iter().zip(self.masses.iter()) {
            if count < 2 {
                return Err(PhysicsError::InvalidMassCount { axis: *axis, count });
            }
        }
        for (axis, extent) in axes.iter().zip([self.width, self.height, self.depth]) {
            if !extent.is_finite() || extent <= F::zero() {
                return Err(PhysicsError::InvalidExtent { axis: *axis, value: extent.to_f64() });
            }
        }
        if !self.offset.is_finite() {
            return Err(PhysicsError::InvalidOffset);
        }
        if self.block_radius < 2 {
            return Err(PhysicsError::InvalidBlockRadius { radius: self.block_radius });
        }
        let dims = self.dims();
        if BlockPartition::checked_spring_capacity(dims, self.block_radius).is_none() {
            return Err(PhysicsError::SpringCapacityOverflow { radius: self.block_radius });
        }

        // Body vertices are duplicated once per face-plane family.
        let particles = self.masses.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n));
        let vertices = particles.and_then(|n| n.checked_mul(3));
        match vertices {
            Some(count) if u32::try_from(count).is_ok() => Ok(dims),
            Some(count) => Err(PhysicsError::TooManyVertices { count }),
            None => Err(PhysicsError::TooManyVertices { count: usize::MAX }),
        }
    }
}

impl<F: Float> Default for LatticeSpec<F> {
    /// An 8x8x8 cube of side 2 centered at (0, 0, 10).
    fn default() -> Self {
        LatticeSpec::cuboid(8, 8, 8).with_offset(Vec3::new(F::zero(), F::zero(), F::from_f32(10.0)))
    }
}

/// Configuration for the step pipeline.
///
/// # Builder Pattern
/// ```
/// use jello::config::SolverConfig;
/// use jello::vec::Vec3;
///
/// let config: SolverConfig<f32> = SolverConfig::new()
///     .with_gravity(Vec3::new(0.0, -9.81, 0.0))
///     .with_stiffness(800.0, 400.0, 200.0)
///     .with_correction_iterations(4)
///     .with_sub_steps(2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig<F: Float> {
    /// Gravity acceleration vector. Default: (0, -9.81, 0).
    pub gravity: Vec3<F>,
    /// Hooke coefficient of structural springs. Default: 500.
    pub structural_stiffness: F,
    /// Hooke coefficient of shear springs. Default: 500.
    pub shear_stiffness: F,
    /// Hooke coefficient of bend springs. Default: 250.
    pub bend_stiffness: F,
    /// Damping along each spring axis, proportional to the relative velocity. Default: 2.
    pub spring_damping: F,
    /// Verlet velocity retention [0, 1]. 1.0 = no damping. Default: 1.0.
    pub damping: F,
    /// Number of sub-steps per tick. Default: 1.
    pub sub_steps: usize,
    /// Number of stretch-correction passes per sub-step. Default: 2.
    pub correction_iterations: usize,
    /// Relative deformation a spring may reach before it is corrected. Default: 0.1.
    pub max_stretch: F,
    /// How spring contributions are written to the shared accumulators.
    pub accumulation: AccumulationMode,
    /// Velocity treatment on contact with scene primitives.
    pub contact: ContactResponse<F>,
}

impl<F: Float> SolverConfig<F> {
    pub fn new() -> Self {
        SolverConfig {
            gravity: Vec3::new(F::zero(), F::from_f32(-9.81), F::zero()),
            structural_stiffness: F::from_f32(500.0),
            shear_stiffness: F::from_f32(500.0),
            bend_stiffness: F::from_f32(250.0),
            spring_damping: F::two(),
            damping: F::one(),
            sub_steps: 1,
            correction_iterations: 2,
            max_stretch: F::from_f32(0.1),
            accumulation: AccumulationMode::Exclusive,
            contact: ContactResponse::default(),
        }
    }

    pub fn with_gravity(mut self, gravity: Vec3<F>) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set structural, shear and bend stiffness at once.
    pub fn with_stiffness(mut self, structural: F, shear: F, bend: F) -> Self {
        self.structural_stiffness = structural;
        self.shear_stiffness = shear;
        self.bend_stiffness = bend;
        self
    }

    pub fn with_spring_damping(mut self, spring_damping: F) -> Self {
        self.spring_damping = spring_damping;
        self
    }

    pub fn with_damping(mut self, damping: F) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_sub_steps(mut self, sub_steps: usize) -> Self {
        self.sub_steps = sub_steps.max(1);
        self
    }

    pub fn with_correction_iterations(mut self, iterations: usize) -> Self {
        self.correction_iterations = iterations;
        self
    }

    pub fn with_max_stretch(mut self, max_stretch: F) -> Self {
        self.max_stretch = max_stretch;
        self
    }

    pub fn with_accumulation(mut self, mode: AccumulationMode) -> Self {
        self.accumulation = mode;
        self
    }

    pub fn with_contact(mut self, contact: ContactResponse<F>) -> Self {
        self.contact = contact;
        self
    }

    /// Hooke coefficient for a spring category. Null springs have none.
    pub fn stiffness(&self, kind: SpringKind) -> F {
        match kind {
            SpringKind::Null => F::zero(),
            SpringKind::Structural => self.structural_stiffness,
            SpringKind::Shear => self.shear_stiffness,
            SpringKind::Bend => self.bend_stiffness,
        }
    }

    pub fn validate(&self) -> Result<(), PhysicsError> {
        let non_negative = |v: F| v.is_finite() && v >= F::zero();
        let coefficients = [self.structural_stiffness, self.shear_stiffness, self.bend_stiffness, self.spring_damping];
        if !coefficients.into_iter().all(non_negative) {
            return Err(PhysicsError::InvalidStiffness);
        }
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidGravity);
        }
        if !non_negative(self.max_stretch) {
            return Err(PhysicsError::InvalidMaxStretch { value: self.max_stretch.to_f64() });
        }
        if !self.damping.is_finite() || self.damping < F::zero() || self.damping > F::one() {
            return Err(PhysicsError::InvalidDamping);
        }
        if self.sub_steps == 0 {
            return Err(PhysicsError::InvalidSubSteps);
        }
        self.contact.validate()
    }
}

impl<F: Float> Default for SolverConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}
