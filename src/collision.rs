//! Static collision primitives and contact response.
//!
//! Every particle is tested against every plane (in order) and then every
//! sphere (in order). Each penetration is resolved on its own by projecting
//! the particle back onto the surface and rewriting its implicit velocity;
//! there is no contact manifold across primitives.

use crate::error::PhysicsError;
use crate::float::Float;
use crate::particle::Particle;
use crate::vec::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Half-space boundary `dot(normal, p) >= offset`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane<F: Float> {
    /// Unit normal pointing out of the solid side.
    pub normal: Vec3<F>,
    /// Signed distance of the plane from the origin along `normal`.
    pub offset: F,
}

impl<F: Float> Plane<F> {
    /// A plane with the given normal (normalized here) and offset.
    pub fn new(normal: Vec3<F>, offset: F) -> Self {
        Plane { normal: normal.normalize(), offset }
    }

    /// Horizontal floor at height `y`.
    pub fn floor(y: F) -> Self {
        Plane { normal: Vec3::unit_y(), offset: y }
    }

    pub fn signed_distance(&self, p: Vec3<F>) -> F {
        self.normal.dot(p) - self.offset
    }

    /// Closest point on the plane to the origin.
    pub fn anchor(&self) -> Vec3<F> {
        self.normal.scale(self.offset)
    }

    fn is_valid(&self) -> bool {
        let len = self.normal.length();
        self.normal.is_finite() && self.offset.is_finite() && (len - F::one()).abs() < F::from_f32(1e-3)
    }
}

/// Solid ball.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sphere<F: Float> {
    pub center: Vec3<F>,
    pub radius: F,
}

impl<F: Float> Sphere<F> {
    pub fn new(center: Vec3<F>, radius: F) -> Self {
        Sphere { center, radius }
    }

    fn is_valid(&self) -> bool {
        self.center.is_finite() && self.radius.is_finite() && self.radius > F::zero()
    }
}

/// What happens to the velocity of a particle pushed out of a primitive.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactResponse<F: Float> {
    /// Fraction of the inward normal velocity reflected outward, in [0, 1).
    /// 0 zeroes it.
    pub restitution: F,
    /// Fraction of the tangential velocity removed on an inward contact.
    pub friction: F,
}

impl<F: Float> ContactResponse<F> {
    pub fn new(restitution: F, friction: F) -> Self {
        ContactResponse { restitution, friction }
    }

    pub fn validate(&self) -> Result<(), PhysicsError> {
        let unit = |v: F| v.is_finite() && v >= F::zero() && v <= F::one();
        // A restitution of 1 would be a fully elastic bounce.
        if unit(self.restitution) && self.restitution < F::one() && unit(self.friction) {
            Ok(())
        } else {
            Err(PhysicsError::InvalidContactResponse)
        }
    }

    /// Velocity after contact with a surface of outward normal `n`.
    pub fn respond(&self, velocity: Vec3<F>, n: Vec3<F>) -> Vec3<F> {
        let vn = velocity.dot(n);
        if vn >= F::zero() {
            return velocity;
        }
        let normal = n.scale(vn);
        let tangential = velocity - normal;
        tangential.scale(F::one() - self.friction) - normal.scale(self.restitution)
    }
}

impl<F: Float> Default for ContactResponse<F> {
    fn default() -> Self {
        ContactResponse { restitution: F::zero(), friction: F::zero() }
    }
}

/// Read-only collision scene.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionScene<F: Float> {
    #[serde(default)]
    pub planes: Vec<Plane<F>>,
    #[serde(default)]
    pub spheres: Vec<Sphere<F>>,
}

impl<F: Float> CollisionScene<F> {
    /// A scene with no primitives.
    pub fn new() -> Self {
        CollisionScene { planes: Vec::new(), spheres: Vec::new() }
    }

    /// A tilted ramp below a resting ball, framing a body centered at (0, 0, 10).
    pub fn showcase() -> Self {
        CollisionScene::new()
            .with_plane(Plane::new(Vec3::new(F::from_f32(0.312_249_9), F::from_f32(0.95), F::zero()), F::from_f32(-3.0)))
            .with_sphere(Sphere::new(Vec3::new(F::zero(), F::from_f32(-2.0), F::from_f32(10.0)), F::one()))
    }

    pub fn with_plane(mut self, plane: Plane<F>) -> Self {
        self.planes.push(plane);
        self
    }

    pub fn with_sphere(mut self, sphere: Sphere<F>) -> Self {
        self.spheres.push(sphere);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty() && self.spheres.is_empty()
    }

    pub fn validate(&self) -> Result<(), PhysicsError> {
        if let Some(index) = self.planes.iter().position(|p| !p.is_valid()) {
            return Err(PhysicsError::InvalidPlane { index });
        }
        if let Some(index) = self.spheres.iter().position(|s| !s.is_valid()) {
            return Err(PhysicsError::InvalidSphere { index });
        }
        Ok(())
    }

    /// Resolve every penetration of `particle`, planes first, then spheres.
    ///
    /// Returns the number of primitives the particle was pushed out of.
    pub fn resolve(&self, particle: &mut Particle<F>, response: &ContactResponse<F>) -> u32 {
        let mut contacts = 0;
        for plane in &self.planes {
            if resolve_plane(particle, plane, response) {
                contacts += 1;
            }
        }
        for sphere in &self.spheres {
            if resolve_sphere(particle, sphere, response) {
                contacts += 1;
            }
        }
        contacts
    }
}

/// Push a particle out of the solid side of a plane.
pub fn resolve_plane<F: Float>(p: &mut Particle<F>, plane: &Plane<F>, response: &ContactResponse<F>) -> bool {
    let depth = plane.signed_distance(p.pos.xyz());
    if depth >= F::zero() {
        return false;
    }
    let velocity = p.velocity_raw();
    p.pos = p.pos.translate(plane.normal.scale(-depth));
    p.set_velocity_raw(response.respond(velocity, plane.normal));
    true
}

/// Push a particle out of a sphere along the radial direction.
///
/// A particle exactly at the center is pushed along +Y.
pub fn resolve_sphere<F: Float>(p: &mut Particle<F>, sphere: &Sphere<F>, response: &ContactResponse<F>) -> bool {
    let radial = p.pos.xyz() - sphere.center;
    let distance = radial.length();
    if distance >= sphere.radius {
        return false;
    }
    let normal = if distance.is_near_zero(F::from_f32(1e-10)) {
        Vec3::unit_y()
    } else {
        radial.scale(F::one() / distance)
    };
    let velocity = p.velocity_raw();
    p.pos = Vec4::point(sphere.center + normal.scale(sphere.radius));
    p.set_velocity_raw(response.respond(velocity, normal));
    true
}
