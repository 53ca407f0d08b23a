//! Vector types for lattice geometry and particle state.

use crate::float::Float;
use core::ops::{Add, AddAssign, Neg, Sub};
use serde::{Deserialize, Serialize};

// --------------------------------------------------------------------------
// Vec3<F>: 3D vector
// --------------------------------------------------------------------------

/// 3D vector for forces, edge vectors and directions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3<F: Float> {
    pub x: F,
    pub y: F,
    pub z: F,
}

impl<F: Float> Vec3<F> {
    /// Create a new 3D vector.
    pub fn new(x: F, y: F, z: F) -> Self { Vec3 { x, y, z } }

    /// Zero vector.
    pub fn zero() -> Self { Vec3 { x: F::zero(), y: F::zero(), z: F::zero() } }

    /// Vector with all components set to the same value.
    pub fn splat(value: F) -> Self { Vec3 { x: value, y: value, z: value } }

    /// Unit vector along +Y.
    pub fn unit_y() -> Self { Vec3 { x: F::zero(), y: F::one(), z: F::zero() } }

    pub fn dot(self, other: Self) -> F {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// 3D cross product.
    pub fn cross(self, other: Self) -> Self {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn scale(self, s: F) -> Self {
        Vec3 { x: self.x * s, y: self.y * s, z: self.z * s }
    }

    /// Component-wise multiplication.
    pub fn component_mul(self, other: Self) -> Self {
        Vec3 { x: self.x * other.x, y: self.y * other.y, z: self.z * other.z }
    }

    /// Squared length (avoids sqrt).
    pub fn length_sq(self) -> F { self.dot(self) }

    pub fn length(self) -> F { self.length_sq().sqrt() }

    /// Normalize to unit length. Returns zero vector if length is near zero.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len.is_near_zero(F::from_f32(1e-10)) {
            Self::zero()
        } else {
            self.scale(F::one() / len)
        }
    }

    /// Distance between two points.
    pub fn distance(self, other: Self) -> F { (self - other).length() }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Largest absolute component.
    pub fn max_abs(self) -> F {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }
}

impl<F: Float> Add for Vec3<F> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Vec3 { x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z }
    }
}

impl<F: Float> AddAssign for Vec3<F> {
    fn add_assign(&mut self, rhs: Self) { *self = *self + rhs; }
}

impl<F: Float> Sub for Vec3<F> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Vec3 { x: self.x - rhs.x, y: self.y - rhs.y, z: self.z - rhs.z }
    }
}

impl<F: Float> Neg for Vec3<F> {
    type Output = Self;
    fn neg(self) -> Self { Vec3 { x: -self.x, y: -self.y, z: -self.z } }
}

// --------------------------------------------------------------------------
// Vec4<F>: homogeneous 4D vector
// --------------------------------------------------------------------------

/// Homogeneous vector as laid out in vertex buffers.
///
/// Points carry `w = 1`, directions (normals) carry `w = 0`. Arithmetic runs
/// over all four components, so adding directions to a point keeps it a point
/// and summing normals keeps them directions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec4<F: Float> {
    pub x: F,
    pub y: F,
    pub z: F,
    pub w: F,
}

impl<F: Float> Vec4<F> {
    pub fn new(x: F, y: F, z: F, w: F) -> Self { Vec4 { x, y, z, w } }

    pub fn zero() -> Self { Vec4 { x: F::zero(), y: F::zero(), z: F::zero(), w: F::zero() } }

    /// A point (`w = 1`).
    pub fn point(v: Vec3<F>) -> Self { Vec4 { x: v.x, y: v.y, z: v.z, w: F::one() } }

    /// A direction (`w = 0`).
    pub fn direction(v: Vec3<F>) -> Self { Vec4 { x: v.x, y: v.y, z: v.z, w: F::zero() } }

    pub fn xyz(self) -> Vec3<F> { Vec3 { x: self.x, y: self.y, z: self.z } }

    /// Offset the spatial part, leaving `w` alone.
    pub fn translate(self, v: Vec3<F>) -> Self {
        Vec4 { x: self.x + v.x, y: self.y + v.y, z: self.z + v.z, w: self.w }
    }

    /// Euclidean distance between the spatial parts.
    pub fn distance(self, other: Self) -> F { self.xyz().distance(other.xyz()) }

    pub fn is_finite(self) -> bool { self.xyz().is_finite() && self.w.is_finite() }
}

impl<F: Float> Add for Vec4<F> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Vec4 { x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z, w: self.w + rhs.w }
    }
}

impl<F: Float> AddAssign for Vec4<F> {
    fn add_assign(&mut self, rhs: Self) { *self = *self + rhs; }
}

impl<F: Float> Sub for Vec4<F> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Vec4 { x: self.x - rhs.x, y: self.y - rhs.y, z: self.z - rhs.z, w: self.w - rhs.w }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec3_cross() {
        let i = Vec3::new(1.0f32, 0.0, 0.0);
        let j = Vec3::new(0.0f32, 1.0, 0.0);
        let k = i.cross(j);
        assert!((k.x - 0.0).abs() < 1e-6);
        assert!((k.y - 0.0).abs() < 1e-6);
        assert!((k.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_zero_vector() {
        let v = Vec3::<f32>::zero();
        assert_eq!(v.normalize(), Vec3::zero());
    }

    #[test]
    fn distance_calculation() {
        let a = Vec3::new(0.0f64, 0.0, 0.0);
        let b = Vec3::new(2.0f64, 3.0, 6.0);
        assert!((a.distance(b) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn point_minus_point_is_direction() {
        let a = Vec4::point(Vec3::new(1.0f32, 2.0, 3.0));
        let b = Vec4::point(Vec3::new(0.5f32, 0.5, 0.5));
        let d = a - b;
        assert_eq!(d.w, 0.0);
        assert_eq!(a.translate(Vec3::splat(1.0)).w, 1.0);
    }
}
