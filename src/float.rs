//! Floating-point abstraction trait for generic numeric operations.

use core::cmp::PartialOrd;
use core::ops::{Add, Div, Mul, Neg, Sub};

/// Trait abstracting floating-point operations needed by the simulation.
///
/// Implemented for `f32` and `f64`. The `Send + Sync` bounds let buffers of
/// these values be shared with the parallel stage workers.
pub trait Float:
    Copy
    + Clone
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Default
    + Send
    + Sync
    + core::fmt::Debug
    + core::fmt::Display
    + 'static
{
    /// The additive identity (0.0).
    fn zero() -> Self;
    /// The multiplicative identity (1.0).
    fn one() -> Self;
    /// Half (0.5).
    fn half() -> Self;
    /// Two (2.0).
    fn two() -> Self;
    /// Square root.
    fn sqrt(self) -> Self;
    /// Absolute value.
    fn abs(self) -> Self;
    /// Minimum of two values.
    fn min(self, other: Self) -> Self;
    /// Maximum of two values.
    fn max(self, other: Self) -> Self;
    /// Convert from f32 (for constants and configuration).
    fn from_f32(v: f32) -> Self;
    /// Lossy conversion to f64, used for diagnostics and error payloads.
    fn to_f64(self) -> f64;
    /// True when neither infinite nor NaN.
    fn is_finite(self) -> bool;
    /// Raw bit pattern, widened to 64 bits.
    fn to_bits_u64(self) -> u64;
    /// Inverse of [`Float::to_bits_u64`].
    fn from_bits_u64(bits: u64) -> Self;

    /// Convert a lattice count or coordinate.
    fn from_usize(v: usize) -> Self {
        Self::from_f32(v as f32)
    }

    /// Clamp self to [min, max].
    fn clamp(self, min: Self, max: Self) -> Self {
        self.max(min).min(max)
    }

    /// Check if approximately zero within epsilon.
    fn is_near_zero(self, epsilon: Self) -> bool {
        self.abs() < epsilon
    }
}

impl Float for f32 {
    fn zero() -> Self { 0.0 }
    fn one() -> Self { 1.0 }
    fn half() -> Self { 0.5 }
    fn two() -> Self { 2.0 }
    fn sqrt(self) -> Self { libm::sqrtf(self) }
    fn abs(self) -> Self { libm::fabsf(self) }
    fn min(self, other: Self) -> Self { if self < other { self } else { other } }
    fn max(self, other: Self) -> Self { if self > other { self } else { other } }
    fn from_f32(v: f32) -> Self { v }
    fn to_f64(self) -> f64 { f64::from(self) }
    fn is_finite(self) -> bool { f32::is_finite(self) }
    fn to_bits_u64(self) -> u64 { u64::from(self.to_bits()) }
    fn from_bits_u64(bits: u64) -> Self { f32::from_bits(bits as u32) }
}

impl Float for f64 {
    fn zero() -> Self { 0.0 }
    fn one() -> Self { 1.0 }
    fn half() -> Self { 0.5 }
    fn two() -> Self { 2.0 }
    fn sqrt(self) -> Self { libm::sqrt(self) }
    fn abs(self) -> Self { libm::fabs(self) }
    fn min(self, other: Self) -> Self { if self < other { self } else { other } }
    fn max(self, other: Self) -> Self { if self > other { self } else { other } }
    fn from_f32(v: f32) -> Self { f64::from(v) }
    fn from_usize(v: usize) -> Self { v as f64 }
    fn to_f64(self) -> f64 { self }
    fn is_finite(self) -> bool { f64::is_finite(self) }
    fn to_bits_u64(self) -> u64 { self.to_bits() }
    fn from_bits_u64(bits: u64) -> Self { f64::from_bits(bits) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_survive_the_trip_for_f32() {
        for v in [0.0f32, -0.0, 1.5, -3.25e-7, f32::MAX] {
            assert_eq!(f32::from_bits_u64(v.to_bits_u64()).to_bits(), v.to_bits());
        }
    }

    #[test]
    fn clamp_and_near_zero() {
        assert_eq!(5.0f64.clamp(0.0, 1.0), 1.0);
        assert!(1e-12f64.is_near_zero(1e-10));
        assert!(!Float::is_finite(f32::NAN));
    }
}
