// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::fmt::Debug;
use core::ops::{Add, Div, Mul, Sub};

/// A point in 3D space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point3<T> {
    /// X coordinate
    pub x: T,
    /// Y coordinate
    pub y: T,
    /// Z coordinate
    pub z: T,
}

impl<T> Point3<T> {
    /// Create a new point from its coordinates.
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl<T: Scalar> Point3<T> {
    /// The point with all coordinates equal to `v`.
    pub fn splat(v: T) -> Self {
        Self::new(v, v, v)
    }

    /// Squared Euclidean distance to `other`.
    #[inline]
    pub fn distance_squared(&self, other: Self) -> T {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// This point translated by `d` along every axis.
    #[inline]
    pub fn offset(&self, d: T) -> Self {
        Self::new(self.x + d, self.y + d, self.z + d)
    }

    /// Whether every coordinate is finite (no NaN or infinity).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Coordinates as an `[x, y, z]` array, for per-axis loops.
    #[inline]
    pub fn to_array(self) -> [T; 3] {
        [self.x, self.y, self.z]
    }
}

impl<T> From<[T; 3]> for Point3<T> {
    fn from([x, y, z]: [T; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Floating-point scalar abstraction for 3D positions.
///
/// Grid bucketing needs a floor-to-integer conversion that works without `std`,
/// so this trait carries one alongside the arithmetic the indexes use.
pub trait Scalar:
    Copy
    + PartialOrd
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// Whether the value is neither NaN nor infinite.
    fn is_finite(self) -> bool;

    /// Floor to the nearest integer toward negative infinity.
    ///
    /// Values beyond the `i64` range saturate. NaN maps to zero; callers are
    /// expected to screen non-finite input first.
    fn floor_to_i64(self) -> i64;

    /// Convert a division count to the scalar type.
    fn from_u32(n: u32) -> Self;
}

impl Scalar for f32 {
    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn is_finite(self) -> bool {
        Self::is_finite(self)
    }

    #[inline]
    fn floor_to_i64(self) -> i64 {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Saturating float->int casts are the intended floor semantics."
        )]
        let i = self as i64;
        if (i as Self) > self {
            i.saturating_sub(1)
        } else {
            i
        }
    }

    #[inline]
    #[allow(
        clippy::cast_precision_loss,
        reason = "Division counts are small; precision loss past 2^24 is acceptable."
    )]
    fn from_u32(n: u32) -> Self {
        n as Self
    }
}

impl Scalar for f64 {
    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn is_finite(self) -> bool {
        Self::is_finite(self)
    }

    #[inline]
    fn floor_to_i64(self) -> i64 {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Saturating float->int casts are the intended floor semantics."
        )]
        let i = self as i64;
        if (i as Self) > self {
            i.saturating_sub(1)
        } else {
            i
        }
    }

    #[inline]
    fn from_u32(n: u32) -> Self {
        n.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_rounds_toward_negative_infinity() {
        assert_eq!(2.5_f64.floor_to_i64(), 2);
        assert_eq!((-0.5_f64).floor_to_i64(), -1);
        assert_eq!((-1.0_f32).floor_to_i64(), -1);
        assert_eq!(0.0_f32.floor_to_i64(), 0);
        assert_eq!(f64::MAX.floor_to_i64(), i64::MAX);
        assert_eq!(f64::MIN.floor_to_i64(), i64::MIN);
    }

    #[test]
    fn distance_squared_matches_components() {
        let a = Point3::new(1.0_f32, 2.0, 3.0);
        let b = Point3::new(4.0_f32, 6.0, 3.0);
        assert_eq!(a.distance_squared(b), 25.0);
        assert_eq!(b.distance_squared(a), 25.0);
    }

    #[test]
    fn offset_and_finiteness() {
        let p = Point3::new(1.0_f64, -1.0, 0.0).offset(2.0);
        assert_eq!(p, Point3::new(3.0, 1.0, 2.0));
        assert!(p.is_finite());
        assert!(!Point3::new(f64::NAN, 0.0, 0.0).is_finite());
        assert!(!Point3::new(0.0, f64::INFINITY, 0.0).is_finite());
    }
}
