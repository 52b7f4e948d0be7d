// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported when constructing a grid lattice.

use core::fmt;

/// One of the three lattice axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    /// The x axis.
    X,
    /// The y axis.
    Y,
    /// The z axis.
    Z,
}

impl Axis {
    /// All axes in `x, y, z` order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        };
        f.write_str(name)
    }
}

/// Rejected lattice geometry.
///
/// A [`GridIndex`](crate::GridIndex) is only built from a region with a finite
/// origin, a positive finite extent and at least one division on every axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// The division count along an axis is zero.
    ZeroDivisions(Axis),
    /// The region extent along an axis is zero, negative, or not finite.
    InvalidSize(Axis),
    /// The bucket extent along an axis rounds to zero or is not finite.
    DegenerateBucket(Axis),
    /// The region origin along an axis is not finite.
    NonFiniteOrigin(Axis),
    /// The bucket array for the requested divisions cannot be allocated.
    TooManyBuckets,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDivisions(axis) => write!(f, "division count along {axis} must be positive"),
            Self::InvalidSize(axis) => {
                write!(f, "region size along {axis} must be positive and finite")
            }
            Self::DegenerateBucket(axis) => {
                write!(f, "bucket extent along {axis} is zero or not finite")
            }
            Self::NonFiniteOrigin(axis) => write!(f, "region origin along {axis} is not finite"),
            Self::TooManyBuckets => f.write_str("bucket lattice is too large to allocate"),
        }
    }
}

impl core::error::Error for GridError {}
