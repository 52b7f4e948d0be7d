// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_proximity --heading-base-level=0

//! Understory Proximity: token-based neighbor queries over moving 3D points.
//!
//! Understory Proximity is a reusable building block for simulations, crowds, and steering.
//!
//! - Allocate a [`Token`] per tracked object, carrying an opaque payload.
//! - Update the token's position every tick; the index keeps its spatial structure in sync.
//! - Query every payload strictly within a radius of a point, or the nearest one.
//!
//! It is generic over the scalar type `T` (`f32` or `f64`) and the payload type `P`,
//! and does not depend on any geometry crate.
//!
//! Backends implement the [`ProximityIndex`] trait, which is object safe, so
//! callers can swap the spatial strategy at runtime without touching call sites.
//!
//! # Example
//!
//! ```rust
//! use understory_proximity::{GridIndex, LatticeConfig, Point3, ProximityIndex};
//!
//! // A 100-unit cube split into 10×10×10 buckets.
//! let config = LatticeConfig::cube(Point3::splat(0.0_f32), 100.0, 10);
//! let mut idx: GridIndex<f32, u32> = GridIndex::new(config).unwrap();
//!
//! let a = idx.allocate_token(1);
//! let b = idx.allocate_token(2);
//! idx.update_position(a, Point3::new(5.0, 5.0, 5.0));
//! idx.update_position(b, Point3::new(15.0, 5.0, 5.0));
//!
//! let mut near = Vec::new();
//! idx.find_neighbors(Point3::new(5.0, 5.0, 5.0), 12.0, &mut near);
//! near.sort();
//! assert_eq!(near, [1, 2]);
//!
//! // Move the second token away; it is no longer a neighbor.
//! idx.update_position(b, Point3::new(50.0, 50.0, 50.0));
//! near.clear();
//! idx.find_neighbors(Point3::new(5.0, 5.0, 5.0), 12.0, &mut near);
//! assert_eq!(near, [1]);
//! ```
//!
//! ## Choosing a backend
//!
//! - [`BruteForceIndex`]: checks every point on each query. Good for small populations
//!   and as a reference when testing other backends.
//! - [`GridIndex`]: the locality-query bin lattice. Covers a fixed region with a uniform
//!   grid; updates are O(1) and queries only visit buckets touching the query sphere.
//!   Choose the bucket size close to the typical query radius.
//!
//! ### Wraparound
//!
//! The grid lattice wraps at its boundary: positions outside the covered region map to
//! buckets on the opposite side instead of being clamped. Query results stay exact,
//! because every candidate is checked against the true distance. See [`backends::lq_grid`].
//!
//! ### Lifetimes
//!
//! Tokens are plain handles; the client removes them with [`ProximityIndex::remove_token`].
//! If you would rather tie removal to an object's lifetime, [`SharedIndex`] hands out
//! [`ProximityToken`]s that remove themselves on drop.
//!
//! ### Float semantics
//!
//! Matches use `distance² < radius²`: points exactly on the query sphere are excluded.
//! A radius that is zero, negative, or NaN matches nothing.
//!
//! ### Threading
//!
//! Indexes are plain owned data and are not internally synchronized; mutation requires
//! `&mut` access. Wrap an index in a lock if several threads need it.

#![no_std]

extern crate alloc;

pub mod backends;
pub mod error;
pub mod proximity;
pub mod shared;
pub mod token;
pub mod types;

pub use backends::brute_force::BruteForceIndex;
pub use backends::lq_grid::{GridIndex, LatticeConfig};
pub use error::{Axis, GridError};
pub use proximity::{BinStats, ProximityIndex};
pub use shared::{ProximityToken, SharedIndex};
pub use token::Token;
pub use types::{Point3, Scalar};

/// Grid index over `f32` coordinates.
pub type GridIndexF32<P> = GridIndex<f32, P>;
/// Grid index over `f64` coordinates.
pub type GridIndexF64<P> = GridIndex<f64, P>;
