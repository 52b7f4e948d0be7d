// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `brute_force`: dense member list scanned on every query (small, simple, exact by construction).
//! - `lq_grid`: fixed 3D bin lattice over a bounded region with toroidal wraparound.
//!
//! Cost overview
//! -------------
//! For `n` positioned tokens:
//!
//! | Operation         | `BruteForceIndex` | `GridIndex`                                   |
//! |-------------------|-------------------|-----------------------------------------------|
//! | allocate / remove | O(1)              | O(1)                                          |
//! | update position   | O(1)              | O(1) (bucket lookup, optional swap-remove)    |
//! | radius query      | O(n)              | O(k + b), `k` tokens in the `b` swept buckets |
//!
//! The grid also scans its overflow bucket on every query, so positions with
//! non-finite coordinates degrade toward brute-force behavior if they pile up.

pub mod brute_force;
pub mod lq_grid;

pub use brute_force::BruteForceIndex;
pub use lq_grid::{GridIndex, LatticeConfig};
