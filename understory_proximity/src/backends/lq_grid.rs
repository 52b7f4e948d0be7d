// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Locality-query ("LQ") bin lattice: a fixed 3D grid of buckets over a
//! bounded region.
//!
//! # Wraparound
//!
//! The lattice is a 3D torus for indexing purposes. A position outside
//! `[origin, origin + size)` is *not* clamped: its bucket index is wrapped with
//! a Euclidean modulo, so an object that leaves the region on one side lands in
//! the buckets on the opposite side. Queries wrap their bucket ranges the same
//! way and then check the exact distance for every candidate, so results are
//! always exact; points far outside the region only cost extra candidates.
//!
//! Distances themselves are plain Euclidean distances between stored
//! positions. Wrapping affects which buckets hold a point, never whether it
//! matches a query.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::error::{Axis, GridError};
use crate::proximity::{BinStats, ProximityIndex, radius_is_positive};
use crate::token::{Placement, Token, TokenTable, detach_member};
use crate::types::{Point3, Scalar};

/// Geometry of a bin lattice.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LatticeConfig<T> {
    /// Minimum corner of the covered region.
    pub origin: Point3<T>,
    /// Extent of the covered region along each axis.
    pub size: Point3<T>,
    /// Number of buckets along each axis.
    pub divisions: [u32; 3],
}

impl<T: Scalar> LatticeConfig<T> {
    /// Create a lattice configuration.
    pub const fn new(origin: Point3<T>, size: Point3<T>, divisions: [u32; 3]) -> Self {
        Self {
            origin,
            size,
            divisions,
        }
    }

    /// A cube of edge `edge` split into `divisions` buckets along every axis.
    pub fn cube(origin: Point3<T>, edge: T, divisions: u32) -> Self {
        Self::new(origin, Point3::splat(edge), [divisions; 3])
    }

    /// A region made of `divisions` cubic buckets of edge `cell` per axis.
    pub fn from_cell_size(origin: Point3<T>, cell: T, divisions: [u32; 3]) -> Self {
        let size = Point3::new(
            cell * T::from_u32(divisions[0]),
            cell * T::from_u32(divisions[1]),
            cell * T::from_u32(divisions[2]),
        );
        Self::new(origin, size, divisions)
    }

    /// Check that the geometry describes a usable lattice.
    pub fn validate(&self) -> Result<(), GridError> {
        let origin = self.origin.to_array();
        let size = self.size.to_array();
        for (i, axis) in Axis::ALL.into_iter().enumerate() {
            if !origin[i].is_finite() {
                return Err(GridError::NonFiniteOrigin(axis));
            }
            if !(size[i].is_finite() && size[i] > T::zero()) {
                return Err(GridError::InvalidSize(axis));
            }
            if self.divisions[i] == 0 {
                return Err(GridError::ZeroDivisions(axis));
            }
            let bin = size[i] / T::from_u32(self.divisions[i]);
            if !(bin.is_finite() && bin > T::zero()) {
                return Err(GridError::DegenerateBucket(axis));
            }
        }
        self.lattice_len().ok_or(GridError::TooManyBuckets)?;
        Ok(())
    }

    /// Number of lattice buckets (excluding the overflow bucket), if the
    /// bucket array including the overflow bucket is addressable.
    fn lattice_len(&self) -> Option<usize> {
        let [x, y, z] = self.divisions.map(|d| d as usize);
        let n = x.checked_mul(y)?.checked_mul(z)?;
        let bytes = n
            .checked_add(1)?
            .checked_mul(core::mem::size_of::<Vec<u32>>())?;
        if bytes > isize::MAX as usize {
            return None;
        }
        Some(n)
    }
}

/// A token's bucket and its index within that bucket's member list.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct BucketLink {
    bucket: usize,
    member: usize,
}

/// Proximity index backed by a uniform 3D bin lattice.
///
/// Every positioned token lives in exactly one bucket. Updating a position is
/// O(1): it recomputes the bucket and, only when that changes, swap-removes the
/// token from the old bucket and pushes it onto the new one. A radius query
/// visits the buckets overlapping the query sphere's bounding box (wrapped, see
/// the [module docs](self)) plus the overflow bucket.
///
/// The overflow bucket holds tokens whose bucket cannot be computed, which is
/// the case for positions with a NaN or infinite coordinate. It is part of
/// every query's candidate set, so such tokens are never silently dropped.
pub struct GridIndex<T, P> {
    config: LatticeConfig<T>,
    bin_size: [T; 3],
    divisions: [i64; 3],
    /// Lattice buckets in row-major order, followed by the overflow bucket.
    buckets: Vec<Vec<u32>>,
    table: TokenTable<T, P, BucketLink>,
}

impl<T: Scalar, P> GridIndex<T, P> {
    /// Build an empty lattice, rejecting degenerate geometry.
    pub fn new(config: LatticeConfig<T>) -> Result<Self, GridError> {
        config.validate()?;
        let lattice_len = config.lattice_len().ok_or(GridError::TooManyBuckets)?;
        let size = config.size.to_array();
        let bin_size = [0, 1, 2].map(|i| size[i] / T::from_u32(config.divisions[i]));
        let divisions = config.divisions.map(i64::from);
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(lattice_len + 1)
            .map_err(|_| GridError::TooManyBuckets)?;
        buckets.resize_with(lattice_len + 1, Vec::new);
        log::debug!(
            "lq lattice: {}x{}x{} buckets, bin size {:?}, origin {:?}",
            divisions[0],
            divisions[1],
            divisions[2],
            bin_size,
            config.origin,
        );
        Ok(Self {
            config,
            bin_size,
            divisions,
            buckets,
            table: TokenTable::default(),
        })
    }

    /// The geometry this lattice was built with.
    pub fn config(&self) -> &LatticeConfig<T> {
        &self.config
    }

    /// Bucket extent along each axis.
    pub fn bin_size(&self) -> Point3<T> {
        Point3::from(self.bin_size)
    }

    /// Number of lattice buckets, not counting the overflow bucket.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len() - 1
    }

    /// Number of tokens currently in the overflow bucket.
    pub fn overflow_population(&self) -> usize {
        self.buckets[self.overflow_bucket()].len()
    }

    /// Flat bucket index holding the token, or `None` if it is stale or has
    /// no position yet. The overflow bucket is reported as
    /// [`bucket_count`](Self::bucket_count).
    pub fn bucket_of(&self, token: Token) -> Option<usize> {
        self.table
            .get(token)?
            .placement
            .as_ref()
            .map(|p| p.link.bucket)
    }

    /// Flat bucket index a position maps to.
    pub fn bucket_for(&self, position: Point3<T>) -> usize {
        if !position.is_finite() {
            return self.overflow_bucket();
        }
        let p = position.to_array();
        let mut cell = [0_usize; 3];
        for (axis, c) in cell.iter_mut().enumerate() {
            *c = self.wrap(axis, self.raw_index(axis, p[axis]));
        }
        self.flatten(cell).unwrap_or_else(|| self.overflow_bucket())
    }

    #[inline]
    fn overflow_bucket(&self) -> usize {
        self.buckets.len() - 1
    }

    /// Unwrapped bucket coordinate of `v` along `axis`.
    #[inline]
    fn raw_index(&self, axis: usize, v: T) -> i64 {
        let origin = self.config.origin.to_array()[axis];
        ((v - origin) / self.bin_size[axis]).floor_to_i64()
    }

    #[inline]
    #[allow(
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation,
        reason = "rem_euclid by a positive u32-sized divisor is in 0..divisor."
    )]
    fn wrap(&self, axis: usize, raw: i64) -> usize {
        raw.rem_euclid(self.divisions[axis]) as usize
    }

    #[inline]
    fn flatten(&self, [x, y, z]: [usize; 3]) -> Option<usize> {
        let [dx, dy, dz] = self.config.divisions.map(|d| d as usize);
        if x >= dx || y >= dy || z >= dz {
            return None;
        }
        Some(x + dx * (y + dy * z))
    }

    /// Wrapped bucket coordinates along `axis` overlapping `[lo, hi]`.
    ///
    /// Returns the first raw coordinate and how many consecutive coordinates to
    /// visit. Spans that reach around the whole torus collapse to one full lap
    /// so no bucket is visited twice.
    fn axis_span(&self, axis: usize, lo: T, hi: T) -> (i64, i64) {
        let div = self.divisions[axis];
        let first = self.raw_index(axis, lo);
        let last = self.raw_index(axis, hi);
        let span = last.saturating_sub(first);
        if span >= div - 1 {
            (0, div)
        } else {
            (first, span + 1)
        }
    }

    fn detach(&mut self, link: BucketLink) {
        let Some(bucket) = self.buckets.get_mut(link.bucket) else {
            return;
        };
        if let Some(moved) = detach_member(bucket, link.member)
            && let Some(p) = self
                .table
                .occupant_mut(moved)
                .and_then(|e| e.placement.as_mut())
        {
            p.link.member = link.member;
        }
    }

    fn visit_bucket(
        &self,
        bucket: usize,
        center: Point3<T>,
        r2: T,
        visit: &mut dyn FnMut(Token, &P, Point3<T>, T),
    ) {
        for &slot in &self.buckets[bucket] {
            if let Some((token, entry)) = self.table.occupant(slot)
                && let Some(p) = entry.placement.as_ref()
            {
                let d2 = p.position.distance_squared(center);
                if d2 < r2 {
                    visit(token, &entry.payload, p.position, d2);
                }
            }
        }
    }
}

impl<T: Scalar, P: Clone> ProximityIndex<T, P> for GridIndex<T, P> {
    fn allocate_token(&mut self, payload: P) -> Token {
        self.table.allocate(payload)
    }

    fn remove_token(&mut self, token: Token) -> Option<P> {
        let entry = self.table.remove(token)?;
        if let Some(placement) = entry.placement {
            self.detach(placement.link);
        }
        Some(entry.payload)
    }

    fn update_position(&mut self, token: Token, position: Point3<T>) -> bool {
        let bucket = self.bucket_for(position);
        let overflow = self.overflow_bucket();
        let Some(entry) = self.table.get_mut(token) else {
            return false;
        };
        let previous = match entry.placement.as_mut() {
            Some(p) if p.link.bucket == bucket => {
                p.position = position;
                return true;
            }
            Some(p) => Some(p.link),
            None => None,
        };
        let members = &mut self.buckets[bucket];
        members.push(token.slot());
        entry.placement = Some(Placement {
            position,
            link: BucketLink {
                bucket,
                member: members.len() - 1,
            },
        });
        if bucket == overflow {
            log::warn!("token {token:?} moved to the overflow bucket (position {position:?})");
        }
        if let Some(old) = previous {
            log::trace!("token {token:?}: bucket {} -> {bucket}", old.bucket);
            self.detach(old);
        }
        true
    }

    fn for_each_in_radius(
        &self,
        center: Point3<T>,
        radius: T,
        visit: &mut dyn FnMut(Token, &P, Point3<T>, T),
    ) {
        if !radius_is_positive(radius) || !center.is_finite() {
            return;
        }
        let r2 = radius * radius;
        let lo = center.offset(T::zero() - radius).to_array();
        let hi = center.offset(radius).to_array();
        let (x0, nx) = self.axis_span(0, lo[0], hi[0]);
        let (y0, ny) = self.axis_span(1, lo[1], hi[1]);
        let (z0, nz) = self.axis_span(2, lo[2], hi[2]);
        for k in 0..nz {
            let z = self.wrap(2, z0 + k);
            for j in 0..ny {
                let y = self.wrap(1, y0 + j);
                for i in 0..nx {
                    let x = self.wrap(0, x0 + i);
                    if let Some(bucket) = self.flatten([x, y, z]) {
                        self.visit_bucket(bucket, center, r2, visit);
                    }
                }
            }
        }
        self.visit_bucket(self.overflow_bucket(), center, r2, visit);
    }

    fn for_each_token(&self, visit: &mut dyn FnMut(Token, &P, Option<Point3<T>>)) {
        for (token, entry) in self.table.iter() {
            visit(token, &entry.payload, entry.placement.map(|p| p.position));
        }
    }

    fn population(&self) -> usize {
        self.table.len()
    }

    fn clear(&mut self) {
        log::debug!("lq lattice: clearing {} tokens", self.table.len());
        self.table.clear();
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    fn position(&self, token: Token) -> Option<Point3<T>> {
        self.table.get(token)?.placement.map(|p| p.position)
    }

    fn payload(&self, token: Token) -> Option<&P> {
        self.table.get(token).map(|e| &e.payload)
    }

    /// Occupancy of the lattice buckets. The overflow bucket is not included.
    fn bin_population_stats(&self) -> BinStats {
        let mut min = usize::MAX;
        let mut max = 0;
        let mut total = 0_usize;
        let mut occupied = 0_usize;
        for bucket in &self.buckets[..self.bucket_count()] {
            let n = bucket.len();
            if n == 0 {
                continue;
            }
            min = min.min(n);
            max = max.max(n);
            total += n;
            occupied += 1;
        }
        if occupied == 0 {
            return BinStats::default();
        }
        #[allow(
            clippy::cast_precision_loss,
            reason = "Diagnostic average; counts far below 2^52."
        )]
        let average = total as f64 / occupied as f64;
        BinStats { min, max, average }
    }
}

impl<T: Debug, P> Debug for GridIndex<T, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let occupied = self.buckets.iter().filter(|b| !b.is_empty()).count();
        f.debug_struct("GridIndex")
            .field("origin", &self.config.origin)
            .field("size", &self.config.size)
            .field("divisions", &self.config.divisions)
            .field("alive", &self.table.len())
            .field("occupied_buckets", &occupied)
            .field("overflow", &self.buckets.last().map_or(0, Vec::len))
            .finish_non_exhaustive()
    }
}
