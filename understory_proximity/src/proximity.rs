// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The proximity index abstraction shared by every backend.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::token::Token;
use crate::types::{Point3, Scalar};

/// Bucket occupancy summary reported by
/// [`ProximityIndex::bin_population_stats`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BinStats {
    /// Smallest population among non-empty buckets.
    pub min: usize,
    /// Largest bucket population.
    pub max: usize,
    /// Mean population over non-empty buckets.
    pub average: f64,
}

/// A database of moving points answering radius queries.
///
/// Each tracked payload is represented by a [`Token`]. The client owns the
/// token's lifetime: it allocates one per object, updates its position as the
/// object moves, and removes it when the object leaves the simulation.
///
/// Queries only see tokens that have had at least one position update, and a
/// point matches a sphere when `distance² < radius²` (points exactly on the
/// surface are excluded). A non-positive or NaN radius matches nothing.
///
/// The trait is object safe, so indexes can be swapped at runtime behind a
/// `Box<dyn ProximityIndex<T, P>>`.
pub trait ProximityIndex<T: Scalar, P: Clone> {
    /// Register a new payload. It has no position until the first
    /// [`update_position`](Self::update_position).
    fn allocate_token(&mut self, payload: P) -> Token;

    /// Remove a token and hand back its payload. Stale tokens yield `None`.
    fn remove_token(&mut self, token: Token) -> Option<P>;

    /// Record a new position for the token. Returns `false` for a stale token.
    fn update_position(&mut self, token: Token, position: Point3<T>) -> bool;

    /// Visit every positioned token strictly within `radius` of `center`.
    ///
    /// The visitor receives the token, its payload, its position and its squared
    /// distance to `center`. Visit order is unspecified.
    fn for_each_in_radius(
        &self,
        center: Point3<T>,
        radius: T,
        visit: &mut dyn FnMut(Token, &P, Point3<T>, T),
    );

    /// Visit every live token, positioned or not.
    fn for_each_token(&self, visit: &mut dyn FnMut(Token, &P, Option<Point3<T>>));

    /// Number of live tokens.
    fn population(&self) -> usize;

    /// Remove every token. All outstanding tokens become stale.
    fn clear(&mut self);

    /// Last recorded position of the token, if it is live and positioned.
    fn position(&self, token: Token) -> Option<Point3<T>>;

    /// Payload of a live token.
    fn payload(&self, token: Token) -> Option<&P>;

    /// Whether the token is live in this index.
    fn contains(&self, token: Token) -> bool {
        self.payload(token).is_some()
    }

    /// Append the payload of every positioned token strictly within `radius`
    /// of `center` to `out`. Existing contents of `out` are kept.
    fn find_neighbors(&self, center: Point3<T>, radius: T, out: &mut Vec<P>) {
        self.for_each_in_radius(center, radius, &mut |_, payload, _, _| {
            out.push(payload.clone());
        });
    }

    /// The closest positioned token strictly within `radius` of `center`,
    /// skipping `ignore` (typically the querying object's own token).
    fn find_nearest(&self, center: Point3<T>, radius: T, ignore: Option<Token>) -> Option<Token> {
        let mut best: Option<(Token, T)> = None;
        self.for_each_in_radius(center, radius, &mut |token, _, _, d2| {
            if Some(token) == ignore {
                return;
            }
            if best.is_none_or(|(_, best_d2)| d2 < best_d2) {
                best = Some((token, d2));
            }
        });
        best.map(|(token, _)| token)
    }

    /// Bucket occupancy diagnostics. Indexes without buckets report zeros.
    fn bin_population_stats(&self) -> BinStats {
        BinStats::default()
    }
}

impl<T, P, I> ProximityIndex<T, P> for Box<I>
where
    T: Scalar,
    P: Clone,
    I: ProximityIndex<T, P> + ?Sized,
{
    fn allocate_token(&mut self, payload: P) -> Token {
        (**self).allocate_token(payload)
    }

    fn remove_token(&mut self, token: Token) -> Option<P> {
        (**self).remove_token(token)
    }

    fn update_position(&mut self, token: Token, position: Point3<T>) -> bool {
        (**self).update_position(token, position)
    }

    fn for_each_in_radius(
        &self,
        center: Point3<T>,
        radius: T,
        visit: &mut dyn FnMut(Token, &P, Point3<T>, T),
    ) {
        (**self).for_each_in_radius(center, radius, visit);
    }

    fn for_each_token(&self, visit: &mut dyn FnMut(Token, &P, Option<Point3<T>>)) {
        (**self).for_each_token(visit);
    }

    fn population(&self) -> usize {
        (**self).population()
    }

    fn clear(&mut self) {
        (**self).clear();
    }

    fn position(&self, token: Token) -> Option<Point3<T>> {
        (**self).position(token)
    }

    fn payload(&self, token: Token) -> Option<&P> {
        (**self).payload(token)
    }

    fn contains(&self, token: Token) -> bool {
        (**self).contains(token)
    }

    fn find_neighbors(&self, center: Point3<T>, radius: T, out: &mut Vec<P>) {
        (**self).find_neighbors(center, radius, out);
    }

    fn find_nearest(&self, center: Point3<T>, radius: T, ignore: Option<Token>) -> Option<Token> {
        (**self).find_nearest(center, radius, ignore)
    }

    fn bin_population_stats(&self) -> BinStats {
        (**self).bin_population_stats()
    }
}

/// Whether a query with this radius can match anything.
#[inline]
pub(crate) fn radius_is_positive<T: Scalar>(radius: T) -> bool {
    radius > T::zero()
}
