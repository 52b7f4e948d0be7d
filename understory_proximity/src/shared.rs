// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Self-removing tokens over a shared, single-threaded index.
//!
//! [`SharedIndex`] puts any [`ProximityIndex`] behind `Rc<RefCell<_>>` so that
//! each tracked object can hold its own [`ProximityToken`]. The token keeps a
//! back-reference to the index, updates and queries through it, and removes
//! itself when dropped.
//!
//! ```rust
//! use understory_proximity::{BruteForceIndex, Point3, SharedIndex};
//!
//! let db = SharedIndex::new(BruteForceIndex::<f32, &str>::new());
//! let mut a = db.allocate("a");
//! let mut b = db.allocate("b");
//! a.update_position(Point3::new(0.0, 0.0, 0.0));
//! b.update_position(Point3::new(1.0, 0.0, 0.0));
//!
//! let mut near = Vec::new();
//! a.find_neighbors(2.0, &mut near);
//! assert_eq!(near.len(), 2);
//!
//! drop(b);
//! assert_eq!(db.population(), 1);
//! ```
//!
//! Borrowing is checked at runtime: calling back into the same index from
//! inside a [`SharedIndex::with_index`] closure panics.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt::Debug;
use core::marker::PhantomData;

use crate::proximity::{BinStats, ProximityIndex};
use crate::token::Token;
use crate::types::{Point3, Scalar};

/// A proximity index shared between the tokens it hands out.
pub struct SharedIndex<I> {
    inner: Rc<RefCell<I>>,
}

impl<I> Clone for SharedIndex<I> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<I: Debug> Debug for SharedIndex<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.inner.try_borrow() {
            Ok(index) => f.debug_tuple("SharedIndex").field(&*index).finish(),
            Err(_) => f.write_str("SharedIndex(<borrowed>)"),
        }
    }
}

impl<I> SharedIndex<I> {
    /// Wrap an index for shared use.
    pub fn new(index: I) -> Self {
        Self {
            inner: Rc::new(RefCell::new(index)),
        }
    }

    /// Run `f` with shared access to the underlying index.
    pub fn with_index<R>(&self, f: impl FnOnce(&I) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Allocate a self-removing token for `payload`.
    pub fn allocate<T, P>(&self, payload: P) -> ProximityToken<T, P, I>
    where
        T: Scalar,
        P: Clone,
        I: ProximityIndex<T, P>,
    {
        let token = self.inner.borrow_mut().allocate_token(payload);
        ProximityToken {
            index: Rc::clone(&self.inner),
            token,
            _marker: PhantomData,
        }
    }

    /// Number of live tokens.
    pub fn population<T, P>(&self) -> usize
    where
        T: Scalar,
        P: Clone,
        I: ProximityIndex<T, P>,
    {
        self.inner.borrow().population()
    }

    /// Append every payload strictly within `radius` of `center` to `out`.
    pub fn find_neighbors<T, P>(&self, center: Point3<T>, radius: T, out: &mut Vec<P>)
    where
        T: Scalar,
        P: Clone,
        I: ProximityIndex<T, P>,
    {
        self.inner.borrow().find_neighbors(center, radius, out);
    }

    /// Bucket occupancy diagnostics of the underlying index.
    pub fn bin_population_stats<T, P>(&self) -> BinStats
    where
        T: Scalar,
        P: Clone,
        I: ProximityIndex<T, P>,
    {
        self.inner.borrow().bin_population_stats()
    }
}

/// A token that removes itself from its [`SharedIndex`] when dropped.
///
/// If the token is dropped while the index is borrowed (for example inside a
/// [`SharedIndex::with_index`] closure), removal is skipped and an error is
/// logged. The entry then stays registered for the life of the index and is
/// still counted by [`SharedIndex::population`] and returned by queries.
pub struct ProximityToken<T, P, I>
where
    T: Scalar,
    P: Clone,
    I: ProximityIndex<T, P>,
{
    index: Rc<RefCell<I>>,
    token: Token,
    _marker: PhantomData<fn() -> (T, P)>,
}

impl<T, P, I> ProximityToken<T, P, I>
where
    T: Scalar,
    P: Clone,
    I: ProximityIndex<T, P>,
{
    /// The raw handle inside the shared index.
    pub fn token(&self) -> Token {
        self.token
    }

    /// Record the object's new position.
    pub fn update_position(&mut self, position: Point3<T>) {
        self.index
            .borrow_mut()
            .update_position(self.token, position);
    }

    /// Last recorded position, `None` before the first update.
    pub fn position(&self) -> Option<Point3<T>> {
        self.index.borrow().position(self.token)
    }

    /// A copy of this token's payload.
    pub fn payload(&self) -> Option<P> {
        self.index.borrow().payload(self.token).cloned()
    }

    /// Append every payload strictly within `radius` of this token's position.
    /// The token's own payload is included. Does nothing before the first
    /// position update.
    pub fn find_neighbors(&self, radius: T, out: &mut Vec<P>) {
        let index = self.index.borrow();
        if let Some(center) = index.position(self.token) {
            index.find_neighbors(center, radius, out);
        }
    }

    /// Append every payload strictly within `radius` of `center`.
    pub fn find_neighbors_around(&self, center: Point3<T>, radius: T, out: &mut Vec<P>) {
        self.index.borrow().find_neighbors(center, radius, out);
    }

    /// Payload of the closest other token strictly within `radius`.
    pub fn find_nearest(&self, radius: T) -> Option<P> {
        let index = self.index.borrow();
        let center = index.position(self.token)?;
        let nearest = index.find_nearest(center, radius, Some(self.token))?;
        index.payload(nearest).cloned()
    }
}

impl<T, P, I> Drop for ProximityToken<T, P, I>
where
    T: Scalar,
    P: Clone,
    I: ProximityIndex<T, P>,
{
    fn drop(&mut self) {
        match self.index.try_borrow_mut() {
            Ok(mut index) => {
                index.remove_token(self.token);
            }
            Err(_) => {
                log::error!(
                    "proximity token {:?} dropped while its index was borrowed; it stays registered",
                    self.token
                );
            }
        }
    }
}

impl<T, P, I> Debug for ProximityToken<T, P, I>
where
    T: Scalar,
    P: Clone,
    I: ProximityIndex<T, P>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProximityToken")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
