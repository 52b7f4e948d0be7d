// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Brute-force backend with linear scans. Small and simple; good for tiny sets
//! and as the reference for checking other backends.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::proximity::{ProximityIndex, radius_is_positive};
use crate::token::{Placement, Token, TokenTable, detach_member};
use crate::types::{Point3, Scalar};

/// Proximity index that checks every tracked point on each query.
///
/// Positioned tokens are kept in a dense member list; each token remembers its
/// member index so removal is an O(1) swap-remove by identity.
pub struct BruteForceIndex<T, P> {
    table: TokenTable<T, P, usize>,
    members: Vec<u32>,
}

impl<T, P> BruteForceIndex<T, P> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            table: TokenTable::default(),
            members: Vec::new(),
        }
    }
}

impl<T, P> Default for BruteForceIndex<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> Debug for BruteForceIndex<T, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BruteForceIndex")
            .field("total_slots", &self.table.capacity())
            .field("alive", &self.table.len())
            .field("positioned", &self.members.len())
            .finish_non_exhaustive()
    }
}

impl<T: Scalar, P: Clone> ProximityIndex<T, P> for BruteForceIndex<T, P> {
    fn allocate_token(&mut self, payload: P) -> Token {
        self.table.allocate(payload)
    }

    fn remove_token(&mut self, token: Token) -> Option<P> {
        let entry = self.table.remove(token)?;
        if let Some(placement) = entry.placement
            && let Some(moved) = detach_member(&mut self.members, placement.link)
            && let Some(p) = self
                .table
                .occupant_mut(moved)
                .and_then(|e| e.placement.as_mut())
        {
            p.link = placement.link;
        }
        Some(entry.payload)
    }

    fn update_position(&mut self, token: Token, position: Point3<T>) -> bool {
        let Some(entry) = self.table.get_mut(token) else {
            return false;
        };
        match entry.placement.as_mut() {
            Some(p) => p.position = position,
            None => {
                self.members.push(token.slot());
                entry.placement = Some(Placement {
                    position,
                    link: self.members.len() - 1,
                });
            }
        }
        true
    }

    fn for_each_in_radius(
        &self,
        center: Point3<T>,
        radius: T,
        visit: &mut dyn FnMut(Token, &P, Point3<T>, T),
    ) {
        if !radius_is_positive(radius) {
            return;
        }
        let r2 = radius * radius;
        for &slot in &self.members {
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

    fn for_each_token(&self, visit: &mut dyn FnMut(Token, &P, Option<Point3<T>>)) {
        for (token, entry) in self.table.iter() {
            visit(token, &entry.payload, entry.placement.map(|p| p.position));
        }
    }

    fn population(&self) -> usize {
        self.table.len()
    }

    fn clear(&mut self) {
        self.table.clear();
        self.members.clear();
    }

    fn position(&self, token: Token) -> Option<Point3<T>> {
        self.table.get(token)?.placement.map(|p| p.position)
    }

    fn payload(&self, token: Token) -> Option<&P> {
        self.table.get(token).map(|e| &e.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn sorted(mut v: Vec<u32>) -> Vec<u32> {
        v.sort_unstable();
        v
    }

    #[test]
    fn finds_points_strictly_inside_radius() {
        let mut idx = BruteForceIndex::<f32, u32>::new();
        let a = idx.allocate_token(1);
        let b = idx.allocate_token(2);
        let c = idx.allocate_token(3);
        idx.update_position(a, Point3::new(0.0, 0.0, 0.0));
        idx.update_position(b, Point3::new(3.0, 4.0, 0.0));
        idx.update_position(c, Point3::new(10.0, 0.0, 0.0));

        let mut out = Vec::new();
        idx.find_neighbors(Point3::new(0.0, 0.0, 0.0), 5.0, &mut out);
        assert_eq!(sorted(out), vec![1], "distance == radius is excluded");

        let mut out = Vec::new();
        idx.find_neighbors(Point3::new(0.0, 0.0, 0.0), 5.001, &mut out);
        assert_eq!(sorted(out), vec![1, 2]);
    }

    #[test]
    fn results_accumulate() {
        let mut idx = BruteForceIndex::<f64, u32>::new();
        let a = idx.allocate_token(7);
        idx.update_position(a, Point3::splat(1.0));
        let mut out = vec![99];
        idx.find_neighbors(Point3::splat(1.0), 1.0, &mut out);
        idx.find_neighbors(Point3::splat(1.0), 1.0, &mut out);
        assert_eq!(out, vec![99, 7, 7]);
    }

    #[test]
    fn unpositioned_tokens_count_but_are_not_found() {
        let mut idx = BruteForceIndex::<f32, u32>::new();
        let _ = idx.allocate_token(1);
        assert_eq!(idx.population(), 1);
        let mut out = Vec::new();
        idx.find_neighbors(Point3::splat(0.0), 1.0e6, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn non_positive_radius_matches_nothing() {
        let mut idx = BruteForceIndex::<f32, u32>::new();
        let a = idx.allocate_token(1);
        idx.update_position(a, Point3::splat(0.0));
        let mut out = Vec::new();
        idx.find_neighbors(Point3::splat(0.0), 0.0, &mut out);
        idx.find_neighbors(Point3::splat(0.0), -1.0, &mut out);
        idx.find_neighbors(Point3::splat(0.0), f32::NAN, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn removal_is_by_identity_and_patches_moved_member() {
        // Equal payloads must not confuse removal.
        let mut idx = BruteForceIndex::<f32, u32>::new();
        let a = idx.allocate_token(5);
        let b = idx.allocate_token(5);
        let c = idx.allocate_token(6);
        idx.update_position(a, Point3::new(0.0, 0.0, 0.0));
        idx.update_position(b, Point3::new(1.0, 0.0, 0.0));
        idx.update_position(c, Point3::new(2.0, 0.0, 0.0));

        assert_eq!(idx.remove_token(a), Some(5));
        assert_eq!(idx.remove_token(a), None);
        assert_eq!(idx.population(), 2);

        // `c` was swapped into `a`'s member slot; it must still be removable.
        assert_eq!(idx.remove_token(c), Some(6));
        let mut out = Vec::new();
        idx.find_neighbors(Point3::splat(0.0), 100.0, &mut out);
        assert_eq!(out, vec![5]);
        assert_eq!(idx.position(b), Some(Point3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn stale_token_update_is_rejected() {
        let mut idx = BruteForceIndex::<f32, u32>::new();
        let a = idx.allocate_token(1);
        idx.remove_token(a);
        assert!(!idx.update_position(a, Point3::splat(0.0)));
        assert!(!idx.contains(a));
    }

    #[test]
    fn reports_default_bin_stats() {
        let mut idx = BruteForceIndex::<f32, u32>::new();
        let a = idx.allocate_token(1);
        idx.update_position(a, Point3::splat(0.0));
        let stats = idx.bin_population_stats();
        assert_eq!((stats.min, stats.max, stats.average), (0, 0, 0.0));
    }

    #[test]
    fn nearest_skips_ignored_token() {
        let mut idx = BruteForceIndex::<f32, u32>::new();
        let me = idx.allocate_token(0);
        let near = idx.allocate_token(1);
        let far = idx.allocate_token(2);
        idx.update_position(me, Point3::splat(0.0));
        idx.update_position(near, Point3::new(1.0, 0.0, 0.0));
        idx.update_position(far, Point3::new(2.0, 0.0, 0.0));

        assert_eq!(idx.find_nearest(Point3::splat(0.0), 5.0, None), Some(me));
        assert_eq!(idx.find_nearest(Point3::splat(0.0), 5.0, Some(me)), Some(near));
        assert_eq!(idx.find_nearest(Point3::splat(0.0), 0.5, Some(me)), None);
    }
}
