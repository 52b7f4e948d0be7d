// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Token handles and the generational slot table that owns per-token data.

use alloc::vec::Vec;

use crate::types::Point3;

/// Generational handle for a tracked payload.
///
/// A token is returned by [`ProximityIndex::allocate_token`](crate::ProximityIndex::allocate_token)
/// and stays valid until it is passed to
/// [`ProximityIndex::remove_token`](crate::ProximityIndex::remove_token) or the index is cleared.
/// Slots are recycled with a bumped generation, so a stale token never aliases a newer one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token(u32, u32);

impl Token {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Token slots are intentionally 32-bit; bucket members store them as u32."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    pub(crate) const fn slot(self) -> u32 {
        self.0
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Where a positioned token lives: its last position and a backend-specific link
/// into the container that holds it.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Placement<T, L> {
    pub(crate) position: Point3<T>,
    pub(crate) link: L,
}

#[derive(Clone, Debug)]
pub(crate) struct Entry<T, P, L> {
    pub(crate) payload: P,
    /// `None` until the first position update.
    pub(crate) placement: Option<Placement<T, L>>,
}

#[derive(Clone, Debug)]
struct Slot<T, P, L> {
    generation: u32,
    entry: Option<Entry<T, P, L>>,
}

/// Slot storage shared by every index: payloads, positions, and back-links.
#[derive(Clone, Debug)]
pub(crate) struct TokenTable<T, P, L> {
    slots: Vec<Slot<T, P, L>>,
    free_list: Vec<usize>,
    live: usize,
}

impl<T, P, L> Default for TokenTable<T, P, L> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }
}

impl<T, P, L> TokenTable<T, P, L> {
    pub(crate) fn allocate(&mut self, payload: P) -> Token {
        let entry = Entry {
            payload,
            placement: None,
        };
        self.live += 1;
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx];
            slot.entry = Some(entry);
            Token::new(idx, slot.generation)
        } else {
            self.slots.push(Slot {
                generation: 1,
                entry: Some(entry),
            });
            Token::new(self.slots.len() - 1, 1)
        }
    }

    /// Take the entry out of its slot. The slot's generation is bumped so the
    /// removed token (and copies of it) stop resolving.
    pub(crate) fn remove(&mut self, token: Token) -> Option<Entry<T, P, L>> {
        let slot = self.slots.get_mut(token.idx())?;
        if slot.generation != token.1 {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1).max(1);
        self.free_list.push(token.idx());
        self.live -= 1;
        Some(entry)
    }

    /// Drop every entry and invalidate all outstanding tokens.
    pub(crate) fn clear(&mut self) {
        self.free_list.clear();
        for (idx, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.entry.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1).max(1);
            }
            self.free_list.push(idx);
        }
        self.live = 0;
    }

    pub(crate) fn get(&self, token: Token) -> Option<&Entry<T, P, L>> {
        let slot = self.slots.get(token.idx())?;
        if slot.generation != token.1 {
            return None;
        }
        slot.entry.as_ref()
    }

    pub(crate) fn get_mut(&mut self, token: Token) -> Option<&mut Entry<T, P, L>> {
        let slot = self.slots.get_mut(token.idx())?;
        if slot.generation != token.1 {
            return None;
        }
        slot.entry.as_mut()
    }

    /// Live entry stored at a raw slot, as recorded in a bucket or member list.
    #[inline]
    pub(crate) fn occupant(&self, slot: u32) -> Option<(Token, &Entry<T, P, L>)> {
        let s = self.slots.get(slot as usize)?;
        let entry = s.entry.as_ref()?;
        Some((Token(slot, s.generation), entry))
    }

    #[inline]
    pub(crate) fn occupant_mut(&mut self, slot: u32) -> Option<&mut Entry<T, P, L>> {
        self.slots.get_mut(slot as usize)?.entry.as_mut()
    }

    /// Number of live tokens.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Number of slots ever allocated, live or free.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Token, &Entry<T, P, L>)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.entry
                .as_ref()
                .map(|entry| (Token::new(idx, slot.generation), entry))
        })
    }
}

/// Swap-remove `members[at]`. Returns the slot that moved into `at`, if any,
/// so the caller can patch that token's back-link.
#[inline]
pub(crate) fn detach_member(members: &mut Vec<u32>, at: usize) -> Option<u32> {
    if at >= members.len() {
        return None;
    }
    members.swap_remove(at);
    members.get(at).copied()
}
