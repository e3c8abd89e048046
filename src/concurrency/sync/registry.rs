//! Dense thread-slot assignment for the bakery lock.
//!
//! Every thread that interacts with a lock needs a small integer index into the
//! lock's per-slot arrays. The registry hands those out on first contact and
//! keeps them for its whole lifetime; slots are never reclaimed when a thread
//! exits.
//!
//! The map is guarded by its own `RwLock`. That lock is only about bootstrap:
//! it serializes first-time registrations and is never held while the bakery
//! protocol runs.

use core::fmt;
use crate::concurrency::atomic::SeqCstUsize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::thread::{self, ThreadId};
use super::error::CapacityExceeded;

/// Index of a thread's doorway flag and ticket inside a lock, in `[0, N)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(usize);

impl SlotId {
    #[inline]
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw array index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Maps `ThreadId`s to slots for a lock of capacity `N`.
pub struct ThreadRegistry<const N: usize> {
    slots: RwLock<HashMap<ThreadId, SlotId>>,
    /// Next slot to hand out. Written only under the write lock.
    next: SeqCstUsize,
}

impl<const N: usize> ThreadRegistry<N> {
    const NONZERO_CAPACITY: () = assert!(N > 0, "a bakery lock needs at least one slot");

    /// Creates an empty registry.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NONZERO_CAPACITY;
        Self {
            slots: RwLock::new(HashMap::with_capacity(N)),
            next: SeqCstUsize::new(0),
        }
    }

    /// Returns the calling thread's slot, registering it on first call.
    ///
    /// # Errors
    /// Returns [`CapacityExceeded`] if `N` other threads already hold slots.
    /// A failed call does not consume a slot.
    pub fn slot_for_current_thread(&self) -> Result<SlotId, CapacityExceeded> {
        let id = thread::current().id();
        match self.lookup(id) {
            Some(slot) => Ok(slot),
            None => self.register(id),
        }
    }

    /// Returns the calling thread's slot without registering it.
    #[inline]
    pub fn current_slot(&self) -> Option<SlotId> {
        self.lookup(thread::current().id())
    }

    fn lookup(&self, id: ThreadId) -> Option<SlotId> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
    }

    #[cold]
    fn register(&self, id: ThreadId) -> Result<SlotId, CapacityExceeded> {
        // Only the thread itself inserts its own key, so no other writer can
        // have registered `id` between the read above and this write.
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);

        let index = self.next.load();
        if index >= N {
            #[cfg(feature = "tracing")]
            tracing::warn!(?id, capacity = N, "bakery registry is full");
            return Err(CapacityExceeded::new(N));
        }

        let slot = SlotId::new(index);
        slots.insert(id, slot);
        self.next.store(index + 1);

        #[cfg(feature = "tracing")]
        tracing::debug!(?id, slot = index, "registered thread with bakery lock");

        Ok(slot)
    }

    /// Number of threads registered so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.next.load()
    }

    /// Returns `true` if no thread has registered yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once every slot has an owner.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= N
    }

    /// Total number of slots.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Lists every registered `(thread, slot)` pair, ordered by slot.
    ///
    /// This is a debugging aid. It takes a consistent view of the map, but the
    /// map may change the moment the call returns.
    pub fn dump(&self) -> Vec<(ThreadId, SlotId)> {
        let mut entries: Vec<_> = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(&id, &slot)| (id, slot))
            .collect();
        entries.sort_unstable_by_key(|&(_, slot)| slot);
        entries
    }
}

impl<const N: usize> Default for ThreadRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for ThreadRegistry<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadRegistry")
            .field("capacity", &N)
            .field("registered", &self.len())
            .finish_non_exhaustive()
    }
}
