//! Lamport's Bakery lock.
//!
//! Each participating thread owns one slot: a doorway flag ("choosing") and a
//! ticket. Acquisition happens in two phases:
//!
//! 1. **Doorway.** Raise the flag, take `1 + max(all tickets)`, publish it,
//!    lower the flag.
//! 2. **Waiting room.** For every other slot `k`, wait until `k` has left its
//!    doorway, then wait while `k` holds a ticket that beats ours under the
//!    lexicographic `(ticket, slot)` order.
//!
//! Releasing stores `0` into the caller's ticket. Each cell is written only by
//! its owning slot and read by everyone else, so the protocol needs nothing
//! beyond sequentially-consistent loads and stores.
//!
//! # Guarantees
//! - Mutual exclusion for up to `N` threads.
//! - First-come-first-served: a thread that finishes its doorway before
//!   another starts its own is served first.
//! - Requests with overlapping doorways are served in `(ticket, slot)` order.
//!
//! Waiting spins and yields the time slice on every iteration. There is no
//! parking, timeout, or reentrancy.

use core::fmt;
use core::marker::PhantomData;
use crate::concurrency::atomic::{SeqCstBool, SeqCstUsize};
use crossbeam_utils::CachePadded;
use std::thread::{self, ThreadId};
use super::diagnostics::{BakerySnapshot, SlotState};
use super::error::CapacityExceeded;
use super::registry::{SlotId, ThreadRegistry};
use super::spin_while;

/// A spin lock for at most `N` distinct threads, built on Lamport's Bakery
/// algorithm.
///
/// Threads are assigned slots on first use; the `N + 1`th distinct thread gets
/// [`CapacityExceeded`] instead of the lock.
///
/// # Example
///
/// ```rust
/// use bakery::BakeryLock;
///
/// let lock = BakeryLock::<2>::new();
/// std::thread::scope(|s| {
///     s.spawn(|| {
///         lock.acquire().unwrap();
///         // critical section
///         lock.release();
///     });
///     let guard = lock.lock().unwrap();
///     assert!(lock.ticket(guard.slot()) > 0);
/// });
/// ```
pub struct BakeryLock<const N: usize> {
    choosing: [CachePadded<SeqCstBool>; N],
    tickets: [CachePadded<SeqCstUsize>; N],
    registry: ThreadRegistry<N>,
}

impl<const N: usize> BakeryLock<N> {
    /// Creates an unlocked bakery with `N` free slots.
    ///
    /// Instantiating `BakeryLock<0>` fails to compile.
    pub fn new() -> Self {
        Self {
            choosing: core::array::from_fn(|_| CachePadded::new(SeqCstBool::new(false))),
            tickets: core::array::from_fn(|_| CachePadded::new(SeqCstUsize::new(0))),
            registry: ThreadRegistry::new(),
        }
    }

    /// Claims a slot for the calling thread without taking the lock.
    ///
    /// Registration otherwise happens lazily inside [`acquire`](Self::acquire).
    /// Calling this during setup surfaces an under-provisioned `N` before any
    /// thread is inside the protocol.
    ///
    /// # Errors
    /// Returns [`CapacityExceeded`] if all slots belong to other threads.
    #[inline]
    pub fn register(&self) -> Result<SlotId, CapacityExceeded> {
        self.registry.slot_for_current_thread()
    }

    /// Spins until the calling thread holds the lock.
    ///
    /// Every successful call must be paired with one [`release`](Self::release)
    /// from the same thread. Prefer [`lock`](Self::lock) for scoped use.
    ///
    /// # Errors
    /// Returns [`CapacityExceeded`] if the caller is a new thread and every slot
    /// is taken. The caller does not hold the lock in that case.
    ///
    /// # Panics
    /// In debug builds, panics if the calling thread already holds the lock or
    /// has a pending request. The lock is not reentrant; in release builds a
    /// nested acquire breaks mutual exclusion.
    pub fn acquire(&self) -> Result<(), CapacityExceeded> {
        let slot = self.registry.slot_for_current_thread()?;
        self.acquire_slot(slot);
        Ok(())
    }

    /// Releases the lock held by the calling thread.
    ///
    /// Only the current holder may call this. Releasing without holding the
    /// lock is a caller bug: it withdraws the caller's pending request, if any,
    /// and is otherwise not detected.
    pub fn release(&self) {
        let slot = self.registry.current_slot();
        debug_assert!(
            slot.is_some(),
            "release() called by a thread that never acquired this lock"
        );
        if let Some(slot) = slot {
            self.release_slot(slot);
        }
    }

    /// Acquires the lock and returns a guard that releases it on drop.
    ///
    /// # Errors
    /// Returns [`CapacityExceeded`] under the same conditions as
    /// [`acquire`](Self::acquire).
    ///
    /// # Panics
    /// In debug builds, panics if the calling thread already holds the lock or
    /// has a pending request. The lock is not reentrant; in release builds a
    /// nested acquire breaks mutual exclusion.
    pub fn lock(&self) -> Result<BakeryGuard<'_, N>, CapacityExceeded> {
        let slot = self.registry.slot_for_current_thread()?;
        self.acquire_slot(slot);
        Ok(BakeryGuard {
            lock: self,
            slot,
            _not_send: PhantomData,
        })
    }

    /// Runs `f` inside the critical section.
    ///
    /// # Errors
    /// Returns [`CapacityExceeded`] without running `f` if the caller cannot
    /// get a slot.
    pub fn with_lock<R>(&self, f: impl FnOnce() -> R) -> Result<R, CapacityExceeded> {
        let _guard = self.lock()?;
        Ok(f())
    }

    /// Lists every registered `(thread, slot)` pair, ordered by slot.
    #[inline]
    pub fn dump(&self) -> Vec<(ThreadId, SlotId)> {
        self.registry.dump()
    }

    /// Total number of slots.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The registry that assigns slots for this lock.
    #[inline]
    pub fn registry(&self) -> &ThreadRegistry<N> {
        &self.registry
    }

    /// Current ticket of `slot`; `0` means no pending request.
    ///
    /// # Panics
    /// Panics if `slot` does not belong to a lock of this capacity.
    #[inline]
    pub fn ticket(&self, slot: SlotId) -> usize {
        self.tickets[slot.index()].load()
    }

    /// Whether `slot` is currently inside its doorway.
    ///
    /// # Panics
    /// Panics if `slot` does not belong to a lock of this capacity.
    #[inline]
    pub fn is_choosing(&self, slot: SlotId) -> bool {
        self.choosing[slot.index()].load()
    }

    /// Reads every slot's doorway flag and ticket.
    ///
    /// Slots are read one after another, so under contention the result is
    /// not an atomic picture of the whole lock.
    pub fn snapshot(&self) -> BakerySnapshot {
        let slots = (0..N)
            .map(|index| {
                let slot = SlotId::new(index);
                SlotState::new(slot, self.is_choosing(slot), self.ticket(slot))
            })
            .collect();
        BakerySnapshot::new(N, self.registry.len(), slots)
    }

    pub(crate) fn acquire_slot(&self, slot: SlotId) {
        debug_assert_eq!(
            self.tickets[slot.index()].load(),
            0,
            "BakeryLock is not reentrant"
        );

        #[cfg(feature = "tracing")]
        tracing::trace!(slot = slot.index(), "entering bakery doorway");

        let ticket = self.doorway(slot);
        self.wait_turn(slot, ticket);

        #[cfg(feature = "tracing")]
        tracing::trace!(slot = slot.index(), ticket, "acquired bakery lock");
    }

    pub(crate) fn release_slot(&self, slot: SlotId) {
        self.tickets[slot.index()].store(0);

        #[cfg(feature = "tracing")]
        tracing::trace!(slot = slot.index(), "released bakery lock");
    }

    /// Runs the doorway for `slot` and returns the ticket it published.
    pub(crate) fn doorway(&self, slot: SlotId) -> usize {
        loop {
            self.enter_doorway(slot);
            // A maximal ticket cannot be exceeded. Step out so the holders of
            // large tickets can drain, then try again.
            if let Some(ticket) = self.max_ticket().checked_add(1) {
                self.publish_ticket(slot, ticket);
                self.leave_doorway(slot);
                return ticket;
            }
            self.leave_doorway(slot);
            thread::yield_now();
        }
    }

    #[inline]
    pub(crate) fn enter_doorway(&self, slot: SlotId) {
        self.choosing[slot.index()].store(true);
    }

    #[inline]
    pub(crate) fn leave_doorway(&self, slot: SlotId) {
        self.choosing[slot.index()].store(false);
    }

    #[inline]
    pub(crate) fn publish_ticket(&self, slot: SlotId, ticket: usize) {
        self.tickets[slot.index()].store(ticket);
    }

    pub(crate) fn max_ticket(&self) -> usize {
        self.tickets.iter().map(|t| t.load()).max().unwrap_or(0)
    }

    /// Spins until every other slot has either no request or a later one.
    pub(crate) fn wait_turn(&self, slot: SlotId, ticket: usize) {
        let me = slot.index();
        for other in (0..N).filter(|&k| k != me) {
            spin_while(|| self.choosing[other].load());
            spin_while(|| {
                let theirs = self.tickets[other].load();
                theirs != 0 && (theirs, other) < (ticket, me)
            });
        }
    }
}

impl<const N: usize> Default for BakeryLock<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for BakeryLock<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BakeryLock")
            .field("capacity", &N)
            .field("registered", &self.registry.len())
            .field("tickets", &self.tickets)
            .finish_non_exhaustive()
    }
}

/// Holds a [`BakeryLock`] until dropped.
///
/// The guard stays on the thread that acquired it, matching the slot it
/// releases.
#[must_use = "dropping the guard releases the lock immediately"]
pub struct BakeryGuard<'a, const N: usize> {
    lock: &'a BakeryLock<N>,
    slot: SlotId,
    _not_send: PhantomData<*const ()>,
}

impl<'a, const N: usize> BakeryGuard<'a, N> {
    /// The slot holding the lock.
    #[inline]
    pub fn slot(&self) -> SlotId {
        self.slot
    }
}

impl<'a, const N: usize> Drop for BakeryGuard<'a, N> {
    fn drop(&mut self) {
        self.lock.release_slot(self.slot);
    }
}

impl<'a, const N: usize> fmt::Debug for BakeryGuard<'a, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BakeryGuard")
            .field("slot", &self.slot)
            .field("ticket", &self.lock.ticket(self.slot))
            .finish()
    }
}
