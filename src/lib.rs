//! # `bakery` - Lamport's Bakery Lock
//!
//! A mutual-exclusion lock for a fixed number `N` of threads that needs no
//! compare-and-swap or other read-modify-write instruction. Every shared cell
//! is written by exactly one thread and read by the others with
//! sequentially-consistent loads.
//!
//! ## Guarantees
//!
//! ### Safety
//! - **Mutual exclusion**: at most one thread is between a successful
//!   `acquire()` and its `release()`.
//! - **Bounded slots**: the `N + 1`th distinct thread receives
//!   [`CapacityExceeded`] instead of indexing past the per-slot arrays.
//!
//! ### Fairness
//! - **First-come-first-served**: a thread that finishes choosing its ticket
//!   before another starts choosing is served first.
//! - **Deterministic ties**: overlapping doorways that draw the same ticket
//!   are ordered by slot id.
//!
//! ### Progress
//! - **Deadlock freedom**: every `acquire()` returns as long as each holder
//!   eventually releases.
//! - **No blocking**: waiters spin and yield their time slice each iteration.
//!
//! ## Architecture
//!
//! 1. **SeqCst cells** ([`SeqCstBool`], [`SeqCstUsize`]): load/store-only
//!    atomics pinned to `Ordering::SeqCst`.
//! 2. **Thread registry** ([`ThreadRegistry`]): maps `ThreadId` to a dense
//!    [`SlotId`] under its own `RwLock`, used only on first contact.
//! 3. **Bakery lock** ([`BakeryLock`]): per-slot doorway flags and tickets,
//!    each on its own cache line.
//!
//! ## Example
//!
//! ```rust
//! use bakery::BakeryLock;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let lock = BakeryLock::<4>::new();
//! let hits = AtomicUsize::new(0);
//!
//! std::thread::scope(|s| {
//!     for _ in 0..4 {
//!         s.spawn(|| {
//!             for _ in 0..100 {
//!                 let _guard = lock.lock().unwrap();
//!                 hits.fetch_add(1, Ordering::Relaxed);
//!             }
//!         });
//!     }
//! });
//!
//! assert_eq!(hits.load(Ordering::Relaxed), 400);
//! assert_eq!(lock.dump().len(), 4);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod concurrency;

pub use concurrency::atomic::{SeqCstBool, SeqCstUsize};
pub use concurrency::sync::{
    BakeryGuard, BakeryLock, BakerySnapshot, CapacityExceeded, SlotId, SlotPhase, SlotState,
    ThreadRegistry,
};

// Compile-time assertions for memory layout
const _: () = {
    use core::mem;
    use core::sync::atomic::{AtomicBool, AtomicUsize};

    // The cells are `repr(transparent)` over the std atomics.
    assert!(mem::size_of::<SeqCstBool>() == mem::size_of::<AtomicBool>());
    assert!(mem::size_of::<SeqCstUsize>() == mem::size_of::<AtomicUsize>());

    // Each slot's doorway flag and ticket sit on separate cache lines.
    assert!(
        mem::size_of::<crossbeam_utils::CachePadded<SeqCstBool>>()
            == mem::align_of::<crossbeam_utils::CachePadded<SeqCstBool>>()
    );

    // Slot ids add nothing over the index they wrap.
    assert!(mem::size_of::<SlotId>() == mem::size_of::<usize>());
};
