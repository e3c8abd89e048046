//! Spin-based mutual exclusion for a fixed set of threads.
//!
//! [`BakeryLock`] implements Lamport's Bakery algorithm on top of the
//! `SeqCst` cells in [`crate::concurrency::atomic`]. [`ThreadRegistry`] hands
//! each thread its slot. Nothing here parks a thread: waiting is a
//! yield-per-iteration spin.

pub mod bakery;
pub mod diagnostics;
pub mod error;
pub mod registry;

pub use bakery::{BakeryGuard, BakeryLock};
pub use diagnostics::{BakerySnapshot, SlotPhase, SlotState};
pub use error::CapacityExceeded;
pub use registry::{SlotId, ThreadRegistry};

/// Spins while `condition` holds, yielding the time slice on each iteration.
///
/// Yielding keeps the thread being waited on runnable when there are fewer
/// hardware threads than contenders.
#[inline]
pub(crate) fn spin_while(mut condition: impl FnMut() -> bool) {
    while condition() {
        std::thread::yield_now();
    }
}
