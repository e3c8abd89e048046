//! Sequentially-consistent load/store cells.
//!
//! The bakery protocol reasons about program-order visibility of every doorway
//! flag and ticket across threads, so each cross-thread field goes through one
//! of these wrappers. They pin the ordering to `SeqCst` and expose no
//! read-modify-write operation: the lock itself never needs one.
//!
//! Important:
//! - `SeqCst` here is a correctness requirement, not a tuning knob. Weaker
//!   orderings allow store buffering between the doorway flag and the ticket
//!   scan, which breaks mutual exclusion on weakly ordered hardware.

/// `SeqCst` boolean cell.
pub mod bool;
/// `SeqCst` usize cell.
pub mod usize;

pub use bool::SeqCstBool;
pub use usize::SeqCstUsize;
