//! Concurrency primitives.
//!
//! Important: everything here assumes OS threads running in parallel. Waiting
//! is done by spinning with a scheduler yield, never by blocking.

pub mod atomic;
pub mod sync;
