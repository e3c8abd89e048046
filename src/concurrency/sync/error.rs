//! Error returned when a lock runs out of thread slots.

use core::fmt;

/// Returned when a new thread touches a lock whose slots are all taken.
///
/// Capacity is fixed at construction, so retrying cannot succeed. Treat this as
/// a configuration error: the lock was provisioned for fewer threads than use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityExceeded {
    capacity: usize,
}

impl CapacityExceeded {
    pub(crate) const fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// The number of slots the lock was built with.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl fmt::Display for CapacityExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bakery lock capacity of {} threads exceeded",
            self.capacity
        )
    }
}

impl std::error::Error for CapacityExceeded {}
