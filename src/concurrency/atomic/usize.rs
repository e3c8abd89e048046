use core::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
};

/// An `AtomicUsize` restricted to sequentially-consistent loads and stores.
///
/// There is deliberately no `fetch_add` or `compare_exchange`: a value is only
/// ever written by a single owner, and readers observe it with plain loads.
#[repr(transparent)]
pub struct SeqCstUsize {
    inner: AtomicUsize,
}

impl SeqCstUsize {
    /// Creates a new cell holding `value`.
    #[inline(always)]
    pub const fn new(value: usize) -> Self {
        Self {
            inner: AtomicUsize::new(value),
        }
    }

    /// Loads the current value.
    #[inline(always)]
    pub fn load(&self) -> usize {
        self.inner.load(Ordering::SeqCst)
    }

    /// Stores a new value.
    #[inline(always)]
    pub fn store(&self, value: usize) {
        self.inner.store(value, Ordering::SeqCst);
    }

    /// Returns the value through exclusive access.
    #[inline]
    pub fn into_inner(self) -> usize {
        self.inner.into_inner()
    }
}

impl Default for SeqCstUsize {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for SeqCstUsize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.load(), f)
    }
}
