use core::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};

/// An `AtomicBool` restricted to sequentially-consistent loads and stores.
#[repr(transparent)]
pub struct SeqCstBool {
    inner: AtomicBool,
}

impl SeqCstBool {
    /// Creates a new cell holding `value`.
    #[inline(always)]
    pub const fn new(value: bool) -> Self {
        Self {
            inner: AtomicBool::new(value),
        }
    }

    /// Loads the current value.
    #[inline(always)]
    pub fn load(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }

    /// Stores a new value.
    #[inline(always)]
    pub fn store(&self, value: bool) {
        self.inner.store(value, Ordering::SeqCst);
    }

    /// Returns the value through exclusive access.
    #[inline]
    pub fn into_inner(self) -> bool {
        self.inner.into_inner()
    }
}

impl Default for SeqCstBool {
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for SeqCstBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.load(), f)
    }
}
