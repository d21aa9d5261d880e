//! A minimal `UnsafeCell` wrapper that opts into `Send + Sync`.
//!
//! Used for statics whose synchronization is handled externally by the
//! kernel's [`CriticalSection`](crate::lock::CriticalSection) rather than
//! by the type system — the task pool and primitive storage are accessed
//! only while the lock is held.

use core::cell::UnsafeCell;

/// An `UnsafeCell` wrapper that implements `Send` and `Sync`.
///
/// # Safety
///
/// The caller must ensure all accesses are properly synchronised.
#[repr(transparent)]
pub struct RacyCell<T>(UnsafeCell<T>);

// SAFETY: the user of `RacyCell` guarantees synchronisation externally.
unsafe impl<T: Send> Send for RacyCell<T> {}
// SAFETY: same as above.
unsafe impl<T: Sync> Sync for RacyCell<T> {}

impl<T> RacyCell<T> {
    /// Creates a new `RacyCell` wrapping `value`.
    #[inline]
    pub const fn new(value: T) -> Self {
        Self(UnsafeCell::new(value))
    }

    /// Returns a raw pointer to the underlying data.
    #[inline]
    pub const fn get(&self) -> *mut T {
        self.0.get()
    }

    /// Returns a mutable reference to the underlying data.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.0.get_mut()
    }
}
