//! Atomic Cell
//!
//! `AtomicCell<T>` is the single mutation surface for every field that more
//! than one execution context can touch. Stage state, accumulators and the
//! downstream links held by a relay all live inside one.
//!
//! # Thread Safety
//!
//! Every operation takes the same `parking_lot::Mutex`, so all operations on
//! one cell are linearizable with respect to each other. The lock is only
//! held for the duration of the operation itself.
//!
//! # Reentrancy
//!
//! The lock is not reentrant. Closures passed to
//! [`AtomicCell::with_lock_mutating`] must not touch the same cell, and must
//! never call out into a consumer or subscription. Callers copy what they
//! need out of the cell first (`load`, `exchange`) and make the call after
//! the lock is released.

use std::fmt::{self, Debug};

use parking_lot::Mutex;

/// A thread-safe mutable container.
///
/// # Example
///
/// ```rust
/// use relay_core::sync::AtomicCell;
///
/// let cell = AtomicCell::new(1);
/// assert!(cell.compare_and_store(&1, 2));
/// assert!(!cell.compare_and_store(&1, 3));
/// cell.with_lock_mutating(|v| *v *= 10);
/// assert_eq!(cell.load(), 20);
/// ```
pub struct AtomicCell<T> {
    value: Mutex<T>,
}

impl<T> AtomicCell<T> {
    /// Create a new cell holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
        }
    }

    /// Get a clone of the current value.
    pub fn load(&self) -> T
    where
        T: Clone,
    {
        self.value.lock().clone()
    }

    /// Replace the current value.
    ///
    /// The previous value is dropped while the lock is held. Use
    /// [`exchange`](Self::exchange) when dropping it may run user code.
    pub fn store(&self, value: T) {
        *self.value.lock() = value;
    }

    /// Store `new` iff the current value equals `expected`.
    ///
    /// Returns whether the store happened.
    pub fn compare_and_store(&self, expected: &T, new: T) -> bool
    where
        T: PartialEq,
    {
        let mut guard = self.value.lock();
        if *guard == *expected {
            *guard = new;
            true
        } else {
            false
        }
    }

    /// Replace the current value and return the previous one.
    pub fn exchange(&self, value: T) -> T {
        std::mem::replace(&mut *self.value.lock(), value)
    }

    /// Run `f` against the value inside a single critical section.
    pub fn with_lock_mutating<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self.value.lock();
        f(&mut guard)
    }

    /// Consume the cell and return the value.
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: Default> Default for AtomicCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Debug> Debug for AtomicCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.try_lock() {
            Some(guard) => f.debug_tuple("AtomicCell").field(&*guard).finish(),
            None => f.write_str("AtomicCell(<locked>)"),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
