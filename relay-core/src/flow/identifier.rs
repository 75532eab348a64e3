//! Identifiers for stages and consumers.
//!
//! Every relay stage and sink gets a process-unique id when created. The id
//! shows up in `Debug` output and in log fields, which makes it possible to
//! follow one link of a chain through interleaved trace output.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Unique identifier for a stage or consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CombineId(u64);

impl CombineId {
    /// Generate a new unique id.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The id of a shared object, derived from its address.
    ///
    /// Every handle to the same allocation yields the same id for as long
    /// as the allocation is alive.
    pub fn of<T: ?Sized>(object: &Arc<T>) -> Self {
        Self(Arc::as_ptr(object) as *const () as usize as u64)
    }

    /// The raw numeric value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for CombineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CombineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
