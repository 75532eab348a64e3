//! Recording subscription.

use std::fmt;

use crate::flow::{Demand, Subscription};
use crate::sync::AtomicCell;

/// A subscription that records what its consumer asked of it.
#[derive(Default)]
pub struct TestSubscription {
    requests: AtomicCell<Vec<Demand>>,
    cancels: AtomicCell<usize>,
    on_request: Option<Box<dyn Fn(Demand) + Send + Sync>>,
    on_cancel: Option<Box<dyn Fn() + Send + Sync>>,
}

impl TestSubscription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` on every request, after it is recorded.
    pub fn on_request<F>(mut self, f: F) -> Self
    where
        F: Fn(Demand) + Send + Sync + 'static,
    {
        self.on_request = Some(Box::new(f));
        self
    }

    /// Run `f` on every cancel, after it is recorded.
    pub fn on_cancel<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_cancel = Some(Box::new(f));
        self
    }

    /// Every demand requested so far, in order.
    pub fn requests(&self) -> Vec<Demand> {
        self.requests.load()
    }

    /// How many times `cancel` was called.
    pub fn cancel_count(&self) -> usize {
        self.cancels.load()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_count() > 0
    }
}

impl Subscription for TestSubscription {
    fn request(&self, demand: Demand) {
        self.requests.with_lock_mutating(|requests| requests.push(demand));
        if let Some(on_request) = &self.on_request {
            on_request(demand);
        }
    }

    fn cancel(&self) {
        self.cancels.with_lock_mutating(|count| *count += 1);
        if let Some(on_cancel) = &self.on_cancel {
            on_cancel();
        }
    }
}

impl fmt::Debug for TestSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSubscription")
            .field("requests", &self.requests())
            .field("cancels", &self.cancel_count())
            .finish()
    }
}
