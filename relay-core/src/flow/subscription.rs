//! Subscription
//!
//! The consumer-facing handle of one producer/consumer link. The consumer
//! pulls values by requesting demand and ends the link by cancelling.

use std::sync::Arc;

use super::Demand;

/// The consumer → producer half of a link.
pub trait Subscription: Send + Sync {
    /// Ask for `demand` more values.
    ///
    /// Demand accumulates. Requesting `Demand::NONE` is a contract
    /// violation.
    fn request(&self, demand: Demand);

    /// Stop the link.
    ///
    /// Idempotent. After the first call the producer stops delivering
    /// values and completions to this link.
    fn cancel(&self);
}

/// Shared handle to a type-erased subscription.
pub type SubscriptionRef = Arc<dyn Subscription>;

impl<S: Subscription + ?Sized> Subscription for Arc<S> {
    fn request(&self, demand: Demand) {
        (**self).request(demand);
    }

    fn cancel(&self) {
        (**self).cancel();
    }
}

/// A subscription that ignores requests and cancels.
///
/// Handed out by producers that never emit anything, and used to reject
/// links that were never meant to carry values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptySubscription;

impl EmptySubscription {
    /// A shared, type-erased empty subscription.
    pub fn shared() -> SubscriptionRef {
        Arc::new(EmptySubscription)
    }
}

impl Subscription for EmptySubscription {
    fn request(&self, _demand: Demand) {}

    fn cancel(&self) {}
}
