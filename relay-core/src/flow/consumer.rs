//! Consumer
//!
//! The receiving end of a link. A consumer gets exactly one subscription,
//! then zero or more values, then at most one completion.

use std::sync::Arc;

use super::{Completion, Demand, SubscriptionRef};

/// The producer → consumer half of a link.
///
/// Producers serialize calls to one consumer: `receive_value` and
/// `receive_completion` never overlap in time for the same consumer.
pub trait Consumer: Send + Sync {
    /// The type of values this consumer accepts.
    type Input;

    /// The type of failure this consumer accepts.
    type Failure;

    /// Called once when the producer attaches this consumer.
    ///
    /// The consumer stores the subscription (or cancels it) before it
    /// requests any demand.
    fn receive_subscription(&self, subscription: SubscriptionRef);

    /// Called for each value.
    ///
    /// Returns the additional demand to add to the outstanding total.
    fn receive_value(&self, value: Self::Input) -> Demand;

    /// Called at most once. No callbacks follow.
    fn receive_completion(&self, completion: Completion<Self::Failure>);
}

impl<C: Consumer + ?Sized> Consumer for Arc<C> {
    type Input = C::Input;
    type Failure = C::Failure;

    fn receive_subscription(&self, subscription: SubscriptionRef) {
        (**self).receive_subscription(subscription);
    }

    fn receive_value(&self, value: Self::Input) -> Demand {
        (**self).receive_value(value)
    }

    fn receive_completion(&self, completion: Completion<Self::Failure>) {
        (**self).receive_completion(completion);
    }
}

/// Shared handle to a type-erased consumer.
pub type ConsumerRef<I, E> = Arc<dyn Consumer<Input = I, Failure = E>>;
