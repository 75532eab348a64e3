//! Producer
//!
//! Anything that emits values over time to the consumers attached to it.

use super::Consumer;

/// A source of values.
///
/// `subscribe` may be called many times with different consumers. Fan-out
/// is the producer's responsibility; each call creates an independent link.
pub trait Producer {
    /// The type of values this producer emits.
    type Output;

    /// The type of failure this producer may complete with.
    type Failure;

    /// Attach `consumer`.
    ///
    /// The producer eventually calls back into the consumer, starting with
    /// [`Consumer::receive_subscription`].
    fn subscribe<C>(&self, consumer: C)
    where
        C: Consumer<Input = Self::Output, Failure = Self::Failure> + 'static;
}
