//! Empty producer.

use std::fmt;
use std::marker::PhantomData;

use super::{Completion, Consumer, EmptySubscription, Producer};

/// A producer that never emits a value.
///
/// It either finishes as soon as a consumer attaches, or stays silent
/// forever.
pub struct Empty<O, E> {
    complete_immediately: bool,
    _marker: PhantomData<fn() -> (O, E)>,
}

impl<O, E> Empty<O, E> {
    /// An empty producer that finishes immediately.
    pub fn new() -> Self {
        Self::with_completion(true)
    }

    /// An empty producer that never completes.
    pub fn never() -> Self {
        Self::with_completion(false)
    }

    pub fn with_completion(complete_immediately: bool) -> Self {
        Self {
            complete_immediately,
            _marker: PhantomData,
        }
    }

    pub fn completes_immediately(&self) -> bool {
        self.complete_immediately
    }
}

impl<O, E> Producer for Empty<O, E> {
    type Output = O;
    type Failure = E;

    fn subscribe<C>(&self, consumer: C)
    where
        C: Consumer<Input = O, Failure = E> + 'static,
    {
        consumer.receive_subscription(EmptySubscription::shared());
        if self.complete_immediately {
            consumer.receive_completion(Completion::Finished);
        }
    }
}

impl<O, E> Default for Empty<O, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O, E> Clone for Empty<O, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O, E> Copy for Empty<O, E> {}

impl<O, E> PartialEq for Empty<O, E> {
    fn eq(&self, other: &Self) -> bool {
        self.complete_immediately == other.complete_immediately
    }
}

impl<O, E> Eq for Empty<O, E> {}

impl<O, E> fmt::Debug for Empty<O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Empty")
            .field("complete_immediately", &self.complete_immediately)
            .finish()
    }
}
