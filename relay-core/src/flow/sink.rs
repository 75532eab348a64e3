//! Sink
//!
//! The simplest useful consumer: it requests unbounded demand and hands
//! every value and the completion to closures.
//!
//! A sink holds its subscription from the moment it arrives until the
//! stream completes or the sink is cancelled. Like a stage, it accepts only
//! one subscription; any other is cancelled on arrival.

use std::fmt;

use tracing::debug;

use super::{CombineId, Completion, Consumer, Demand, SubscriptionRef};
use crate::sync::{RelayPhase, RelayStateMachine};

type ValueHandler<I> = Box<dyn Fn(I) + Send + Sync>;
type CompletionHandler<E> = Box<dyn Fn(Completion<E>) + Send + Sync>;

/// A consumer that forwards everything to closures.
pub struct Sink<I, E> {
    id: CombineId,
    state: RelayStateMachine,
    receive_value: ValueHandler<I>,
    receive_completion: CompletionHandler<E>,
}

impl<I, E> Sink<I, E> {
    pub fn new<C, V>(receive_completion: C, receive_value: V) -> Self
    where
        C: Fn(Completion<E>) + Send + Sync + 'static,
        V: Fn(I) + Send + Sync + 'static,
    {
        Self {
            id: CombineId::new(),
            state: RelayStateMachine::new(),
            receive_value: Box::new(receive_value),
            receive_completion: Box::new(receive_completion),
        }
    }

    pub fn id(&self) -> CombineId {
        self.id
    }

    /// Cancel and release the held subscription.
    ///
    /// Any subscription that arrives afterwards is cancelled too.
    pub fn cancel(&self) {
        if let Some(subscription) = self.state.finish() {
            debug!(id = %self.id, "sink cancelled");
            subscription.cancel();
        }
    }

    /// Whether a subscription is currently held.
    pub fn is_subscribed(&self) -> bool {
        self.state.is_relaying()
    }

    pub fn phase(&self) -> RelayPhase {
        self.state.phase()
    }
}

impl<I, E> Consumer for Sink<I, E> {
    type Input = I;
    type Failure = E;

    fn receive_subscription(&self, subscription: SubscriptionRef) {
        if self.state.try_start_relaying(&subscription) {
            subscription.request(Demand::UNBOUNDED);
        } else {
            subscription.cancel();
        }
    }

    fn receive_value(&self, value: I) -> Demand {
        (self.receive_value)(value);
        Demand::NONE
    }

    fn receive_completion(&self, completion: Completion<E>) {
        (self.receive_completion)(completion);
        // Released, not cancelled: the upstream is already done.
        drop(self.state.finish());
    }
}

impl<I, E> fmt::Debug for Sink<I, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("id", &self.id)
            .field("phase", &self.phase())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
