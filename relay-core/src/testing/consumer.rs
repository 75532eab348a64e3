//! Recording consumer.

use std::fmt;

use crate::flow::{CombineId, Completion, Consumer, Demand, SubscriptionRef};
use crate::sync::AtomicCell;

/// One callback observed by a [`TestConsumer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<I, E> {
    Subscription,
    Value(I),
    Completion(Completion<E>),
}

type CancelPredicate<I> = Box<dyn Fn(&I) -> bool + Send + Sync>;

/// A consumer that records every callback in order.
///
/// On subscription it requests `initial_demand` (nothing if that is
/// `Demand::NONE`); every value returns `value_demand`.
pub struct TestConsumer<I, E> {
    id: CombineId,
    subscription: AtomicCell<Option<SubscriptionRef>>,
    events: AtomicCell<Vec<Event<I, E>>>,
    initial_demand: Demand,
    value_demand: Demand,
    cancel_when: Option<CancelPredicate<I>>,
}

impl<I, E> TestConsumer<I, E> {
    pub fn new(initial_demand: Demand) -> Self {
        Self {
            id: CombineId::new(),
            subscription: AtomicCell::new(None),
            events: AtomicCell::new(Vec::new()),
            initial_demand,
            value_demand: Demand::NONE,
            cancel_when: None,
        }
    }

    /// Demand returned from every `receive_value`.
    pub fn with_value_demand(mut self, demand: Demand) -> Self {
        self.value_demand = demand;
        self
    }

    /// Cancel the held subscription from inside `receive_value` when
    /// `predicate` matches the value. The value is still recorded.
    pub fn cancel_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&I) -> bool + Send + Sync + 'static,
    {
        self.cancel_when = Some(Box::new(predicate));
        self
    }

    pub fn id(&self) -> CombineId {
        self.id
    }

    /// The subscription received, until completion or cancel.
    pub fn subscription(&self) -> Option<SubscriptionRef> {
        self.subscription.load()
    }

    /// Request more demand on the held subscription.
    pub fn request(&self, demand: Demand) {
        if let Some(subscription) = self.subscription() {
            subscription.request(demand);
        }
    }

    /// Cancel and release the held subscription.
    pub fn cancel(&self) {
        if let Some(subscription) = self.subscription.exchange(None) {
            subscription.cancel();
        }
    }

    pub fn events(&self) -> Vec<Event<I, E>>
    where
        I: Clone,
        E: Clone,
    {
        self.events.load()
    }

    pub fn values(&self) -> Vec<I>
    where
        I: Clone,
    {
        self.events.with_lock_mutating(|events| {
            events
                .iter()
                .filter_map(|event| match event {
                    Event::Value(value) => Some(value.clone()),
                    _ => None,
                })
                .collect()
        })
    }

    pub fn completions(&self) -> Vec<Completion<E>>
    where
        E: Clone,
    {
        self.events.with_lock_mutating(|events| {
            events
                .iter()
                .filter_map(|event| match event {
                    Event::Completion(completion) => Some(completion.clone()),
                    _ => None,
                })
                .collect()
        })
    }

    fn record(&self, event: Event<I, E>) {
        self.events.with_lock_mutating(|events| events.push(event));
    }
}

impl<I, E> Consumer for TestConsumer<I, E>
where
    I: Send,
    E: Send,
{
    type Input = I;
    type Failure = E;

    fn receive_subscription(&self, subscription: SubscriptionRef) {
        self.record(Event::Subscription);
        self.subscription.store(Some(subscription.clone()));
        if self.initial_demand.has_demand() {
            subscription.request(self.initial_demand);
        }
    }

    fn receive_value(&self, value: I) -> Demand {
        let cancel = self
            .cancel_when
            .as_ref()
            .is_some_and(|predicate| predicate(&value));
        self.record(Event::Value(value));

        if cancel {
            self.cancel();
            return Demand::NONE;
        }
        self.value_demand
    }

    fn receive_completion(&self, completion: Completion<E>) {
        self.record(Event::Completion(completion));
        drop(self.subscription.exchange(None));
    }
}

impl<I, E> fmt::Debug for TestConsumer<I, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestConsumer")
            .field("id", &self.id)
            .field("initial_demand", &self.initial_demand)
            .field("value_demand", &self.value_demand)
            .finish()
    }
}
