//! Hand-driven producer.

use std::fmt;
use std::sync::Arc;

use crate::flow::{Consumer, ConsumerRef, Producer};
use crate::sync::AtomicCell;

type SubscribeBody<O, E> = Arc<dyn Fn(ConsumerRef<O, E>) + Send + Sync>;

/// A producer whose behaviour is a closure over each attached consumer.
///
/// The closure decides everything: which subscription to hand out, which
/// values to send and when to complete. This makes it possible to script
/// misbehaving producers (duplicate subscriptions, values after
/// completion) as well as well-behaved ones.
pub struct ManualProducer<O, E> {
    body: SubscribeBody<O, E>,
}

impl<O, E> ManualProducer<O, E>
where
    O: 'static,
    E: 'static,
{
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(ConsumerRef<O, E>) + Send + Sync + 'static,
    {
        Self {
            body: Arc::new(body),
        }
    }

    /// A producer that stores the most recently attached consumer in the
    /// returned slot and does nothing else.
    pub fn capturing() -> (Self, ConsumerSlot<O, E>) {
        let slot = ConsumerSlot {
            consumer: Arc::new(AtomicCell::new(None)),
        };
        let captured = slot.clone();
        let producer = Self::new(move |consumer| captured.consumer.store(Some(consumer)));
        (producer, slot)
    }
}

impl<O, E> Producer for ManualProducer<O, E>
where
    O: 'static,
    E: 'static,
{
    type Output = O;
    type Failure = E;

    fn subscribe<C>(&self, consumer: C)
    where
        C: Consumer<Input = O, Failure = E> + 'static,
    {
        (self.body)(Arc::new(consumer));
    }
}

impl<O, E> Clone for ManualProducer<O, E> {
    fn clone(&self) -> Self {
        Self {
            body: Arc::clone(&self.body),
        }
    }
}

impl<O, E> fmt::Debug for ManualProducer<O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ManualProducer")
    }
}

/// Slot filled by [`ManualProducer::capturing`].
pub struct ConsumerSlot<O, E> {
    consumer: Arc<AtomicCell<Option<ConsumerRef<O, E>>>>,
}

impl<O, E> ConsumerSlot<O, E> {
    /// The captured consumer, if any producer call has happened yet.
    pub fn get(&self) -> Option<ConsumerRef<O, E>> {
        self.consumer.load()
    }

    /// Take the captured consumer out of the slot.
    pub fn take(&self) -> Option<ConsumerRef<O, E>> {
        self.consumer.exchange(None)
    }
}

impl<O, E> Clone for ConsumerSlot<O, E> {
    fn clone(&self) -> Self {
        Self {
            consumer: Arc::clone(&self.consumer),
        }
    }
}
