//! Sequence producer
//!
//! Emits the items of a collection, honoring demand, then finishes.
//!
//! Emission is driven by `request`. Demand that arrives while values are
//! already being emitted (for instance from inside `receive_value`) is
//! added to the outstanding count and picked up by the running loop, so
//! the call stack never grows with the number of items.

use std::convert::Infallible;
use std::fmt;
use std::iter::Peekable;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::trace;

use super::{CombineId, Completion, Consumer, Demand, Producer, Subscription};
use crate::sync::AtomicCell;

/// A producer that replays a collection to each consumer.
pub struct Sequence<I, E = Infallible> {
    items: I,
    _failure: PhantomData<fn() -> E>,
}

impl<I> Sequence<I, Infallible> {
    pub fn new(items: I) -> Self {
        Self::with_failure(items)
    }
}

impl<I, E> Sequence<I, E> {
    /// A sequence that never fails but advertises failure type `E`, so it
    /// can feed stages expecting that failure type.
    pub fn with_failure(items: I) -> Self {
        Self {
            items,
            _failure: PhantomData,
        }
    }

    pub fn items(&self) -> &I {
        &self.items
    }
}

impl<I, E> Producer for Sequence<I, E>
where
    I: IntoIterator + Clone,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
    E: 'static,
{
    type Output = I::Item;
    type Failure = E;

    fn subscribe<C>(&self, consumer: C)
    where
        C: Consumer<Input = I::Item, Failure = E> + 'static,
    {
        let link = Arc::new(SequenceLink {
            id: CombineId::new(),
            cursor: AtomicCell::new(Cursor {
                items: Some(self.items.clone().into_iter().peekable()),
                demand: Demand::NONE,
                emitting: false,
            }),
            downstream: AtomicCell::new(Some(Arc::new(consumer))),
        });
        link.start();
    }
}

impl<I: fmt::Debug, E> fmt::Debug for Sequence<I, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("items", &self.items)
            .finish()
    }
}

impl<I: Clone, E> Clone for Sequence<I, E> {
    fn clone(&self) -> Self {
        Self::with_failure(self.items.clone())
    }
}

// ----------------------------------------------------------------------------
// Link
// ----------------------------------------------------------------------------

struct Cursor<It: Iterator> {
    /// `None` once finished or cancelled.
    items: Option<Peekable<It>>,
    demand: Demand,
    emitting: bool,
}

impl<It: Iterator> Cursor<It> {
    fn is_exhausted(&mut self) -> bool {
        self.items
            .as_mut()
            .is_some_and(|items| items.peek().is_none())
    }
}

enum Step<T> {
    Emit(T),
    Finish,
    Stop,
}

/// One consumer's view of a sequence. This is the subscription handed out.
struct SequenceLink<It: Iterator, C> {
    id: CombineId,
    cursor: AtomicCell<Cursor<It>>,
    downstream: AtomicCell<Option<Arc<C>>>,
}

impl<It, C> SequenceLink<It, C>
where
    It: Iterator + Send + 'static,
    It::Item: Send + 'static,
    C: Consumer<Input = It::Item> + 'static,
{
    fn start(self: &Arc<Self>) {
        let Some(downstream) = self.downstream.load() else {
            return;
        };
        downstream.receive_subscription(Arc::clone(self) as Arc<dyn Subscription>);

        // An empty sequence finishes without waiting for demand.
        if self.cursor.with_lock_mutating(Cursor::is_exhausted) {
            self.finish();
        }
    }

    fn drain(&self) {
        loop {
            let step = self.cursor.with_lock_mutating(|cursor| {
                if !cursor.demand.has_demand() {
                    cursor.emitting = false;
                    return Step::Stop;
                }
                let Some(items) = cursor.items.as_mut() else {
                    cursor.emitting = false;
                    return Step::Stop;
                };
                match items.next() {
                    Some(item) => {
                        cursor.demand -= 1;
                        Step::Emit(item)
                    }
                    None => Step::Finish,
                }
            });

            let item = match step {
                Step::Emit(item) => item,
                Step::Finish => return self.finish(),
                Step::Stop => return,
            };

            let Some(downstream) = self.downstream.load() else {
                return;
            };
            let more = downstream.receive_value(item);
            let exhausted = self.cursor.with_lock_mutating(|cursor| {
                cursor.demand += more;
                cursor.is_exhausted()
            });
            if exhausted {
                return self.finish();
            }
        }
    }

    fn finish(&self) {
        self.cursor.with_lock_mutating(|cursor| {
            cursor.items = None;
            cursor.emitting = false;
        });
        if let Some(downstream) = self.downstream.exchange(None) {
            trace!(id = %self.id, "sequence finished");
            downstream.receive_completion(Completion::Finished);
        }
    }
}

impl<It, C> Subscription for SequenceLink<It, C>
where
    It: Iterator + Send + 'static,
    It::Item: Send + 'static,
    C: Consumer<Input = It::Item> + 'static,
{
    fn request(&self, demand: Demand) {
        assert!(demand > Demand::NONE, "demand must be positive, got {}", demand);
        let should_drain = self.cursor.with_lock_mutating(|cursor| {
            if cursor.items.is_none() {
                return false;
            }
            cursor.demand += demand;
            !std::mem::replace(&mut cursor.emitting, true)
        });
        if should_drain {
            self.drain();
        }
    }

    fn cancel(&self) {
        self.cursor.with_lock_mutating(|cursor| cursor.items = None);
        if self.downstream.exchange(None).is_some() {
            trace!(id = %self.id, "sequence cancelled");
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::{Event, TestConsumer};

    #[test]
    fn emits_only_what_was_requested() {
        let consumer = Arc::new(TestConsumer::<i32, Infallible>::new(Demand::max(2)));

        Sequence::new(vec![1, 2, 3, 4]).subscribe(consumer.clone());
        assert_eq!(consumer.values(), vec![1, 2]);
        assert!(consumer.completions().is_empty());

        consumer.request(Demand::max(1));
        assert_eq!(consumer.values(), vec![1, 2, 3]);

        consumer.request(Demand::max(1));
        assert_eq!(consumer.values(), vec![1, 2, 3, 4]);
        assert_eq!(consumer.completions(), vec![Completion::Finished]);
    }

    #[test]
    fn finishes_with_the_last_item() {
        let consumer = Arc::new(TestConsumer::<i32, Infallible>::new(Demand::max(3)));

        Sequence::new(vec![1, 2, 3]).subscribe(consumer.clone());

        assert_eq!(
            consumer.events(),
            vec![
                Event::Subscription,
                Event::Value(1),
                Event::Value(2),
                Event::Value(3),
                Event::Completion(Completion::Finished),
            ]
        );
    }

    #[test]
    fn empty_sequence_finishes_without_demand() {
        let consumer = Arc::new(TestConsumer::<i32, Infallible>::new(Demand::NONE));

        Sequence::new(Vec::<i32>::new()).subscribe(consumer.clone());

        assert_eq!(
            consumer.events(),
            vec![Event::Subscription, Event::Completion(Completion::Finished)]
        );
    }

    #[test]
    fn demand_returned_from_values_is_honored() {
        let consumer = Arc::new(
            TestConsumer::<i32, Infallible>::new(Demand::max(1)).with_value_demand(Demand::max(1)),
        );

        Sequence::new(1..=100).subscribe(consumer.clone());

        assert_eq!(consumer.values().len(), 100);
        assert_eq!(consumer.completions(), vec![Completion::Finished]);
    }

    #[test]
    fn cancel_stops_emission() {
        let consumer = Arc::new(
            TestConsumer::<i32, Infallible>::new(Demand::UNBOUNDED).cancel_when(|v| *v == 2),
        );

        Sequence::new(vec![1, 2, 3]).subscribe(consumer.clone());

        assert_eq!(consumer.values(), vec![1, 2]);
        assert!(consumer.completions().is_empty());
    }

    #[test]
    fn every_consumer_gets_the_whole_sequence() {
        let sequence = Sequence::<_, String>::with_failure(vec!['a', 'b']);
        let first = Arc::new(TestConsumer::new(Demand::UNBOUNDED));
        let second = Arc::new(TestConsumer::new(Demand::UNBOUNDED));

        sequence.subscribe(first.clone());
        sequence.subscribe(second.clone());

        assert_eq!(first.values(), vec!['a', 'b']);
        assert_eq!(second.values(), vec!['a', 'b']);
    }

    #[test]
    #[should_panic(expected = "demand must be positive")]
    fn zero_request_is_a_precondition_failure() {
        let consumer = Arc::new(TestConsumer::<i32, Infallible>::new(Demand::NONE));
        Sequence::new(vec![1]).subscribe(consumer.clone());

        consumer.request(Demand::NONE);
    }
}
