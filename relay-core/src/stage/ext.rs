//! Combinator methods on every producer.

use std::sync::Arc;

use super::{Breakpoint, BreakpointConfig, Reduce};
use crate::flow::{Completion, Producer, Sink};

/// Chaining helpers for building pipelines.
///
/// ```rust,ignore
/// let sum = Sequence::new(vec![1, 2, 3])
///     .breakpoint_on_error()
///     .reduce(0, |acc, v| acc + v)
///     .sink(|_| {}, |total| println!("{total}"));
/// ```
pub trait ProducerExt: Producer + Sized {
    fn breakpoint(self, config: BreakpointConfig<Self::Output, Self::Failure>) -> Breakpoint<Self> {
        Breakpoint::new(self, config)
    }

    /// Trap only when the stream fails.
    fn breakpoint_on_error(self) -> Breakpoint<Self>
    where
        Self::Failure: 'static,
    {
        Breakpoint::new(self, BreakpointConfig::on_error())
    }

    fn reduce<T, F>(self, initial: T, fold: F) -> Reduce<Self, T>
    where
        F: Fn(T, Self::Output) -> T + Send + Sync + 'static,
    {
        Reduce::new(self, initial, fold)
    }

    /// Attach a [`Sink`] and return it. Dropping the returned handle does
    /// not cancel; call [`Sink::cancel`] for that.
    fn sink<C, V>(self, receive_completion: C, receive_value: V) -> Arc<Sink<Self::Output, Self::Failure>>
    where
        Self::Output: 'static,
        Self::Failure: 'static,
        C: Fn(Completion<Self::Failure>) + Send + Sync + 'static,
        V: Fn(Self::Output) + Send + Sync + 'static,
    {
        let sink = Arc::new(Sink::new(receive_completion, receive_value));
        self.subscribe(Arc::clone(&sink));
        sink
    }
}

impl<P: Producer> ProducerExt for P {}
