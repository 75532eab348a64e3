//! Reduce Stage
//!
//! Folds every upstream value into an accumulator and publishes the final
//! accumulated value once upstream finishes.
//!
//! # How Reduce Works
//!
//! 1. Every downstream request, whatever its size, is turned into an
//!    unbounded request upstream. The stage needs the whole stream to
//!    produce its one value.
//!
//! 2. Each upstream value is folded into the accumulator inside a single
//!    critical section. No demand is returned; the upstream is already
//!    unbounded.
//!
//! 3. On `Finished` the accumulator is taken out exactly once and sent
//!    downstream, immediately followed by `Finished`.
//!
//! 4. On `Failed` the accumulator is dropped and only the failure is
//!    forwarded. Partial results are never published.

use std::fmt;
use std::sync::Arc;

use super::{Relay, RelayHook};
use crate::flow::{Completion, Consumer, Demand, Producer};
use crate::sync::AtomicCell;

type Fold<T, I> = Arc<dyn Fn(T, I) -> T + Send + Sync>;

/// A producer that emits one accumulated value when its upstream finishes.
pub struct Reduce<P: Producer, T> {
    upstream: P,
    initial: T,
    fold: Fold<T, P::Output>,
}

impl<P: Producer, T> Reduce<P, T> {
    pub fn new<F>(upstream: P, initial: T, fold: F) -> Self
    where
        F: Fn(T, P::Output) -> T + Send + Sync + 'static,
    {
        Self {
            upstream,
            initial,
            fold: Arc::new(fold),
        }
    }

    /// The value the first fold starts from.
    pub fn initial(&self) -> &T {
        &self.initial
    }

    pub fn upstream(&self) -> &P {
        &self.upstream
    }
}

impl<P, T> Producer for Reduce<P, T>
where
    P: Producer,
    P::Output: Send + 'static,
    P::Failure: Send + 'static,
    T: Clone + Send + 'static,
{
    type Output = T;
    type Failure = P::Failure;

    fn subscribe<C>(&self, consumer: C)
    where
        C: Consumer<Input = T, Failure = P::Failure> + 'static,
    {
        let hook = ReduceHook::<P::Output, T, P::Failure> {
            fold: Arc::clone(&self.fold),
            accumulator: AtomicCell::new(Some(self.initial.clone())),
            _failure: std::marker::PhantomData,
        };
        self.upstream.subscribe(Relay::new(hook, consumer));
    }
}

impl<P, T> fmt::Debug for Reduce<P, T>
where
    P: Producer + fmt::Debug,
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reduce")
            .field("upstream", &self.upstream)
            .field("initial", &self.initial)
            .finish_non_exhaustive()
    }
}

/// Per-link half of the reduce stage. Owns the accumulator.
struct ReduceHook<I, T, E> {
    fold: Fold<T, I>,
    /// `None` once the final value has been taken or discarded.
    accumulator: AtomicCell<Option<T>>,
    _failure: std::marker::PhantomData<fn() -> E>,
}

impl<I, T, E> RelayHook for ReduceHook<I, T, E>
where
    I: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    type Input = I;
    type Output = T;
    type Failure = E;

    fn name(&self) -> &'static str {
        "Reduce"
    }

    fn request(&self, _demand: Demand) -> Demand {
        Demand::UNBOUNDED
    }

    fn receive_value<S>(&self, value: I, _downstream: &S) -> Demand
    where
        S: Consumer<Input = T, Failure = E> + ?Sized,
    {
        self.accumulator.with_lock_mutating(|slot| {
            if let Some(current) = slot.take() {
                *slot = Some((self.fold)(current, value));
            }
        });
        Demand::NONE
    }

    fn receive_completion<S>(&self, completion: Completion<E>, downstream: &S)
    where
        S: Consumer<Input = T, Failure = E> + ?Sized,
    {
        let output = self.accumulator.exchange(None);
        match completion {
            Completion::Failed(err) => {
                drop(output);
                downstream.receive_completion(Completion::Failed(err));
            }
            Completion::Finished => {
                if let Some(output) = output {
                    let _ = downstream.receive_value(output);
                }
                downstream.receive_completion(Completion::Finished);
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
