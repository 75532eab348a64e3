//! Breakpoint Stage
//!
//! A passthrough stage that raises a debugger trap when one of its
//! predicates matches. Values and completions are forwarded unchanged,
//! the only effect is the trap itself.
//!
//! # Example
//!
//! ```rust,ignore
//! let stage = producer.breakpoint(
//!     BreakpointConfig::new()
//!         .on_value(|v: &i32| *v == 42)
//!         .trap(LoggingTrap),
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use super::{DebuggerTrap, Relay, RelayHook, TrapHandler, TrapSite};
use crate::flow::{Completion, Consumer, Demand, Producer, SubscriptionRef};

type SubscriptionPredicate = Arc<dyn Fn(&SubscriptionRef) -> bool + Send + Sync>;
type ValuePredicate<O> = Arc<dyn Fn(&O) -> bool + Send + Sync>;
type CompletionPredicate<E> = Arc<dyn Fn(&Completion<E>) -> bool + Send + Sync>;

/// When a breakpoint stage traps, and how.
///
/// Every predicate is optional; a missing predicate never traps. The trap
/// handler defaults to [`DebuggerTrap`].
pub struct BreakpointConfig<O, E> {
    receive_subscription: Option<SubscriptionPredicate>,
    receive_value: Option<ValuePredicate<O>>,
    receive_completion: Option<CompletionPredicate<E>>,
    trap: Arc<dyn TrapHandler>,
}

impl<O, E> BreakpointConfig<O, E> {
    /// A configuration that never traps.
    pub fn new() -> Self {
        Self {
            receive_subscription: None,
            receive_value: None,
            receive_completion: None,
            trap: Arc::new(DebuggerTrap),
        }
    }

    /// Trap on failure completions only.
    pub fn on_error() -> Self
    where
        E: 'static,
    {
        Self::new().on_completion(Completion::is_failure)
    }

    /// Trap when `predicate` matches the upstream subscription.
    pub fn on_subscription<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&SubscriptionRef) -> bool + Send + Sync + 'static,
    {
        self.receive_subscription = Some(Arc::new(predicate));
        self
    }

    /// Trap when `predicate` matches a value.
    pub fn on_value<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&O) -> bool + Send + Sync + 'static,
    {
        self.receive_value = Some(Arc::new(predicate));
        self
    }

    /// Trap when `predicate` matches the completion.
    pub fn on_completion<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Completion<E>) -> bool + Send + Sync + 'static,
    {
        self.receive_completion = Some(Arc::new(predicate));
        self
    }

    /// Replace the trap handler.
    pub fn trap<T>(mut self, handler: T) -> Self
    where
        T: TrapHandler + 'static,
    {
        self.trap = Arc::new(handler);
        self
    }

    fn check(&self, site: TrapSite, matched: bool) {
        if matched {
            tracing::debug!(%site, "breakpoint predicate matched");
            self.trap.raise(site);
        }
    }
}

impl<O, E> Default for BreakpointConfig<O, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O, E> Clone for BreakpointConfig<O, E> {
    fn clone(&self) -> Self {
        Self {
            receive_subscription: self.receive_subscription.clone(),
            receive_value: self.receive_value.clone(),
            receive_completion: self.receive_completion.clone(),
            trap: Arc::clone(&self.trap),
        }
    }
}

impl<O, E> fmt::Debug for BreakpointConfig<O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BreakpointConfig")
            .field("receive_subscription", &self.receive_subscription.is_some())
            .field("receive_value", &self.receive_value.is_some())
            .field("receive_completion", &self.receive_completion.is_some())
            .finish()
    }
}

/// A producer that traps when a configured predicate matches.
pub struct Breakpoint<P: Producer> {
    upstream: P,
    config: Arc<BreakpointConfig<P::Output, P::Failure>>,
}

impl<P: Producer> Breakpoint<P> {
    pub fn new(upstream: P, config: BreakpointConfig<P::Output, P::Failure>) -> Self {
        Self {
            upstream,
            config: Arc::new(config),
        }
    }

    pub fn upstream(&self) -> &P {
        &self.upstream
    }
}

impl<P> Producer for Breakpoint<P>
where
    P: Producer,
    P::Output: Send + 'static,
    P::Failure: Send + 'static,
{
    type Output = P::Output;
    type Failure = P::Failure;

    fn subscribe<C>(&self, consumer: C)
    where
        C: Consumer<Input = P::Output, Failure = P::Failure> + 'static,
    {
        let hook = BreakpointHook {
            config: Arc::clone(&self.config),
        };
        self.upstream.subscribe(Relay::new(hook, consumer));
    }
}

impl<P: Producer + fmt::Debug> fmt::Debug for Breakpoint<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Breakpoint")
            .field("upstream", &self.upstream)
            .field("config", &self.config)
            .finish()
    }
}

/// Per-link half of the breakpoint stage.
struct BreakpointHook<O, E> {
    config: Arc<BreakpointConfig<O, E>>,
}

impl<O, E> RelayHook for BreakpointHook<O, E>
where
    O: Send + 'static,
    E: Send + 'static,
{
    type Input = O;
    type Output = O;
    type Failure = E;

    fn name(&self) -> &'static str {
        "Breakpoint"
    }

    fn receive_subscription(&self, subscription: &SubscriptionRef) {
        if let Some(predicate) = &self.config.receive_subscription {
            self.config.check(TrapSite::Subscription, predicate(subscription));
        }
    }

    fn receive_value<S>(&self, value: O, downstream: &S) -> Demand
    where
        S: Consumer<Input = O, Failure = E> + ?Sized,
    {
        if let Some(predicate) = &self.config.receive_value {
            self.config.check(TrapSite::Value, predicate(&value));
        }
        downstream.receive_value(value)
    }

    fn receive_completion<S>(&self, completion: Completion<E>, downstream: &S)
    where
        S: Consumer<Input = O, Failure = E> + ?Sized,
    {
        if let Some(predicate) = &self.config.receive_completion {
            self.config.check(TrapSite::Completion, predicate(&completion));
        }
        downstream.receive_completion(completion);
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use crate::sync::AtomicCell;
    use crate::testing::{Event, ManualProducer, TestConsumer, TestSubscription};

    /// A trap handler that records where it fired.
    fn recording_trap() -> (Arc<AtomicCell<Vec<TrapSite>>>, impl TrapHandler + 'static) {
        let sites = Arc::new(AtomicCell::new(Vec::new()));
        let sites_clone = sites.clone();
        let handler = move |site: TrapSite| sites_clone.with_lock_mutating(|s| s.push(site));
        (sites, handler)
    }

    fn script(values: Vec<i32>, end: Completion<&'static str>) -> ManualProducer<i32, &'static str> {
        ManualProducer::new(move |consumer| {
            consumer.receive_subscription(Arc::new(TestSubscription::new()));
            for v in &values {
                consumer.receive_value(*v);
            }
            consumer.receive_completion(end);
        })
    }

    #[test]
    fn passthrough_when_no_predicate_matches() {
        let (sites, trap) = recording_trap();
        let config = BreakpointConfig::new()
            .on_subscription(|_| false)
            .on_value(|_| false)
            .on_completion(|_| false)
            .trap(trap);
        let stage = Breakpoint::new(script(vec![1, 2, 3], Completion::Finished), config);
        let consumer = Arc::new(TestConsumer::new(Demand::UNBOUNDED));

        stage.subscribe(consumer.clone());

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
        assert!(sites.load().is_empty());
    }

    #[test]
    fn value_trap_fires_once_and_value_is_forwarded() {
        let (sites, trap) = recording_trap();
        let consumer = Arc::new(TestConsumer::<i32, &'static str>::new(Demand::UNBOUNDED));
        let observed = consumer.clone();

        // Record how many values reached downstream when the trap fired.
        let at_trap = Arc::new(AtomicCell::new(None));
        let at_trap_clone = at_trap.clone();
        let config = BreakpointConfig::new()
            .on_value(|v: &i32| *v == 2)
            .trap(move |site: TrapSite| {
                at_trap_clone.store(Some(observed.values().len()));
                trap.raise(site);
            });

        Breakpoint::new(script(vec![1, 2, 3], Completion::Finished), config)
            .subscribe(consumer.clone());

        assert_eq!(sites.load(), vec![TrapSite::Value]);
        assert_eq!(at_trap.load(), Some(1));
        assert_eq!(consumer.values(), vec![1, 2, 3]);
    }

    #[test]
    fn subscription_trap_fires_before_downstream_sees_subscription() {
        let consumer = Arc::new(TestConsumer::<i32, &'static str>::new(Demand::NONE));
        let observed = consumer.clone();
        let seen_events = Arc::new(AtomicCell::new(None));
        let seen_clone = seen_events.clone();

        let config = BreakpointConfig::new()
            .on_subscription(|_| true)
            .trap(move |_site: TrapSite| seen_clone.store(Some(observed.events().len())));

        Breakpoint::new(script(vec![], Completion::Finished), config).subscribe(consumer.clone());

        assert_eq!(seen_events.load(), Some(0));
    }

    #[test]
    fn on_error_traps_only_failures() {
        let (sites, trap) = recording_trap();
        let consumer = Arc::new(TestConsumer::new(Demand::UNBOUNDED));
        Breakpoint::new(
            script(vec![1], Completion::Finished),
            BreakpointConfig::on_error().trap(trap),
        )
        .subscribe(consumer.clone());
        assert!(sites.load().is_empty());

        let (sites, trap) = recording_trap();
        let consumer = Arc::new(TestConsumer::new(Demand::UNBOUNDED));
        Breakpoint::new(
            script(vec![1], Completion::Failed("boom")),
            BreakpointConfig::on_error().trap(trap),
        )
        .subscribe(consumer.clone());

        assert_eq!(sites.load(), vec![TrapSite::Completion]);
        assert_eq!(consumer.completions(), vec![Completion::Failed("boom")]);
    }

    #[test]
    fn failure_is_forwarded_verbatim() {
        let consumer = Arc::new(TestConsumer::new(Demand::UNBOUNDED));
        Breakpoint::new(
            script(vec![7], Completion::Failed("E")),
            BreakpointConfig::new().trap(PanicTrap),
        )
        .subscribe(consumer.clone());

        assert_eq!(
            consumer.events(),
            vec![
                Event::Subscription,
                Event::Value(7),
                Event::Completion(Completion::Failed("E")),
            ]
        );
    }

    #[test]
    fn requests_pass_through_unchanged() {
        let upstream = Arc::new(TestSubscription::new());
        let handed_out = upstream.clone();
        let producer = ManualProducer::<i32, ()>::new(move |consumer| {
            consumer.receive_subscription(handed_out.clone());
        });
        let consumer = Arc::new(TestConsumer::new(Demand::max(3)));

        Breakpoint::new(producer, BreakpointConfig::new()).subscribe(consumer.clone());
        consumer.request(Demand::max(2));

        assert_eq!(upstream.requests(), vec![Demand::max(3), Demand::max(2)]);
    }

    #[test]
    fn each_subscribe_creates_an_independent_link() {
        let stage = Breakpoint::new(
            script(vec![1, 2], Completion::Finished),
            BreakpointConfig::new(),
        );
        let first = Arc::new(TestConsumer::new(Demand::UNBOUNDED));
        let second = Arc::new(TestConsumer::new(Demand::UNBOUNDED));

        stage.subscribe(first.clone());
        stage.subscribe(second.clone());

        assert_eq!(first.values(), vec![1, 2]);
        assert_eq!(second.values(), vec![1, 2]);
    }

    #[cfg(unix)]
    #[test]
    fn default_trap_raises_sigtrap_and_forwards() {
        use std::sync::atomic::{AtomicBool, Ordering};

        use signal_hook::consts::SIGTRAP;

        // Handled in-process so the trap does not terminate the test binary.
        let trapped = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(SIGTRAP, Arc::clone(&trapped)).unwrap();

        let consumer = Arc::new(TestConsumer::new(Demand::UNBOUNDED));
        Breakpoint::new(
            script(vec![1, 2], Completion::Finished),
            BreakpointConfig::new()
                .on_value(|v: &i32| *v == 2)
                .trap(DebuggerTrap),
        )
        .subscribe(consumer.clone());

        assert!(trapped.load(Ordering::SeqCst));
        assert_eq!(consumer.values(), vec![1, 2]);
        assert_eq!(consumer.completions(), vec![Completion::Finished]);
    }

    struct PanicTrap;

    impl TrapHandler for PanicTrap {
        fn raise(&self, _site: TrapSite) {
            panic!("no predicate configured, trap must not fire");
        }
    }
}
