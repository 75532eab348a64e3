//! Relay
//!
//! The generic stage. A `Relay` sits between one upstream subscription and
//! one downstream consumer and plays both roles at once: it is the
//! [`Consumer`] the upstream producer delivers to, and the [`Subscription`]
//! the downstream consumer requests from and cancels.
//!
//! # Protocol
//!
//! 1. `receive_subscription` accepts the first upstream subscription and
//!    presents the relay itself downstream. Any later subscription is
//!    cancelled on the spot.
//!
//! 2. Downstream requests are forwarded upstream while the link is live.
//!
//! 3. Values pass through the [`RelayHook`] while the link is live and are
//!    absorbed (no demand, no forwarding) otherwise.
//!
//! 4. Whichever terminal event reaches the state machine first, downstream
//!    `cancel` or upstream `receive_completion`, wins. It cancels the
//!    upstream subscription exactly once and releases the hook and the
//!    downstream consumer. The loser does nothing.
//!
//! # Ownership
//!
//! The downstream consumer holds the relay (as its subscription) and the
//! relay holds the downstream consumer. The cycle is broken explicitly:
//! the relay drops its references to the hook and the consumer the moment
//! the link terminates.

use std::fmt;
use std::sync::{Arc, Weak};

use tracing::{debug, trace};

use super::RelayHook;
use crate::flow::{CombineId, Completion, Consumer, Demand, Subscription, SubscriptionRef};
use crate::sync::{AtomicCell, RelayPhase, RelayStateMachine};

/// References a relay holds only while its link is live.
struct Links<H, S> {
    hook: Arc<H>,
    downstream: Arc<S>,
}

impl<H, S> Clone for Links<H, S> {
    fn clone(&self) -> Self {
        Self {
            hook: Arc::clone(&self.hook),
            downstream: Arc::clone(&self.downstream),
        }
    }
}

/// A stage instance mediating one upstream and one downstream link.
pub struct Relay<H, S> {
    id: CombineId,
    name: &'static str,
    state: RelayStateMachine,
    links: AtomicCell<Option<Links<H, S>>>,
    /// Handed downstream as the subscription.
    me: Weak<Self>,
}

impl<H, S> Relay<H, S>
where
    H: RelayHook,
    S: Consumer<Input = H::Output, Failure = H::Failure> + 'static,
{
    /// Create a relay in the `Waiting` state.
    ///
    /// The returned handle is what gets subscribed to the upstream
    /// producer.
    pub fn new(hook: H, downstream: S) -> Arc<Self> {
        let name = hook.name();
        Arc::new_cyclic(|me| Self {
            id: CombineId::new(),
            name,
            state: RelayStateMachine::new(),
            links: AtomicCell::new(Some(Links {
                hook: Arc::new(hook),
                downstream: Arc::new(downstream),
            })),
            me: me.clone(),
        })
    }
}

impl<H, S> Relay<H, S> {
    pub fn id(&self) -> CombineId {
        self.id
    }

    pub fn phase(&self) -> RelayPhase {
        self.state.phase()
    }

    /// Whether the hook and downstream consumer have been dropped.
    pub fn is_released(&self) -> bool {
        self.links.with_lock_mutating(|links| links.is_none())
    }

    fn release(&self) {
        // Dropped outside the lock; the consumer's destructor may run here.
        drop(self.links.exchange(None));
    }
}

impl<H, S> Consumer for Relay<H, S>
where
    H: RelayHook,
    S: Consumer<Input = H::Output, Failure = H::Failure> + 'static,
{
    type Input = H::Input;
    type Failure = H::Failure;

    fn receive_subscription(&self, subscription: SubscriptionRef) {
        if !self.state.try_start_relaying(&subscription) {
            debug!(stage = self.name, id = %self.id, "cancelling duplicate subscription");
            subscription.cancel();
            return;
        }
        trace!(stage = self.name, id = %self.id, "relaying");

        let Some(links) = self.links.load() else {
            return;
        };
        links.hook.receive_subscription(&subscription);
        if let Some(me) = self.me.upgrade() {
            links.downstream.receive_subscription(me);
        }
    }

    fn receive_value(&self, value: H::Input) -> Demand {
        if !self.state.is_relaying() {
            trace!(stage = self.name, id = %self.id, "absorbing value outside relaying state");
            return Demand::NONE;
        }
        let Some(links) = self.links.load() else {
            return Demand::NONE;
        };
        links.hook.receive_value(value, &*links.downstream)
    }

    fn receive_completion(&self, completion: Completion<H::Failure>) {
        let Some(subscription) = self.state.finish_if_relaying() else {
            trace!(stage = self.name, id = %self.id, "absorbing completion outside relaying state");
            return;
        };
        // Upstream should already be terminal; this guards misbehaving producers.
        subscription.cancel();

        let Some(links) = self.links.exchange(None) else {
            return;
        };
        debug!(
            stage = self.name,
            id = %self.id,
            failed = completion.is_failure(),
            "completing"
        );
        links.hook.receive_completion(completion, &*links.downstream);
    }
}

impl<H, S> Subscription for Relay<H, S>
where
    H: RelayHook,
    S: Consumer<Input = H::Output, Failure = H::Failure> + 'static,
{
    fn request(&self, demand: Demand) {
        assert!(demand > Demand::NONE, "demand must be positive, got {}", demand);
        let Some(links) = self.links.load() else {
            return;
        };
        self.state.request_if_relaying(links.hook.request(demand));
    }

    fn cancel(&self) {
        if let Some(subscription) = self.state.finish() {
            debug!(stage = self.name, id = %self.id, "cancelling upstream");
            subscription.cancel();
        }
        self.release();
    }
}

impl<H, S> fmt::Display for Relay<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl<H, S> fmt::Debug for Relay<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relay")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("phase", &self.phase())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
