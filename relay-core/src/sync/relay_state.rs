//! Relay State Machine
//!
//! Every stage guards its link to the upstream subscription with a
//! three-state lifecycle:
//!
//! ```text
//! Waiting ──try_start_relaying──▶ Relaying(subscription) ──finish_if_relaying──▶ Finished
//!    │                                                                              ▲
//!    └────────────────────────────────finish────────────────────────────────────────┘
//! ```
//!
//! Transitions only move forward. Each one happens inside a single critical
//! section of an [`AtomicCell`], so when a downstream cancel races an
//! upstream completion exactly one of them observes `Relaying` and gets the
//! subscription back. The loser observes `Finished` and does nothing.
//!
//! The held subscription is released as soon as the machine enters
//! `Finished`.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::AtomicCell;
use crate::flow::{Demand, SubscriptionRef};

/// State of a stage's upstream link.
#[derive(Clone, Default)]
pub enum RelayState {
    /// No subscription has arrived yet.
    #[default]
    Waiting,

    /// The upstream subscription is held and the link is live.
    Relaying(SubscriptionRef),

    /// The link terminated. No further transition is possible.
    Finished,
}

impl RelayState {
    /// The held subscription, if relaying.
    pub fn subscription(&self) -> Option<&SubscriptionRef> {
        match self {
            RelayState::Relaying(subscription) => Some(subscription),
            _ => None,
        }
    }

    /// The phase without the payload.
    pub fn phase(&self) -> RelayPhase {
        match self {
            RelayState::Waiting => RelayPhase::Waiting,
            RelayState::Relaying(_) => RelayPhase::Relaying,
            RelayState::Finished => RelayPhase::Finished,
        }
    }
}

impl fmt::Debug for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.phase(), f)
    }
}

/// Payload-free view of a [`RelayState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayPhase {
    Waiting,
    Relaying,
    Finished,
}

/// The relay state guarded by an atomic cell.
#[derive(Debug, Default)]
pub struct RelayStateMachine {
    state: AtomicCell<RelayState>,
}

impl RelayStateMachine {
    /// Create a machine in the `Waiting` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transition `Waiting → Relaying(subscription)`.
    ///
    /// Returns `false` if a subscription was already accepted or the link
    /// already finished. The caller then owns the rejected subscription and
    /// must cancel it.
    pub fn try_start_relaying(&self, subscription: &SubscriptionRef) -> bool {
        self.state.with_lock_mutating(|state| match state {
            RelayState::Waiting => {
                *state = RelayState::Relaying(Arc::clone(subscription));
                true
            }
            _ => false,
        })
    }

    /// Transition `Relaying → Finished`, returning the released subscription.
    ///
    /// Returns `None` when still waiting or already finished; in that case
    /// nothing changes.
    pub fn finish_if_relaying(&self) -> Option<SubscriptionRef> {
        self.state.with_lock_mutating(|state| {
            if !matches!(state, RelayState::Relaying(_)) {
                return None;
            }
            match std::mem::replace(state, RelayState::Finished) {
                RelayState::Relaying(subscription) => Some(subscription),
                _ => None,
            }
        })
    }

    /// Transition to `Finished` from any state.
    ///
    /// Returns the released subscription iff the state was `Relaying`. A
    /// link cancelled while still waiting goes straight to `Finished`, so a
    /// subscription arriving later is rejected.
    pub fn finish(&self) -> Option<SubscriptionRef> {
        let previous = self.state.exchange(RelayState::Finished);
        trace!(previous = ?previous.phase(), "relay finished");
        match previous {
            RelayState::Relaying(subscription) => Some(subscription),
            _ => None,
        }
    }

    /// Forward `demand` to the held subscription iff relaying.
    ///
    /// The request is made after the lock is released, so the subscription
    /// may call straight back into the stage.
    pub fn request_if_relaying(&self, demand: Demand) {
        if let Some(subscription) = self.subscription() {
            subscription.request(demand);
        }
    }

    /// A clone of the held subscription, if relaying.
    pub fn subscription(&self) -> Option<SubscriptionRef> {
        self.state
            .with_lock_mutating(|state| state.subscription().cloned())
    }

    pub fn phase(&self) -> RelayPhase {
        self.state.with_lock_mutating(|state| state.phase())
    }

    pub fn is_relaying(&self) -> bool {
        self.phase() == RelayPhase::Relaying
    }

    pub fn is_finished(&self) -> bool {
        self.phase() == RelayPhase::Finished
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    use crate::testing::TestSubscription;

    fn subscription() -> (Arc<TestSubscription>, SubscriptionRef) {
        let sub = Arc::new(TestSubscription::new());
        let erased: SubscriptionRef = sub.clone();
        (sub, erased)
    }

    #[test]
    fn starts_waiting() {
        let machine = RelayStateMachine::new();
        assert_eq!(machine.phase(), RelayPhase::Waiting);
        assert!(machine.subscription().is_none());
    }

    #[test]
    fn accepts_only_the_first_subscription() {
        let machine = RelayStateMachine::new();
        let (_, first) = subscription();
        let (_, second) = subscription();

        assert!(machine.try_start_relaying(&first));
        assert!(!machine.try_start_relaying(&second));

        let held = machine.subscription().unwrap();
        assert!(Arc::ptr_eq(&held, &first));
    }

    #[test]
    fn finish_if_relaying_releases_once() {
        let machine = RelayStateMachine::new();
        let (_, sub) = subscription();
        machine.try_start_relaying(&sub);

        assert!(machine.finish_if_relaying().is_some());
        assert!(machine.finish_if_relaying().is_none());
        assert!(machine.is_finished());
        assert!(machine.subscription().is_none());
    }

    #[test]
    fn finish_if_relaying_ignores_waiting() {
        let machine = RelayStateMachine::new();
        assert!(machine.finish_if_relaying().is_none());
        assert_eq!(machine.phase(), RelayPhase::Waiting);
    }

    #[test]
    fn finish_from_waiting_rejects_later_subscription() {
        let machine = RelayStateMachine::new();
        assert!(machine.finish().is_none());

        let (_, late) = subscription();
        assert!(!machine.try_start_relaying(&late));
        assert!(machine.is_finished());
    }

    #[test]
    fn finish_releases_held_subscription() {
        let machine = RelayStateMachine::new();
        let (test_sub, sub) = subscription();
        machine.try_start_relaying(&sub);
        drop(sub);

        let released = machine.finish().unwrap();
        drop(released);

        // Only the test's own handle is left.
        assert_eq!(Arc::strong_count(&test_sub), 1);
    }

    #[test]
    fn request_is_forwarded_only_while_relaying() {
        let machine = RelayStateMachine::new();
        let (test_sub, sub) = subscription();

        machine.request_if_relaying(Demand::max(1));
        machine.try_start_relaying(&sub);
        machine.request_if_relaying(Demand::max(2));
        machine.finish_if_relaying();
        machine.request_if_relaying(Demand::max(3));

        assert_eq!(test_sub.requests(), vec![Demand::max(2)]);
    }

    #[test]
    fn racing_finishers_release_exactly_once() {
        for _ in 0..100 {
            let machine = Arc::new(RelayStateMachine::new());
            let (_, sub) = subscription();
            machine.try_start_relaying(&sub);

            let barrier = Arc::new(Barrier::new(4));
            let handles: Vec<_> = (0..4)
                .map(|n| {
                    let machine = Arc::clone(&machine);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        if n % 2 == 0 {
                            machine.finish_if_relaying().is_some()
                        } else {
                            machine.finish().is_some()
                        }
                    })
                })
                .collect();

            let released = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count();
            assert_eq!(released, 1);
        }
    }

    #[test]
    fn racing_subscriptions_accept_exactly_one() {
        let machine = Arc::new(RelayStateMachine::new());
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let machine = Arc::clone(&machine);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let (_, sub) = subscription();
                    barrier.wait();
                    machine.try_start_relaying(&sub)
                })
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(accepted, 1);
        assert!(machine.is_relaying());
    }
}
