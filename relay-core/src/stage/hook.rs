//! Relay hooks.
//!
//! A hook is what makes one stage different from another. The
//! [`Relay`](super::Relay) owns the protocol (subscription bookkeeping,
//! cancellation, the single terminal event) and calls into the hook at
//! fixed points.

use crate::flow::{Completion, Consumer, Demand, SubscriptionRef};

/// The stage-specific part of a relay.
///
/// A hook instance lives for exactly one link. It is created when the stage
/// is subscribed to and released when the link terminates, so per-link
/// state (an accumulator, say) lives directly in the hook.
pub trait RelayHook: Send + Sync + 'static {
    /// Values received from upstream.
    type Input: Send + 'static;

    /// Values sent downstream.
    type Output: Send + 'static;

    /// Failure type, shared by both sides.
    type Failure: Send + 'static;

    /// Stage name used in `Display` output and log fields.
    fn name(&self) -> &'static str;

    /// Called after the upstream subscription is accepted and before the
    /// relay presents itself downstream.
    fn receive_subscription(&self, _subscription: &SubscriptionRef) {}

    /// Map a downstream request to the demand forwarded upstream.
    ///
    /// Only called with positive demand.
    fn request(&self, demand: Demand) -> Demand {
        demand
    }

    /// Handle one upstream value while the link is live.
    ///
    /// Either forward something to `downstream` and return the demand it
    /// reports, or suppress the value and return `Demand::NONE`.
    fn receive_value<S>(&self, value: Self::Input, downstream: &S) -> Demand
    where
        S: Consumer<Input = Self::Output, Failure = Self::Failure> + ?Sized;

    /// Handle the upstream completion. Called at most once.
    ///
    /// The default forwards the completion unchanged.
    fn receive_completion<S>(&self, completion: Completion<Self::Failure>, downstream: &S)
    where
        S: Consumer<Input = Self::Output, Failure = Self::Failure> + ?Sized,
    {
        downstream.receive_completion(completion);
    }
}
