//! Flow Control
//!
//! This module defines the wire contract between stages: demand, the
//! Producer / Consumer / Subscription triad, and a handful of simple
//! producers and consumers built directly on it.
//!
//! # Concepts
//!
//! ## Producers
//!
//! A [`Producer`] emits values over time. Attaching a consumer creates one
//! independent link; a producer may serve many links at once.
//!
//! ## Consumers
//!
//! A [`Consumer`] receives, in order: one subscription, zero or more values,
//! and at most one [`Completion`]. Each value it receives returns a
//! [`Demand`] telling the producer how many more values it wants on top of
//! what it already asked for.
//!
//! ## Subscriptions
//!
//! A [`Subscription`] is the consumer's handle on the link. Values only
//! flow after the consumer requests demand through it, and cancelling it
//! ends the link.
//!
//! # Backpressure
//!
//! Flow is pull-based. A producer never sends more values than the
//! consumer has asked for, which lets a slow consumer bound the amount of
//! work in flight without buffering anywhere in the chain.

mod completion;
mod consumer;
mod demand;
mod empty;
mod identifier;
mod producer;
mod sequence;
mod sink;
mod subscription;

pub use completion::Completion;
pub use consumer::{Consumer, ConsumerRef};
pub use demand::Demand;
pub use empty::Empty;
pub use identifier::CombineId;
pub use producer::Producer;
pub use sequence::Sequence;
pub use sink::Sink;
pub use subscription::{EmptySubscription, Subscription, SubscriptionRef};
