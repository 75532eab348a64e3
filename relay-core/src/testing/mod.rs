//! Test Support
//!
//! Building blocks for exercising stages by hand: a subscription that
//! records requests and cancels, a consumer that records every callback,
//! and a producer scripted by a closure.
//!
//! These are used by this crate's own tests and are public so that crates
//! writing their own stages can test them the same way.

mod consumer;
mod producer;
mod subscription;

pub use consumer::{Event, TestConsumer};
pub use producer::{ConsumerSlot, ManualProducer};
pub use subscription::TestSubscription;
