//! Relay Core
//!
//! This crate provides the core of a pull-based reactive streams library.
//! It implements:
//!
//! - Demand accounting between producers and consumers
//! - The Producer / Consumer / Subscription protocol
//! - A reusable relay that turns a small hook into a correct stage
//! - Breakpoint and Reduce stages built on that relay
//!
//! Every callback may arrive on any thread, concurrently with any other.
//! The relay guarantees that downstream sees at most one completion, that
//! the upstream is cancelled at most once, and that nothing is delivered
//! once a link has terminated.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `flow`: Demand, completion and the protocol traits, plus simple
//!   producers (`Sequence`, `Empty`) and a closure consumer (`Sink`)
//! - `sync`: The lock-backed cell and the relay lifecycle state machine
//! - `stage`: The relay, its hook trait, and the provided stages
//! - `testing`: Recording consumers, subscriptions and scripted producers
//!
//! # Example
//!
//! ```rust,ignore
//! use relay_core::flow::Sequence;
//! use relay_core::stage::ProducerExt;
//!
//! // Sum a sequence and print the total
//! let sink = Sequence::new(vec![1, 2, 3])
//!     .reduce(0, |acc, v| acc + v)
//!     .sink(|_| {}, |total| println!("Total: {}", total));
//! // prints: "Total: 6"
//! ```

pub mod error;
pub mod flow;
pub mod stage;
pub mod sync;
pub mod testing;

pub use error::{Error, Result};
pub use flow::{Completion, Consumer, Demand, Producer, Subscription, SubscriptionRef};
pub use stage::{Breakpoint, BreakpointConfig, ProducerExt, Reduce, Relay, RelayHook};
