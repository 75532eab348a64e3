//! Synchronisation Primitives
//!
//! This module holds the two building blocks that every stage's shared
//! state is made of.
//!
//! # Overview
//!
//! - [`AtomicCell`] is the only place shared fields are mutated. It offers
//!   load/store, compare-and-store, exchange and read-modify-write, all
//!   under one lock.
//! - [`RelayStateMachine`] is the `Waiting → Relaying → Finished` lifecycle
//!   of a stage's upstream link, built on an `AtomicCell` and exposed as
//!   named transitions rather than ad hoc lock/unlock pairs.
//!
//! # Design Decisions
//!
//! 1. No user callback ever runs while a cell is locked. Transitions hand
//!    back what the caller needs (usually a subscription) and the caller
//!    acts on it afterwards. This keeps reentrant calls from deadlocking.
//!
//! 2. Losing a race is not an error. Every transition reports whether it
//!    happened, and the loser simply does nothing.

mod atomic;
mod relay_state;

pub use atomic::AtomicCell;
pub use relay_state::{RelayPhase, RelayState, RelayStateMachine};
