//! Stages
//!
//! A stage sits between an upstream producer and a downstream consumer.
//! To the upstream it is a consumer; to the downstream it is the
//! subscription. Both halves are one object, a [`Relay`].
//!
//! # Building a stage
//!
//! The relay implements the protocol once: it accepts a single upstream
//! subscription, forwards demand, cancels at most once, and delivers at
//! most one completion. A stage only supplies a [`RelayHook`] with the
//! behavior that makes it different.
//!
//! ```text
//!   upstream ──values──▶ Relay(hook) ──values──▶ downstream
//!            ◀─demand───             ◀─demand───
//! ```
//!
//! # Provided stages
//!
//! - [`Breakpoint`] passes everything through and raises a trap when a
//!   predicate matches.
//! - [`Reduce`] folds the stream into one value.

mod breakpoint;
mod ext;
mod hook;
mod reduce;
mod relay;
mod trap;

pub use breakpoint::{Breakpoint, BreakpointConfig};
pub use ext::ProducerExt;
pub use hook::RelayHook;
pub use reduce::Reduce;
pub use relay::Relay;
pub use trap::{raise_sigtrap, DebuggerTrap, IgnoreTrap, LoggingTrap, TrapHandler, TrapSite};
