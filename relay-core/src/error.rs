//! Error types for the relay core.
//!
//! Protocol anomalies (late subscriptions, callbacks after termination) are
//! resolved inside the relay state machine and never show up here. Upstream
//! failures travel as user-defined values inside
//! [`Completion::Failed`](crate::flow::Completion::Failed). What remains are
//! the few fallible operations of the library surface itself.

use thiserror::Error;

/// Errors produced by the relay core.
#[derive(Debug, Error)]
pub enum Error {
    /// A demand was built from a negative count.
    #[error("demand cannot be negative (got {0})")]
    NegativeDemand(i64),

    /// The operating system refused to raise the debugger trap signal.
    #[error("failed to raise debugger trap: {0}")]
    Trap(#[from] std::io::Error),

    /// The current platform has no debugger trap signal.
    #[error("debugger trap is not supported on this platform")]
    TrapUnsupported,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
