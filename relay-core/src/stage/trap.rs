//! Debugger Traps
//!
//! The breakpoint stage interrupts the current thread when one of its
//! predicates fires. What "interrupt" means is pluggable through the
//! [`TrapHandler`] trait:
//!
//! - [`DebuggerTrap`] raises `SIGTRAP`. Under a debugger this stops the
//!   thread and execution resumes normally afterwards. Without one attached,
//!   the default disposition of `SIGTRAP` terminates the process.
//! - [`LoggingTrap`] emits a `warn!` event instead.
//! - [`IgnoreTrap`] does nothing.
//!
//! Any `Fn(TrapSite)` closure is a handler too, which is how tests observe
//! that a trap fired.

use std::fmt;

use tracing::{error, warn};

use crate::error::Result;

/// Which callback raised the trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrapSite {
    Subscription,
    Value,
    Completion,
}

impl fmt::Display for TrapSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrapSite::Subscription => "subscription",
            TrapSite::Value => "value",
            TrapSite::Completion => "completion",
        })
    }
}

/// A synchronous side effect run when a breakpoint predicate matches.
pub trait TrapHandler: Send + Sync {
    fn raise(&self, site: TrapSite);
}

impl<F> TrapHandler for F
where
    F: Fn(TrapSite) + Send + Sync,
{
    fn raise(&self, site: TrapSite) {
        self(site);
    }
}

/// Raises `SIGTRAP` on the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebuggerTrap;

impl TrapHandler for DebuggerTrap {
    fn raise(&self, site: TrapSite) {
        if let Err(err) = raise_sigtrap() {
            error!(%site, error = %err, "breakpoint could not raise debugger trap");
        }
    }
}

/// Logs the trap instead of interrupting.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingTrap;

impl TrapHandler for LoggingTrap {
    fn raise(&self, site: TrapSite) {
        warn!(%site, "breakpoint hit");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreTrap;

impl TrapHandler for IgnoreTrap {
    fn raise(&self, _site: TrapSite) {}
}

/// Raise `SIGTRAP` on the calling process.
#[cfg(unix)]
pub fn raise_sigtrap() -> Result<()> {
    signal_hook::low_level::raise(signal_hook::consts::SIGTRAP)?;
    Ok(())
}

/// Raise `SIGTRAP` on the calling process.
#[cfg(not(unix))]
pub fn raise_sigtrap() -> Result<()> {
    Err(crate::error::Error::TrapUnsupported)
}
