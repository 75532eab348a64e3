//! Completion
//!
//! The terminal event a producer sends to a consumer: either the stream
//! finished normally or it failed with a typed error.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a stream terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Completion<E> {
    /// The stream finished normally.
    Finished,

    /// The stream failed.
    Failed(E),
}

impl<E> Completion<E> {
    pub const fn is_finished(&self) -> bool {
        matches!(self, Completion::Finished)
    }

    pub const fn is_failure(&self) -> bool {
        matches!(self, Completion::Failed(_))
    }

    /// The failure, if any.
    pub fn failure(&self) -> Option<&E> {
        match self {
            Completion::Failed(err) => Some(err),
            Completion::Finished => None,
        }
    }

    /// Map the failure type, leaving `Finished` untouched.
    pub fn map_failure<F, T>(self, f: F) -> Completion<T>
    where
        F: FnOnce(E) -> T,
    {
        match self {
            Completion::Finished => Completion::Finished,
            Completion::Failed(err) => Completion::Failed(f(err)),
        }
    }
}

impl<E> From<Result<(), E>> for Completion<E> {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Completion::Finished,
            Err(err) => Completion::Failed(err),
        }
    }
}
