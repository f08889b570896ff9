//! Error types.
//!
//! Task failures are caller-defined values and never pass through here. These
//! types cover the host runtime and the derived helpers.

use std::time::Duration;

use thiserror::Error;

/// Errors reported by the host [`Runtime`](crate::Runtime).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeError {
    /// The driven future is pending but nothing left can wake it: no ready
    /// tasks, no spawned tasks and no pending timers.
    #[error("runtime stalled: future is pending with no tasks or timers left")]
    Stalled,

    /// No runtime is driving the current thread.
    #[error("no runtime is running on this thread")]
    NoContext,
}

/// Failure of a task bounded by [`timeout`](crate::time::timeout).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeoutError<E> {
    /// The deadline passed before the task settled.
    #[error("deadline of {0:?} elapsed")]
    Elapsed(Duration),

    /// The task failed on its own before the deadline.
    #[error("task failed: {0}")]
    Failed(E),
}
