//! Timer capability and the helpers built on it.
//!
//! Tasks never look up a clock on their own. Everything time-related takes a
//! [`Timer`], usually a [`Handle`](crate::Handle) to the host runtime.
//!
//! It includes:
//! - [`delay`] for a task that succeeds after a duration,
//! - [`sleep`] for the equivalent cancel-safe future,
//! - [`timeout`] for bounding how long a task may run.

mod delay;
mod sleep;
mod timeout;

use std::time::Duration;

#[doc(inline)]
pub use delay::delay;

#[doc(inline)]
pub use sleep::{Sleep, sleep};

#[doc(inline)]
pub use timeout::timeout;

/// A facility that runs callbacks after a delay.
///
/// Callbacks run on the thread that drives the timer, never inside
/// [`set_timeout`](Self::set_timeout) itself.
pub trait Timer {
    /// Identifies a scheduled callback.
    type Id: 'static;

    /// Schedules `callback` to run once `after` has elapsed.
    fn set_timeout(&self, after: Duration, callback: Box<dyn FnOnce()>) -> Self::Id;

    /// Unschedules a callback. Ids that already fired are ignored.
    fn clear_timeout(&self, id: Self::Id);
}
