//! Single-threaded host runtime.
//!
//! Tasks never schedule anything on their own: timers and futures are
//! provided by the host through the [`Timer`](crate::time::Timer) and
//! [`Spawn`](crate::task::Spawn) capabilities. This module is a small host
//! implementing both on the current thread.
//!
//! It includes:
//! - the [`Runtime`] event loop and its [`RuntimeBuilder`],
//! - the cloneable [`Handle`] passed to helpers that need timers,
//! - the thread-local context behind [`Handle::current`].

mod builder;
mod context;
mod core;
mod handle;
mod timer;
mod waker;

pub use builder::RuntimeBuilder;
pub use handle::Handle;
pub use timer::TimerId;
pub use self::core::Runtime;
