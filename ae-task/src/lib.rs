//! # ae-task
//!
//! **ae-task** provides [`Task`], a lazy, cancellable computation with two
//! outcome channels: a success value `A` and a failure value `E`.
//!
//! A task describes work without running it. Starting it with
//! [`Task::fork`] runs the computation, which later settles exactly one of the
//! two callbacks, at most once. Every start returns a [`Cancel`] handle;
//! cancelling before settlement guarantees neither callback fires.
//!
//! The crate offers:
//!
//! - **Operators** like `map`, `map_rejected`, `bimap`, `chain` and `fold`
//! - **Combinators** [`Task::race`], [`Task::series`] and [`Task::parallel`]
//! - **Future interop** via [`Task::to_promise`], [`Task::from_promise`] and `.await`
//! - **Time helpers** in [`time`] and a [`retry`](tools::retry) helper in [`tools`]
//! - A small single-threaded [`Runtime`] hosting timers and spawned futures
//! - **Macros** `#[ae_task::main]` and `#[ae_task::test]`
//!
//! Tasks are single-threaded: they are built on `Rc` and are not `Send`.
//!
//! ## Quick Start
//!
//! ```rust
//! use ae_task::Task;
//! use ae_task::time::delay;
//! use std::time::Duration;
//!
//! #[ae_task::main]
//! async fn main() {
//!     let handle = ae_task::Handle::current();
//!
//!     let slow = delay(&handle, Duration::from_millis(20)).map(|()| "slow");
//!     let fast = delay(&handle, Duration::from_millis(5)).map(|()| "fast");
//!
//!     let winner: Result<_, ()> = Task::race([slow, fast]).await;
//!     assert_eq!(winner, Ok("fast"));
//! }
//! ```

mod combinator;
mod error;
mod runtime;
mod task;
mod utils;

pub mod time;
pub mod tools;

pub use error::{RuntimeError, TimeoutError};
pub use runtime::{Handle, Runtime, RuntimeBuilder, TimerId};
pub use task::{Cancel, LocalFuture, Promise, Reject, Resolve, Spawn, Task};

pub use ae_task_macros::{main, test};
