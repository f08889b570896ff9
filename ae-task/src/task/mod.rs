//! The task primitive.
//!
//! A [`Task`] describes work without running it. Starting it with
//! [`Task::fork`] hands the computation a [`Reject`] and a [`Resolve`] handle
//! and yields a [`Cancel`] handle synchronously.
//!
//! It includes:
//! - the settlement protocol guaranteeing a single outcome per start,
//! - idempotent cancellation,
//! - transformation and override operators,
//! - the bridge to Rust futures.

mod cancel;
mod core;
mod interop;
mod settle;
mod transform;

pub use cancel::Cancel;
pub use self::core::Task;
pub use interop::{LocalFuture, Promise, Spawn};
pub use settle::{Reject, Resolve};
