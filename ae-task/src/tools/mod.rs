//! Higher-level helpers built from tasks.
//!
//! It includes:
//! - [`retry`] for restarting a failing task a bounded number of times,
//! - [`retry_with_interval`] for the same with a pause between attempts.

mod retry;

#[doc(inline)]
pub use retry::{retry, retry_with_interval};
