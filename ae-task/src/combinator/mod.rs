//! Combinators over sequences of tasks.
//!
//! Each one is a different scheduling strategy built on [`Task::fork`]:
//! - [`Task::race`] starts everything and keeps the first outcome,
//! - [`Task::series`] starts one task at a time,
//! - [`Task::parallel`] starts everything and waits for all successes.
//!
//! Failure values pass through unmodified. When several children fail, only
//! the first observed failure is reported and the others are discarded.
//!
//! [`Task::fork`]: crate::Task::fork
//! [`Task::race`]: crate::Task::race
//! [`Task::series`]: crate::Task::series
//! [`Task::parallel`]: crate::Task::parallel

mod parallel;
mod race;
mod series;
