//! Demo: racing, sequencing and bounding tasks with timers.
//!
//! Run with `RUST_LOG=ae_task=trace` to watch forks and cancellations.

use ae_task::time::{delay, timeout};
use ae_task::{Handle, Task, TimeoutError};
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn after(handle: &Handle, ms: u64, label: &'static str) -> Task<&'static str, &'static str> {
    delay(handle, Duration::from_millis(ms)).map(move |()| label)
}

#[ae_task::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ae_task=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let handle = Handle::current();
    let start = Instant::now();

    // The fastest download wins, the others are cancelled
    let mirror = Task::race([
        after(&handle, 120, "eu"),
        after(&handle, 40, "us"),
        after(&handle, 200, "asia"),
    ])
    .await;
    println!("fastest mirror: {mirror:?} after {:?}", start.elapsed());

    // Steps that must happen in order
    let steps = Task::series([
        after(&handle, 20, "fetch"),
        after(&handle, 20, "verify"),
        after(&handle, 20, "install"),
    ])
    .await;
    println!("steps: {steps:?} after {:?}", start.elapsed());

    // A step that takes too long
    let slow = after(&handle, 500, "never");
    match timeout(&handle, Duration::from_millis(50), &slow).await {
        Ok(value) => println!("finished: {value}"),
        Err(TimeoutError::Elapsed(limit)) => println!("gave up after {limit:?}"),
        Err(TimeoutError::Failed(error)) => println!("failed: {error}"),
    }
}
