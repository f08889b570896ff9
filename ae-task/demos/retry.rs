//! Demo: retrying a flaky operation with a pause between attempts.

use ae_task::tools::retry_with_interval;
use ae_task::{Handle, Task};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

#[ae_task::main]
async fn main() {
    let handle = Handle::current();
    let attempts = Rc::new(Cell::new(0));

    let counter = attempts.clone();
    let flaky = Task::new(move |reject, resolve| {
        counter.set(counter.get() + 1);
        println!("attempt {}", counter.get());

        if counter.get() < 3 {
            reject.settle("connection refused");
        } else {
            resolve.settle("connected");
        }
    });

    let result = retry_with_interval(&handle, &flaky, 5, Duration::from_millis(100)).await;

    println!("{result:?} after {} attempts", attempts.get());
}
