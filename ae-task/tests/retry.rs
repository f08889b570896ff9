use ae_task::tools::{retry, retry_with_interval};
use ae_task::{Handle, RuntimeBuilder, Task};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

fn flaky(attempts: &Rc<Cell<usize>>, failures: usize) -> Task<&'static str, i32> {
    let attempts = attempts.clone();

    Task::new(move |reject, resolve| {
        let n = attempts.get();
        attempts.set(n + 1);

        if n < failures {
            reject.settle("fail");
        } else {
            resolve.settle(42);
        }
    })
}

#[test]
fn test_retry_succeeds_before_limit() {
    let rt = RuntimeBuilder::new().build();
    let attempts = Rc::new(Cell::new(0));

    let result = rt.block_on(retry(&flaky(&attempts, 2), 5).to_promise());

    assert!(matches!(result, Ok(Ok(42))), "Retry should succeed before limit");
    assert_eq!(attempts.get(), 3, "Should have attempted 3 times");
}

#[test]
fn test_retry_fails_after_limit() {
    let rt = RuntimeBuilder::new().build();
    let attempts = Rc::new(Cell::new(0));

    let result = rt.block_on(retry(&flaky(&attempts, usize::MAX), 3).to_promise());

    assert!(matches!(result, Ok(Err("fail"))), "Retry should fail after limit");
    assert_eq!(attempts.get(), 4, "Should have attempted 1 + 3 times");
}

#[ae_task::test]
async fn test_retry_with_interval_waits_between_attempts() {
    let handle = Handle::current();
    let attempts = Rc::new(Cell::new(0));
    let start = Instant::now();

    let result =
        retry_with_interval(&handle, &flaky(&attempts, 2), 5, Duration::from_millis(30)).await;

    assert_eq!(result, Ok(42));
    assert_eq!(attempts.get(), 3);
    assert!(
        start.elapsed() >= Duration::from_millis(60),
        "Two retries should wait two intervals"
    );
}

#[test]
fn test_retry_restarts_on_each_fork() {
    let attempts = Rc::new(Cell::new(0));
    let task = retry(&flaky(&attempts, 1), 1);

    let first = Rc::new(Cell::new(None));
    let out = first.clone();
    task.fork(|_| {}, move |v| out.set(Some(v)));

    assert_eq!(first.get(), Some(42));
    assert_eq!(attempts.get(), 2);

    task.fork(|_| {}, |_| {});
    assert_eq!(attempts.get(), 3, "Second fork should start from a fresh budget");
}
