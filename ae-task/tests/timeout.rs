use ae_task::time::{delay, timeout};
use ae_task::{Handle, RuntimeBuilder, Task, TimeoutError};
use std::time::{Duration, Instant};

#[ae_task::test]
async fn test_timeout_completes_before_deadline() {
    let handle = Handle::current();
    let task = delay::<_, &str>(&handle, Duration::from_millis(10)).map(|()| 42);

    let result = timeout(&handle, Duration::from_millis(100), &task).await;

    assert!(matches!(result, Ok(42)), "Task should complete before the timeout");
}

#[ae_task::test]
async fn test_timeout_elapses() {
    let handle = Handle::current();
    let task = delay::<_, &str>(&handle, Duration::from_millis(200)).map(|()| 42);
    let start = Instant::now();

    let result = timeout(&handle, Duration::from_millis(30), &task).await;

    assert!(
        matches!(result, Err(TimeoutError::Elapsed(d)) if d == Duration::from_millis(30)),
        "Timeout should elapse before the task completes"
    );
    assert!(start.elapsed() < Duration::from_millis(200));
}

#[test]
fn test_timeout_reports_task_failure() {
    let rt = RuntimeBuilder::new().build();
    let handle = rt.handle().clone();

    let failing = delay::<_, &str>(&handle, Duration::from_millis(5))
        .chain(|()| Task::<&str, ()>::rejected("boom"));
    let result = rt.block_on(timeout(&handle, Duration::from_millis(100), &failing).to_promise());

    assert_eq!(result, Ok(Err(TimeoutError::Failed("boom"))));
}

#[test]
fn test_timeout_error_messages() {
    let elapsed: TimeoutError<&str> = TimeoutError::Elapsed(Duration::from_millis(30));
    let failed: TimeoutError<&str> = TimeoutError::Failed("boom");

    assert_eq!(elapsed.to_string(), "deadline of 30ms elapsed");
    assert_eq!(failed.to_string(), "task failed: boom");
}
