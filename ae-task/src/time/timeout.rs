use super::Timer;
use super::delay::delay;
use crate::error::TimeoutError;
use crate::task::{Reject, Resolve, Task};

use std::convert::Infallible;
use std::time::Duration;

/// Bounds how long `task` may run.
///
/// Each start races `task` against a timer. If the timer wins, the task is
/// cancelled and the result fails with [`TimeoutError::Elapsed`]; a failure of
/// `task` itself is reported as [`TimeoutError::Failed`].
///
/// # Examples
///
/// ```rust
/// use ae_task::time::{delay, timeout};
/// use ae_task::TimeoutError;
/// use std::time::Duration;
///
/// #[ae_task::main]
/// async fn main() {
///     let handle = ae_task::Handle::current();
///     let slow = delay::<_, ()>(&handle, Duration::from_millis(50));
///
///     let bounded = timeout(&handle, Duration::from_millis(5), &slow);
///     assert_eq!(bounded.await, Err(TimeoutError::Elapsed(Duration::from_millis(5))));
/// }
/// ```
pub fn timeout<T, E, A>(
    timer: &T,
    duration: Duration,
    task: &Task<E, A>,
) -> Task<TimeoutError<E>, A>
where
    T: Timer + Clone + 'static,
    E: 'static,
    A: 'static,
{
    let deadline = delay::<T, Infallible>(timer, duration)
        .map_rejected(|never| match never {})
        .chain(move |()| {
            Task::new(move |reject: Reject<TimeoutError<E>>, _: Resolve<A>| {
                reject.settle(TimeoutError::Elapsed(duration));
            })
        });

    Task::race([task.map_rejected(TimeoutError::Failed), deadline])
}
