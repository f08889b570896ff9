use super::Timer;
use crate::task::{Cancel, Reject, Resolve, Task};

use std::time::Duration;

/// Creates a task that succeeds with `()` once `duration` has elapsed.
///
/// Each start schedules its own timer on `timer`; cancelling the start clears
/// it. The failure type is free, the task never fails.
///
/// # Examples
///
/// ```rust
/// use ae_task::time::delay;
/// use std::time::Duration;
///
/// #[ae_task::main]
/// async fn main() {
///     let handle = ae_task::Handle::current();
///     let one = delay::<_, ()>(&handle, Duration::from_millis(5)).map(|()| 1);
///
///     assert_eq!(one.await, Ok(1));
/// }
/// ```
pub fn delay<T, E>(timer: &T, duration: Duration) -> Task<E, ()>
where
    T: Timer + Clone + 'static,
    E: 'static,
{
    let timer = timer.clone();

    Task::new(move |_: Reject<E>, resolve: Resolve<()>| {
        let id = timer.set_timeout(duration, Box::new(move || resolve.settle(())));

        let timer = timer.clone();
        Cancel::new(move || timer.clear_timeout(id))
    })
}
