use super::builder::RuntimeBuilder;
use super::context::enter_context;
use super::handle::Handle;
use super::waker::make_waker;
use crate::error::RuntimeError;
use crate::task::Spawn;

use std::future::Future;
use std::mem;
use std::pin::pin;
use std::task::{Context, Poll};

use tracing::{debug, warn};

/// Wake-queue id reserved for the future passed to [`Runtime::block_on`].
const MAIN: usize = usize::MAX;

/// A single-threaded host runtime.
///
/// `Runtime` is responsible for:
/// - driving a future to completion via [`block_on`](Self::block_on),
/// - polling futures spawned through its [`Handle`],
/// - firing timers scheduled through its [`Handle`].
///
/// Everything runs on the thread calling `block_on`; between events the
/// thread parks until the next timer deadline or wake-up.
///
/// Dropping the runtime drops every pending timer callback and spawned
/// future.
pub struct Runtime {
    handle: Handle,

    /// Spawned futures polled per tick before timers are checked again.
    event_interval: usize,

    /// Whether [`block_on`](Self::block_on) reports
    /// [`RuntimeError::Stalled`] instead of parking forever.
    detect_stalls: bool,
}

impl Runtime {
    /// Creates a runtime with the default configuration.
    ///
    /// See [`RuntimeBuilder`] to customise it.
    pub fn new() -> Self {
        RuntimeBuilder::new().build()
    }

    pub(crate) fn from_parts(handle: Handle, event_interval: usize, detect_stalls: bool) -> Self {
        debug!(event_interval, detect_stalls, "runtime created");

        Self {
            handle,
            event_interval,
            detect_stalls,
        }
    }

    /// Returns a handle to this runtime.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Spawns a future onto the runtime.
    ///
    /// The future is first polled the next time the runtime is driven.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let runtime = ae_task::Runtime::new();
    /// runtime.spawn_local(async {
    ///     // background work
    /// });
    /// ```
    pub fn spawn_local<F>(&self, future: F)
    where
        F: Future<Output = ()> + 'static,
    {
        self.handle.spawn_local(Box::pin(future));
    }

    /// Runs a future to completion on the current thread.
    ///
    /// While the future is pending, due timers fire and spawned futures are
    /// polled. Inside the call, [`Handle::current`] returns this runtime's
    /// handle.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Stalled`] if the future is pending and nothing
    /// is left that could wake it (no timers, no spawned futures), unless
    /// stall detection was disabled on the builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ae_task::{Runtime, Task};
    ///
    /// let runtime = Runtime::new();
    /// let result = runtime.block_on(Task::<(), i32>::resolved(42).to_promise());
    ///
    /// assert_eq!(result, Ok(Ok(42)));
    /// ```
    pub fn block_on<F: Future>(&self, future: F) -> Result<F::Output, RuntimeError> {
        enter_context(self.handle.clone(), || self.run(future))
    }

    fn run<F: Future>(&self, future: F) -> Result<F::Output, RuntimeError> {
        let shared = &self.handle.shared;

        let mut future = pin!(future);
        let waker = make_waker(MAIN, shared.queue.clone());
        let mut cx = Context::from_waker(&waker);

        let mut main_woken = true;

        loop {
            if mem::take(&mut main_woken) {
                if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
                    return Ok(output);
                }
            }

            self.handle.fire_due_timers();

            let mut budget = self.event_interval;
            while budget > 0 {
                let Some(id) = shared.queue.pop() else {
                    break;
                };

                if id == MAIN {
                    main_woken = true;
                    continue;
                }

                self.handle.poll_task(id);
                budget -= 1;
            }

            if main_woken || !shared.queue.is_empty() {
                continue;
            }

            let deadline = shared.timers.borrow_mut().next_deadline();

            if self.detect_stalls && deadline.is_none() && shared.tasks.borrow().is_empty() {
                warn!("block_on stalled: no timers or spawned tasks left to wake the future");
                return Err(RuntimeError::Stalled);
            }

            shared.queue.park(deadline);
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Runtime {
    /// Drops pending timers and spawned futures.
    ///
    /// They may hold handles to this runtime, so they are moved out first and
    /// dropped without any borrow held.
    fn drop(&mut self) {
        let shared = &self.handle.shared;

        let timers = mem::take(&mut *shared.timers.borrow_mut());
        let tasks = mem::take(&mut *shared.tasks.borrow_mut());

        debug!(timers = timers.len(), tasks = tasks.len(), "runtime dropped");

        drop(timers);
        drop(tasks);
    }
}

#[cfg(test)]
mod tests {
    use super::Runtime;
    use crate::error::RuntimeError;
    use crate::runtime::{Handle, RuntimeBuilder};
    use crate::time::{Timer, sleep};

    use std::cell::Cell;
    use std::future::pending;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    #[test]
    fn block_on_returns_output() {
        let runtime = Runtime::new();
        assert_eq!(runtime.block_on(async { 42 }), Ok(42));
    }

    #[test]
    fn pending_future_without_work_stalls() {
        let runtime = Runtime::new();
        assert_eq!(runtime.block_on(pending::<()>()), Err(RuntimeError::Stalled));
    }

    #[test]
    fn timers_fire_while_blocking() {
        let runtime = Runtime::new();
        let handle = runtime.handle().clone();
        let fired = Rc::new(Cell::new(false));

        let flag = fired.clone();
        handle.set_timeout(Duration::from_millis(10), Box::new(move || flag.set(true)));

        let start = Instant::now();
        let result = runtime.block_on(sleep(&handle, Duration::from_millis(30)));

        assert_eq!(result, Ok(()));
        assert!(fired.get());
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn spawned_futures_run() {
        let runtime = RuntimeBuilder::new().event_interval(1).build();
        let count = Rc::new(Cell::new(0));

        for _ in 0..3 {
            let count = count.clone();
            runtime.spawn_local(async move { count.set(count.get() + 1) });
        }

        let handle = runtime.handle().clone();
        runtime
            .block_on(sleep(&handle, Duration::from_millis(5)))
            .unwrap();

        assert_eq!(count.get(), 3);
    }

    #[test]
    fn context_is_installed_during_block_on() {
        assert_eq!(Handle::try_current().err(), Some(RuntimeError::NoContext));

        let runtime = Runtime::new();
        let inside = runtime.block_on(async { Handle::try_current().is_ok() });

        assert_eq!(inside, Ok(true));
        assert!(Handle::try_current().is_err());
    }

    #[test]
    fn sleep_completes_with_stall_detection_disabled() {
        let runtime = RuntimeBuilder::new().detect_stalls(false).build();
        let handle = runtime.handle().clone();

        let result = runtime.block_on(async move {
            sleep(&handle, Duration::from_millis(1)).await;
            7
        });

        assert_eq!(result, Ok(7));
    }
}
