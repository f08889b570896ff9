use super::context;
use super::timer::{TimerId, TimerQueue};
use super::waker::{WakeQueue, make_waker};
use crate::error::RuntimeError;
use crate::task::{LocalFuture, Spawn};
use crate::time::Timer;
use crate::utils::Slab;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use tracing::trace;

/// State shared by a runtime and all of its handles.
pub(crate) struct Shared {
    /// Woken task ids.
    pub(crate) queue: Arc<WakeQueue>,

    /// Futures spawned with [`Spawn::spawn_local`].
    pub(crate) tasks: RefCell<Slab<LocalFuture>>,

    /// Pending timers.
    pub(crate) timers: RefCell<TimerQueue>,
}

/// A cheap, cloneable reference to a [`Runtime`](super::Runtime).
///
/// `Handle` is the capability the rest of the crate consumes: it implements
/// [`Timer`] for [`delay`](crate::time::delay) and friends, and [`Spawn`] for
/// [`Task::from_promise`](crate::Task::from_promise).
#[derive(Clone)]
pub struct Handle {
    pub(crate) shared: Rc<Shared>,
}

impl Handle {
    pub(crate) fn new(task_capacity: usize, timer_capacity: usize) -> Self {
        Self {
            shared: Rc::new(Shared {
                queue: Arc::new(WakeQueue::default()),
                tasks: RefCell::new(Slab::with_capacity(task_capacity)),
                timers: RefCell::new(TimerQueue::with_capacity(timer_capacity)),
            }),
        }
    }

    /// Returns the handle of the runtime driving the current thread.
    ///
    /// # Panics
    ///
    /// Panics if called outside of [`Runtime::block_on`](super::Runtime::block_on).
    /// Use [`try_current`](Self::try_current) to handle that case.
    pub fn current() -> Self {
        match Self::try_current() {
            Ok(handle) => handle,
            Err(error) => panic!("{error}"),
        }
    }

    /// Returns the handle of the runtime driving the current thread, or
    /// [`RuntimeError::NoContext`].
    pub fn try_current() -> Result<Self, RuntimeError> {
        context::current().ok_or(RuntimeError::NoContext)
    }

    /// Polls spawned task `id` once. Completed tasks free their slot.
    pub(crate) fn poll_task(&self, id: usize) {
        let future = self.shared.tasks.borrow_mut().checkout(id);

        let Some(mut future) = future else {
            return;
        };

        let waker = make_waker(id, self.shared.queue.clone());
        let mut cx = Context::from_waker(&waker);

        match future.as_mut().poll(&mut cx) {
            Poll::Ready(()) => {
                self.shared.tasks.borrow_mut().release(id);
                trace!(id, "spawned task completed");
                drop(future);
            }
            Poll::Pending => self.shared.tasks.borrow_mut().restore(id, future),
        }
    }

    /// Runs the callbacks of every timer due now. Returns how many fired.
    pub(crate) fn fire_due_timers(&self) -> usize {
        let now = Instant::now();
        let mut fired = 0;

        loop {
            let callback = self.shared.timers.borrow_mut().pop_expired(now);

            let Some(callback) = callback else {
                break;
            };

            callback();
            fired += 1;
        }

        fired
    }
}

impl Spawn for Handle {
    fn spawn_local(&self, future: LocalFuture) {
        let id = self.shared.tasks.borrow_mut().insert(future);
        trace!(id, "spawned task");

        self.shared.queue.push(id);
    }
}

impl Timer for Handle {
    type Id = TimerId;

    fn set_timeout(&self, after: Duration, callback: Box<dyn FnOnce()>) -> TimerId {
        let deadline = Instant::now() + after;
        let id = self.shared.timers.borrow_mut().schedule(deadline, callback);
        trace!(?id, ?after, "timer scheduled");

        id
    }

    fn clear_timeout(&self, id: TimerId) {
        let callback = self.shared.timers.borrow_mut().cancel(id);

        if callback.is_some() {
            trace!(?id, "timer cleared");
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("tasks", &self.shared.tasks.borrow().len())
            .field("timers", &self.shared.timers.borrow().len())
            .finish()
    }
}
