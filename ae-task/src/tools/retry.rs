use crate::task::{Cancel, Reject, Resolve, Task};
use crate::time::{Timer, delay};

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;

/// Restarts `task` on failure, up to `times` more times.
///
/// `times` counts retries after the first attempt, so a task is started at
/// most `times + 1` times. The result settles with the first success, or with
/// the failure of the last attempt.
///
/// # Examples
///
/// ```rust
/// use ae_task::Task;
/// use ae_task::tools::retry;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let attempts = Rc::new(Cell::new(0));
/// let counter = attempts.clone();
///
/// let flaky = Task::new(move |reject, resolve| {
///     counter.set(counter.get() + 1);
///     match counter.get() {
///         3 => resolve.settle("ok"),
///         _ => reject.settle("not yet"),
///     }
/// });
///
/// retry(&flaky, 5).fork(|_| unreachable!(), |v| assert_eq!(v, "ok"));
/// assert_eq!(attempts.get(), 3);
/// ```
pub fn retry<E: 'static, A: 'static>(task: &Task<E, A>, times: usize) -> Task<E, A> {
    with_pause(task, times, None)
}

/// Like [`retry`], waiting `interval` on `timer` before each new attempt.
pub fn retry_with_interval<T, E, A>(
    timer: &T,
    task: &Task<E, A>,
    times: usize,
    interval: Duration,
) -> Task<E, A>
where
    T: Timer + Clone + 'static,
    E: 'static,
    A: 'static,
{
    with_pause(task, times, Some(delay(timer, interval)))
}

fn with_pause<E: 'static, A: 'static>(
    task: &Task<E, A>,
    times: usize,
    pause: Option<Task<Infallible, ()>>,
) -> Task<E, A> {
    let task = task.clone();

    Task::new(move |reject: Reject<E>, resolve: Resolve<A>| {
        let retry = Rc::new(Retry {
            task: task.clone(),
            pause: pause.clone(),
            remaining: Cell::new(times),
            step: Cell::new(Step::Attempt),
            restart: Cell::new(true),
            driving: Cell::new(false),
            current: RefCell::new(None),
            closed: Cell::new(false),
            reject: RefCell::new(Some(reject)),
            resolve: RefCell::new(Some(resolve)),
        });

        retry.drive();

        Cancel::new(move || retry.cancel())
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Attempt,
    Pause,
}

/// State of one retried run.
struct Retry<E, A> {
    task: Task<E, A>,
    pause: Option<Task<Infallible, ()>>,

    /// Retries left.
    remaining: Cell<usize>,

    /// What to start next.
    step: Cell<Step>,

    /// Set when `step` is due to start.
    restart: Cell<bool>,

    /// Set while [`Retry::drive`] is on the stack, so that synchronous
    /// settlements loop instead of recursing.
    driving: Cell<bool>,

    current: RefCell<Option<Cancel>>,
    closed: Cell<bool>,

    reject: RefCell<Option<Reject<E>>>,
    resolve: RefCell<Option<Resolve<A>>>,
}

impl<E: 'static, A: 'static> Retry<E, A> {
    fn drive(self: &Rc<Self>) {
        if self.driving.replace(true) {
            return;
        }

        while self.restart.replace(false) && !self.closed.get() {
            let cancel = match self.step.get() {
                Step::Attempt => self.start_attempt(),
                Step::Pause => self.start_pause(),
            };

            if !self.restart.get() && !self.closed.get() {
                self.current.replace(Some(cancel));
            }
        }

        self.driving.set(false);
    }

    fn start_attempt(self: &Rc<Self>) -> Cancel {
        let on_failure = {
            let retry = self.clone();
            move |error| retry.failed(error)
        };

        let on_success = {
            let retry = self.clone();
            move |value| retry.succeeded(value)
        };

        self.task.fork(on_failure, on_success)
    }

    fn start_pause(self: &Rc<Self>) -> Cancel {
        let Some(pause) = &self.pause else {
            self.schedule(Step::Attempt);
            return Cancel::noop();
        };

        let retry = self.clone();
        pause.fork(|never| match never {}, move |()| retry.schedule(Step::Attempt))
    }

    fn schedule(self: &Rc<Self>, step: Step) {
        self.step.set(step);
        self.restart.set(true);
        self.drive();
    }

    fn succeeded(&self, value: A) {
        if self.closed.replace(true) {
            return;
        }

        let resolve = self.resolve.borrow_mut().take();
        if let Some(resolve) = resolve {
            resolve.settle(value);
        }
    }

    fn failed(self: &Rc<Self>, error: E) {
        if self.closed.get() {
            return;
        }

        let remaining = self.remaining.get();

        if remaining == 0 {
            trace!("retries exhausted");
            self.closed.set(true);

            let reject = self.reject.borrow_mut().take();
            if let Some(reject) = reject {
                reject.settle(error);
            }
            return;
        }

        self.remaining.set(remaining - 1);
        trace!(remaining = remaining - 1, "attempt failed, retrying");

        let next = if self.pause.is_some() {
            Step::Pause
        } else {
            Step::Attempt
        };
        self.schedule(next);
    }

    fn cancel(&self) {
        self.closed.set(true);

        let current = self.current.borrow_mut().take();
        if let Some(cancel) = current {
            cancel.cancel();
        }
    }
}
