use super::cancel::Cancel;
use super::settle::{Reject, Resolve, Slot};

use std::fmt;
use std::rc::Rc;

use tracing::trace;

type Computation<E, A> = dyn Fn(Reject<E>, Resolve<A>) -> Cancel;

/// A lazy, cancellable computation that fails with `E` or succeeds with `A`.
///
/// Building a `Task` runs nothing. Work starts on [`fork`](Self::fork), and
/// every fork is an independent run of the same computation. Operators such as
/// [`map`](Self::map) or [`chain`](Self::chain) return new tasks and leave the
/// original untouched.
///
/// # Examples
///
/// ```
/// use ae_task::Task;
///
/// let task = Task::<String, i32>::resolved(20).map(|n| n + 1);
///
/// task.fork(
///     |error| panic!("unexpected failure: {error}"),
///     |n| assert_eq!(n, 21),
/// );
/// ```
pub struct Task<E, A> {
    computation: Rc<Computation<E, A>>,
}

impl<E: 'static, A: 'static> Task<E, A> {
    /// Wraps a computation into a task.
    ///
    /// The computation receives the two settlement handles and returns what
    /// cancels its work: a [`Cancel`], or `()` when there is nothing to cancel.
    /// It must settle at most once; extra settlements are ignored.
    pub fn new<F, C>(computation: F) -> Self
    where
        F: Fn(Reject<E>, Resolve<A>) -> C + 'static,
        C: Into<Cancel>,
    {
        Self {
            computation: Rc::new(move |reject: Reject<E>, resolve: Resolve<A>| -> Cancel {
                computation(reject, resolve).into()
            }),
        }
    }

    /// A task that succeeds with `value` as soon as it is started.
    pub fn resolved(value: A) -> Self
    where
        A: Clone,
    {
        Self::new(move |_, resolve| resolve.settle(value.clone()))
    }

    /// A task that fails with `error` as soon as it is started.
    pub fn rejected(error: E) -> Self
    where
        E: Clone,
    {
        Self::new(move |reject, _| reject.settle(error.clone()))
    }

    /// Starts the task.
    ///
    /// Exactly one of the callbacks fires, at most once, unless the returned
    /// handle is cancelled first, in which case neither fires. Cancelling after
    /// settlement is a no-op.
    pub fn fork<F, S>(&self, on_failure: F, on_success: S) -> Cancel
    where
        F: FnOnce(E) + 'static,
        S: FnOnce(A) + 'static,
    {
        trace!("forking task");
        let slot = Slot::open(on_failure, on_success);

        let cancel = (self.computation)(Reject::new(slot.clone()), Resolve::new(slot.clone()));

        if slot.is_closed() {
            return Cancel::noop();
        }

        Cancel::new(move || {
            if slot.close() {
                trace!("cancelling pending task");
                cancel.cancel();
            }
        })
    }
}

impl<E, A> Clone for Task<E, A> {
    fn clone(&self) -> Self {
        Self {
            computation: self.computation.clone(),
        }
    }
}

impl<E, A> fmt::Debug for Task<E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}
