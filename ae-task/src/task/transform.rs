//! Transformation and override operators.
//!
//! Every operator returns a new [`Task`] whose computation forks the source
//! and post-processes its outcome. Cancelling the new task cancels the
//! source's run.

use super::cancel::Cancel;
use super::core::Task;
use super::settle::{Reject, Resolve};

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

impl<E: 'static, A: 'static> Task<E, A> {
    /// Transforms the success value. Failures pass through untouched.
    pub fn map<B, F>(&self, f: F) -> Task<E, B>
    where
        B: 'static,
        F: Fn(A) -> B + 'static,
    {
        let source = self.clone();
        let f = Rc::new(f);

        Task::new(move |reject: Reject<E>, resolve: Resolve<B>| {
            let f = f.clone();
            source.fork(move |e| reject.settle(e), move |a| resolve.settle(f(a)))
        })
    }

    /// Transforms the failure value. Successes pass through untouched.
    pub fn map_rejected<F2, F>(&self, f: F) -> Task<F2, A>
    where
        F2: 'static,
        F: Fn(E) -> F2 + 'static,
    {
        let source = self.clone();
        let f = Rc::new(f);

        Task::new(move |reject: Reject<F2>, resolve: Resolve<A>| {
            let f = f.clone();
            source.fork(move |e| reject.settle(f(e)), move |a| resolve.settle(a))
        })
    }

    /// Applies `on_failure` or `on_success`, whichever channel settles.
    pub fn bimap<F2, B, F, G>(&self, on_failure: F, on_success: G) -> Task<F2, B>
    where
        F2: 'static,
        B: 'static,
        F: Fn(E) -> F2 + 'static,
        G: Fn(A) -> B + 'static,
    {
        let source = self.clone();
        let on_failure = Rc::new(on_failure);
        let on_success = Rc::new(on_success);

        Task::new(move |reject: Reject<F2>, resolve: Resolve<B>| {
            let (f, g) = (on_failure.clone(), on_success.clone());
            source.fork(move |e| reject.settle(f(e)), move |a| resolve.settle(g(a)))
        })
    }

    /// Sequences a dependent task.
    ///
    /// On success, `f` builds the next task, which is started immediately and
    /// whose outcome becomes the outcome of the whole. On failure `f` is never
    /// called. Cancelling cancels whichever of the two runs is in flight.
    pub fn chain<B, F>(&self, f: F) -> Task<E, B>
    where
        B: 'static,
        F: Fn(A) -> Task<E, B> + 'static,
    {
        let source = self.clone();
        let f = Rc::new(f);

        Task::new(move |reject: Reject<E>, resolve: Resolve<B>| {
            let next: Rc<RefCell<Option<Cancel>>> = Rc::default();

            let on_success = {
                let f = f.clone();
                let next = next.clone();
                let reject = reject.clone();

                move |value| {
                    let cancel =
                        f(value).fork(move |e| reject.settle(e), move |b| resolve.settle(b));
                    next.replace(Some(cancel));
                }
            };

            let first = source.fork(move |e| reject.settle(e), on_success);

            Cancel::new(move || {
                first.cancel();

                let pending = next.borrow_mut().take();
                if let Some(cancel) = pending {
                    cancel.cancel();
                }
            })
        })
    }

    /// Recovers from a failure with another task.
    ///
    /// The dual of [`chain`](Self::chain): on failure, `f` builds the task
    /// that decides the outcome; successes pass through.
    pub fn chain_rejected<F2, F>(&self, f: F) -> Task<F2, A>
    where
        F2: 'static,
        F: Fn(E) -> Task<F2, A> + 'static,
    {
        let source = self.clone();
        let f = Rc::new(f);

        Task::new(move |reject: Reject<F2>, resolve: Resolve<A>| {
            let next: Rc<RefCell<Option<Cancel>>> = Rc::default();

            let on_failure = {
                let f = f.clone();
                let next = next.clone();
                let resolve = resolve.clone();

                move |error| {
                    let cancel =
                        f(error).fork(move |e| reject.settle(e), move |a| resolve.settle(a));
                    next.replace(Some(cancel));
                }
            };

            let first = source.fork(on_failure, move |a| resolve.settle(a));

            Cancel::new(move || {
                first.cancel();

                let pending = next.borrow_mut().take();
                if let Some(cancel) = pending {
                    cancel.cancel();
                }
            })
        })
    }

    /// Collapses both channels into success. The resulting task never fails.
    pub fn fold<B, F, G>(&self, on_failure: F, on_success: G) -> Task<Infallible, B>
    where
        B: 'static,
        F: Fn(E) -> B + 'static,
        G: Fn(A) -> B + 'static,
    {
        let source = self.clone();
        let on_failure = Rc::new(on_failure);
        let on_success = Rc::new(on_success);

        Task::new(move |_: Reject<Infallible>, resolve: Resolve<B>| {
            let (f, g) = (on_failure.clone(), on_success.clone());
            let other = resolve.clone();
            source.fork(move |e| other.settle(f(e)), move |a| resolve.settle(g(a)))
        })
    }

    /// Runs the task but succeeds with `value` whatever its outcome.
    pub fn resolve_with<B>(&self, value: B) -> Task<E, B>
    where
        B: Clone + 'static,
    {
        let source = self.clone();

        Task::new(move |_: Reject<E>, resolve: Resolve<B>| {
            let (on_failure, on_success) = (value.clone(), value.clone());
            let other = resolve.clone();
            source.fork(
                move |_| other.settle(on_failure),
                move |_| resolve.settle(on_success),
            )
        })
    }

    /// Runs the task but fails with `error` whatever its outcome.
    pub fn reject_with<F2>(&self, error: F2) -> Task<F2, A>
    where
        F2: Clone + 'static,
    {
        let source = self.clone();

        Task::new(move |reject: Reject<F2>, _: Resolve<A>| {
            let (on_failure, on_success) = (error.clone(), error.clone());
            let other = reject.clone();
            source.fork(
                move |_| other.settle(on_failure),
                move |_| reject.settle(on_success),
            )
        })
    }

    /// Runs the task for its effects and never settles.
    pub fn empty(&self) -> Task<E, A> {
        let source = self.clone();

        Task::new(move |_: Reject<E>, _: Resolve<A>| source.fork(|_| {}, |_| {}))
    }
}
