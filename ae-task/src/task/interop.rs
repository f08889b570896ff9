//! Bridge between tasks and Rust futures.
//!
//! [`Task::to_promise`] starts a task and exposes its outcome as a
//! [`Future`]. [`Task::from_promise`] goes the other way and needs a
//! [`Spawn`] capability to drive the future it is given.

use super::cancel::Cancel;
use super::core::Task;
use super::settle::{Reject, Resolve};

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use tracing::trace;

/// A boxed, non-`Send` future with no output.
pub type LocalFuture = Pin<Box<dyn Future<Output = ()>>>;

/// Something able to drive local futures to completion.
///
/// Implemented by [`Handle`](crate::Handle); any single-threaded executor can
/// implement it to host [`Task::from_promise`].
pub trait Spawn {
    /// Schedules `future` to be polled until it completes.
    fn spawn_local(&self, future: LocalFuture);
}

struct PromiseState<E, A> {
    outcome: Option<Result<A, E>>,
    waker: Option<Waker>,
}

/// The outcome of a started task, as a [`Future`].
///
/// Produced by [`Task::to_promise`]. It resolves to `Ok` on success and `Err`
/// on failure. It cannot cancel the task; if the task never settles, neither
/// does the promise.
pub struct Promise<E, A> {
    state: Rc<RefCell<PromiseState<E, A>>>,
}

impl<E, A> Future for Promise<E, A> {
    type Output = Result<A, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.state.borrow_mut();

        match state.outcome.take() {
            Some(outcome) => Poll::Ready(outcome),
            None => {
                state.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl<E, A> fmt::Debug for Promise<E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("settled", &self.state.borrow().outcome.is_some())
            .finish()
    }
}

/// Cancellation flag for a spawned future, checked on every poll.
#[derive(Default)]
struct AbortSignal {
    raised: Cell<bool>,
    waker: RefCell<Option<Waker>>,
}

impl AbortSignal {
    fn raise(&self) {
        self.raised.set(true);

        let waker = self.waker.borrow_mut().take();
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

/// Polls a future on behalf of one start and settles it.
struct Driver<E, A> {
    future: Pin<Box<dyn Future<Output = Result<A, E>>>>,
    reject: Option<Reject<E>>,
    resolve: Option<Resolve<A>>,
    signal: Rc<AbortSignal>,
}

impl<E, A> Future for Driver<E, A> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();

        if this.signal.raised.get() {
            trace!("dropping future of a cancelled task");
            return Poll::Ready(());
        }

        this.signal.waker.replace(Some(cx.waker().clone()));

        match this.future.as_mut().poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(value)) => {
                if let Some(resolve) = this.resolve.take() {
                    resolve.settle(value);
                }
                Poll::Ready(())
            }
            Poll::Ready(Err(error)) => {
                if let Some(reject) = this.reject.take() {
                    reject.settle(error);
                }
                Poll::Ready(())
            }
        }
    }
}

impl<E: 'static, A: 'static> Task<E, A> {
    /// Builds a task from a future factory.
    ///
    /// Each start calls `factory` and spawns the future on `spawner`; its
    /// `Ok`/`Err` output settles the start. Cancelling cannot interrupt a
    /// poll in progress, but the future is dropped at its next resumption and
    /// its outcome is never delivered.
    pub fn from_promise<S, F, Fut>(spawner: &S, factory: F) -> Self
    where
        S: Spawn + Clone + 'static,
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<A, E>> + 'static,
    {
        let spawner = spawner.clone();

        Task::new(move |reject: Reject<E>, resolve: Resolve<A>| {
            let signal = Rc::new(AbortSignal::default());

            spawner.spawn_local(Box::pin(Driver {
                future: Box::pin(factory()),
                reject: Some(reject),
                resolve: Some(resolve),
                signal: signal.clone(),
            }));

            Cancel::new(move || signal.raise())
        })
    }

    /// Starts the task now and returns its outcome as a future.
    ///
    /// There is no way to cancel the run from the returned [`Promise`].
    pub fn to_promise(&self) -> Promise<E, A> {
        let state = Rc::new(RefCell::new(PromiseState {
            outcome: None,
            waker: None,
        }));

        let (failure, success) = (state.clone(), state.clone());

        self.fork(
            move |error| settle_promise(&failure, Err(error)),
            move |value| settle_promise(&success, Ok(value)),
        );

        Promise { state }
    }
}

fn settle_promise<E, A>(state: &RefCell<PromiseState<E, A>>, outcome: Result<A, E>) {
    let waker = {
        let mut state = state.borrow_mut();
        state.outcome = Some(outcome);
        state.waker.take()
    };

    if let Some(waker) = waker {
        waker.wake();
    }
}

impl<E: 'static, A: 'static> IntoFuture for Task<E, A> {
    type Output = Result<A, E>;
    type IntoFuture = Promise<E, A>;

    /// Starts the task at the `.await` point.
    fn into_future(self) -> Self::IntoFuture {
        self.to_promise()
    }
}

#[cfg(test)]
mod tests {
    use super::{LocalFuture, Spawn};
    use crate::task::Task;

    use std::cell::{Cell, RefCell};
    use std::future::Future;
    use std::pin::pin;
    use std::rc::Rc;
    use std::task::{Context, Poll, Waker};

    /// Collects spawned futures and polls them on demand.
    #[derive(Clone, Default)]
    struct ManualSpawner {
        queue: Rc<RefCell<Vec<LocalFuture>>>,
    }

    impl ManualSpawner {
        fn run_until_idle(&self) {
            let mut cx = Context::from_waker(Waker::noop());
            let batch: Vec<_> = self.queue.borrow_mut().drain(..).collect();

            for mut future in batch {
                if future.as_mut().poll(&mut cx).is_pending() {
                    self.queue.borrow_mut().push(future);
                }
            }
        }
    }

    impl Spawn for ManualSpawner {
        fn spawn_local(&self, future: LocalFuture) {
            self.queue.borrow_mut().push(future);
        }
    }

    #[test]
    fn to_promise_resolves() {
        let task = Task::<i32, i32>::resolved(5)
            .map(|x| x + 1)
            .chain(|x| Task::resolved(2 * x))
            .map(|x| x + 5);

        let mut promise = pin!(task.to_promise());
        let mut cx = Context::from_waker(Waker::noop());

        assert_eq!(promise.as_mut().poll(&mut cx), Poll::Ready(Ok(17)));
    }

    #[test]
    fn to_promise_rejects() {
        let task = Task::<i32, i32>::rejected(5)
            .map(|x| x + 1)
            .chain(|x| Task::resolved(2 * x));

        let mut promise = pin!(task.to_promise());
        let mut cx = Context::from_waker(Waker::noop());

        assert_eq!(promise.as_mut().poll(&mut cx), Poll::Ready(Err(5)));
    }

    #[test]
    fn from_promise_is_lazy_and_settles() {
        let spawner = ManualSpawner::default();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();

        let task = Task::<i32, i32>::from_promise(&spawner, move || {
            counter.set(counter.get() + 1);
            async { Ok(5) }
        });
        assert_eq!(calls.get(), 0);

        let seen = Rc::new(Cell::new(None));
        let out = seen.clone();
        task.fork(|_| panic!("should not fail"), move |n| out.set(Some(n)));

        spawner.run_until_idle();

        assert_eq!(calls.get(), 1);
        assert_eq!(seen.get(), Some(5));
    }

    #[test]
    fn from_promise_rejects() {
        let spawner = ManualSpawner::default();
        let task = Task::<i32, i32>::from_promise(&spawner, || async { Err(5) });

        let seen = Rc::new(Cell::new(None));
        let out = seen.clone();
        task.fork(move |e| out.set(Some(e)), |_| panic!("should not succeed"));

        spawner.run_until_idle();

        assert_eq!(seen.get(), Some(5));
    }

    #[test]
    fn cancelled_from_promise_never_settles() {
        let spawner = ManualSpawner::default();
        let task = Task::<i32, i32>::from_promise(&spawner, || async { Ok(1) });

        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        task.fork(|_| {}, move |_| flag.set(true)).cancel();

        spawner.run_until_idle();

        assert!(!fired.get());
        assert!(spawner.queue.borrow().is_empty());
    }
}
