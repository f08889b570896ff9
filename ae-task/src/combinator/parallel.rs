use crate::task::{Cancel, Reject, Resolve, Task};

use std::cell::{Cell, RefCell};
use std::mem;
use std::rc::Rc;

use tracing::trace;

/// State of one concurrent run.
struct Parallel<E, A> {
    /// One slot per child, in input order.
    values: RefCell<Vec<Option<A>>>,
    remaining: Cell<usize>,
    running: RefCell<Vec<Cancel>>,
    closed: Cell<bool>,

    reject: RefCell<Option<Reject<E>>>,
    resolve: RefCell<Option<Resolve<Vec<A>>>>,
}

impl<E, A> Parallel<E, A> {
    fn succeed(&self, index: usize, value: A) {
        if self.closed.get() {
            return;
        }

        self.values.borrow_mut()[index] = Some(value);
        self.remaining.set(self.remaining.get() - 1);

        if self.remaining.get() > 0 {
            return;
        }

        self.closed.set(true);
        self.running.replace(Vec::new());

        let values = mem::take(&mut *self.values.borrow_mut())
            .into_iter()
            .flatten()
            .collect();

        let resolve = self.resolve.borrow_mut().take();
        if let Some(resolve) = resolve {
            resolve.settle(values);
        }
    }

    fn fail(&self, index: usize, error: E) {
        if self.closed.replace(true) {
            return;
        }

        trace!(index, "parallel run failed, cancelling siblings");
        self.cancel_running();

        let reject = self.reject.borrow_mut().take();
        if let Some(reject) = reject {
            reject.settle(error);
        }
    }

    fn cancel_running(&self) {
        let running = mem::take(&mut *self.running.borrow_mut());

        for cancel in running {
            cancel.cancel();
        }
    }
}

impl<E: 'static, A: 'static> Task<E, A> {
    /// Runs `tasks` concurrently and collects their values in input order.
    ///
    /// All tasks are started at once, in input order. The aggregate succeeds
    /// when every task succeeded, and fails with the first failure observed in
    /// time, cancelling the tasks still running. A synchronous failure during
    /// kickoff keeps the remaining tasks from being started.
    pub fn parallel<I>(tasks: I) -> Task<E, Vec<A>>
    where
        I: IntoIterator<Item = Task<E, A>>,
    {
        let tasks: Rc<[Task<E, A>]> = tasks.into_iter().collect();

        Task::new(move |reject: Reject<E>, resolve: Resolve<Vec<A>>| {
            if tasks.is_empty() {
                resolve.settle(Vec::new());
                return Cancel::noop();
            }

            let parallel = Rc::new(Parallel {
                values: RefCell::new(tasks.iter().map(|_| None).collect()),
                remaining: Cell::new(tasks.len()),
                running: RefCell::new(Vec::with_capacity(tasks.len())),
                closed: Cell::new(false),
                reject: RefCell::new(Some(reject)),
                resolve: RefCell::new(Some(resolve)),
            });

            for (index, task) in tasks.iter().enumerate() {
                let on_failure = {
                    let parallel = parallel.clone();
                    move |error| parallel.fail(index, error)
                };

                let on_success = {
                    let parallel = parallel.clone();
                    move |value| parallel.succeed(index, value)
                };

                let cancel = task.fork(on_failure, on_success);

                if parallel.closed.get() {
                    break;
                }

                parallel.running.borrow_mut().push(cancel);
            }

            Cancel::new(move || {
                parallel.closed.set(true);
                parallel.cancel_running();
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::task::{Cancel, Resolve, Task};

    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    type Stash = Rc<RefCell<Vec<Option<Resolve<i32>>>>>;

    /// A task whose success handle is parked in `stash` at `index`.
    fn deferred(stash: &Stash, index: usize) -> Task<i32, i32> {
        let stash = stash.clone();
        Task::new(move |_, resolve| {
            stash.borrow_mut()[index] = Some(resolve);
        })
    }

    fn settle(stash: &Stash, index: usize, value: i32) {
        let resolve = stash.borrow_mut()[index].take();
        if let Some(resolve) = resolve {
            resolve.settle(value);
        }
    }

    #[test]
    fn building_a_parallel_runs_nothing() {
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let child = Task::<i32, i32>::new(move |_, _| counter.set(counter.get() + 1));

        let task = Task::parallel([child.clone(), child]);
        assert_eq!(runs.get(), 0);

        task.fork(|_| {}, |_| {});
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn values_follow_input_order() {
        let stash: Stash = Rc::new(RefCell::new(vec![None, None, None]));
        let task = Task::parallel([deferred(&stash, 0), deferred(&stash, 1), deferred(&stash, 2)]);

        let seen = Rc::new(RefCell::new(None));
        let out = seen.clone();
        task.fork(|_| {}, move |v| *out.borrow_mut() = Some(v));

        settle(&stash, 2, 30);
        settle(&stash, 0, 10);
        assert!(seen.borrow().is_none());

        settle(&stash, 1, 20);
        assert_eq!(*seen.borrow(), Some(vec![10, 20, 30]));
    }

    #[test]
    fn empty_parallel_resolves_empty() {
        let seen = Rc::new(RefCell::new(None));
        let out = seen.clone();

        Task::<i32, i32>::parallel([]).fork(|_| {}, move |v| *out.borrow_mut() = Some(v));

        assert_eq!(*seen.borrow(), Some(vec![]));
    }

    #[test]
    fn first_failure_cancels_running() {
        let cancelled = Rc::new(Cell::new(0));
        let stash: Rc<RefCell<Option<crate::task::Reject<i32>>>> = Rc::default();

        let pending = {
            let cancelled = cancelled.clone();
            Task::<i32, i32>::new(move |_, _| {
                let cancelled = cancelled.clone();
                Cancel::new(move || cancelled.set(cancelled.get() + 1))
            })
        };

        let slot = stash.clone();
        let failing = Task::<i32, i32>::new(move |reject, _| {
            slot.replace(Some(reject));
        });

        let seen = Rc::new(Cell::new(None));
        let out = seen.clone();
        Task::parallel([pending.clone(), failing, pending]).fork(move |e| out.set(Some(e)), |_| {});

        let reject = stash.borrow_mut().take();
        if let Some(reject) = reject {
            reject.settle(4);
        }

        assert_eq!(seen.get(), Some(4));
        assert_eq!(cancelled.get(), 2);
    }

    #[test]
    fn synchronous_failure_skips_remaining() {
        let started = Rc::new(Cell::new(false));
        let flag = started.clone();
        let late = Task::<i32, i32>::new(move |_, resolve| {
            flag.set(true);
            resolve.settle(3);
        });

        let seen = Rc::new(Cell::new(None));
        let out = seen.clone();
        Task::parallel([Task::resolved(1), Task::rejected(2), late])
            .fork(move |e| out.set(Some(e)), |_| {});

        assert_eq!(seen.get(), Some(2));
        assert!(!started.get());
    }

    #[test]
    fn cancel_reaches_every_running_child() {
        let cancelled = Rc::new(Cell::new(0));

        let pending = {
            let cancelled = cancelled.clone();
            Task::<i32, i32>::new(move |_, _| {
                let cancelled = cancelled.clone();
                Cancel::new(move || cancelled.set(cancelled.get() + 1))
            })
        };

        let cancel =
            Task::parallel([Task::resolved(0), pending.clone(), pending]).fork(|_| {}, |_| {});
        cancel.cancel();

        assert_eq!(cancelled.get(), 2);
    }
}
