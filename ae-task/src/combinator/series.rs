use crate::task::{Cancel, Reject, Resolve, Task};

use std::cell::{Cell, RefCell};
use std::mem;
use std::rc::Rc;

use tracing::trace;

/// State of one sequential run.
struct Series<E, A> {
    tasks: Rc<[Task<E, A>]>,

    /// Index of the next task to start.
    next: Cell<usize>,
    values: RefCell<Vec<A>>,

    /// Cancel handle of the task currently running, if any.
    current: RefCell<Option<Cancel>>,

    /// Set while [`Series::drive`] is on the stack, so that synchronous
    /// settlements continue the loop instead of recursing.
    driving: Cell<bool>,
    closed: Cell<bool>,

    reject: RefCell<Option<Reject<E>>>,
    resolve: RefCell<Option<Resolve<Vec<A>>>>,
}

impl<E: 'static, A: 'static> Series<E, A> {
    fn drive(self: &Rc<Self>) {
        if self.driving.replace(true) {
            return;
        }

        while !self.closed.get() {
            let index = self.next.get();

            let Some(task) = self.tasks.get(index) else {
                self.complete();
                break;
            };

            trace!(index, "series starting task");

            let on_success = {
                let series = self.clone();

                move |value| {
                    series.values.borrow_mut().push(value);
                    series.next.set(index + 1);
                    series.drive();
                }
            };

            let on_failure = {
                let series = self.clone();
                move |error| series.fail(index, error)
            };

            let cancel = task.fork(on_failure, on_success);

            if self.next.get() == index && !self.closed.get() {
                self.current.replace(Some(cancel));
                break;
            }
        }

        self.driving.set(false);
    }

    fn complete(&self) {
        self.closed.set(true);

        let values = mem::take(&mut *self.values.borrow_mut());
        let resolve = self.resolve.borrow_mut().take();

        if let Some(resolve) = resolve {
            resolve.settle(values);
        }
    }

    fn fail(&self, index: usize, error: E) {
        if self.closed.replace(true) {
            return;
        }

        trace!(index, "series short-circuited");
        self.current.replace(None);

        let reject = self.reject.borrow_mut().take();
        if let Some(reject) = reject {
            reject.settle(error);
        }
    }

    fn cancel(&self) {
        self.closed.set(true);

        let current = self.current.borrow_mut().take();
        if let Some(cancel) = current {
            cancel.cancel();
        }
    }
}

impl<E: 'static, A: 'static> Task<E, A> {
    /// Runs `tasks` one after another and collects their values in order.
    ///
    /// A task starts only once its predecessor succeeded. The first failure
    /// settles the aggregate and the remaining tasks are never started.
    /// Cancelling the aggregate cancels the task currently running.
    pub fn series<I>(tasks: I) -> Task<E, Vec<A>>
    where
        I: IntoIterator<Item = Task<E, A>>,
    {
        let tasks: Rc<[Task<E, A>]> = tasks.into_iter().collect();

        Task::new(move |reject: Reject<E>, resolve: Resolve<Vec<A>>| {
            let series = Rc::new(Series {
                tasks: tasks.clone(),
                next: Cell::new(0),
                values: RefCell::new(Vec::with_capacity(tasks.len())),
                current: RefCell::new(None),
                driving: Cell::new(false),
                closed: Cell::new(false),
                reject: RefCell::new(Some(reject)),
                resolve: RefCell::new(Some(resolve)),
            });

            series.drive();

            Cancel::new(move || series.cancel())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::task::{Cancel, Resolve, Task};

    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn outcome<A: 'static>(task: &Task<i32, A>) -> Option<Result<A, i32>> {
        let seen = Rc::new(RefCell::new(None));
        let (failure, success) = (seen.clone(), seen.clone());

        task.fork(
            move |e| *failure.borrow_mut() = Some(Err(e)),
            move |a| *success.borrow_mut() = Some(Ok(a)),
        );

        seen.take()
    }

    #[test]
    fn building_a_series_runs_nothing() {
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let child = Task::<i32, i32>::new(move |_, resolve| {
            counter.set(counter.get() + 1);
            resolve.settle(0);
        });

        let task = Task::series([child.clone(), child]);
        assert_eq!(runs.get(), 0);

        assert_eq!(outcome(&task), Some(Ok(vec![0, 0])));
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn collects_values_in_order() {
        let task = Task::series([Task::resolved(1), Task::resolved(2), Task::resolved(3)]);
        assert_eq!(outcome(&task), Some(Ok(vec![1, 2, 3])));
    }

    #[test]
    fn empty_series_resolves_empty() {
        let task = Task::<i32, i32>::series([]);
        assert_eq!(outcome(&task), Some(Ok(vec![])));
    }

    #[test]
    fn stops_at_first_failure() {
        let started = Rc::new(Cell::new(false));
        let flag = started.clone();
        let third = Task::<i32, i32>::new(move |_, resolve| {
            flag.set(true);
            resolve.settle(3);
        });

        let task = Task::series([Task::resolved(1), Task::rejected(2), third]);

        assert_eq!(outcome(&task), Some(Err(2)));
        assert!(!started.get());
    }

    #[test]
    fn waits_for_predecessor() {
        let stash: Rc<RefCell<Option<Resolve<i32>>>> = Rc::default();
        let started = Rc::new(Cell::new(false));

        let slot = stash.clone();
        let first = Task::<i32, i32>::new(move |_, resolve| {
            slot.replace(Some(resolve));
        });

        let flag = started.clone();
        let second = Task::<i32, i32>::new(move |_, resolve| {
            flag.set(true);
            resolve.settle(2);
        });

        let seen = Rc::new(RefCell::new(None));
        let out = seen.clone();
        Task::series([first, second]).fork(|_| {}, move |v| *out.borrow_mut() = Some(v));

        assert!(!started.get());

        let resolve = stash.borrow_mut().take();
        if let Some(resolve) = resolve {
            resolve.settle(1);
        }

        assert!(started.get());
        assert_eq!(*seen.borrow(), Some(vec![1, 2]));
    }

    #[test]
    fn cancel_reaches_only_current_task() {
        let cancels = Rc::new(RefCell::new(Vec::new()));

        let pending = |id: usize| {
            let cancels = cancels.clone();
            Task::<i32, i32>::new(move |_, _| {
                let cancels = cancels.clone();
                Cancel::new(move || cancels.borrow_mut().push(id))
            })
        };

        let task = Task::series([Task::resolved(0), pending(1), pending(2)]);
        task.fork(|_| {}, |_| {}).cancel();

        assert_eq!(*cancels.borrow(), vec![1]);
    }

    #[test]
    fn long_synchronous_series_does_not_recurse() {
        let tasks = (0..100_000).map(Task::<i32, i32>::resolved);
        let task = Task::series(tasks).map(|values| values.len());

        assert_eq!(outcome(&task), Some(Ok(100_000)));
    }
}
