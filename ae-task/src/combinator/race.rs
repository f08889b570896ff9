use crate::task::{Cancel, Reject, Resolve, Task};

use std::cell::{Cell, RefCell};
use std::mem;
use std::rc::Rc;

use tracing::trace;

/// State of one aggregate run.
struct Race {
    settled: Cell<bool>,
    running: RefCell<Vec<Cancel>>,
}

impl Race {
    /// Claims the win for `index`. Returns `false` if another child already won.
    fn finish(&self, index: usize) -> bool {
        if self.settled.replace(true) {
            return false;
        }

        trace!(index, "race decided");
        self.cancel_running();
        true
    }

    fn cancel_running(&self) {
        let running = mem::take(&mut *self.running.borrow_mut());

        for cancel in running {
            cancel.cancel();
        }
    }
}

impl<E: 'static, A: 'static> Task<E, A> {
    /// Settles like the first of `tasks` to settle, on either channel.
    ///
    /// Children are started in input order. As soon as one settles, every
    /// other running child is cancelled; children not started yet (because an
    /// earlier one settled synchronously) are never started. Cancelling the
    /// aggregate cancels every running child. An empty race never settles.
    pub fn race<I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = Task<E, A>>,
    {
        let tasks: Rc<[Task<E, A>]> = tasks.into_iter().collect();

        Task::new(move |reject: Reject<E>, resolve: Resolve<A>| {
            let race = Rc::new(Race {
                settled: Cell::new(false),
                running: RefCell::new(Vec::with_capacity(tasks.len())),
            });

            for (index, task) in tasks.iter().enumerate() {
                let on_failure = {
                    let race = race.clone();
                    let reject = reject.clone();

                    move |error| {
                        if race.finish(index) {
                            reject.settle(error);
                        }
                    }
                };

                let on_success = {
                    let race = race.clone();
                    let resolve = resolve.clone();

                    move |value| {
                        if race.finish(index) {
                            resolve.settle(value);
                        }
                    }
                };

                let cancel = task.fork(on_failure, on_success);

                if race.settled.get() {
                    break;
                }

                race.running.borrow_mut().push(cancel);
            }

            Cancel::new(move || {
                race.settled.set(true);
                race.cancel_running();
            })
        })
    }
}
