use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::task::{Wake, Waker};
use std::time::Instant;

/// Queue of woken task ids.
///
/// Wakers may be invoked from any thread, so the queue is shared behind a
/// mutex and signals the runtime thread through a condition variable when it
/// is parked.
#[derive(Default)]
pub(crate) struct WakeQueue {
    /// Ids of woken tasks, in wake order.
    ids: Mutex<VecDeque<usize>>,

    /// Condition variable used to unpark the runtime thread.
    condvar: Condvar,
}

impl WakeQueue {
    fn lock(&self) -> MutexGuard<'_, VecDeque<usize>> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks task `id` as ready and unparks the runtime thread.
    pub(crate) fn push(&self, id: usize) {
        self.lock().push_back(id);
        self.condvar.notify_one();
    }

    pub(crate) fn pop(&self) -> Option<usize> {
        self.lock().pop_front()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Parks the current thread until a task is woken or `deadline` passes.
    ///
    /// Without a deadline, waits until a task is woken.
    pub(crate) fn park(&self, deadline: Option<Instant>) {
        let mut ids = self.lock();

        while ids.is_empty() {
            match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return;
                    }

                    ids = self
                        .condvar
                        .wait_timeout(ids, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
                None => {
                    ids = self
                        .condvar
                        .wait(ids)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }
}

/// Waker pushing its task id into the runtime's [`WakeQueue`].
struct TaskWaker {
    id: usize,
    queue: Arc<WakeQueue>,
}

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        self.queue.push(self.id);
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.queue.push(self.id);
    }
}

/// Creates a [`Waker`] that reschedules task `id` on `queue`.
pub(crate) fn make_waker(id: usize, queue: Arc<WakeQueue>) -> Waker {
    Waker::from(Arc::new(TaskWaker { id, queue }))
}

#[cfg(test)]
mod tests {
    use super::{WakeQueue, make_waker};

    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn wakers_enqueue_their_id() {
        let queue = Arc::new(WakeQueue::default());
        let waker = make_waker(7, queue.clone());

        waker.wake_by_ref();
        waker.wake();

        assert_eq!(queue.pop(), Some(7));
        assert_eq!(queue.pop(), Some(7));
        assert!(queue.is_empty());
    }

    #[test]
    fn park_returns_at_deadline() {
        let queue = WakeQueue::default();
        let start = Instant::now();

        queue.park(Some(start + Duration::from_millis(20)));

        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn park_returns_when_woken_from_another_thread() {
        let queue = Arc::new(WakeQueue::default());
        let waker = make_waker(1, queue.clone());

        let remote = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            waker.wake();
        });

        queue.park(None);
        assert_eq!(queue.pop(), Some(1));

        remote.join().unwrap();
    }
}
