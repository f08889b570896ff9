use super::Timer;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

/// Creates a future that completes after `duration`.
///
/// The timer is registered with `timer` on first poll, so the duration counts
/// from there.
///
/// # Examples
///
/// ```rust
/// use ae_task::time::sleep;
/// use std::time::Duration;
///
/// #[ae_task::main]
/// async fn main() {
///     sleep(&ae_task::Handle::current(), Duration::from_millis(10)).await;
/// }
/// ```
pub fn sleep<T: Timer + Clone>(timer: &T, duration: Duration) -> Sleep<T> {
    Sleep {
        timer: timer.clone(),
        duration,
        id: None,
        state: Rc::default(),
    }
}

/// State shared between a [`Sleep`] and its timer callback.
#[derive(Default)]
struct SleepState {
    fired: Cell<bool>,
    waker: RefCell<Option<Waker>>,
}

/// A future that completes once its timer fired.
///
/// This future is **cancel-safe**: dropping it clears the timer.
pub struct Sleep<T: Timer> {
    timer: T,
    duration: Duration,

    /// Id of the registered timer, set on first poll.
    id: Option<T::Id>,
    state: Rc<SleepState>,
}

impl<T: Timer> Unpin for Sleep<T> {}

impl<T: Timer> Future for Sleep<T> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();

        if this.state.fired.get() {
            return Poll::Ready(());
        }

        this.state.waker.replace(Some(cx.waker().clone()));

        if this.id.is_none() {
            let state = this.state.clone();

            let id = this.timer.set_timeout(
                this.duration,
                Box::new(move || {
                    state.fired.set(true);

                    let waker = state.waker.borrow_mut().take();
                    if let Some(waker) = waker {
                        waker.wake();
                    }
                }),
            );

            this.id = Some(id);
        }

        Poll::Pending
    }
}

impl<T: Timer> Drop for Sleep<T> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            if !self.state.fired.get() {
                self.timer.clear_timeout(id);
            }
        }
    }
}

impl<T: Timer> fmt::Debug for Sleep<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sleep")
            .field("duration", &self.duration)
            .field("registered", &self.id.is_some())
            .field("fired", &self.state.fired.get())
            .finish()
    }
}
