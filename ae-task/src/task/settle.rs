//! Settlement protocol.
//!
//! Every start of a task owns one [`Slot`] holding the caller's two
//! callbacks. Settling empties the slot, so exactly one callback fires and it
//! fires at most once; cancelling empties it too, so nothing fires afterwards.
//! The computation only ever sees the slot through [`Reject`] and
//! [`Resolve`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

struct Callbacks<E, A> {
    on_failure: Box<dyn FnOnce(E)>,
    on_success: Box<dyn FnOnce(A)>,
}

/// Per-start settlement state.
pub(crate) struct Slot<E, A> {
    callbacks: RefCell<Option<Callbacks<E, A>>>,
}

impl<E, A> Slot<E, A> {
    pub(crate) fn open<F, S>(on_failure: F, on_success: S) -> Rc<Self>
    where
        F: FnOnce(E) + 'static,
        S: FnOnce(A) + 'static,
    {
        Rc::new(Self {
            callbacks: RefCell::new(Some(Callbacks {
                on_failure: Box::new(on_failure),
                on_success: Box::new(on_success),
            })),
        })
    }

    fn take(&self) -> Option<Callbacks<E, A>> {
        self.callbacks.borrow_mut().take()
    }

    fn settle_failure(&self, error: E) {
        match self.take() {
            Some(callbacks) => (callbacks.on_failure)(error),
            None => trace!("failure ignored, start already closed"),
        }
    }

    fn settle_success(&self, value: A) {
        match self.take() {
            Some(callbacks) => (callbacks.on_success)(value),
            None => trace!("success ignored, start already closed"),
        }
    }

    /// Closes the slot without settling. Returns `true` if it was still open.
    pub(crate) fn close(&self) -> bool {
        self.take().is_some()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.callbacks.borrow().is_none()
    }
}

trait FailureSink<E> {
    fn fail(&self, error: E);
    fn closed(&self) -> bool;
}

trait SuccessSink<A> {
    fn succeed(&self, value: A);
    fn closed(&self) -> bool;
}

impl<E, A> FailureSink<E> for Slot<E, A> {
    fn fail(&self, error: E) {
        self.settle_failure(error);
    }

    fn closed(&self) -> bool {
        self.is_closed()
    }
}

impl<E, A> SuccessSink<A> for Slot<E, A> {
    fn succeed(&self, value: A) {
        self.settle_success(value);
    }

    fn closed(&self) -> bool {
        self.is_closed()
    }
}

/// The failure half of a start.
///
/// Handed to a task's computation. Settling through it (or through any
/// clone, or through the matching [`Resolve`]) closes the start; later
/// settlements are ignored.
pub struct Reject<E> {
    sink: Rc<dyn FailureSink<E>>,
}

impl<E: 'static> Reject<E> {
    pub(crate) fn new<A: 'static>(slot: Rc<Slot<E, A>>) -> Self {
        Self { sink: slot }
    }
}

impl<E> Reject<E> {
    /// Settles the start with a failure.
    pub fn settle(self, error: E) {
        self.sink.fail(error);
    }

    /// Whether the start already settled or was cancelled.
    ///
    /// Long-running computations can check this at resumption points to stop
    /// work nobody is waiting for any more.
    pub fn is_closed(&self) -> bool {
        self.sink.closed()
    }
}

impl<E> Clone for Reject<E> {
    fn clone(&self) -> Self {
        Self {
            sink: self.sink.clone(),
        }
    }
}

impl<E> fmt::Debug for Reject<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reject")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// The success half of a start. See [`Reject`].
pub struct Resolve<A> {
    sink: Rc<dyn SuccessSink<A>>,
}

impl<A: 'static> Resolve<A> {
    pub(crate) fn new<E: 'static>(slot: Rc<Slot<E, A>>) -> Self {
        Self { sink: slot }
    }
}

impl<A> Resolve<A> {
    /// Settles the start with a success.
    pub fn settle(self, value: A) {
        self.sink.succeed(value);
    }

    /// Whether the start already settled or was cancelled.
    pub fn is_closed(&self) -> bool {
        self.sink.closed()
    }
}

impl<A> Clone for Resolve<A> {
    fn clone(&self) -> Self {
        Self {
            sink: self.sink.clone(),
        }
    }
}

impl<A> fmt::Debug for Resolve<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolve")
            .field("closed", &self.is_closed())
            .finish()
    }
}
