use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Handle returned by every start of a [`Task`](crate::Task).
///
/// Calling [`cancel`](Self::cancel) runs the underlying cancel action at most
/// once. Calling it again, or after the task already settled, does nothing.
///
/// `Cancel` is cheap to clone; all clones share the same action.
#[derive(Clone, Default)]
pub struct Cancel {
    action: Option<Rc<RefCell<Option<Box<dyn FnOnce()>>>>>,
}

impl Cancel {
    /// Creates a cancel handle running `action` the first time it is cancelled.
    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            action: Some(Rc::new(RefCell::new(Some(Box::new(action))))),
        }
    }

    /// A cancel handle with nothing to cancel.
    pub fn noop() -> Self {
        Self::default()
    }

    /// Cancels the associated work.
    ///
    /// Idempotent: only the first call has any effect.
    pub fn cancel(&self) {
        let Some(cell) = &self.action else {
            return;
        };

        // Released before running so the action may clone or drop this handle.
        let action = cell.borrow_mut().take();

        if let Some(action) = action {
            action();
        }
    }

    /// Returns `true` once the action ran, or if there was never one.
    pub fn is_spent(&self) -> bool {
        self.action
            .as_ref()
            .is_none_or(|cell| cell.borrow().is_none())
    }
}

impl From<()> for Cancel {
    /// A computation without a cancel handler cancels nothing.
    fn from(_: ()) -> Self {
        Self::noop()
    }
}

impl fmt::Debug for Cancel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancel")
            .field("spent", &self.is_spent())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Cancel;

    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn runs_action_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let cancel = Cancel::new(move || counter.set(counter.get() + 1));

        let other = cancel.clone();
        assert!(!cancel.is_spent());

        cancel.cancel();
        cancel.cancel();
        other.cancel();

        assert_eq!(calls.get(), 1);
        assert!(other.is_spent());
    }

    #[test]
    fn unit_converts_to_noop() {
        let cancel: Cancel = ().into();
        cancel.cancel();
        assert!(cancel.is_spent());
    }
}
