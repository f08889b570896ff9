use super::handle::Handle;

use std::cell::RefCell;

thread_local! {
    /// Handle of the runtime currently driving this thread.
    ///
    /// Set for the duration of [`Runtime::block_on`](super::Runtime::block_on)
    /// so that code running inside it can reach the runtime through
    /// [`Handle::current`] without explicit parameter passing.
    static CURRENT_HANDLE: RefCell<Option<Handle>> = const { RefCell::new(None) };
}

/// Restores the previous context when dropped, even on panic.
struct ContextGuard {
    previous: Option<Handle>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT_HANDLE.with(|cell| cell.replace(previous));
    }
}

/// Runs `f` with `handle` installed as the current runtime of this thread.
///
/// The previous context, if any, is restored afterwards, so nested runtimes
/// see their own handle.
pub(crate) fn enter_context<R>(handle: Handle, f: impl FnOnce() -> R) -> R {
    let previous = CURRENT_HANDLE.with(|cell| cell.replace(Some(handle)));
    let _guard = ContextGuard { previous };

    f()
}

/// Handle of the runtime driving this thread, if any.
pub(crate) fn current() -> Option<Handle> {
    CURRENT_HANDLE.with(|cell| cell.borrow().clone())
}
