use crate::reactor::ReactorHandle;
use crate::runtime::executor::queue::QueueHandle;

use std::cell::RefCell;

thread_local! {
    /// Thread-local handle to the current reactor.
    ///
    /// Installed while a thread executes inside the runtime, so timers
    /// and I/O primitives can reach the reactor without threading a
    /// handle through every call.
    pub(crate) static CURRENT_REACTOR: RefCell<Option<ReactorHandle>> =
        const { RefCell::new(None) };

    /// Thread-local handle to the executor's shared task queue.
    ///
    /// Used by `spawn` to submit work from inside the runtime.
    pub(crate) static CURRENT_QUEUE: RefCell<Option<QueueHandle>> =
        const { RefCell::new(None) };
}

/// Enters the runtime execution context for the current thread.
///
/// The handles stay installed for the duration of `f`. The previous
/// context is restored on the way out by a drop guard, so it comes back
/// even if `f` unwinds.
pub(crate) fn enter_context<R>(
    reactor: ReactorHandle,
    queue: QueueHandle,
    f: impl FnOnce() -> R,
) -> R {
    let _restore = ContextGuard {
        reactor: CURRENT_REACTOR.replace(Some(reactor)),
        queue: CURRENT_QUEUE.replace(Some(queue)),
    };

    f()
}

/// Holds the displaced context and reinstates it when dropped.
struct ContextGuard {
    reactor: Option<ReactorHandle>,
    queue: Option<QueueHandle>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_REACTOR.replace(self.reactor.take());
        CURRENT_QUEUE.replace(self.queue.take());
    }
}

/// Returns the reactor handle of the current runtime context.
///
/// # Panics
///
/// Panics when called outside of a running runtime.
pub(crate) fn current_reactor() -> ReactorHandle {
    CURRENT_REACTOR.with_borrow(|slot| {
        slot.clone()
            .expect("no reactor in context; this operation requires a running runtime")
    })
}

/// Returns the task queue handle of the current runtime context.
///
/// # Panics
///
/// Panics when called outside of a running runtime.
pub(crate) fn current_queue() -> QueueHandle {
    CURRENT_QUEUE.with_borrow(|slot| {
        slot.clone()
            .expect("spawn must be called within the context of a runtime")
    })
}
