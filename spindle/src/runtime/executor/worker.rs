use crate::runtime::executor::queue::QueueHandle;
use crate::runtime::spawn::panic_message;

use std::panic::{self, AssertUnwindSafe};

/// A worker thread in the executor.
///
/// Workers share one FIFO queue: each pops the front, runs the task to
/// completion of its current step, and goes back for more. A task that
/// panics is contained here so a single bad task cannot collapse the
/// pool.
pub(crate) struct Worker {
    /// Identifier used in diagnostics.
    id: usize,

    /// Handle to the shared task queue.
    queue: QueueHandle,
}

impl Worker {
    pub(crate) fn new(id: usize, queue: QueueHandle) -> Self {
        Self { id, queue }
    }

    /// Runs the worker loop until the queue reports shutdown.
    ///
    /// The runtime context is installed by the executor before this is
    /// called, so task bodies can reach the reactor and re-spawn.
    pub(crate) fn run(&self) {
        while let Some(task) = self.queue.pop() {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| task.run())) {
                tracing::error!(
                    worker = self.id,
                    panic = panic_message(payload.as_ref()),
                    "task panicked; worker continues"
                );
            }
        }

        tracing::debug!(worker = self.id, "worker exiting");
    }
}
