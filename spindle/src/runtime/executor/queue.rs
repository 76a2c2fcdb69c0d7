use crate::runtime::spawn::Runnable;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};

/// Shared handle to the executor's task queue.
pub(crate) type QueueHandle = Arc<TaskQueue>;

/// The executor's single shared FIFO queue.
///
/// All spawned work funnels through this queue: submission is
/// multi-producer, consumption is one worker at a time popping the
/// front. There is no per-worker queue and no stealing, so a
/// single-producer sequence of submissions is started in submission
/// order.
///
/// Workers sleep on the condition variable while the queue is empty and
/// are woken one per submission.
pub(crate) struct TaskQueue {
    /// FIFO of pending runnables.
    queue: Mutex<VecDeque<Arc<dyn Runnable>>>,

    /// Wakes sleeping workers on submission and on shutdown.
    condvar: Condvar,

    /// Indicates that the executor is shutting down.
    shutdown: AtomicBool,
}

impl TaskQueue {
    pub(crate) fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            condvar: Condvar::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Appends a runnable and wakes one worker.
    ///
    /// Submissions after shutdown are dropped; the corresponding join
    /// handle is never completed, so callers must not submit once
    /// shutdown has begun.
    pub(crate) fn submit(&self, task: Arc<dyn Runnable>) {
        if self.shutdown.load(Ordering::Acquire) {
            tracing::debug!("submission after shutdown dropped");
            return;
        }

        self.queue.lock().unwrap().push_back(task);
        self.condvar.notify_one();
    }

    /// Pops the next runnable, sleeping while the queue is empty.
    ///
    /// Returns `None` once shutdown has been requested and the queue is
    /// drained; work still queued at shutdown is handed out before
    /// workers exit.
    pub(crate) fn pop(&self) -> Option<Arc<dyn Runnable>> {
        let mut queue = self.queue.lock().unwrap();

        loop {
            if let Some(task) = queue.pop_front() {
                return Some(task);
            }

            if self.shutdown.load(Ordering::Acquire) {
                return None;
            }

            queue = self.condvar.wait(queue).unwrap();
        }
    }

    /// Requests shutdown and wakes every sleeping worker.
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.condvar.notify_all();
    }
}
