use crate::reactor::ReactorHandle;
use crate::runtime::context::enter_context;
use crate::runtime::executor::queue::{QueueHandle, TaskQueue};
use crate::runtime::executor::worker::Worker;
use crate::runtime::spawn::{JoinHandle, spawn_onto};

use std::future::Future;
use std::sync::Arc;
use std::thread;

/// Fixed-size worker pool around the shared FIFO queue.
///
/// The executor owns the queue and the worker threads. It does not
/// schedule beyond FIFO order: a submitted task runs on exactly one
/// worker, whichever pops it first.
pub(crate) struct Executor {
    /// The shared task queue.
    queue: QueueHandle,

    /// Join handles for the worker threads.
    handles: Vec<thread::JoinHandle<()>>,
}

impl Executor {
    /// Spawns `threads` workers, each with the runtime context
    /// installed for its whole lifetime.
    pub(crate) fn new(reactor: ReactorHandle, threads: usize) -> Self {
        let queue = Arc::new(TaskQueue::new());

        let mut handles = Vec::with_capacity(threads);

        for id in 0..threads {
            let worker = Worker::new(id, queue.clone());
            let reactor = reactor.clone();
            let queue = queue.clone();

            let handle = thread::Builder::new()
                .name(format!("spindle-worker-{id}"))
                .spawn(move || {
                    enter_context(reactor, queue, || worker.run());
                })
                .expect("failed to spawn worker thread");

            handles.push(handle);
        }

        Self { queue, handles }
    }

    /// Submits a future to the pool, returning its join handle.
    pub(crate) fn spawn<F, T>(&self, future: F) -> JoinHandle<T>
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        spawn_onto(&self.queue, future)
    }

    /// Signals all workers to finish up and exit.
    pub(crate) fn shutdown(&self) {
        self.queue.shutdown();
    }

    /// Waits for all worker threads to terminate.
    ///
    /// Call after [`shutdown`](Self::shutdown).
    pub(crate) fn join(&mut self) {
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}
