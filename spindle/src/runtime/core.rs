use super::executor::core::Executor;
use crate::reactor::command::Command;
use crate::reactor::{Reactor, ReactorHandle};
use crate::runtime::spawn::JoinHandle;

use std::future::Future;
use std::sync::mpsc;
use std::thread;

/// The main runtime handle.
///
/// A `Runtime` couples one reactor thread with one worker pool:
/// - CPU-bound progress happens on the workers, fed by the shared FIFO
///   queue,
/// - I/O readiness and timers are observed on the reactor thread, which
///   wakes the affected tasks back onto the queue.
///
/// Dropping the runtime shuts both down in order.
pub struct Runtime {
    /// Worker pool driving task frames.
    executor: Executor,

    /// Command handle to the reactor thread.
    reactor_handle: ReactorHandle,

    /// Join handle of the reactor thread, taken at shutdown.
    reactor_thread: Option<thread::JoinHandle<()>>,
}

impl Runtime {
    /// Creates a runtime with `worker_threads` workers.
    ///
    /// # Panics
    ///
    /// Panics if the reactor cannot be started (readiness multiplexer
    /// creation failed).
    pub(crate) fn new(worker_threads: usize) -> Self {
        let (reactor_handle, reactor_thread) =
            Reactor::start().expect("failed to start the reactor");

        let executor = Executor::new(reactor_handle.clone(), worker_threads);

        Self {
            executor,
            reactor_handle,
            reactor_thread: Some(reactor_thread),
        }
    }

    /// Spawns a future onto the runtime, returning its join handle.
    pub fn spawn<F, T>(&self, future: F) -> JoinHandle<T>
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        self.executor.spawn(future)
    }

    /// Runs a future to completion, blocking the current thread.
    ///
    /// The future is spawned onto the executor and its result is sent
    /// back over a channel; this is the synchronous entry point of the
    /// runtime (`main`, tests). Must not be called from a worker
    /// thread.
    ///
    /// # Panics
    ///
    /// Panics if the future panics or the runtime shuts down before it
    /// completes.
    pub fn block_on<F>(&self, future: F) -> F::Output
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let (transmitter, receiver) = mpsc::channel();

        self.executor.spawn(async move {
            let _ = transmitter.send(future.await);
        });

        receiver
            .recv()
            .expect("block_on future panicked or the runtime shut down")
    }
}

impl Drop for Runtime {
    /// Shuts down the runtime:
    /// 1. stops task submission and signals the workers,
    /// 2. sends the reactor its shutdown command,
    /// 3. joins the workers, then the reactor thread.
    fn drop(&mut self) {
        self.executor.shutdown();

        self.reactor_handle.send(Command::Shutdown);

        self.executor.join();

        if let Some(reactor) = self.reactor_thread.take() {
            let _ = reactor.join();
        }
    }
}
