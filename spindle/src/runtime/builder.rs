use super::Runtime;

use std::num::NonZeroUsize;
use std::thread;

/// Builder for configuring and creating a runtime.
///
/// # Examples
///
/// ```rust,ignore
/// let runtime = RuntimeBuilder::new()
///     .worker_threads(4)
///     .build();
/// ```
pub struct RuntimeBuilder {
    /// Explicit worker count; resolved against the host at build time
    /// when unset.
    worker_threads: Option<usize>,
}

impl RuntimeBuilder {
    /// Creates a new `RuntimeBuilder` with default configuration.
    pub fn new() -> Self {
        Self {
            worker_threads: None,
        }
    }

    /// Sets the number of worker threads used by the runtime.
    ///
    /// When not set, the pool is sized to the host's available
    /// parallelism at [`build`](Self::build) time (at least one worker).
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn worker_threads(mut self, n: usize) -> Self {
        assert!(n > 0, "worker_threads must be > 0");

        self.worker_threads = Some(n);
        self
    }

    /// Builds the runtime with the configured options.
    ///
    /// This starts the reactor thread and the worker pool.
    pub fn build(self) -> Runtime {
        let workers = self.worker_threads.unwrap_or_else(default_worker_count);

        Runtime::new(workers)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pool size used when the builder is given no explicit worker count.
fn default_worker_count() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}
