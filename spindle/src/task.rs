//! Lazy task primitives.
//!
//! A [`Task`] is a move-only handle to a heap-pinned frame that produces
//! exactly one value. Construction never runs the body: nothing happens
//! until the task is awaited, driven by [`sync_wait`], or handed to the
//! runtime with [`spawn`](crate::spawn).
//!
//! Awaiting a task from inside another task composes without stacking
//! resumption frames; the whole chain advances through a single poll of
//! the outermost frame.

use std::future::Future;
use std::pin::{Pin, pin};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll, Wake, Waker};
use std::thread::{self, Thread};

/// Stable identity of a task frame.
///
/// Derived from the frame's heap address at construction; valid for the
/// lifetime of the owning [`Task`]. Intended for adapter code that needs
/// to correlate tasks without holding them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(usize);

/// A lazy, move-only asynchronous computation producing one `T`.
///
/// The frame is owned exclusively: dropping the `Task` drops the frame,
/// releasing every resource it holds (registered I/O interests are
/// released through the socket destructors inside the frame).
///
/// # Examples
///
/// ```rust,ignore
/// fn get() -> Task<i32> {
///     Task::new(async { 10 })
/// }
///
/// fn double() -> Task<i32> {
///     Task::new(async { 2 * get().await })
/// }
///
/// assert_eq!(double().sync_wait(), 20);
/// ```
pub struct Task<T> {
    /// The pinned frame; `None` once the task has produced its value.
    future: Option<Pin<Box<dyn Future<Output = T> + Send>>>,

    /// Frame identity captured at construction.
    id: TaskId,
}

impl<T> Task<T> {
    /// Adopts a future as a task frame.
    ///
    /// The body does not start executing; the task is inert until driven.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let future: Pin<Box<dyn Future<Output = T> + Send>> = Box::pin(future);
        let id = TaskId(std::ptr::from_ref(&*future).cast::<()>() as usize);

        Self {
            future: Some(future),
            id,
        }
    }

    /// Returns the identity of the underlying frame.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns `true` once the task has produced its value.
    pub fn is_finished(&self) -> bool {
        self.future.is_none()
    }

    /// Drives the task on the current thread until it completes.
    ///
    /// The calling thread parks between polls and is unparked by whatever
    /// wakes the frame (a reactor timer, I/O readiness, an immediate
    /// self-wake). A body that touches runtime services (timers, sockets)
    /// must still be created and driven inside a runtime context.
    pub fn sync_wait(self) -> T {
        sync_wait(self)
    }
}

impl<T> Future for Task<T> {
    type Output = T;

    /// Advances the frame to its next suspension point.
    ///
    /// # Panics
    ///
    /// Panics if polled again after completion; the value was handed to
    /// the first observer and the frame is gone.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        let frame = this
            .future
            .as_mut()
            .expect("task polled after completion");

        match frame.as_mut().poll(cx) {
            Poll::Ready(value) => {
                this.future = None;
                Poll::Ready(value)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> std::fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Runs a future to completion on the current thread.
///
/// The thread parks while the future is pending and is unparked by the
/// future's waker. This is the synchronous boundary for code that is not
/// already running on the executor; it must not be called from a worker
/// thread, where parking would stall the pool.
pub fn sync_wait<F: Future>(future: F) -> F::Output {
    let mut future = pin!(future);

    let parker = Arc::new(Parker {
        thread: thread::current(),
        notified: AtomicBool::new(false),
    });
    let waker = Waker::from(parker.clone());
    let mut cx = Context::from_waker(&waker);

    loop {
        if let Poll::Ready(value) = future.as_mut().poll(&mut cx) {
            return value;
        }

        parker.wait();
    }
}

/// Thread-parking waker used by [`sync_wait`].
///
/// The `notified` flag absorbs wakes that land between the poll returning
/// `Pending` and the thread actually parking, so no wake-up is lost.
struct Parker {
    thread: Thread,
    notified: AtomicBool,
}

impl Parker {
    fn wait(&self) {
        while !self.notified.swap(false, Ordering::Acquire) {
            thread::park();
        }
    }
}

impl Wake for Parker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.notified.store(true, Ordering::Release);
        self.thread.unpark();
    }
}
