use super::handle::JoinHandle;
use super::state::{COMPLETED, IDLE, NOTIFIED, QUEUED, RUNNING};
use super::waker::make_waker;
use crate::error::JoinError;
use crate::runtime::context::current_queue;
use crate::runtime::executor::queue::QueueHandle;

use std::any::Any;
use std::cell::UnsafeCell;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

/// A runnable unit of work consumed by the executor.
///
/// The trait erases the task's result type, so the queue can carry a
/// heterogeneous collection as `Arc<dyn Runnable>`.
pub(crate) trait Runnable: Send + Sync {
    /// Executes one step of the task. Called by a worker thread.
    fn run(self: Arc<Self>);
}

/// The shared anchor of a spawned task.
///
/// `Spawned` owns the frame and everything needed to observe its
/// completion: the result slot, the lifecycle state word and the join
/// waiters. The queue entry, every waker handed to the frame and the
/// [`JoinHandle`] all hold the same `Arc`; whichever is dropped last
/// frees the frame. The state machine makes a duplicate delivery of the
/// queue entry harmless: only one CAS into `RUNNING` can win.
pub(crate) struct Spawned<T> {
    /// The frame. `UnsafeCell` for interior mutability during polls;
    /// exclusive access is guaranteed by the `RUNNING` state.
    future: UnsafeCell<Pin<Box<dyn Future<Output = T> + Send>>>,

    /// Result slot, written exactly once right before `COMPLETED`.
    pub(crate) result: UnsafeCell<Option<Result<T, JoinError>>>,

    /// Lifecycle state (IDLE, QUEUED, RUNNING, COMPLETED, NOTIFIED).
    pub(crate) state: AtomicUsize,

    /// Queue used to re-submit the task when it is woken.
    queue: QueueHandle,

    /// Wakers of join handles awaiting this task.
    pub(crate) waiters: Mutex<Vec<Waker>>,
}

unsafe impl<T: Send> Send for Spawned<T> {}
unsafe impl<T: Send> Sync for Spawned<T> {}

impl<T: Send + 'static> Spawned<T> {
    /// Wraps a future, starting in the `QUEUED` state.
    pub(crate) fn new<F>(future: F, queue: QueueHandle) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            future: UnsafeCell::new(Box::pin(future)),
            result: UnsafeCell::new(None),
            state: AtomicUsize::new(QUEUED),
            queue,
            waiters: Mutex::new(Vec::new()),
        }
    }

    /// Polls the frame once.
    ///
    /// Transitions to `RUNNING` for exclusive frame access, polls, and
    /// resolves the outcome:
    /// - `Pending`: back to `IDLE`, or re-queued if a wake arrived
    ///   mid-poll (`NOTIFIED`),
    /// - `Ready`: result stored, waiters woken,
    /// - panic: captured and stored as the task's error; the worker
    ///   stays alive.
    pub(crate) fn run(self: Arc<Self>) {
        let current = self.state.load(Ordering::Acquire);

        if current != QUEUED && current != NOTIFIED {
            return;
        }

        if self
            .state
            .compare_exchange(current, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let waker = make_waker(self.clone());
        let mut cx = Context::from_waker(&waker);

        // Safety: the RUNNING state guarantees that no other thread is
        // polling this frame.
        let poll = panic::catch_unwind(AssertUnwindSafe(|| unsafe {
            (&mut *self.future.get()).as_mut().poll(&mut cx)
        }));

        match poll {
            Ok(Poll::Pending) => {
                if self
                    .state
                    .compare_exchange(RUNNING, IDLE, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    // Woken while running; go around again.
                    self.state.store(QUEUED, Ordering::Release);
                    self.queue.submit(self.clone());
                }
            }
            Ok(Poll::Ready(value)) => self.finish(Ok(value)),
            Err(payload) => {
                self.finish(Err(JoinError::Panicked(
                    panic_message(payload.as_ref()).to_owned(),
                )));
            }
        }
    }

    /// Stores the outcome and wakes every join waiter.
    fn finish(&self, outcome: Result<T, JoinError>) {
        // Safety: still exclusive; the state is RUNNING until the store
        // below.
        unsafe {
            *self.result.get() = Some(outcome);
        }
        self.state.store(COMPLETED, Ordering::Release);

        let waiters = self.waiters.lock().unwrap();
        for waiter in waiters.iter() {
            waiter.wake_by_ref();
        }
    }

    /// Schedules the task to be polled again.
    ///
    /// An `IDLE` task moves to `QUEUED` and is submitted; a `RUNNING`
    /// task moves to `NOTIFIED` so the worker re-queues it after the
    /// current poll. Re-entry always goes through the queue — a wake
    /// never polls the frame on the waking thread.
    pub(crate) fn wake(self: Arc<Self>) {
        loop {
            let state = self.state.load(Ordering::Acquire);

            match state {
                IDLE => {
                    if self
                        .state
                        .compare_exchange(IDLE, QUEUED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        self.queue.submit(self.clone());
                        return;
                    }
                }
                RUNNING => {
                    if self
                        .state
                        .compare_exchange(RUNNING, NOTIFIED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        return;
                    }
                }
                // Already queued, notified or finished; nothing to do.
                _ => return,
            }
        }
    }
}

impl<T: Send + 'static> Runnable for Spawned<T> {
    fn run(self: Arc<Self>) {
        Spawned::run(self)
    }
}

/// Submits a future onto a specific queue. Shared by `spawn` and the
/// runtime-owned executor.
pub(crate) fn spawn_onto<F, T>(queue: &QueueHandle, future: F) -> JoinHandle<T>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    let task = Arc::new(Spawned::new(future, queue.clone()));
    queue.submit(task.clone());

    JoinHandle { task }
}

/// Spawns a future onto the current runtime.
///
/// The frame is anchored in a shared container held by the queue, by
/// every waker derived from it and by the returned [`JoinHandle`];
/// dropping the handle does not cancel the task.
///
/// # Panics
///
/// Panics if called outside the context of a running runtime.
pub fn spawn<F, T>(future: F) -> JoinHandle<T>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    spawn_onto(&current_queue(), future)
}

/// Spawns a future and forgets about it.
///
/// The anchor lives on in the queue and waker ownership chain until the
/// frame completes, after which the last owner frees it. A panic inside
/// the body is contained and logged; there is no handle to observe it.
///
/// # Panics
///
/// Panics if called outside the context of a running runtime.
pub fn detach<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let _ = spawn(future);
}

/// Best-effort extraction of a panic payload message.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
