use super::core::Spawned;
use super::state::COMPLETED;
use crate::error::JoinError;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::task::{Context, Poll};

/// Handle for awaiting the result of a spawned task.
///
/// Returned by [`spawn`](crate::spawn); implements [`Future`] and
/// resolves with the task's value, or with [`JoinError`] if the body
/// panicked. Dropping the handle detaches the task — it keeps running,
/// its result discarded on completion.
///
/// # Panics
///
/// The result is consumed when the handle resolves; polling again
/// afterwards panics.
pub struct JoinHandle<T> {
    /// Shared anchor of the task.
    pub(crate) task: Arc<Spawned<T>>,
}

impl<T> JoinHandle<T> {
    /// Returns `true` once the task has finished running.
    pub fn is_finished(&self) -> bool {
        self.task.state.load(Ordering::Acquire) == COMPLETED
    }
}

impl<T> Future for JoinHandle<T> {
    type Output = Result<T, JoinError>;

    /// Polls for the task's completion.
    ///
    /// Registration is double-checked: the state is read once before
    /// and once after pushing the waker into the waiter list, closing
    /// the window where the task completes between the check and the
    /// registration and the wake would otherwise be lost.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.task.state.load(Ordering::Acquire) == COMPLETED {
            let outcome = unsafe {
                (*self.task.result.get())
                    .take()
                    .expect("task result was already consumed; a JoinHandle resolves once")
            };
            return Poll::Ready(outcome);
        }

        self.task.waiters.lock().unwrap().push(cx.waker().clone());

        if self.task.state.load(Ordering::Acquire) == COMPLETED {
            let outcome = unsafe {
                (*self.task.result.get())
                    .take()
                    .expect("task result was already consumed; a JoinHandle resolves once")
            };
            return Poll::Ready(outcome);
        }

        Poll::Pending
    }
}
