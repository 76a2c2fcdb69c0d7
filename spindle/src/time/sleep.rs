use crate::reactor::ReactorHandle;
use crate::reactor::command::Command;
use crate::reactor::timer::{TimerId, next_timer_id};
use crate::runtime::context::current_reactor;

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

/// Creates a future that completes after the given duration.
///
/// # Panics
///
/// Panics if polled outside of a running runtime.
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
///
/// sleep(Duration::from_millis(10)).await;
/// ```
pub fn sleep(duration: Duration) -> Sleep {
    Sleep::new(duration)
}

/// A future that completes once a specific deadline is reached.
///
/// The first poll registers a timer with the reactor; the timer's
/// callback wakes the task when the deadline passes. Dropping the
/// future before completion cancels the timer, so no stray wake-up
/// arrives afterwards.
pub struct Sleep {
    /// Absolute point in time when the sleep completes.
    deadline: Instant,

    /// Timer registration, kept for cancellation on drop.
    registered: Option<(TimerId, ReactorHandle)>,
}

impl Sleep {
    /// The timer is not registered until the future is first polled.
    pub(crate) fn new(duration: Duration) -> Self {
        Self {
            deadline: Instant::now() + duration,
            registered: None,
        }
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if Instant::now() >= this.deadline {
            return Poll::Ready(());
        }

        if this.registered.is_none() {
            let reactor = current_reactor();
            let id = next_timer_id();
            let waker = cx.waker().clone();

            reactor.send(Command::AddTimer {
                id,
                deadline: this.deadline,
                callback: Box::new(move || waker.wake()),
            });

            this.registered = Some((id, reactor));
        }

        Poll::Pending
    }
}

impl Drop for Sleep {
    /// Cancels the timer if the future is dropped before completion.
    ///
    /// Cancellation is idempotent on the reactor side, so dropping a
    /// sleep whose timer already fired is harmless.
    fn drop(&mut self) {
        if let Some((id, reactor)) = self.registered.take() {
            reactor.send(Command::CancelTimer { id });
        }
    }
}
