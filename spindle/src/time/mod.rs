//! Timers and time-bounded execution.
//!
//! Everything here is backed by the reactor's deadline-ordered timer
//! store:
//! - [`after`] / [`cancel`] register and revoke raw timer callbacks,
//! - [`sleep`] suspends the current task until a deadline,
//! - [`timeout`] bounds the execution time of a future.

mod sleep;
mod timeout;

#[doc(inline)]
pub use sleep::{Sleep, sleep};

#[doc(inline)]
pub use timeout::{Timeout, timeout};

pub use crate::reactor::timer::TimerId;

use crate::reactor::command::Command;
use crate::reactor::timer::next_timer_id;
use crate::runtime::context::current_reactor;

use std::time::{Duration, Instant};

/// Registers `callback` to run once `duration` has elapsed.
///
/// The callback fires on the reactor thread; keep it short and hand any
/// real work to the executor. Returns the id under which the timer can
/// be cancelled. Ids are monotone and never reused.
///
/// # Panics
///
/// Panics if called outside of a running runtime.
pub fn after<F>(duration: Duration, callback: F) -> TimerId
where
    F: FnOnce() + Send + 'static,
{
    let id = next_timer_id();

    current_reactor().send(Command::AddTimer {
        id,
        deadline: Instant::now() + duration,
        callback: Box::new(callback),
    });

    id
}

/// Cancels the timer registered under `id`.
///
/// Idempotent: cancelling twice, or cancelling a timer that has already
/// fired, is a no-op.
///
/// # Panics
///
/// Panics if called outside of a running runtime.
pub fn cancel(id: TimerId) {
    current_reactor().send(Command::CancelTimer { id });
}
