use super::timer::{TimerCallback, TimerId};
use crate::reactor::poller::common::Interest;

use std::os::fd::RawFd;
use std::task::Waker;
use std::time::Instant;

/// Commands sent to the reactor thread.
///
/// `Command` is the communication protocol between the rest of the
/// runtime and the reactor. Commands may be submitted from any thread;
/// they are processed sequentially on the reactor thread, which is the
/// only place the poller and the handler map are touched.
pub(crate) enum Command {
    /// Registers interest in a descriptor for one wake-up.
    ///
    /// If the descriptor is unknown it is added to the poller, otherwise
    /// its registration is modified. The waker replaces any previously
    /// stored one: a descriptor carries at most one pending waker.
    Register {
        /// Descriptor to watch.
        fd: RawFd,

        /// Readiness to wait for.
        interest: Interest,

        /// Waker resumed on the first matching event.
        waker: Waker,
    },

    /// Removes a descriptor from the poller and drops its pending waker.
    ///
    /// Sent by socket teardown before the descriptor is released.
    Deregister {
        /// Descriptor to remove.
        fd: RawFd,
    },

    /// Schedules a callback to fire at `deadline`.
    AddTimer {
        /// Identity under which the timer can be cancelled.
        id: TimerId,

        /// Absolute point in time when the timer fires.
        deadline: Instant,

        /// Callback invoked on the reactor thread at expiry.
        callback: TimerCallback,
    },

    /// Cancels a scheduled timer.
    ///
    /// Cancelling an unknown or already fired timer is a no-op.
    CancelTimer {
        /// Identity returned at registration.
        id: TimerId,
    },

    /// Shuts down the reactor; the event loop exits.
    Shutdown,
}
