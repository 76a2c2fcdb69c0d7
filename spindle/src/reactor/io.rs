use crate::reactor::poller::common::Interest;

use std::task::Waker;

/// Per-descriptor registration state.
///
/// Each registered descriptor carries the interest it was armed with and
/// at most one pending waker. Delivering an event takes the waker out,
/// which both enforces the at-most-once wake per registration and makes
/// duplicate events for the same descriptor within a poll cycle
/// harmless. The next I/O attempt that would block re-arms the entry by
/// re-registering.
pub(crate) struct IoHandler {
    /// Readiness the waiter asked for.
    pub(crate) interest: Interest,

    /// Waker of the suspended waiter, consumed on delivery.
    pub(crate) waker: Option<Waker>,
}
