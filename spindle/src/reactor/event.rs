use std::os::fd::RawFd;

/// A readiness event reported by the poller.
///
/// Produced on the reactor thread and consumed immediately to move the
/// descriptor's pending waker into the ready queue. Error and hang-up
/// conditions arrive with both flags set so that read and write waiters
/// alike get to observe the failure through their next syscall.
pub(crate) struct Event {
    /// The descriptor that became ready.
    pub(crate) fd: RawFd,

    /// The descriptor is readable (or failed).
    pub(crate) readable: bool,

    /// The descriptor is writable (or failed).
    pub(crate) writable: bool,
}
