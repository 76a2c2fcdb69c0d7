//! Linux `epoll`-based readiness poller.
//!
//! The poller is the reactor's window onto the kernel. It is
//! responsible for:
//! - registering descriptors with edge-triggered read/write interests,
//! - blocking for readiness with a bounded timeout,
//! - translating kernel events into [`Event`] records keyed by fd,
//! - waking the reactor from other threads through an internal eventfd.
//!
//! Edge-triggered mode means a descriptor is reported only on a state
//! change; the code resumed by an event must retry its syscall until it
//! would block again before re-registering.

use super::common::Interest;
use crate::reactor::event::Event;

use libc::{
    EPOLL_CLOEXEC, EPOLL_CTL_ADD, EPOLL_CTL_DEL, EPOLL_CTL_MOD, EPOLLERR, EPOLLET, EPOLLHUP,
    EPOLLIN, EPOLLOUT, epoll_create1, epoll_ctl, epoll_event, epoll_wait,
};
use std::io;
use std::os::fd::RawFd;
use std::sync::Arc;
use std::time::Duration;

/// Token reserved for the internal wake eventfd.
///
/// Descriptor tokens are the fd value itself, so `u64::MAX` can never
/// collide with a registered descriptor.
const WAKE_TOKEN: u64 = u64::MAX;

/// Handle used to interrupt a blocking poll from another thread.
///
/// Writing to the wrapped eventfd makes `epoll_wait` return immediately,
/// letting the reactor pick up freshly submitted commands.
pub(crate) struct PollerWaker(RawFd);

impl PollerWaker {
    /// Wakes the poller by signalling the eventfd.
    pub(crate) fn wake(&self) {
        let buf: u64 = 1;
        unsafe {
            libc::write(self.0, &buf as *const _ as *const _, 8);
        }
    }
}

/// Linux `epoll` poller owned by the reactor thread.
pub(crate) struct EpollPoller {
    /// Epoll instance descriptor.
    epoll: RawFd,

    /// Reusable buffer handed to `epoll_wait`.
    events: Vec<epoll_event>,

    /// Waker wrapping the internal eventfd.
    waker: Arc<PollerWaker>,
}

unsafe impl Send for EpollPoller {}

impl EpollPoller {
    /// Creates the epoll instance and its eventfd wake channel.
    ///
    /// The eventfd is registered as a persistent (level-triggered) wake
    /// source under [`WAKE_TOKEN`].
    pub(crate) fn new() -> io::Result<Self> {
        let epoll = unsafe { epoll_create1(EPOLL_CLOEXEC) };
        if epoll < 0 {
            return Err(io::Error::last_os_error());
        }

        let eventfd = unsafe { libc::eventfd(0, libc::EFD_NONBLOCK | libc::EFD_CLOEXEC) };
        if eventfd < 0 {
            let err = io::Error::last_os_error();
            unsafe { libc::close(epoll) };
            return Err(err);
        }

        let mut event = epoll_event {
            events: EPOLLIN as u32,
            u64: WAKE_TOKEN,
        };

        let rc = unsafe { epoll_ctl(epoll, EPOLL_CTL_ADD, eventfd, &mut event) };
        if rc != 0 {
            let err = io::Error::last_os_error();
            unsafe {
                libc::close(eventfd);
                libc::close(epoll);
            }
            return Err(err);
        }

        Ok(Self {
            epoll,
            events: Vec::with_capacity(64),
            waker: Arc::new(PollerWaker(eventfd)),
        })
    }

    /// Returns the poller waker.
    pub(crate) fn waker(&self) -> Arc<PollerWaker> {
        self.waker.clone()
    }

    /// Registers a descriptor with edge-triggered interest.
    pub(crate) fn register(&self, fd: RawFd, interest: Interest) -> io::Result<()> {
        self.ctl(EPOLL_CTL_ADD, fd, interest)
    }

    /// Replaces the interest of an already registered descriptor.
    pub(crate) fn reregister(&self, fd: RawFd, interest: Interest) -> io::Result<()> {
        self.ctl(EPOLL_CTL_MOD, fd, interest)
    }

    /// Removes a descriptor. Unknown descriptors are ignored.
    pub(crate) fn deregister(&self, fd: RawFd) {
        unsafe {
            epoll_ctl(self.epoll, EPOLL_CTL_DEL, fd, std::ptr::null_mut());
        }
    }

    fn ctl(&self, op: libc::c_int, fd: RawFd, interest: Interest) -> io::Result<()> {
        let mut flags = EPOLLET;

        if interest.read {
            flags |= EPOLLIN;
        }
        if interest.write {
            flags |= EPOLLOUT;
        }

        let mut event = epoll_event {
            events: flags as u32,
            u64: fd as u64,
        };

        let rc = unsafe { epoll_ctl(self.epoll, op, fd, &mut event) };
        if rc != 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }

    /// Blocks for readiness events for at most `timeout`.
    ///
    /// Ready descriptors are appended to `events`. Error and hang-up
    /// conditions are folded into both readiness flags so that a waiter
    /// of either kind observes them. An interrupted wait returns with no
    /// events.
    pub(crate) fn poll(&mut self, events: &mut Vec<Event>, timeout: Duration) -> io::Result<()> {
        let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as i32;

        unsafe {
            self.events.set_len(self.events.capacity());
        }

        let n = unsafe {
            epoll_wait(
                self.epoll,
                self.events.as_mut_ptr(),
                self.events.capacity() as i32,
                timeout_ms,
            )
        };

        if n < 0 {
            let err = io::Error::last_os_error();
            unsafe {
                self.events.set_len(0);
            }
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(());
            }
            return Err(err);
        }

        unsafe {
            self.events.set_len(n as usize);
        }

        for ev in &self.events {
            if ev.u64 == WAKE_TOKEN {
                let mut buf = 0u64;
                unsafe {
                    libc::read(self.waker.0, &mut buf as *mut _ as *mut _, 8);
                }
                continue;
            }

            let hup = ev.events & ((EPOLLERR | EPOLLHUP) as u32) != 0;

            events.push(Event {
                fd: ev.u64 as RawFd,
                readable: ev.events & (EPOLLIN as u32) != 0 || hup,
                writable: ev.events & (EPOLLOUT as u32) != 0 || hup,
            });
        }

        Ok(())
    }
}

impl Drop for EpollPoller {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.waker.0);
            libc::close(self.epoll);
        }
    }
}
