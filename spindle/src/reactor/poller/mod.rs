//! Readiness multiplexer.
//!
//! The reactor depends on a Linux-class readiness interface: per-fd
//! registration, edge-triggered notification and a bounded-timeout
//! wait. The `epoll` backend provides it; the raw syscall surface the
//! rest of the crate uses lives in [`unix`].

pub(crate) mod common;
pub(crate) mod unix;

mod epoll;

pub(crate) use epoll::{EpollPoller, PollerWaker};
