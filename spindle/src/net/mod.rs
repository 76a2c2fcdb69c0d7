//! Asynchronous networking.
//!
//! [`AsyncSocket`] is a non-blocking socket facade over the reactor:
//! every operation attempts its syscall first and suspends for
//! readiness only when the kernel would block. The future types it
//! returns are re-exported here for code that needs to name them.

mod socket;

pub use socket::{AsyncSocket, Domain};

pub use crate::reactor::future::{AcceptFuture, ConnectFuture, ReadFuture, WriteFuture};
