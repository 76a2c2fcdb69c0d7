//! # Spindle
//!
//! **Spindle** is a small asynchronous runtime built around three
//! pieces:
//!
//! - a lazy [`Task`](task::Task) abstraction carrying a typed result,
//!   composable by awaiting without stacking resumption frames,
//! - a work-stealing-free executor: a fixed pool of workers draining a
//!   single shared FIFO queue,
//! - a single-threaded reactor multiplexing edge-triggered I/O
//!   readiness and deadline-ordered timers into task wake-ups.
//!
//! A task spawned onto the runtime may run on any worker, and the
//! suspensions that register with the reactor are woken from the
//! reactor thread — a frame migrates freely across threads between its
//! suspension points.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use spindle::time::sleep;
//! use std::time::Duration;
//!
//! #[spindle::main]
//! async fn main() {
//!     let handle = spindle::spawn(async {
//!         sleep(Duration::from_millis(100)).await;
//!         42
//!     });
//!
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`task`] — lazy tasks and [`sync_wait`](task::sync_wait)
//! - [`generator`] — lazy, iterable coroutines
//! - [`net`] — non-blocking sockets
//! - [`time`] — timers, sleep, timeout
//! - [`error`] — join and timeout errors

mod reactor;
mod runtime;

pub mod error;
pub mod generator;
pub mod net;
pub mod task;
pub mod time;

pub use error::JoinError;
pub use runtime::Runtime;
pub use runtime::builder::RuntimeBuilder;
pub use runtime::spawn::{JoinHandle, detach, spawn};
pub use runtime::yield_now::yield_now;

pub use spindle_macros::*;
