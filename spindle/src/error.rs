//! Error types surfaced by the runtime.
//!
//! I/O operations report plain [`std::io::Error`]; the types here cover
//! the spawn/join surface and the timer utilities.

use thiserror::Error;

/// Error returned when awaiting a [`JoinHandle`](crate::JoinHandle) whose
/// task did not run to completion.
///
/// A panic inside a spawned task is captured at the worker boundary and
/// carried with the task's result; it re-surfaces only here, when the
/// handle is awaited.
#[derive(Debug, Error)]
pub enum JoinError {
    /// The task body panicked. The payload message is preserved when it
    /// is a string.
    #[error("task panicked: {0}")]
    Panicked(String),
}

/// Error returned by [`timeout`](crate::time::timeout) when the wrapped
/// future did not complete within the allotted duration.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("deadline elapsed before the future completed")]
pub struct Elapsed;
