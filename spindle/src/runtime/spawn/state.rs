/// Task is idle and not scheduled.
///
/// The frame exists but is neither queued nor running; a wake moves it
/// back to `QUEUED`.
pub(crate) const IDLE: usize = 0;

/// Task is queued for execution.
pub(crate) const QUEUED: usize = 1;

/// Task is currently being polled by a worker.
///
/// At most one worker observes this state at a time; it guarantees
/// exclusive access to the frame.
pub(crate) const RUNNING: usize = 2;

/// Task has completed and its result slot is populated.
///
/// The frame is never polled again.
pub(crate) const COMPLETED: usize = 3;

/// Task was woken while running.
///
/// The worker re-queues it as soon as the current poll returns.
pub(crate) const NOTIFIED: usize = 4;
