//! Deadline-ordered timer store.
//!
//! Timers are keyed by `(deadline, id)` so the earliest deadline is
//! always at the front, with the monotone id breaking ties between
//! timers sharing a deadline. A secondary id-to-deadline index makes
//! cancellation by id an `O(log n)` operation.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Identity of a scheduled timer, unique for the lifetime of the process.
pub type TimerId = u64;

/// Callback fired on the reactor thread when a timer expires.
pub(crate) type TimerCallback = Box<dyn FnOnce() + Send>;

/// Poll timeout used when no timer is pending.
///
/// Bounds the reactor's sleep so shutdown commands are picked up even
/// when the wake eventfd is quiet.
pub(crate) const IDLE_TIMEOUT: Duration = Duration::from_millis(100);

/// Process-wide timer id counter.
static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(0);

/// Allocates a fresh timer id. Ids are never reused.
pub(crate) fn next_timer_id() -> TimerId {
    NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed)
}

/// The reactor's timer store.
///
/// Touched only on the reactor thread; cross-thread submissions arrive
/// as commands.
pub(crate) struct TimerQueue {
    /// Timers ordered by deadline, id tie-break.
    entries: BTreeMap<(Instant, TimerId), TimerCallback>,

    /// Deadline lookup for cancellation by id.
    deadlines: HashMap<TimerId, Instant>,
}

impl TimerQueue {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Schedules `callback` to fire at `deadline` under `id`.
    pub(crate) fn insert(&mut self, id: TimerId, deadline: Instant, callback: TimerCallback) {
        self.entries.insert((deadline, id), callback);
        self.deadlines.insert(id, deadline);
    }

    /// Cancels the timer registered under `id`.
    ///
    /// Idempotent: cancelling an unknown or already fired timer does
    /// nothing.
    pub(crate) fn cancel(&mut self, id: TimerId) {
        if let Some(deadline) = self.deadlines.remove(&id) {
            self.entries.remove(&(deadline, id));
        }
    }

    /// Fires every timer whose deadline has passed, earliest first.
    ///
    /// Returns the duration until the next remaining deadline, clamped
    /// to zero, or [`IDLE_TIMEOUT`] when the store is empty. The return
    /// value bounds the reactor's next poll.
    pub(crate) fn fire_due(&mut self, now: Instant) -> Duration {
        while let Some((&(deadline, id), _)) = self.entries.first_key_value() {
            if deadline > now {
                break;
            }

            let callback = self
                .entries
                .remove(&(deadline, id))
                .expect("timer entry vanished between peek and remove");
            self.deadlines.remove(&id);

            callback();
        }

        match self.entries.first_key_value() {
            Some((&(deadline, _), _)) => deadline.saturating_duration_since(now),
            None => IDLE_TIMEOUT,
        }
    }
}
