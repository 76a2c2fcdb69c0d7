use super::core::Spawned;

use std::mem;
use std::sync::Arc;
use std::task::{RawWaker, RawWakerVTable, Waker};

/// Returns the `RawWakerVTable` for tasks of result type `T`.
///
/// The vtable routes waker operations onto the task anchor:
/// cloning and dropping adjust the `Arc` count, waking re-schedules the
/// task through [`Spawned::wake`].
fn vtable<T: Send + 'static>() -> &'static RawWakerVTable {
    &RawWakerVTable::new(
        clone_raw::<T>,
        wake_raw::<T>,
        wake_by_ref_raw::<T>,
        drop_raw::<T>,
    )
}

/// Creates a [`Waker`] backed by the task anchor.
///
/// The pointer inside the `RawWaker` comes from `Arc::into_raw`; each
/// vtable function rebuilds the `Arc` and keeps the reference count
/// balanced, so the anchor stays alive for as long as any waker derived
/// from it does.
pub(crate) fn make_waker<T: Send + 'static>(task: Arc<Spawned<T>>) -> Waker {
    unsafe {
        Waker::from_raw(RawWaker::new(
            Arc::into_raw(task) as *const (),
            vtable::<T>(),
        ))
    }
}

/// Clones the waker, incrementing the anchor's reference count.
fn clone_raw<T: Send + 'static>(ptr: *const ()) -> RawWaker {
    let arc = unsafe { Arc::<Spawned<T>>::from_raw(ptr as *const Spawned<T>) };
    let cloned = arc.clone();
    mem::forget(arc);

    RawWaker::new(Arc::into_raw(cloned) as *const (), vtable::<T>())
}

/// Wakes the task, consuming the waker's reference.
fn wake_raw<T: Send + 'static>(ptr: *const ()) {
    let arc = unsafe { Arc::<Spawned<T>>::from_raw(ptr as *const Spawned<T>) };
    arc.wake();
}

/// Wakes the task while keeping the waker alive.
fn wake_by_ref_raw<T: Send + 'static>(ptr: *const ()) {
    let arc = unsafe { Arc::<Spawned<T>>::from_raw(ptr as *const Spawned<T>) };
    arc.clone().wake();
    mem::forget(arc);
}

/// Drops the waker's reference to the anchor.
fn drop_raw<T: Send + 'static>(ptr: *const ()) {
    unsafe { Arc::<Spawned<T>>::from_raw(ptr as *const Spawned<T>) };
}
