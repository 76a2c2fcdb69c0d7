use std::future::poll_fn;
use std::task::Poll;

/// Yields execution back to the executor.
///
/// The current task wakes itself and suspends exactly once, which
/// re-queues it behind everything already submitted and lets other
/// tasks make progress. Re-entry goes through the queue and the task
/// state machine, never through a concurrent poll of the suspended
/// frame.
///
/// # Examples
///
/// ```rust,ignore
/// async fn cooperative() {
///     yield_now().await;
/// }
/// ```
pub async fn yield_now() {
    let mut yielded = false;

    poll_fn(|cx| {
        if yielded {
            return Poll::Ready(());
        }

        yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    })
    .await
}
