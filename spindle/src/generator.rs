//! Lazy, iterable coroutines.
//!
//! A [`Generator`] owns a suspended frame that produces a sequence of
//! values instead of a single result. The body receives a [`Yielder`]
//! and parks each value with `yielder.yield_value(v).await`; the
//! consumer steps the frame through the [`Iterator`] interface.
//!
//! Every yielded value is moved into a slot owned by the generator and
//! handed to the consumer exactly once, so a temporary yielded from a
//! scope that has since exited remains readable.
//!
//! # Examples
//!
//! ```rust,ignore
//! let mut fib = Generator::new(|y| async move {
//!     let (mut a, mut b) = (0u64, 1u64);
//!     loop {
//!         y.yield_value(a).await;
//!         (a, b) = (b, a + b);
//!     }
//! });
//!
//! let first: Vec<u64> = fib.by_ref().take(8).collect();
//! assert_eq!(first, [0, 1, 1, 2, 3, 5, 8, 13]);
//! ```

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// A lazy coroutine yielding a finite or infinite sequence of `T`.
///
/// The frame is initially suspended; the first call to `next` advances
/// it to the first yield. Once the body returns, the generator is fused:
/// every further `next` returns `None` without touching the frame.
pub struct Generator<T> {
    /// The suspended frame; `None` once the body has returned.
    frame: Option<Pin<Box<dyn Future<Output = ()>>>>,

    /// Slot holding the value parked by the most recent yield.
    slot: Rc<RefCell<Option<T>>>,
}

impl<T: 'static> Generator<T> {
    /// Creates a generator from a coroutine body.
    ///
    /// The body receives the [`Yielder`] through which it parks values.
    /// Nothing runs until the generator is stepped.
    pub fn new<F, Fut>(body: F) -> Self
    where
        F: FnOnce(Yielder<T>) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        let slot = Rc::new(RefCell::new(None));
        let yielder = Yielder { slot: slot.clone() };

        Self {
            frame: Some(Box::pin(body(yielder))),
            slot,
        }
    }
}

impl<T> Iterator for Generator<T> {
    type Item = T;

    /// Resumes the frame up to its next yield, or to completion.
    ///
    /// # Panics
    ///
    /// Panics if the body suspends on anything other than
    /// [`Yielder::yield_value`]; a generator frame has no other legal
    /// suspension point.
    fn next(&mut self) -> Option<T> {
        let frame = self.frame.as_mut()?;
        let mut cx = Context::from_waker(Waker::noop());

        match frame.as_mut().poll(&mut cx) {
            Poll::Pending => {
                let value = self.slot.borrow_mut().take();
                Some(value.expect("generator suspended without yielding a value"))
            }
            Poll::Ready(()) => {
                self.frame = None;
                None
            }
        }
    }
}

/// Handle through which a generator body parks values for its consumer.
pub struct Yielder<T> {
    slot: Rc<RefCell<Option<T>>>,
}

impl<T> Yielder<T> {
    /// Moves `value` into the generator's slot and suspends the frame.
    ///
    /// Control returns to the consumer, which takes the value out of the
    /// slot before the next resumption. The slot therefore holds at most
    /// one value at a time.
    pub fn yield_value(&self, value: T) -> YieldValue<'_, T> {
        YieldValue {
            yielder: self,
            value: Some(value),
        }
    }
}

/// Suspension point created by [`Yielder::yield_value`].
///
/// The first poll parks the value and suspends; the resumption completes
/// it. No waker is involved: generator frames are resumed explicitly by
/// the consumer stepping the iterator.
pub struct YieldValue<'a, T> {
    yielder: &'a Yielder<T>,
    value: Option<T>,
}

impl<T> Future for YieldValue<'_, T> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        // The value is not structurally pinned; it is moved out exactly once.
        let this = unsafe { self.get_unchecked_mut() };

        match this.value.take() {
            Some(value) => {
                let previous = this.yielder.slot.borrow_mut().replace(value);
                assert!(
                    previous.is_none(),
                    "generator resumed with an unconsumed value in its slot"
                );
                Poll::Pending
            }
            None => Poll::Ready(()),
        }
    }
}
