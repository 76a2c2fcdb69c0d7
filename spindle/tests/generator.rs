use spindle::generator::Generator;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_simple_sequence() {
    let r#gen = Generator::new(|y| async move {
        y.yield_value(1).await;
        y.yield_value(2).await;
        y.yield_value(3).await;
    });

    let result: Vec<i32> = r#gen.collect();
    assert_eq!(result, vec![1, 2, 3]);
}

#[test]
fn test_range() {
    fn range(n: i32) -> Generator<i32> {
        Generator::new(move |y| async move {
            for i in 0..n {
                y.yield_value(i).await;
            }
        })
    }

    let result: Vec<i32> = range(5).collect();
    assert_eq!(result, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_empty_generator() {
    let r#gen: Generator<i32> = Generator::new(|_y| async move {});

    assert_eq!(r#gen.count(), 0);
}

#[test]
fn test_single_value() {
    let r#gen = Generator::new(|y| async move {
        y.yield_value(42).await;
    });

    let result: Vec<i32> = r#gen.collect();
    assert_eq!(result, vec![42]);
}

#[test]
fn test_fibonacci_first_eight() {
    let fib = Generator::new(|y| async move {
        let (mut a, mut b) = (0u64, 1u64);
        loop {
            y.yield_value(a).await;
            (a, b) = (b, a + b);
        }
    });

    let first: Vec<u64> = fib.take(8).collect();
    assert_eq!(first, vec![0, 1, 1, 2, 3, 5, 8, 13]);
}

#[test]
fn test_temporary_then_named_string() {
    let r#gen = Generator::new(|y| async move {
        {
            // The producing scope exits before the consumer reads.
            let temp = String::from("temp");
            y.yield_value(temp).await;
        }

        let named = String::from("named");
        y.yield_value(named).await;
    });

    let result: Vec<String> = r#gen.collect();
    assert_eq!(result, vec!["temp".to_string(), "named".to_string()]);
}

#[test]
fn test_infinite_generator_take() {
    let naturals = Generator::new(|y| async move {
        let mut n = 0u32;
        loop {
            y.yield_value(n).await;
            n += 1;
        }
    });

    let result: Vec<u32> = naturals.take(5).collect();
    assert_eq!(result, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_fused_after_completion() {
    let mut r#gen = Generator::new(|y| async move {
        y.yield_value(7).await;
    });

    assert_eq!(r#gen.next(), Some(7));
    assert_eq!(r#gen.next(), None);
    assert_eq!(r#gen.next(), None);
}

/// Value whose constructions and destructions are counted.
struct Tracked {
    dropped: Arc<AtomicUsize>,
}

impl Tracked {
    fn new(created: &Arc<AtomicUsize>, dropped: &Arc<AtomicUsize>) -> Self {
        created.fetch_add(1, Ordering::SeqCst);
        Self {
            dropped: dropped.clone(),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_values_dropped_exactly_once() {
    let created = Arc::new(AtomicUsize::new(0));
    let dropped = Arc::new(AtomicUsize::new(0));

    {
        let created = created.clone();
        let dropped = dropped.clone();

        let mut r#gen = Generator::new(move |y| async move {
            for _ in 0..3 {
                y.yield_value(Tracked::new(&created, &dropped)).await;
            }
        });

        // Consume two of the three values, then abandon the generator
        // mid-iteration.
        drop(r#gen.next());
        drop(r#gen.next());
    }

    let created = created.load(Ordering::SeqCst);
    let dropped = dropped.load(Ordering::SeqCst);

    assert_eq!(created, 2, "the third value must never be constructed");
    assert_eq!(created, dropped, "every constructed value drops exactly once");
}
