use spindle::{RuntimeBuilder, join};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_join_single_future() {
    let rt = RuntimeBuilder::new().build();

    let result = rt.block_on(async { join!(async { 42 }) });

    assert_eq!(result, 42);
}

#[test]
fn test_join_two_futures() {
    let rt = RuntimeBuilder::new().build();

    let result = rt.block_on(async {
        let (a, b) = join!(async { 10 }, async { 20 });
        (a, b)
    });

    assert_eq!(result, (10, 20));
}

#[test]
fn test_join_three_futures() {
    let rt = RuntimeBuilder::new().build();

    let result = rt.block_on(async {
        let (a, b, c) = join!(async { "hello" }, async { 42 }, async { true });
        (a, b, c)
    });

    assert_eq!(result, ("hello", 42, true));
}

#[test]
fn test_join_runs_all_branches() {
    let rt = RuntimeBuilder::new().build();
    let counter = Arc::new(AtomicUsize::new(0));

    let c1 = counter.clone();
    let c2 = counter.clone();
    let c3 = counter.clone();

    rt.block_on(async move {
        join!(
            async move {
                c1.fetch_add(1, Ordering::SeqCst);
            },
            async move {
                c2.fetch_add(10, Ordering::SeqCst);
            },
            async move {
                c3.fetch_add(100, Ordering::SeqCst);
            }
        );
    });

    assert_eq!(counter.load(Ordering::SeqCst), 111);
}

#[test]
fn test_join_with_trailing_comma() {
    let rt = RuntimeBuilder::new().build();

    let result = rt.block_on(async {
        let (a, b) = join!(async { 1 }, async { 2 },);
        a + b
    });

    assert_eq!(result, 3);
}

#[test]
fn test_join_different_types() {
    let rt = RuntimeBuilder::new().build();

    let result = rt.block_on(async {
        let (num, text, items) = join!(async { 100i32 }, async { String::from("test") }, async {
            vec![1, 2, 3]
        });
        (num, text, items)
    });

    assert_eq!(result.0, 100);
    assert_eq!(result.1, "test");
    assert_eq!(result.2, vec![1, 2, 3]);
}

#[test]
fn test_join_with_sleeping_branches() {
    use spindle::time::sleep;
    use std::time::{Duration, Instant};

    let rt = RuntimeBuilder::new().build();

    let elapsed = rt.block_on(async {
        let start = Instant::now();

        join!(
            sleep(Duration::from_millis(50)),
            sleep(Duration::from_millis(80))
        );

        start.elapsed()
    });

    assert!(elapsed >= Duration::from_millis(80));
    assert!(
        elapsed < Duration::from_millis(500),
        "branches must wait concurrently"
    );
}
