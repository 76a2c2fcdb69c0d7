use spindle::RuntimeBuilder;
use spindle::time::{after, cancel, sleep};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[spindle::test]
async fn test_sleep_basic() {
    let start = Instant::now();
    sleep(Duration::from_millis(50)).await;
    let elapsed = start.elapsed();

    assert!(
        elapsed >= Duration::from_millis(50),
        "Sleep should wait at least the specified duration"
    );
}

#[spindle::test]
async fn test_sleep_zero_duration() {
    let start = Instant::now();
    sleep(Duration::from_millis(0)).await;
    let elapsed = start.elapsed();

    assert!(
        elapsed < Duration::from_millis(10),
        "Zero duration sleep should be fast"
    );
}

#[spindle::test]
async fn test_sleep_in_function() {
    let start = Instant::now();
    sleep_and_record(start).await;
}

async fn sleep_and_record(start: Instant) {
    let elapsed_before = start.elapsed();
    sleep(Duration::from_millis(30)).await;
    let elapsed_after = start.elapsed();

    assert!(elapsed_after - elapsed_before >= Duration::from_millis(30));
}

#[test]
fn test_timers_fire_in_deadline_order() {
    let rt = RuntimeBuilder::new().build();

    let order = Arc::new(Mutex::new(Vec::new()));
    let order_clone = order.clone();

    rt.block_on(async move {
        let slow = order_clone.clone();
        after(Duration::from_millis(200), move || {
            slow.lock().unwrap().push("A");
        });

        let fast = order_clone.clone();
        after(Duration::from_millis(50), move || {
            fast.lock().unwrap().push("B");
        });

        sleep(Duration::from_millis(400)).await;
    });

    assert_eq!(
        *order.lock().unwrap(),
        vec!["B", "A"],
        "the earlier deadline must fire first regardless of registration order"
    );
}

#[test]
fn test_equal_deadlines_fire_in_registration_order() {
    let rt = RuntimeBuilder::new().build();

    let order = Arc::new(Mutex::new(Vec::new()));
    let order_clone = order.clone();

    rt.block_on(async move {
        for i in 0..4 {
            let order = order_clone.clone();
            after(Duration::ZERO, move || {
                order.lock().unwrap().push(i);
            });
        }

        sleep(Duration::from_millis(100)).await;
    });

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
}

#[test]
fn test_cancel_before_fire() {
    let rt = RuntimeBuilder::new().build();

    let fired = Arc::new(AtomicBool::new(false));
    let fired_clone = fired.clone();

    rt.block_on(async move {
        let flag = fired_clone.clone();
        let id = after(Duration::from_millis(100), move || {
            flag.store(true, Ordering::SeqCst);
        });

        cancel(id);

        sleep(Duration::from_millis(250)).await;
    });

    assert!(
        !fired.load(Ordering::SeqCst),
        "a cancelled timer must not fire"
    );
}

#[test]
fn test_cancel_is_idempotent() {
    let rt = RuntimeBuilder::new().build();

    rt.block_on(async move {
        let id = after(Duration::from_millis(100), || {});

        cancel(id);
        cancel(id);

        sleep(Duration::from_millis(150)).await;
    });
}

#[test]
fn test_cancel_after_fire_is_noop() {
    let rt = RuntimeBuilder::new().build();

    let fired = Arc::new(AtomicBool::new(false));
    let fired_clone = fired.clone();

    rt.block_on(async move {
        let flag = fired_clone.clone();
        let id = after(Duration::from_millis(10), move || {
            flag.store(true, Ordering::SeqCst);
        });

        sleep(Duration::from_millis(100)).await;

        cancel(id);

        sleep(Duration::from_millis(50)).await;
    });

    assert!(fired.load(Ordering::SeqCst));
}

#[test]
fn test_timer_ids_are_unique() {
    let rt = RuntimeBuilder::new().build();

    rt.block_on(async move {
        let a = after(Duration::from_millis(50), || {});
        let b = after(Duration::from_millis(50), || {});
        let c = after(Duration::from_millis(50), || {});

        assert_ne!(a, b);
        assert_ne!(b, c);

        sleep(Duration::from_millis(100)).await;
    });
}

#[spindle::test]
async fn test_concurrent_sleeps() {
    let start = Instant::now();

    let short = spindle::spawn(async {
        sleep(Duration::from_millis(50)).await;
    });
    let long = spindle::spawn(async {
        sleep(Duration::from_millis(100)).await;
    });

    short.await.unwrap();
    long.await.unwrap();

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(100));
    assert!(
        elapsed < Duration::from_millis(500),
        "sleeps must run concurrently, not back to back"
    );
}
