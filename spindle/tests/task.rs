use spindle::RuntimeBuilder;
use spindle::task::Task;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn get() -> Task<i32> {
    Task::new(async { 10 })
}

fn double(value: Task<i32>) -> Task<i32> {
    Task::new(async move { 2 * value.await })
}

#[test]
fn test_simple_int_return() {
    let task = Task::new(async { 42 });
    assert_eq!(task.sync_wait(), 42);
}

#[test]
fn test_unit_return() {
    let executed = Arc::new(AtomicBool::new(false));
    let flag = executed.clone();

    let task = Task::new(async move {
        flag.store(true, Ordering::SeqCst);
    });

    task.sync_wait();
    assert!(executed.load(Ordering::SeqCst));
}

#[test]
fn test_string_return() {
    let task = Task::new(async { String::from("Hello, Spindle!") });
    assert_eq!(task.sync_wait(), "Hello, Spindle!");
}

#[test]
fn test_construction_is_lazy() {
    let executed = Arc::new(AtomicBool::new(false));
    let flag = executed.clone();

    let task = Task::new(async move {
        flag.store(true, Ordering::SeqCst);
    });

    assert!(
        !executed.load(Ordering::SeqCst),
        "Task body must not run before the task is driven"
    );

    task.sync_wait();
    assert!(executed.load(Ordering::SeqCst));
}

#[test]
fn test_task_composition() {
    assert_eq!(double(get()).sync_wait(), 20);
}

#[test]
fn test_multi_level_await() {
    fn level1() -> Task<i32> {
        Task::new(async { 1 })
    }

    fn level2() -> Task<i32> {
        Task::new(async { level1().await + 10 })
    }

    fn level3() -> Task<i32> {
        Task::new(async { level2().await + 100 })
    }

    assert_eq!(level3().sync_wait(), 111);
}

#[test]
fn test_multiple_awaits_in_one_body() {
    let task = Task::new(async {
        let a = Task::new(async { 10 }).await;
        let b = Task::new(async { 20 }).await;
        a + b
    });

    assert_eq!(task.sync_wait(), 30);
}

#[test]
fn test_long_sequential_await_chain() {
    let task = Task::new(async {
        let mut total = 0i64;
        for _ in 0..10_000 {
            total += Task::new(async { 1i64 }).await;
        }
        total
    });

    assert_eq!(task.sync_wait(), 10_000);
}

#[test]
fn test_deep_nested_await_chain() {
    fn chain(depth: u32) -> Task<i64> {
        Task::new(async move {
            if depth == 0 {
                0
            } else {
                chain(depth - 1).await + 1
            }
        })
    }

    assert_eq!(chain(1_000).sync_wait(), 1_000);
}

#[test]
fn test_task_id_survives_moves() {
    let task = get();
    let id = task.id();

    let moved = task;
    assert_eq!(moved.id(), id);
}

#[test]
fn test_distinct_tasks_have_distinct_ids() {
    let a = get();
    let b = get();
    assert_ne!(a.id(), b.id());
}

#[test]
fn test_is_finished_before_completion() {
    let task = get();
    assert!(!task.is_finished());
}

#[test]
#[should_panic(expected = "boom")]
fn test_sync_wait_propagates_panic() {
    let task: Task<()> = Task::new(async {
        panic!("boom");
    });

    task.sync_wait();
}

#[test]
fn test_task_driven_by_runtime() {
    let rt = RuntimeBuilder::new().worker_threads(2).build();

    let result = rt.block_on(double(get()));
    assert_eq!(result, 20);
}

#[test]
fn test_task_awaited_inside_spawned_task() {
    let rt = RuntimeBuilder::new().build();

    let result = rt.block_on(async {
        let handle = spindle::spawn(async { double(get()).await + 1 });
        handle.await.unwrap()
    });

    assert_eq!(result, 21);
}
