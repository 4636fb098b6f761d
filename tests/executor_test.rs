/*!
 * Executor Contract Tests
 * Tests for delegate/access/submit/execute/run across every backend
 */

use green_dispatch::executor::Accessor;
use green_dispatch::{
    get_executor, Dispatch, Executor, ExecutorExt, GreenError, GreenMode, SynchronousExecutor,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

const ASYNC_MODES: [GreenMode; 3] = [GreenMode::Greenlets, GreenMode::Futures, GreenMode::EventLoop];

fn scale(x: i64) -> i64 {
    x.wrapping_mul(3).wrapping_add(1)
}

proptest! {
    #[test]
    fn test_sync_run_matches_direct_call(x in any::<i64>()) {
        let executor = SynchronousExecutor::shared();
        let result = executor.run(move || scale(x), None, None).unwrap().ready();
        prop_assert_eq!(result, Some(scale(x)));
    }
}

#[test]
fn test_sync_run_rejects_deferred_calls() {
    let executor = SynchronousExecutor::shared();

    let err = executor.run(|| 1, Some(false), None).unwrap_err();
    assert!(err.is_invalid_usage());

    let err = executor.run(|| 1, Some(true), Some(Duration::from_secs(1))).unwrap_err();
    assert!(err.is_invalid_usage());

    // A zero timeout is still a timeout
    let err = executor.run(|| 1, None, Some(Duration::ZERO)).unwrap_err();
    assert!(err.is_invalid_usage());

    let err = executor.delegate(|| 1).unwrap_err();
    assert_eq!(err, GreenError::synchronous_only());
}

#[test]
fn test_sync_access_rejects_foreign_accessor() {
    let futures = get_executor(GreenMode::Futures).unwrap();
    let accessor: Accessor<i32> = futures.delegate(|| 7).unwrap();

    let sync = SynchronousExecutor::shared();
    let err = sync.access(accessor, None).unwrap_err();
    assert!(err.is_invalid_usage());
}

#[test]
fn test_sync_submit_and_execute_run_inline() {
    let executor = SynchronousExecutor::shared();
    let caller = thread::current().id();

    let submitted = executor.submit(move || thread::current().id() == caller).unwrap();
    assert_eq!(submitted.ready(), Some(true));
    assert_eq!(executor.execute(|| "inline").unwrap(), "inline");
}

#[test]
fn test_async_no_wait_then_access() {
    for mode in ASYNC_MODES {
        let executor = get_executor(mode).unwrap();
        assert!(executor.asynchronous());

        let dispatch = executor.run(|| 6 * 7, Some(false), None).unwrap();
        let accessor = dispatch.pending().expect("no-wait run must return an accessor");
        assert_eq!(accessor.mode(), mode);
        assert_eq!(executor.access(accessor, None).unwrap(), 42, "mode {}", mode);
    }
}

#[test]
fn test_async_wait_returns_value() {
    for mode in ASYNC_MODES {
        let executor = get_executor(mode).unwrap();
        let result = executor.run(|| "done", Some(true), Some(Duration::from_secs(5))).unwrap();
        assert_eq!(result.ready(), Some("done"), "mode {}", mode);
    }
}

#[test]
fn test_async_submit_defers() {
    for mode in ASYNC_MODES {
        let executor = get_executor(mode).unwrap();
        let dispatch = executor.submit(|| 5).unwrap();
        assert!(dispatch.is_pending(), "mode {}", mode);
        assert_eq!(dispatch.wait(Some(Duration::from_secs(5))).unwrap(), 5);
    }
}

#[test]
fn test_async_execute_waits() {
    for mode in ASYNC_MODES {
        let executor = get_executor(mode).unwrap();
        assert_eq!(executor.execute(|| 2 + 3).unwrap(), 5, "mode {}", mode);
    }
}

#[test]
fn test_default_wait_per_mode() {
    assert!(SynchronousExecutor::shared().default_wait());
    assert!(get_executor(GreenMode::Greenlets).unwrap().default_wait());
    assert!(get_executor(GreenMode::Futures).unwrap().default_wait());
    assert!(!get_executor(GreenMode::EventLoop).unwrap().default_wait());

    let dispatch = get_executor(GreenMode::EventLoop)
        .unwrap()
        .run(|| 1, None, None)
        .unwrap();
    assert!(dispatch.is_pending());
}

#[test]
fn test_timeout_returns_promptly() {
    let executor = get_executor(GreenMode::Futures).unwrap();
    let start = Instant::now();

    let err = executor
        .run(
            || {
                thread::sleep(Duration::from_secs(1));
                1
            },
            Some(true),
            Some(Duration::from_millis(50)),
        )
        .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(
        err,
        GreenError::Timeout {
            mode: GreenMode::Futures,
            timeout_ms: 50,
        }
    );
    assert!(start.elapsed() < Duration::from_millis(900));
}

#[test]
fn test_operation_error_passes_through() {
    for mode in GreenMode::ALL {
        let executor = get_executor(mode).unwrap();
        let dispatch = executor
            .run(|| Err::<i32, String>("device refused".to_string()), Some(true), None)
            .unwrap();

        match dispatch {
            Dispatch::Ready(result) => assert_eq!(result, Err("device refused".to_string())),
            Dispatch::Pending(_) => panic!("Expected a ready result for {}", mode),
        }
    }
}

#[test]
fn test_panic_reaches_caller() {
    for mode in GreenMode::ALL {
        let executor = get_executor(mode).unwrap();
        let caught = panic::catch_unwind(AssertUnwindSafe(|| {
            executor.run(|| -> i32 { panic!("device offline") }, Some(true), None)
        }));

        let payload = caught.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"device offline"), "mode {}", mode);
    }

    // The backends survive the panic
    let executor = get_executor(GreenMode::Futures).unwrap();
    assert_eq!(executor.execute(|| 1).unwrap(), 1);
}

#[tokio::test]
async fn test_wait_async_on_accessor() {
    let executor = get_executor(GreenMode::Futures).unwrap();
    let accessor = executor.delegate(|| 21 * 2).unwrap();
    assert_eq!(accessor.wait_async().await.unwrap(), 42);
}

#[test]
fn test_unbounded_timeout_waits_for_result() {
    for mode in ASYNC_MODES {
        let executor = get_executor(mode).unwrap();

        let dispatch = executor.run(|| 6 * 7, Some(true), Some(Duration::MAX)).unwrap();
        assert_eq!(dispatch.ready(), Some(42), "mode {}", mode);

        let accessor = executor.delegate(|| 42).unwrap();
        assert_eq!(executor.access(accessor, Some(Duration::MAX)).unwrap(), 42, "mode {}", mode);
    }
}
