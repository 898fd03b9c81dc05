/*!
 * Reaper Tests
 * Arrival-order collection, specific-child waits and no-such-child reporting
 */

use pretty_assertions::assert_eq;
use proc_lifecycle::process::fork_child;
use proc_lifecycle::{ExitKind, Fork, ProcessError, ProcessHandle, Reaper};
use serial_test::serial;
use std::time::Duration;

/// Fork a child that sleeps for `delay` and exits with `code`
fn child_exiting_after(index: usize, delay: Duration, code: i32) -> ProcessHandle {
    match fork_child(index).unwrap() {
        Fork::Child(ctx) => ctx.run(|_| {
            std::thread::sleep(delay);
            code
        }),
        Fork::Parent(handle) => handle,
    }
}

#[test]
#[serial]
fn test_records_arrive_in_termination_order() {
    let slow = child_exiting_after(0, Duration::from_millis(600), 1);
    let fast = child_exiting_after(1, Duration::from_millis(50), 2);

    let records = Reaper::reap_all(&[slow, fast]);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].pid, fast.pid);
    assert_eq!(records[0].exit_code(), Some(2));
    assert_eq!(records[1].pid, slow.pid);
    assert_eq!(records[1].exit_code(), Some(1));
}

#[test]
#[serial]
fn test_reap_one_collects_specific_child() {
    let handle = child_exiting_after(0, Duration::ZERO, 7);
    let record = Reaper::reap_one(&handle).unwrap();
    assert_eq!(record.pid, handle.pid);
    assert_eq!(record.kind(), ExitKind::Exited(7));
}

#[test]
#[serial]
fn test_reap_one_twice_is_no_such_child() {
    let handle = child_exiting_after(0, Duration::ZERO, 0);
    Reaper::reap_one(&handle).unwrap();
    assert_eq!(
        Reaper::reap_one(&handle).unwrap_err(),
        ProcessError::NoSuchChild(handle.pid)
    );
}

#[test]
#[serial]
fn test_reap_one_foreign_pid() {
    let init = ProcessHandle::new(1, std::process::id());
    assert_eq!(
        Reaper::reap_one(&init).unwrap_err(),
        ProcessError::NoSuchChild(1)
    );
}

#[test]
#[serial]
fn test_reap_all_reports_missing_handles() {
    let real = child_exiting_after(0, Duration::ZERO, 0);
    let bogus = ProcessHandle::new(1, std::process::id());

    // Stops once the OS has no children left, keeping what it collected
    let records = Reaper::reap_all(&[real, bogus]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].pid, real.pid);
}

#[test]
#[serial]
fn test_panicking_child_exits_101() {
    let handle = match fork_child(0).unwrap() {
        Fork::Child(ctx) => ctx.run(|_| panic!("role failed")),
        Fork::Parent(handle) => handle,
    };
    let record = Reaper::reap_one(&handle).unwrap();
    assert_eq!(record.exit_code(), Some(101));
}

#[test]
#[serial]
fn test_await_exit_leaves_status_collectable() {
    let handle = child_exiting_after(0, Duration::from_millis(50), 4);
    Reaper::await_exit(&handle).unwrap();

    let record = Reaper::reap_one(&handle).unwrap();
    assert_eq!(record.exit_code(), Some(4));
}

#[test]
#[serial]
fn test_terminate_status_reaches_parent() {
    let handle = match fork_child(0).unwrap() {
        Fork::Child(ctx) => ctx.terminate(42),
        Fork::Parent(handle) => handle,
    };
    let record = Reaper::reap_one(&handle).unwrap();
    assert_eq!(record.kind(), ExitKind::Exited(42));
}
