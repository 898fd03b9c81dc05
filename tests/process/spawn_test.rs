/*!
 * Spawner Tests
 * Batch creation with every child role, reaped to completion
 */

use pretty_assertions::assert_eq;
use proc_lifecycle::process::{CommandMode, CommandSpec};
use proc_lifecycle::{ChildRole, ExitKind, Reaper, Spawner};
use serial_test::serial;
use std::collections::HashSet;

#[test]
#[serial]
fn test_greeting_children_all_reaped() {
    let batch = Spawner::spawn(4, &ChildRole::Greeting);
    assert!(batch.failure().is_none());
    assert_eq!(batch.len(), 4);

    let records = Reaper::reap_all(batch.handles());
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.kind() == ExitKind::Exited(0)));

    let spawned: HashSet<u32> = batch.handles().iter().map(|h| h.pid).collect();
    let reaped: HashSet<u32> = records.iter().map(|r| r.pid).collect();
    assert_eq!(spawned, reaped);
}

#[test]
#[serial]
fn test_zero_children() {
    let batch = Spawner::spawn(0, &ChildRole::Greeting);
    assert!(batch.is_empty());
    assert!(Reaper::reap_all(batch.handles()).is_empty());
}

#[test]
#[serial]
fn test_handles_record_parent() {
    let batch = Spawner::spawn(2, &ChildRole::Greeting);
    let me = std::process::id();
    assert!(batch.handles().iter().all(|h| h.parent_pid == me));
    Reaper::reap_all(batch.handles());
}

#[test]
#[serial]
fn test_replace_with_true() {
    let role = ChildRole::Command(CommandSpec::new("true", CommandMode::Replace));
    let batch = Spawner::spawn(3, &role);

    let records = Reaper::reap_all(batch.handles());
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.is_success()));
}

#[test]
#[serial]
fn test_replace_missing_program() {
    let role = ChildRole::Command(CommandSpec::new(
        "definitely-not-a-real-program-xyz --flag",
        CommandMode::Replace,
    ));
    let batch = Spawner::spawn(2, &role);

    let records = Reaper::reap_all(batch.handles());
    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(record.exit_code(), Some(127));
        assert!(!record.is_success());
    }
}

#[test]
#[serial]
fn test_sub_invoke_propagates_exit_code() {
    let role = ChildRole::Command(CommandSpec::new("exit 3", CommandMode::SubInvoke));
    let batch = Spawner::spawn(1, &role);

    let records = Reaper::reap_all(batch.handles());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].exit_code(), Some(3));
}
