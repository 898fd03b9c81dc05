/*!
 * Result Channel Tests
 * Records written by children and taken by the parent
 */

use pretty_assertions::assert_eq;
use proc_lifecycle::process::fork_child;
use proc_lifecycle::{ExperimentEntry, Fork, Reaper, ResultChannel};
use serial_test::serial;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_absent_owner_reads_none() {
    let temp = TempDir::new().unwrap();
    let channel = ResultChannel::<ExperimentEntry>::create(temp.path()).unwrap();
    assert_eq!(channel.read_and_delete(123_456).unwrap(), None);
    assert!(channel.pending_owners().unwrap().is_empty());
}

#[test]
#[serial]
fn test_record_written_by_child() {
    let temp = TempDir::new().unwrap();
    let channel = ResultChannel::<ExperimentEntry>::create(temp.path()).unwrap();

    let handle = match fork_child(0).unwrap() {
        Fork::Child(ctx) => ctx.run(|ctx| {
            let entry = ExperimentEntry::new(ctx.pid(), 5, Duration::from_millis(20));
            match channel.write(ctx.pid(), &entry) {
                Ok(()) => 0,
                Err(_) => 1,
            }
        }),
        Fork::Parent(handle) => handle,
    };
    assert!(Reaper::reap_one(&handle).unwrap().is_success());

    assert_eq!(channel.pending_owners().unwrap(), vec![handle.pid]);
    let entry = channel.read_and_delete(handle.pid).unwrap().unwrap();
    assert_eq!(entry.pid, handle.pid);
    assert_eq!(entry.nice_offset, 5);

    channel.cleanup().unwrap();
    assert!(!channel.dir().exists());
}
