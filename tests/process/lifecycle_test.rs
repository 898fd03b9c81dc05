/*!
 * Lifecycle Tests
 * Zombie visibility during deferral and orphan reparenting
 */

use pretty_assertions::assert_eq;
use proc_lifecycle::process::{fork_child, OrphanReport};
use proc_lifecycle::{
    Fork, LabConfig, LifecycleDemonstrator, ProcEntry, ProcState, Reaper, ReapPolicy,
    ResultChannel,
};
use serial_test::serial;
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[test]
#[serial]
fn test_zombie_visible_until_reaped() {
    let config = LabConfig::fast();
    let demo = LifecycleDemonstrator::from_config(&config);

    let mut observed = None;
    let outcome = demo
        .run_zombie(|handle| {
            observed = Some(ProcEntry::open(handle.pid).and_then(|entry| entry.state()));
        })
        .unwrap();

    assert_eq!(observed, Some(Ok(ProcState::Zombie)));
    assert!(outcome.record.is_success());
    assert!(outcome.unreaped_for >= config.zombie_delay);
    assert!(!ProcEntry::exists(outcome.handle.pid));
}

#[test]
#[serial]
fn test_immediate_policy_skips_observer() {
    let demo = LifecycleDemonstrator::new(ReapPolicy::Immediate, 1, Duration::ZERO);

    let mut called = false;
    let outcome = demo.run_zombie(|_| called = true).unwrap();
    assert!(!called);
    assert!(outcome.record.is_success());
}

#[test]
#[serial]
fn test_orphan_is_reparented() {
    let temp = TempDir::new().unwrap();
    let channel = ResultChannel::<OrphanReport>::create(temp.path()).unwrap();
    let config = LabConfig::fast();

    // The intermediate plays the parent that walks away
    let intermediate = match fork_child(0).unwrap() {
        Fork::Child(ctx) => ctx.run(|_| {
            let demo = LifecycleDemonstrator::from_config(&config).with_orphan_report(channel.clone());
            match demo.run_orphan() {
                Ok(_) => 0,
                Err(_) => 1,
            }
        }),
        Fork::Parent(handle) => handle,
    };
    let record = Reaper::reap_one(&intermediate).unwrap();
    assert!(record.is_success());

    let deadline = Instant::now() + Duration::from_secs(10);
    let owner = loop {
        if let Some(owner) = channel.pending_owners().unwrap().first().copied() {
            break owner;
        }
        assert!(Instant::now() < deadline, "orphan never reported");
        std::thread::sleep(Duration::from_millis(50));
    };

    let report = channel.read_and_delete(owner).unwrap().unwrap();
    assert_eq!(report.pid, owner);
    assert_eq!(report.original_parent, intermediate.pid);
    assert_ne!(report.final_parent, intermediate.pid);
    assert!(report.was_reparented());
    assert_eq!(report.ticks, config.orphan_ticks);
}
