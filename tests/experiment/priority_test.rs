/*!
 * Priority Experiment Tests
 * Full fork/measure/collect runs with small workloads
 */

use pretty_assertions::assert_eq;
use proc_lifecycle::{LabConfig, PriorityExperiment};
use serial_test::serial;
use tempfile::TempDir;

fn experiment(temp: &TempDir) -> PriorityExperiment {
    let config = LabConfig::fast().with_result_dir(temp.path());
    PriorityExperiment::from_config(&config)
}

#[test]
#[serial]
fn test_three_workers_step_five() {
    let temp = TempDir::new().unwrap();
    let report = experiment(&temp).run(3, 5).unwrap();

    assert_eq!(report.exits.len(), 3);
    assert!(report.exits.iter().all(|r| r.is_success()));
    assert!(report.missing.is_empty());
    assert_eq!(report.ranking.len(), 3);

    let mut offsets = report.completion_order();
    offsets.sort_unstable();
    assert_eq!(offsets, vec![0, 5, 10]);

    for pair in report.ranking.windows(2) {
        assert!(pair[0].duration_secs <= pair[1].duration_secs);
    }
    assert!(report.ranking.iter().all(|e| e.duration_secs >= 0.0));
}

#[test]
#[serial]
fn test_every_entry_belongs_to_a_reaped_child() {
    let temp = TempDir::new().unwrap();
    let report = experiment(&temp).run(4, 2).unwrap();

    for entry in &report.ranking {
        assert!(report.exits.iter().any(|r| r.pid == entry.pid));
    }
}

#[test]
#[serial]
fn test_run_directory_removed_after_collection() {
    let temp = TempDir::new().unwrap();
    experiment(&temp).run(2, 5).unwrap();

    let leftover = std::fs::read_dir(temp.path()).unwrap().count();
    assert_eq!(leftover, 0);
}

#[test]
#[serial]
fn test_zero_workers() {
    let temp = TempDir::new().unwrap();
    let report = experiment(&temp).run(0, 5).unwrap();
    assert!(report.ranking.is_empty());
    assert!(report.exits.is_empty());
}

#[test]
#[serial]
fn test_large_step_is_clamped_not_fatal() {
    let temp = TempDir::new().unwrap();
    let report = experiment(&temp).run(3, 15).unwrap();

    // Offsets are recorded as requested even though niceness stops at 19
    let mut offsets = report.completion_order();
    offsets.sort_unstable();
    assert_eq!(offsets, vec![0, 15, 30]);
}
