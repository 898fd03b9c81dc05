/*!
 * Experiment Report
 * Ranking and rendering of priority experiment results
 */

use super::types::ExperimentEntry;
use crate::core::types::Pid;
use crate::process::ExitRecord;
use std::fmt;

/// Printed under every ranking table
pub const INTERPRETATION_NOTE: &str = "Interpretation: children with lower priority \
(higher nice offset) typically finish later, but the scheduler, CPU contention and I/O \
can affect results.";

/// Sort ascending by duration; equal durations keep their input order
pub fn rank_entries(entries: &mut [ExperimentEntry]) {
    entries.sort_by(|a, b| a.duration_secs.total_cmp(&b.duration_secs));
}

/// Outcome of one priority experiment run
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentReport {
    /// Entries ranked by duration, fastest first
    pub ranking: Vec<ExperimentEntry>,
    /// Children whose record was absent or unreadable
    pub missing: Vec<Pid>,
    /// Collected statuses in termination-arrival order
    pub exits: Vec<ExitRecord>,
}

impl ExperimentReport {
    pub fn new(
        mut entries: Vec<ExperimentEntry>,
        missing: Vec<Pid>,
        exits: Vec<ExitRecord>,
    ) -> Self {
        rank_entries(&mut entries);
        Self {
            ranking: entries,
            missing,
            exits,
        }
    }

    /// Nice offsets in completion order
    pub fn completion_order(&self) -> Vec<u32> {
        self.ranking.iter().map(|e| e.nice_offset).collect()
    }
}

impl fmt::Display for ExperimentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PID\tNice\tDuration(s)  (lower duration -> finished earlier)")?;
        for entry in &self.ranking {
            writeln!(
                f,
                "{}\t{}\t{:.3}",
                entry.pid, entry.nice_offset, entry.duration_secs
            )?;
        }
        writeln!(f)?;
        write!(f, "{}", INTERPRETATION_NOTE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn entry(pid: Pid, nice: u32, secs: f64) -> ExperimentEntry {
        ExperimentEntry {
            pid,
            nice_offset: nice,
            duration_secs: secs,
        }
    }

    #[test]
    fn test_ranking_ascending() {
        let report = ExperimentReport::new(
            vec![entry(1, 10, 0.9), entry(2, 0, 0.1), entry(3, 5, 0.5)],
            vec![],
            vec![],
        );
        assert_eq!(report.completion_order(), vec![0, 5, 10]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let report = ExperimentReport::new(
            vec![entry(1, 0, 0.2), entry(2, 5, 0.1), entry(3, 10, 0.2)],
            vec![],
            vec![],
        );
        let pids: Vec<Pid> = report.ranking.iter().map(|e| e.pid).collect();
        assert_eq!(pids, vec![2, 1, 3]);
    }

    #[test]
    fn test_display_table() {
        let report = ExperimentReport::new(vec![entry(42, 5, 0.25)], vec![], vec![]);
        let text = report.to_string();
        assert!(text.starts_with("PID\tNice\tDuration(s)"));
        assert!(text.contains("42\t5\t0.250\n"));
        assert!(text.ends_with(INTERPRETATION_NOTE));
    }

    proptest! {
        #[test]
        fn prop_sorted_and_stable(durations in proptest::collection::vec(0u8..4, 0..24)) {
            let mut entries: Vec<ExperimentEntry> = durations
                .iter()
                .enumerate()
                .map(|(i, d)| entry(i as Pid, i as u32 * 5, f64::from(*d)))
                .collect();
            rank_entries(&mut entries);

            for pair in entries.windows(2) {
                prop_assert!(pair[0].duration_secs <= pair[1].duration_secs);
                if pair[0].duration_secs == pair[1].duration_secs {
                    prop_assert!(pair[0].pid < pair[1].pid);
                }
            }
            prop_assert_eq!(entries.len(), durations.len());
        }
    }
}
