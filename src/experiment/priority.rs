/*!
 * Priority Experiment
 *
 * Siblings run the same workload with increasing niceness and report how
 * long it took. Each worker lowers its own priority by `index * step`,
 * times the workload, and leaves an [`ExperimentEntry`] in a fresh
 * [`ResultChannel`]. The parent reaps everyone before reading, so every
 * record it looks for has already been renamed into place.
 */

use super::channel::ResultChannel;
use super::report::ExperimentReport;
use super::types::{ChannelResult, ExperimentEntry};
use super::workload::WorkloadRunner;
use crate::core::config::LabConfig;
use crate::core::errors::LabResult;
use crate::core::limits::CHILD_FAILURE_STATUS;
use crate::core::types::{NiceOffset, Pid};
use crate::process::fork::ChildContext;
use crate::process::priority::{lower_priority, NiceAdjustment};
use crate::process::reaper::Reaper;
use crate::process::spawner::{ChildRole, Spawner};
use crate::process::types::{ExitRecord, ProcessHandle};
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Applies a niceness offset to the calling process
pub type PriorityAdjuster = fn(NiceOffset) -> NiceAdjustment;

/// Child-side logic of the priority experiment
#[derive(Debug, Clone)]
pub struct PriorityWorker {
    step: u32,
    iterations: u64,
    channel: ResultChannel<ExperimentEntry>,
    adjust: PriorityAdjuster,
}

impl PriorityWorker {
    pub fn new(step: u32, iterations: u64, channel: ResultChannel<ExperimentEntry>) -> Self {
        Self {
            step,
            iterations,
            channel,
            adjust: lower_priority,
        }
    }

    /// Replace how the worker changes its own priority
    #[must_use]
    pub fn with_adjuster(mut self, adjust: PriorityAdjuster) -> Self {
        self.adjust = adjust;
        self
    }

    /// Niceness offset applied by the sibling at `index`
    #[inline]
    #[must_use]
    pub fn offset_for(&self, index: usize) -> NiceOffset {
        u32::try_from(index)
            .unwrap_or(u32::MAX)
            .saturating_mul(self.step)
    }

    /// Adjust priority, time the workload and record the entry as `pid`
    ///
    /// A refused priority change is printed and the workload runs anyway.
    pub fn measure(&self, pid: Pid, index: usize) -> ChannelResult<ExperimentEntry> {
        let offset = self.offset_for(index);

        let adjustment = (self.adjust)(offset);
        if adjustment.is_denied() {
            println!("[CHILD {}] {}; running at current priority", pid, adjustment);
        }

        let (_, elapsed) = WorkloadRunner::timed(self.iterations);
        let entry = ExperimentEntry::new(pid, offset, elapsed);
        println!(
            "[CHILD {}] nice_offset={} duration={:.3}s done",
            pid, offset, entry.duration_secs
        );

        self.channel.write(pid, &entry)?;
        Ok(entry)
    }

    pub(crate) fn run(&self, ctx: &ChildContext) -> i32 {
        match self.measure(ctx.pid(), ctx.index()) {
            Ok(_) => 0,
            Err(e) => {
                eprintln!("[CHILD {}] could not record result: {}", ctx.pid(), e);
                CHILD_FAILURE_STATUS
            }
        }
    }
}

/// Take every handle's record from `channel` and rank them
///
/// Handles without a readable record end up in `missing`.
pub(crate) fn collect(
    channel: &ResultChannel<ExperimentEntry>,
    handles: &[ProcessHandle],
    exits: Vec<ExitRecord>,
) -> ExperimentReport {
    let mut entries = Vec::with_capacity(handles.len());
    let mut missing: Vec<Pid> = Vec::new();

    for handle in handles {
        match channel.read_and_delete(handle.pid) {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => {
                warn!(child = handle.pid, "no result recorded");
                missing.push(handle.pid);
            }
            Err(e) => {
                warn!(child = handle.pid, error = %e, "discarding result");
                missing.push(handle.pid);
            }
        }
    }

    ExperimentReport::new(entries, missing, exits)
}

/// Parent-side driver of the priority experiment
#[derive(Debug, Clone)]
pub struct PriorityExperiment {
    iterations: u64,
    result_dir: PathBuf,
}

impl PriorityExperiment {
    pub fn new(iterations: u64, result_dir: impl Into<PathBuf>) -> Self {
        Self {
            iterations,
            result_dir: result_dir.into(),
        }
    }

    pub fn from_config(config: &LabConfig) -> Self {
        Self::new(config.workload_iterations, config.result_dir.clone())
    }

    #[inline]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Run `n` workers with niceness offsets `0, step, 2*step, ...`
    ///
    /// Missing or unreadable records are listed in the report, never fatal.
    #[instrument(skip(self), fields(iterations = self.iterations))]
    pub fn run(&self, n: usize, step: u32) -> LabResult<ExperimentReport> {
        let channel = ResultChannel::<ExperimentEntry>::create(&self.result_dir)?;
        let role = ChildRole::PriorityWorker(PriorityWorker::new(
            step,
            self.iterations,
            channel.clone(),
        ));

        let batch = Spawner::spawn(n, &role);
        if let Some(e) = batch.failure() {
            warn!(error = %e, created = batch.len(), "continuing with the workers that started");
        }

        let exits = Reaper::reap_all(batch.handles());
        let report = collect(&channel, batch.handles(), exits);

        if let Err(e) = channel.cleanup() {
            warn!(error = %e, "could not remove result directory");
        }

        info!(
            ranked = report.ranking.len(),
            missing = report.missing.len(),
            "experiment finished"
        );
        Ok(report)
    }
}
