/*!
 * Lifecycle Demonstrator
 *
 * Drives a single child into one of the two states that only exist because
 * parent and child run independently:
 *
 * - **Zombie**: the child exits at once and the parent holds off collecting
 *   its status for the configured window. The reap after the window is
 *   unconditional, so the zombie never outlives the demonstration.
 * - **Orphan**: the parent returns immediately without reaping while the child
 *   keeps working. The kernel reparents the child, which notices through its
 *   changing parent id and finishes on its own schedule.
 */

use super::fork::{fork_child, ChildContext, Fork};
use super::reaper::Reaper;
use super::types::{ExitRecord, ProcessHandle, ProcessResult};
use crate::core::config::LabConfig;
use crate::core::errors::ConfigError;
use crate::core::types::Pid;
use crate::experiment::channel::ResultChannel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Which lifecycle state to induce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleMode {
    Zombie,
    Orphan,
}

impl FromStr for LifecycleMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zombie" => Ok(LifecycleMode::Zombie),
            "orphan" => Ok(LifecycleMode::Orphan),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for LifecycleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleMode::Zombie => write!(f, "zombie"),
            LifecycleMode::Orphan => write!(f, "orphan"),
        }
    }
}

/// When the parent collects an exited child's status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapPolicy {
    /// Collect as soon as the child exits
    Immediate,
    /// Leave the child a zombie for this long after creation, then collect
    Deferred(Duration),
}

impl ReapPolicy {
    #[inline]
    #[must_use]
    pub const fn delay(&self) -> Duration {
        match self {
            ReapPolicy::Immediate => Duration::ZERO,
            ReapPolicy::Deferred(delay) => *delay,
        }
    }
}

/// What an orphaned child saw while it ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanReport {
    pub pid: Pid,
    pub original_parent: Pid,
    pub final_parent: Pid,
    pub ticks: u32,
}

impl OrphanReport {
    #[inline]
    #[must_use]
    pub fn was_reparented(&self) -> bool {
        self.final_parent != self.original_parent
    }
}

/// Child-side logic of a lifecycle demonstration
#[derive(Debug, Clone)]
pub enum LifecycleChild {
    /// Exit with status 0 right away
    ExitImmediately,
    /// Keep working for a while, reporting the current parent on every tick
    Linger(OrphanWorker),
}

impl LifecycleChild {
    pub(crate) fn run(&self, ctx: &ChildContext) -> i32 {
        match self {
            LifecycleChild::ExitImmediately => {
                println!(
                    "[CHILD {}] exiting immediately (will become zombie if parent doesn't wait)",
                    ctx.pid()
                );
                0
            }
            LifecycleChild::Linger(worker) => worker.run(ctx),
        }
    }
}

/// Bounded, paced loop run by the orphaned child
#[derive(Debug, Clone)]
pub struct OrphanWorker {
    pub ticks: u32,
    pub tick: Duration,
    pub report: Option<ResultChannel<OrphanReport>>,
}

impl OrphanWorker {
    fn run(&self, ctx: &ChildContext) -> i32 {
        println!(
            "[CHILD {}] running for {} ticks to show orphanhood; parent should exit",
            ctx.pid(),
            self.ticks
        );

        for i in 0..self.ticks {
            println!(
                "[CHILD {}] working... {}/{} parent now: {}",
                ctx.pid(),
                i + 1,
                self.ticks,
                ctx.current_parent()
            );
            std::thread::sleep(self.tick);
        }

        let report = OrphanReport {
            pid: ctx.pid(),
            original_parent: ctx.parent_pid(),
            final_parent: ctx.current_parent(),
            ticks: self.ticks,
        };
        println!("[CHILD {}] done; parent now {}", ctx.pid(), report.final_parent);

        if let Some(channel) = &self.report {
            if let Err(e) = channel.write(ctx.pid(), &report) {
                warn!(error = %e, "could not record orphan report");
            }
        }
        0
    }
}

/// Result of a zombie demonstration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZombieOutcome {
    pub handle: ProcessHandle,
    pub record: ExitRecord,
    /// Time between creation and collection
    pub unreaped_for: Duration,
}

/// Orchestrates zombie and orphan demonstrations
#[derive(Debug, Clone)]
pub struct LifecycleDemonstrator {
    reap_policy: ReapPolicy,
    orphan_ticks: u32,
    orphan_tick: Duration,
    orphan_report: Option<ResultChannel<OrphanReport>>,
}

impl LifecycleDemonstrator {
    pub fn new(reap_policy: ReapPolicy, orphan_ticks: u32, orphan_tick: Duration) -> Self {
        Self {
            reap_policy,
            orphan_ticks,
            orphan_tick,
            orphan_report: None,
        }
    }

    pub fn from_config(config: &LabConfig) -> Self {
        Self::new(
            ReapPolicy::Deferred(config.zombie_delay),
            config.orphan_ticks,
            config.orphan_tick,
        )
    }

    /// Have the orphaned child record what it observed
    #[must_use]
    pub fn with_orphan_report(mut self, channel: ResultChannel<OrphanReport>) -> Self {
        self.orphan_report = Some(channel);
        self
    }

    #[inline]
    pub fn reap_policy(&self) -> ReapPolicy {
        self.reap_policy
    }

    /// Create a child that exits at once and leave it unreaped per the policy
    ///
    /// `observe` runs inside the window, after the child is known to have
    /// exited and before it is collected, so the child is guaranteed to be a
    /// zombie while it runs.
    pub fn run_zombie<F>(&self, observe: F) -> ProcessResult<ZombieOutcome>
    where
        F: FnOnce(&ProcessHandle),
    {
        let created = Instant::now();
        let handle = match fork_child(0)? {
            Fork::Child(ctx) => ctx.run(|ctx| LifecycleChild::ExitImmediately.run(ctx)),
            Fork::Parent(handle) => handle,
        };

        if let ReapPolicy::Deferred(delay) = self.reap_policy {
            info!(child = handle.pid, delay_ms = delay.as_millis() as u64, "deferring reap");
            Reaper::await_exit(&handle)?;
            observe(&handle);
            std::thread::sleep(delay.saturating_sub(created.elapsed()));
        }

        let record = Reaper::reap_one(&handle)?;
        let unreaped_for = created.elapsed();
        info!(child = handle.pid, status = record.raw_status, "zombie collected");

        Ok(ZombieOutcome {
            handle,
            record,
            unreaped_for,
        })
    }

    /// Create a lingering child and return without reaping it
    ///
    /// The caller is expected to exit promptly; the child is then reparented
    /// and its eventual status is collected by its new parent.
    pub fn run_orphan(&self) -> ProcessResult<ProcessHandle> {
        let worker = OrphanWorker {
            ticks: self.orphan_ticks,
            tick: self.orphan_tick,
            report: self.orphan_report.clone(),
        };

        match fork_child(0)? {
            Fork::Child(ctx) => ctx.run(|ctx| LifecycleChild::Linger(worker).run(ctx)),
            Fork::Parent(handle) => {
                info!(child = handle.pid, "leaving child to be orphaned");
                Ok(handle)
            }
        }
    }
}
