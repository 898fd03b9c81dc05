/*!
 * Process Module
 * Duplication, reaping, command execution and lifecycle demonstrations
 */

pub mod exec;
pub mod fork;
pub mod lifecycle;
pub mod priority;
pub mod reaper;
pub mod spawner;
pub mod types;

// Re-export for convenience
pub use exec::{CommandMode, CommandSpec};
pub use fork::{fork_child, ChildContext, Fork};
pub use lifecycle::{
    LifecycleChild, LifecycleDemonstrator, LifecycleMode, OrphanReport, OrphanWorker, ReapPolicy,
    ZombieOutcome,
};
pub use priority::{lower_priority, NiceAdjustment, NicePlan};
pub use reaper::Reaper;
pub use spawner::{ChildRole, SpawnBatch, Spawner};
pub use types::{ExitKind, ExitRecord, ProcessError, ProcessHandle, ProcessResult};
