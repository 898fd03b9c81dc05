/*!
 * Process Lifecycle Lab
 * Child creation, reaping, zombie/orphan induction and a niceness ranking experiment
 */

pub mod cli;
pub mod core;
pub mod experiment;
pub mod introspect;
pub mod monitoring;
pub mod process;

// Re-exports
pub use crate::core::{ConfigError, LabConfig, LabError, LabResult, Pid};
pub use experiment::{
    ExperimentEntry, ExperimentReport, PriorityExperiment, ResultChannel, WorkloadRunner,
};
pub use introspect::{inspect, InspectionReport, ProcEntry, ProcState};
pub use monitoring::init_tracing;
pub use process::{
    ChildContext, ChildRole, ExitKind, ExitRecord, Fork, LifecycleDemonstrator, LifecycleMode,
    ProcessError, ProcessHandle, Reaper, ReapPolicy, Spawner,
};
