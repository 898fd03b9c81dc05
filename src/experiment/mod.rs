/*!
 * Experiment Module
 * CPU-bound workload, cross-process result channel and the priority ranking experiment
 */

pub mod channel;
pub mod priority;
pub mod report;
pub mod types;
pub mod workload;

// Re-export for convenience
pub use channel::ResultChannel;
pub use priority::{PriorityAdjuster, PriorityExperiment, PriorityWorker};
pub use report::{rank_entries, ExperimentReport, INTERPRETATION_NOTE};
pub use types::{ChannelError, ChannelResult, ExperimentEntry};
pub use workload::WorkloadRunner;
