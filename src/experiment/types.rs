/*!
 * Experiment Types
 */

use crate::core::types::{NiceOffset, Pid};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result channel operation result
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Result channel errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ChannelError {
    #[error("I/O error on {path}: {reason}")]
    #[diagnostic(
        code(channel::io_error),
        help("Check that the result directory exists and is writable.")
    )]
    Io { path: PathBuf, reason: String },

    #[error("Failed to serialize record for owner {owner}: {reason}")]
    #[diagnostic(code(channel::serialization))]
    Serialization { owner: Pid, reason: String },

    #[error("Malformed record for owner {owner}: {reason}")]
    #[diagnostic(
        code(channel::malformed),
        help("The writer probably crashed mid-run or wrote a different record type.")
    )]
    Malformed { owner: Pid, reason: String },
}

impl ChannelError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        ChannelError::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

/// One child's measurement in the priority experiment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperimentEntry {
    pub pid: Pid,
    pub nice_offset: NiceOffset,
    /// Wall-clock seconds spent in the workload, never negative
    pub duration_secs: f64,
}

impl ExperimentEntry {
    #[inline]
    #[must_use]
    pub fn new(pid: Pid, nice_offset: NiceOffset, duration: Duration) -> Self {
        Self {
            pid,
            nice_offset,
            duration_secs: duration.as_secs_f64(),
        }
    }
}
