/*!
 * Introspection Types
 */

use crate::core::types::Pid;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Introspection operation result
pub type IntrospectResult<T> = Result<T, IntrospectError>;

/// Procfs introspection errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum IntrospectError {
    #[error("/proc/{0} does not exist")]
    #[diagnostic(
        code(introspect::not_found),
        help("Is the PID valid and is this a Linux system with /proc mounted?")
    )]
    NotFound(Pid),

    #[error("Couldn't read {path}: {reason}")]
    #[diagnostic(
        code(introspect::io_error),
        help("The process may have exited, or its entry needs more privileges.")
    )]
    Io { path: PathBuf, reason: String },

    #[error("Field '{field}' is absent from /proc/{pid}/status")]
    #[diagnostic(code(introspect::missing_field))]
    MissingField { pid: Pid, field: String },

    #[error("Field '{field}' of /proc/{pid}/status is malformed: {value}")]
    #[diagnostic(code(introspect::malformed_field))]
    MalformedField {
        pid: Pid,
        field: String,
        value: String,
    },
}

impl IntrospectError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        IntrospectError::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

/// Scheduler state letter from the `State:` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcState {
    Running,
    Sleeping,
    DiskSleep,
    Zombie,
    Stopped,
    TracingStop,
    Dead,
    Idle,
    Other(char),
}

impl ProcState {
    pub fn from_code(code: char) -> Self {
        match code {
            'R' => ProcState::Running,
            'S' => ProcState::Sleeping,
            'D' => ProcState::DiskSleep,
            'Z' => ProcState::Zombie,
            'T' => ProcState::Stopped,
            't' => ProcState::TracingStop,
            'X' | 'x' => ProcState::Dead,
            'I' => ProcState::Idle,
            other => ProcState::Other(other),
        }
    }

    pub fn code(&self) -> char {
        match self {
            ProcState::Running => 'R',
            ProcState::Sleeping => 'S',
            ProcState::DiskSleep => 'D',
            ProcState::Zombie => 'Z',
            ProcState::Stopped => 'T',
            ProcState::TracingStop => 't',
            ProcState::Dead => 'X',
            ProcState::Idle => 'I',
            ProcState::Other(c) => *c,
        }
    }

    #[inline]
    pub fn is_zombie(&self) -> bool {
        matches!(self, ProcState::Zombie)
    }
}

impl fmt::Display for ProcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProcState::Running => "running",
            ProcState::Sleeping => "sleeping",
            ProcState::DiskSleep => "disk sleep",
            ProcState::Zombie => "zombie",
            ProcState::Stopped => "stopped",
            ProcState::TracingStop => "tracing stop",
            ProcState::Dead => "dead",
            ProcState::Idle => "idle",
            ProcState::Other(_) => "unknown",
        };
        write!(f, "{} ({})", self.code(), label)
    }
}

/// One `Key: value` line of the status file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusField {
    pub name: String,
    /// `None` when the kernel did not report the field (kernel threads, zombies)
    pub value: Option<String>,
}

/// One open descriptor of the inspected process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub fd: u32,
    /// `None` when the link vanished or could not be read
    pub target: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_state_codes() {
        for code in ['R', 'S', 'D', 'Z', 'T', 't', 'X', 'I', 'W'] {
            assert_eq!(ProcState::from_code(code).code(), code);
        }
        assert_eq!(ProcState::from_code('x'), ProcState::Dead);
        assert!(ProcState::from_code('Z').is_zombie());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ProcState::Zombie.to_string(), "Z (zombie)");
        assert_eq!(ProcState::Other('W').to_string(), "W (unknown)");
    }
}
