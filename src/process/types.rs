/*!
 * Process Types
 * Handles, exit records and errors shared by the spawner and the reaper
 */

use crate::core::types::{from_nix, Pid, RawStatus};
use miette::Diagnostic;
use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Process operation result
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Process errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ProcessError {
    #[error("Failed to duplicate process for child {index}: {reason}")]
    #[diagnostic(
        code(process::spawn_failed),
        help("The process table or memory may be exhausted. Check `ulimit -u`.")
    )]
    SpawnFailed { index: usize, reason: String },

    #[error("Process {0} is not an unreaped child of this process")]
    #[diagnostic(
        code(process::no_such_child),
        help("The child was already reaped or was never created by this process.")
    )]
    NoSuchChild(Pid),

    #[error("Failed to collect child status: {0}")]
    #[diagnostic(code(process::wait_failed))]
    WaitFailed(String),

    #[error("Invalid command: {0}")]
    #[diagnostic(code(process::invalid_command))]
    InvalidCommand(String),

    #[error("Program not found: {0}")]
    #[diagnostic(
        code(process::program_not_found),
        help("Check the program name and PATH.")
    )]
    ProgramNotFound(String),

    #[error("Failed to execute {program}: {reason}")]
    #[diagnostic(code(process::exec_failed))]
    ExecFailed { program: String, reason: String },
}

/// Identifier of a child created by this process
///
/// The handle value is owned by the creator; the OS process is not. Once the
/// child has been reaped the handle is stale and its PID may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessHandle {
    pub pid: Pid,
    /// Parent at creation time
    pub parent_pid: Pid,
}

impl ProcessHandle {
    #[inline]
    #[must_use]
    pub const fn new(pid: Pid, parent_pid: Pid) -> Self {
        Self { pid, parent_pid }
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (parent {})", self.pid, self.parent_pid)
    }
}

/// How a child terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitKind {
    /// Returned from main or called exit
    Exited(i32),
    /// Killed by a signal
    Signaled { signal: i32, core_dumped: bool },
}

impl ExitKind {
    /// Encode as a POSIX wait status
    #[must_use]
    pub const fn to_raw(self) -> RawStatus {
        match self {
            ExitKind::Exited(code) => (code & 0xff) << 8,
            ExitKind::Signaled {
                signal,
                core_dumped,
            } => (signal & 0x7f) | if core_dumped { 0x80 } else { 0 },
        }
    }

    /// Decode a POSIX wait status of a terminated child
    #[must_use]
    pub const fn from_raw(raw: RawStatus) -> Self {
        if raw & 0x7f == 0 {
            ExitKind::Exited((raw >> 8) & 0xff)
        } else {
            ExitKind::Signaled {
                signal: raw & 0x7f,
                core_dumped: raw & 0x80 != 0,
            }
        }
    }
}

impl fmt::Display for ExitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ExitKind::Exited(code) => write!(f, "exited with code {}", code),
            ExitKind::Signaled {
                signal,
                core_dumped,
            } => {
                match Signal::try_from(signal) {
                    Ok(sig) => write!(f, "killed by {}", sig.as_str())?,
                    Err(_) => write!(f, "killed by signal {}", signal)?,
                }
                if core_dumped {
                    write!(f, " (core dumped)")?;
                }
                Ok(())
            }
        }
    }
}

/// Collected status of a terminated child. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitRecord {
    pub pid: Pid,
    pub raw_status: RawStatus,
}

impl ExitRecord {
    #[inline]
    #[must_use]
    pub const fn new(pid: Pid, kind: ExitKind) -> Self {
        Self {
            pid,
            raw_status: kind.to_raw(),
        }
    }

    /// Build a record from a wait result; `None` for states that are not terminations
    #[must_use]
    pub fn from_wait_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(pid, code) => Some(Self::new(from_nix(pid), ExitKind::Exited(code))),
            WaitStatus::Signaled(pid, signal, core_dumped) => Some(Self::new(
                from_nix(pid),
                ExitKind::Signaled {
                    signal: signal as i32,
                    core_dumped,
                },
            )),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ExitKind {
        ExitKind::from_raw(self.raw_status)
    }

    /// Exit code if the child exited normally
    #[inline]
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        match self.kind() {
            ExitKind::Exited(code) => Some(code),
            ExitKind::Signaled { .. } => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.kind(), ExitKind::Exited(0))
    }
}

impl fmt::Display for ExitRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status={} ({})", self.raw_status, self.kind())
    }
}
