/*!
 * Command Execution
 * Program replacement (execvp) and sub-invocation (sh -c) for command workers
 */

use super::fork::ChildContext;
use super::types::{ProcessError, ProcessResult};
use crate::core::limits::{
    CHILD_FAILURE_STATUS, EXEC_FAILED_STATUS, EXEC_NOT_FOUND_STATUS, SUB_INVOKE_SHELL,
};
use nix::errno::Errno;
use nix::unistd::execvp;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::ffi::CString;
use std::process::{Command, ExitStatus};
use tracing::{debug, warn};

/// How a command worker runs its command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandMode {
    /// Replace the child's image; the PID is kept and no lab code runs afterwards
    Replace,
    /// Run the command to completion and return to the child
    SubInvoke,
}

/// Command executed by a command worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub command: String,
    pub mode: CommandMode,
}

impl CommandSpec {
    pub fn new(command: impl Into<String>, mode: CommandMode) -> Self {
        Self {
            command: command.into(),
            mode,
        }
    }

    /// Reject commands that could never run, before any child is created
    pub fn validate(&self) -> ProcessResult<()> {
        parse_argv(&self.command).map(|_| ())
    }

    /// Child-side entry point; returns only when the image was not replaced
    pub(crate) fn run(&self, ctx: &ChildContext) -> i32 {
        println!(
            "[CHILD {}] parent={} executing '{}'",
            ctx.pid(),
            ctx.parent_pid(),
            self.command
        );

        match self.mode {
            CommandMode::Replace => match replace(&self.command) {
                Ok(never) => match never {},
                Err(e) => {
                    eprintln!("[CHILD {}] exec failed: {}", ctx.pid(), e);
                    exec_failure_status(&e)
                }
            },
            CommandMode::SubInvoke => match sub_invoke(&self.command) {
                Ok(status) => status.code().unwrap_or(CHILD_FAILURE_STATUS),
                Err(e) => {
                    eprintln!("[CHILD {}] subprocess error: {}", ctx.pid(), e);
                    CHILD_FAILURE_STATUS
                }
            },
        }
    }
}

/// Split a command line on whitespace into an argument vector
pub fn parse_argv(command: &str) -> ProcessResult<Vec<CString>> {
    let argv = command
        .split_whitespace()
        .map(|arg| {
            CString::new(arg)
                .map_err(|_| ProcessError::InvalidCommand(format!("NUL byte in '{}'", arg)))
        })
        .collect::<ProcessResult<Vec<_>>>()?;

    if argv.is_empty() {
        return Err(ProcessError::InvalidCommand("Empty command".to_string()));
    }
    Ok(argv)
}

/// Replace the current process image with `command`
///
/// Searches PATH like a shell does. Returns only on failure.
pub fn replace(command: &str) -> ProcessResult<Infallible> {
    let argv = parse_argv(command)?;
    let program = argv[0].to_string_lossy().into_owned();
    debug!(program = %program, "replacing process image");

    match execvp(&argv[0], &argv) {
        Ok(never) => match never {},
        Err(Errno::ENOENT) => Err(ProcessError::ProgramNotFound(program)),
        Err(errno) => Err(ProcessError::ExecFailed {
            program,
            reason: errno.desc().to_string(),
        }),
    }
}

/// Run `command` through the shell to completion and return its status
pub fn sub_invoke(command: &str) -> ProcessResult<ExitStatus> {
    if command.trim().is_empty() {
        return Err(ProcessError::InvalidCommand("Empty command".to_string()));
    }

    Command::new(SUB_INVOKE_SHELL)
        .arg("-c")
        .arg(command)
        .status()
        .map_err(|e| {
            warn!(error = %e, "sub-invocation failed to start");
            ProcessError::ExecFailed {
                program: SUB_INVOKE_SHELL.to_string(),
                reason: e.to_string(),
            }
        })
}

/// Exit status a child uses after a failed replacement
#[must_use]
pub fn exec_failure_status(error: &ProcessError) -> i32 {
    match error {
        ProcessError::ProgramNotFound(_) => EXEC_NOT_FOUND_STATUS,
        _ => EXEC_FAILED_STATUS,
    }
}
