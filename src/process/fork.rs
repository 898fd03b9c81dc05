/*!
 * Process Duplication
 *
 * `fork` returns twice; this module turns the two returns into the two arms
 * of [`Fork`]. The parent arm carries a [`ProcessHandle`] and continues the
 * caller. The child arm carries a [`ChildContext`] whose only exits are
 * [`ChildContext::run`] and [`ChildContext::terminate`], both of which end
 * the process, so child code can never fall back into the parent's loop.
 */

use super::types::{ProcessError, ProcessHandle, ProcessResult};
use crate::core::limits::CHILD_PANIC_STATUS;
use crate::core::types::{current_parent_pid, current_pid, from_nix, Pid};
use nix::unistd::{fork, ForkResult};
use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error};

/// The two continuations of one duplication
#[derive(Debug)]
#[must_use = "the child arm must be run or terminated"]
pub enum Fork {
    /// Running in the original process
    Parent(ProcessHandle),
    /// Running in the new process
    Child(ChildContext),
}

/// Execution context of a freshly duplicated child
#[derive(Debug)]
pub struct ChildContext {
    index: usize,
    pid: Pid,
    parent_pid: Pid,
}

impl ChildContext {
    /// Position of this child among its siblings
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Parent at creation time
    #[inline]
    pub fn parent_pid(&self) -> Pid {
        self.parent_pid
    }

    /// Parent as the kernel reports it now; differs from `parent_pid` once orphaned
    #[inline]
    pub fn current_parent(&self) -> Pid {
        current_parent_pid()
    }

    /// Run `body` and exit with the status it returns
    ///
    /// A panic in `body` is caught and turned into exit status 101 so the
    /// unwinding never reaches frames that belong to the parent's logic.
    pub fn run<F>(self, body: F) -> !
    where
        F: FnOnce(&ChildContext) -> i32,
    {
        let status = match catch_unwind(AssertUnwindSafe(|| body(&self))) {
            Ok(status) => status,
            Err(_) => {
                error!(pid = self.pid, "child role panicked");
                CHILD_PANIC_STATUS
            }
        };
        self.terminate(status)
    }

    /// Flush standard streams and leave the process immediately
    ///
    /// Uses `_exit` so exit handlers and destructors inherited from the parent
    /// do not run a second time in the child.
    pub fn terminate(self, status: i32) -> ! {
        debug!(pid = self.pid, status, "child terminating");
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
        // SAFETY: `_exit` takes no pointers and never returns; the standard
        // streams were flushed above.
        unsafe { nix::libc::_exit(status) }
    }
}

/// Duplicate the calling process once
///
/// `index` is handed to the child so siblings can tell themselves apart.
pub fn fork_child(index: usize) -> ProcessResult<Fork> {
    let parent_pid = current_pid();

    // Buffered output would otherwise be written once by each process
    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();

    // SAFETY: the child only touches memory it inherited and leaves through
    // `ChildContext::terminate`, which never returns into the caller.
    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            let handle = ProcessHandle::new(from_nix(child), parent_pid);
            debug!(child = handle.pid, index, "forked child");
            Ok(Fork::Parent(handle))
        }
        Ok(ForkResult::Child) => Ok(Fork::Child(ChildContext {
            index,
            pid: current_pid(),
            parent_pid,
        })),
        Err(errno) => Err(ProcessError::SpawnFailed {
            index,
            reason: errno.desc().to_string(),
        }),
    }
}
