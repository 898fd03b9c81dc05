/*!
 * Lab Limits and Constants
 *
 * Defaults for every tunable of the lab, grouped by the subsystem that reads them.
 * `LabConfig` starts from these values and applies overrides on top.
 */

use std::time::Duration;

// =============================================================================
// SPAWNING
// =============================================================================

/// Children created when a task does not specify a count
pub const DEFAULT_CHILD_COUNT: usize = 3;

/// Command run by the exec task when none is given
pub const DEFAULT_COMMAND: &str = "ls -l";

/// Shell used for sub-invocation
pub const SUB_INVOKE_SHELL: &str = "/bin/sh";

// =============================================================================
// EXIT STATUSES
// =============================================================================

/// Child exit status when the replacement target does not exist
/// [POSIX-COMPAT] Same code shells use for "command not found"
pub const EXEC_NOT_FOUND_STATUS: i32 = 127;

/// Child exit status when the replacement target exists but cannot be run
/// [POSIX-COMPAT] Same code shells use for "not executable"
pub const EXEC_FAILED_STATUS: i32 = 126;

/// Generic child failure status
pub const CHILD_FAILURE_STATUS: i32 = 1;

/// Child exit status when role logic panicked
pub const CHILD_PANIC_STATUS: i32 = 101;

// =============================================================================
// LIFECYCLE DEMONSTRATION
// =============================================================================

/// How long the parent leaves an exited child unreaped in zombie mode.
/// Long enough to run `ps -el | grep defunct` from another terminal.
pub const DEFAULT_ZOMBIE_DELAY: Duration = Duration::from_secs(15);

/// Progress ticks printed by an orphaned child before it exits
pub const DEFAULT_ORPHAN_TICKS: u32 = 10;

/// Pacing between orphan progress ticks
pub const DEFAULT_ORPHAN_TICK: Duration = Duration::from_secs(1);

// =============================================================================
// PRIORITY EXPERIMENT
// =============================================================================

/// Workload size used by priority workers
pub const DEFAULT_WORKLOAD_ITERATIONS: u64 = 500_000;

/// Niceness distance between consecutive siblings (0, 5, 10, ...)
pub const DEFAULT_PRIORITY_STEP: u32 = 5;

/// Highest niceness the kernel accepts
/// [LINUX-COMPAT] Values above are clamped by the kernel as well
pub const NICE_MAX: i32 = 19;

// =============================================================================
// RESULT CHANNEL
// =============================================================================

/// Directory created under the base path that holds every run's records
pub const RESULT_DIR_NAME: &str = "proc-lifecycle";

/// Record file prefix; the owner PID follows it
pub const RECORD_PREFIX: &str = "child_";

/// Record file extension
pub const RECORD_EXTENSION: &str = "json";
