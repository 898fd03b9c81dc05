use crate::core::limits::{DEFAULT_CHILD_COUNT, DEFAULT_COMMAND};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Process lifecycle demonstrations for Linux
#[derive(Parser, Debug)]
#[command(name = "proc-lifecycle")]
#[command(version)]
#[command(about = "Create, replace, reap, orphan and reprioritize child processes")]
#[command(after_help = "Examples:\n  \
    proc-lifecycle spawn --n 4\n  \
    proc-lifecycle exec --n 3 --cmd ls --use-exec\n  \
    proc-lifecycle lifecycle --mode zombie\n  \
    proc-lifecycle inspect --pid 1234\n  \
    proc-lifecycle priority --n 4")]
#[command(arg_required_else_help = true)]
pub struct Options {
    #[command(subcommand)]
    pub command: Command,

    /// Base directory for result records (overrides PROCLAB_RESULT_DIR)
    #[arg(long, global = true)]
    pub result_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create N children that greet and exit, then reap them
    #[command(after_help = "Examples:\n  \
        proc-lifecycle spawn\n  \
        proc-lifecycle spawn --n 8")]
    Spawn(SpawnArgs),

    /// Create N children that each run a command
    #[command(after_help = "Examples:\n  \
        proc-lifecycle exec --cmd 'ls -l'\n  \
        proc-lifecycle exec --n 2 --cmd 'echo hi' --use-exec")]
    Exec(ExecArgs),

    /// Leave a child as a zombie or an orphan
    #[command(after_help = "Examples:\n  \
        proc-lifecycle lifecycle --mode zombie\n  \
        proc-lifecycle lifecycle --mode zombie --delay-secs 5\n  \
        proc-lifecycle lifecycle --mode orphan")]
    Lifecycle(LifecycleArgs),

    /// Show status fields, executable and descriptors of a process
    #[command(after_help = "Examples:\n  \
        proc-lifecycle inspect --pid 1\n  \
        proc-lifecycle inspect --pid $$")]
    Inspect(InspectArgs),

    /// Run CPU-bound children at increasing niceness and rank them
    #[command(after_help = "Examples:\n  \
        proc-lifecycle priority --n 4\n  \
        proc-lifecycle priority --n 3 --step 5 --iterations 2000000")]
    Priority(PriorityArgs),
}

/// Arguments for the spawn task
#[derive(Args, Debug)]
pub struct SpawnArgs {
    /// Number of children
    #[arg(long, default_value_t = DEFAULT_CHILD_COUNT)]
    pub n: usize,
}

/// Arguments for the exec task
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Number of children
    #[arg(long, default_value_t = DEFAULT_CHILD_COUNT)]
    pub n: usize,

    /// Command line run by every child
    #[arg(long, default_value = DEFAULT_COMMAND)]
    pub cmd: String,

    /// Replace the child image with execvp instead of running the command through a shell
    #[arg(long)]
    pub use_exec: bool,
}

/// Arguments for the lifecycle task
#[derive(Args, Debug)]
pub struct LifecycleArgs {
    /// zombie | orphan
    #[arg(long)]
    pub mode: Option<String>,

    /// Zombie mode: seconds before the child is reaped (overrides PROCLAB_ZOMBIE_DELAY_SECS)
    #[arg(long)]
    pub delay_secs: Option<u64>,

    /// Orphan mode: number of one-tick progress lines (overrides PROCLAB_ORPHAN_TICKS)
    #[arg(long)]
    pub ticks: Option<u32>,
}

/// Arguments for the inspect task
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Process to inspect
    #[arg(long)]
    pub pid: Option<u32>,
}

/// Arguments for the priority task
#[derive(Args, Debug)]
pub struct PriorityArgs {
    /// Number of children
    #[arg(long, default_value_t = DEFAULT_CHILD_COUNT)]
    pub n: usize,

    /// Niceness added per sibling index (overrides PROCLAB_PRIORITY_STEP)
    #[arg(long)]
    pub step: Option<u32>,

    /// Workload iterations per child (overrides PROCLAB_WORKLOAD_ITERATIONS)
    #[arg(long)]
    pub iterations: Option<u64>,
}
