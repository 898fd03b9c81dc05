/*!
 * Spawner
 * Creates a batch of children that all run the same role
 */

use super::exec::CommandSpec;
use super::fork::{fork_child, ChildContext, Fork};
use super::lifecycle::LifecycleChild;
use super::types::{ProcessError, ProcessHandle};
use crate::experiment::priority::PriorityWorker;
use tracing::{error, info, instrument};

/// What a spawned child does before it terminates
#[derive(Debug, Clone)]
pub enum ChildRole {
    /// Print identity and a greeting, exit 0
    Greeting,
    /// Run an external command, replacing the image or as a sub-invocation
    Command(CommandSpec),
    /// Zombie or orphan demonstration child
    Lifecycle(LifecycleChild),
    /// Priority experiment worker
    PriorityWorker(PriorityWorker),
}

impl ChildRole {
    /// Role logic; the returned value becomes the child's exit status
    fn run(&self, ctx: &ChildContext) -> i32 {
        match self {
            ChildRole::Greeting => {
                println!(
                    "[CHILD {}] parent={} message='Hello from child {}'",
                    ctx.pid(),
                    ctx.current_parent(),
                    ctx.index()
                );
                0
            }
            ChildRole::Command(spec) => spec.run(ctx),
            ChildRole::Lifecycle(child) => child.run(ctx),
            ChildRole::PriorityWorker(worker) => worker.run(ctx),
        }
    }
}

/// Handles of a spawn batch
///
/// When duplication fails part way, the children created before the failure
/// are still listed so the caller can reap them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "spawned children must be reaped"]
pub struct SpawnBatch {
    handles: Vec<ProcessHandle>,
    failure: Option<ProcessError>,
}

impl SpawnBatch {
    #[inline]
    pub fn handles(&self) -> &[ProcessHandle] {
        &self.handles
    }

    #[inline]
    pub fn failure(&self) -> Option<&ProcessError> {
        self.failure.as_ref()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Child process factory
pub struct Spawner;

impl Spawner {
    /// Duplicate the calling process `n` times, each child running `role`
    ///
    /// Only the parent returns from this call.
    #[instrument(skip(role), fields(role = role_name(role)))]
    pub fn spawn(n: usize, role: &ChildRole) -> SpawnBatch {
        let mut handles = Vec::with_capacity(n);

        for index in 0..n {
            match fork_child(index) {
                Ok(Fork::Child(ctx)) => ctx.run(|ctx| role.run(ctx)),
                Ok(Fork::Parent(handle)) => handles.push(handle),
                Err(e) => {
                    error!(error = %e, created = handles.len(), "spawn aborted");
                    return SpawnBatch {
                        handles,
                        failure: Some(e),
                    };
                }
            }
        }

        info!(created = handles.len(), "spawned children");
        SpawnBatch {
            handles,
            failure: None,
        }
    }
}

fn role_name(role: &ChildRole) -> &'static str {
    match role {
        ChildRole::Greeting => "greeting",
        ChildRole::Command(_) => "command",
        ChildRole::Lifecycle(_) => "lifecycle",
        ChildRole::PriorityWorker(_) => "priority_worker",
    }
}
