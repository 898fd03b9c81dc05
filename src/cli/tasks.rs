/*!
 * Lab Tasks
 *
 * One function per subcommand. Parameters are validated before the first
 * child is created; once children exist, failures are reported and the
 * children are still reaped.
 */

use super::options::{ExecArgs, InspectArgs, LifecycleArgs, PriorityArgs, SpawnArgs};
use crate::core::config::LabConfig;
use crate::core::errors::{ConfigError, LabError, LabResult};
use crate::core::types::current_pid;
use crate::experiment::PriorityExperiment;
use crate::introspect::{self, IntrospectError, ProcEntry};
use crate::monitoring::TaskSpan;
use crate::process::{
    ChildRole, CommandMode, CommandSpec, ExitRecord, LifecycleDemonstrator, LifecycleMode,
    ProcessHandle, Reaper, SpawnBatch, Spawner,
};
use std::time::Duration;
use tracing::{info, warn};

fn print_reaped(records: &[ExitRecord]) {
    let me = current_pid();
    for record in records {
        println!("[PARENT {}] Reaped child {} {}", me, record.pid, record);
    }
}

/// Reap a batch and surface a partial spawn failure after everyone is collected
fn reap_batch(batch: SpawnBatch, span: &TaskSpan) -> LabResult<Vec<ExitRecord>> {
    span.record_children(batch.len());
    let records = Reaper::reap_all(batch.handles());
    print_reaped(&records);

    match batch.failure() {
        Some(e) => Err(LabError::Process(e.clone())),
        None => Ok(records),
    }
}

pub fn spawn(args: &SpawnArgs) -> LabResult<()> {
    let span = TaskSpan::new("spawn");
    let _guard = span.enter();

    println!("[PARENT {}] Starting: creating {} children", current_pid(), args.n);
    let batch = Spawner::spawn(args.n, &ChildRole::Greeting);
    reap_batch(batch, &span)?;
    println!("[PARENT {}] All children reaped. Done.", current_pid());
    Ok(())
}

pub fn exec(args: &ExecArgs) -> LabResult<()> {
    let mode = if args.use_exec {
        CommandMode::Replace
    } else {
        CommandMode::SubInvoke
    };
    let spec = CommandSpec::new(args.cmd.clone(), mode);
    spec.validate()?;

    let span = TaskSpan::new("exec");
    let _guard = span.enter();

    println!(
        "[PARENT {}] Creating {} children to run: {} (use_exec={})",
        current_pid(),
        args.n,
        args.cmd,
        args.use_exec
    );
    let batch = Spawner::spawn(args.n, &ChildRole::Command(spec));
    let records = reap_batch(batch, &span)?;

    let failed = records.iter().filter(|r| !r.is_success()).count();
    if failed > 0 {
        warn!(failed, "some commands did not succeed");
    }
    println!("[PARENT {}] Exec task complete.", current_pid());
    Ok(())
}

pub fn lifecycle(args: &LifecycleArgs, config: &LabConfig) -> LabResult<()> {
    let mode: LifecycleMode = args
        .mode
        .as_deref()
        .ok_or(ConfigError::MissingParameter {
            task: "lifecycle",
            parameter: "mode",
        })?
        .parse()?;

    let mut config = config.clone();
    if let Some(secs) = args.delay_secs {
        config.zombie_delay = Duration::from_secs(secs);
    }
    if let Some(ticks) = args.ticks {
        config.orphan_ticks = ticks;
    }

    let span = TaskSpan::new("lifecycle");
    let _guard = span.enter();
    span.record_children(1);

    println!(
        "[PID {}] Running lifecycle mode={}. Note: use another terminal to `ps -el | grep defunct`",
        current_pid(),
        mode
    );

    let demo = LifecycleDemonstrator::from_config(&config);
    match mode {
        LifecycleMode::Zombie => {
            let delay = demo.reap_policy().delay();
            let outcome = demo.run_zombie(|handle| show_zombie(handle, delay))?;
            println!(
                "[PARENT {}] Reaped {} {} after {:.1}s",
                current_pid(),
                outcome.handle.pid,
                outcome.record,
                outcome.unreaped_for.as_secs_f64()
            );
        }
        LifecycleMode::Orphan => {
            let handle = demo.run_orphan()?;
            println!(
                "[PARENT {}] Exiting immediately; child {} runs on.",
                current_pid(),
                handle.pid
            );
        }
    }
    Ok(())
}

fn show_zombie(handle: &ProcessHandle, delay: Duration) {
    println!(
        "[PARENT {}] child {} created and will be left to become zombie. Sleeping {}s (do NOT wait).",
        current_pid(),
        handle.pid,
        delay.as_secs()
    );
    match ProcEntry::open(handle.pid).and_then(|entry| entry.state()) {
        Ok(state) => println!("[PARENT {}] /proc/{} state: {}", current_pid(), handle.pid, state),
        Err(e) => warn!(child = handle.pid, error = %e, "could not read child state"),
    }
}

pub fn inspect(args: &InspectArgs) -> LabResult<()> {
    let pid = args.pid.ok_or(ConfigError::MissingParameter {
        task: "inspect",
        parameter: "pid",
    })?;
    if pid == 0 {
        return Err(ConfigError::InvalidParameter {
            parameter: "pid".to_string(),
            reason: "must be a positive process id".to_string(),
        }
        .into());
    }

    let span = TaskSpan::new("inspect");
    let _guard = span.enter();

    match introspect::inspect(pid) {
        Ok(report) => print!("{}", report),
        Err(e @ IntrospectError::NotFound(_)) => {
            println!("{}. Is the PID valid and are you on Linux?", e);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub fn priority(args: &PriorityArgs, config: &LabConfig) -> LabResult<()> {
    let step = args.step.unwrap_or(config.priority_step);
    let iterations = args.iterations.unwrap_or(config.workload_iterations);

    let span = TaskSpan::new("priority");
    let _guard = span.enter();
    span.record_children(args.n);

    println!(
        "[PARENT {}] Spawning {} CPU-bound children with varied nice()",
        current_pid(),
        args.n
    );

    let experiment = PriorityExperiment::new(iterations, config.result_dir.clone());
    let report = experiment.run(args.n, step)?;
    print_reaped(&report.exits);

    println!();
    println!("Results (collected from result records):");
    for pid in &report.missing {
        println!("Missing or malformed result for {}", pid);
    }
    println!("{}", report);

    info!(order = ?report.completion_order(), "completion order by nice offset");
    Ok(())
}
