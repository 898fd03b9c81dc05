/*!
 * Process Lifecycle Lab - Main Entry Point
 *
 * Runs one demonstration task per invocation:
 * - spawn: create and reap greeting children
 * - exec: children that replace themselves or run a shell command
 * - lifecycle: zombie and orphan induction
 * - inspect: procfs view of any process
 * - priority: niceness ranking experiment
 */

use clap::Parser;
use proc_lifecycle::cli::{self, Options};
use proc_lifecycle::{init_tracing, LabConfig};
use tracing::debug;

fn main() -> miette::Result<()> {
    init_tracing();

    let options = Options::parse();
    let config = LabConfig::from_env()?;
    debug!(?config, "configuration loaded");

    cli::run(options, config)?;
    Ok(())
}
