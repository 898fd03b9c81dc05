/*!
 * Command Line Interface
 * Argument parsing and task dispatch
 */

pub mod options;
pub mod tasks;

pub use options::{Command, Options};

use crate::core::config::LabConfig;
use crate::core::errors::LabResult;

/// Run the selected task
///
/// `config` carries defaults and environment overrides; flags in `options`
/// take precedence over both.
pub fn run(options: Options, config: LabConfig) -> LabResult<()> {
    let config = match options.result_dir {
        Some(dir) => config.with_result_dir(dir),
        None => config,
    };

    match &options.command {
        Command::Spawn(args) => tasks::spawn(args),
        Command::Exec(args) => tasks::exec(args),
        Command::Lifecycle(args) => tasks::lifecycle(args, &config),
        Command::Inspect(args) => tasks::inspect(args),
        Command::Priority(args) => tasks::priority(args, &config),
    }
}
