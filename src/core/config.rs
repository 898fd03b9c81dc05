/*!
 * Lab Configuration
 *
 * Tunables for the lifecycle demonstrations and the priority experiment.
 * Defaults come from `core::limits`; `PROCLAB_*` environment variables
 * override them and command line flags override the environment.
 */

use super::errors::ConfigError;
use super::limits::*;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable names
pub mod env {
    pub const RESULT_DIR: &str = "PROCLAB_RESULT_DIR";
    pub const ZOMBIE_DELAY_SECS: &str = "PROCLAB_ZOMBIE_DELAY_SECS";
    pub const ORPHAN_TICKS: &str = "PROCLAB_ORPHAN_TICKS";
    pub const ORPHAN_TICK_MS: &str = "PROCLAB_ORPHAN_TICK_MS";
    pub const WORKLOAD_ITERATIONS: &str = "PROCLAB_WORKLOAD_ITERATIONS";
    pub const PRIORITY_STEP: &str = "PROCLAB_PRIORITY_STEP";
}

/// Lab configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabConfig {
    /// Base directory for result channels (a per-run subdirectory is created inside)
    pub result_dir: PathBuf,

    /// Zombie mode: how long an exited child stays unreaped (default: 15s)
    pub zombie_delay: Duration,

    /// Orphan mode: number of progress ticks (default: 10)
    pub orphan_ticks: u32,

    /// Orphan mode: pacing between ticks (default: 1s)
    pub orphan_tick: Duration,

    /// Priority experiment: workload iterations per child (default: 500000)
    pub workload_iterations: u64,

    /// Priority experiment: niceness step between siblings (default: 5)
    pub priority_step: u32,
}

impl LabConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self {
            result_dir: std::env::temp_dir().join(RESULT_DIR_NAME),
            zombie_delay: DEFAULT_ZOMBIE_DELAY,
            orphan_ticks: DEFAULT_ORPHAN_TICKS,
            orphan_tick: DEFAULT_ORPHAN_TICK,
            workload_iterations: DEFAULT_WORKLOAD_ITERATIONS,
            priority_step: DEFAULT_PRIORITY_STEP,
        }
    }

    /// Short delays and a small workload for tests
    pub fn fast() -> Self {
        Self {
            zombie_delay: Duration::from_millis(200),
            orphan_ticks: 3,
            orphan_tick: Duration::from_millis(100),
            workload_iterations: 20_000,
            ..Self::new()
        }
    }

    /// Defaults with `PROCLAB_*` overrides from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides resolved through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(dir) = lookup(env::RESULT_DIR) {
            config.result_dir = PathBuf::from(dir);
        }
        if let Some(secs) = parse_override::<u64, _>(&lookup, env::ZOMBIE_DELAY_SECS)? {
            config.zombie_delay = Duration::from_secs(secs);
        }
        if let Some(ticks) = parse_override(&lookup, env::ORPHAN_TICKS)? {
            config.orphan_ticks = ticks;
        }
        if let Some(ms) = parse_override::<u64, _>(&lookup, env::ORPHAN_TICK_MS)? {
            config.orphan_tick = Duration::from_millis(ms);
        }
        if let Some(iterations) = parse_override(&lookup, env::WORKLOAD_ITERATIONS)? {
            config.workload_iterations = iterations;
        }
        if let Some(step) = parse_override(&lookup, env::PRIORITY_STEP)? {
            config.priority_step = step;
        }

        Ok(config)
    }

    #[inline]
    #[must_use]
    pub fn with_result_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.result_dir = dir.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_zombie_delay(mut self, delay: Duration) -> Self {
        self.zombie_delay = delay;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_orphan_ticks(mut self, ticks: u32, tick: Duration) -> Self {
        self.orphan_ticks = ticks;
        self.orphan_tick = tick;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_workload_iterations(mut self, iterations: u64) -> Self {
        self.workload_iterations = iterations;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_priority_step(mut self, step: u32) -> Self {
        self.priority_step = step;
        self
    }
}

impl Default for LabConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_override<T, F>(lookup: &F, variable: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(variable) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidOverride {
                variable: variable.to_string(),
                value,
            }),
    }
}
