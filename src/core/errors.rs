/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use miette::Diagnostic;
use thiserror::Error;

// Re-export subsystem errors
pub use crate::experiment::types::ChannelError;
pub use crate::introspect::IntrospectError;
pub use crate::process::types::ProcessError;

/// Configuration errors, raised before any process is created
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Unknown lifecycle mode: {0}")]
    #[diagnostic(
        code(config::invalid_mode),
        help("Use 'zombie' or 'orphan'.")
    )]
    InvalidMode(String),

    #[error("Task '{task}' requires --{parameter}")]
    #[diagnostic(
        code(config::missing_parameter),
        help("Pass the parameter on the command line. See --help for the task.")
    )]
    MissingParameter {
        task: &'static str,
        parameter: &'static str,
    },

    #[error("Invalid value for {parameter}: {reason}")]
    #[diagnostic(code(config::invalid_parameter))]
    InvalidParameter { parameter: String, reason: String },

    #[error("Environment override {variable}={value} is not valid")]
    #[diagnostic(
        code(config::invalid_override),
        help("Unset the variable or give it a non-negative integer value.")
    )]
    InvalidOverride { variable: String, value: String },
}

/// Unified lab error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum LabError {
    #[error("Process error: {0}")]
    #[diagnostic(transparent)]
    Process(#[from] ProcessError),

    #[error("Result channel error: {0}")]
    #[diagnostic(transparent)]
    Channel(#[from] ChannelError),

    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Introspection error: {0}")]
    #[diagnostic(transparent)]
    Introspect(#[from] IntrospectError),
}

/// Result type for lab operations
pub type LabResult<T> = std::result::Result<T, LabError>;
