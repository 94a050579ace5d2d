//! # growgold-cli
//!
//! Command-line front end for the Grow Gold sub-admin directory.
//!
//! Handlers are plain async functions returning [`CliResult<Output>`]; the
//! binary prints the output and maps errors to exit codes.
//!
//! ```text
//! growgold modules
//! growgold normalize '{"faq": {"view": true}}'
//! growgold directory --json
//! growgold create --name Ada --email ada@x.com --password pw123 --grant faq:view
//! ```

pub mod commands;
pub mod tracing_support;

pub use commands::{CreateArgs, Grant};
pub use tracing_support::{
    init_subscriber, init_subscriber_with_config, TracingConfig, TracingFormat,
};

use growgold_access::{PresetError, SubmitError};
use thiserror::Error;

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Error Types
// ============================================================================

/// Top-level error type for CLI operations.
///
/// Distinguishes between user-fixable errors (exit code 1) and system failures (exit code 101).
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    System(#[from] SystemError),
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::User(_) => 1,
            CliError::System(_) => 101,
        }
    }

    pub fn user(message: impl Into<String>) -> Self {
        CliError::User(UserError::Generic(message.into()))
    }

    pub fn system(message: impl Into<String>) -> Self {
        CliError::System(SystemError::Internal(message.into()))
    }
}

/// User-fixable errors (exit code 1).
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Error: {0}")]
    Generic(String),

    #[error("Error: Invalid argument '{arg}'\n\n{reason}")]
    InvalidArgument { arg: String, reason: String },

    #[error("Error: Validation failed\n\n{}", .details.join("\n"))]
    ValidationFailed { details: Vec<String> },
}

/// System-level failures (exit code 101).
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Internal Error: {0}\n\nThis is likely a bug.")]
    Internal(String),

    #[error("Internal Error: Failed to encode output\n\n{0}")]
    Encode(#[from] serde_json::Error),
}

impl From<PresetError> for CliError {
    fn from(e: PresetError) -> Self {
        match e {
            PresetError::Catalog(err) => CliError::User(UserError::InvalidArgument {
                arg: "--catalog".to_string(),
                reason: err.to_string(),
            }),
            other => CliError::system(other.to_string()),
        }
    }
}

impl From<SubmitError> for CliError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Invalid(errors) => CliError::User(UserError::ValidationFailed {
                details: errors
                    .iter()
                    .map(|(field, message)| format!("  {}: {}", field, message))
                    .collect(),
            }),
            other => CliError::user(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::System(SystemError::Encode(e))
    }
}

// ============================================================================
// Output Types
// ============================================================================

/// Output type for handler results.
#[derive(Debug, PartialEq, Eq)]
pub enum Output {
    Silent,

    /// Text output (printed to stdout).
    Text(String),

    /// JSON output (for machine-readable responses).
    Json(String),
}

impl Output {
    pub fn is_empty(&self) -> bool {
        matches!(self, Output::Silent)
    }
}

impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Output::Silent => Ok(()),
            Output::Text(s) | Output::Json(s) => write!(f, "{}", s),
        }
    }
}
