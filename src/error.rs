//! Error types for the command line front end.
//!
//! Library failures arrive as [`crate::bundler::Error`] and are wrapped in
//! [`BundlerError::Bundler`]; everything the CLI itself can get wrong is a
//! [`CliError`].

use crate::bundler::{BuildStage, Error as PipelineError};
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all CLI operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Pipeline errors
    #[error("{0}")]
    Bundler(#[from] PipelineError),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl BundlerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            BundlerError::Bundler(PipelineError::BuildInProgress(path)) => vec![format!(
                "Wait for the running build to finish, or remove a stale lock in {}",
                path.display()
            )],
            BundlerError::Bundler(PipelineError::InvalidSettings(_))
            | BundlerError::Bundler(PipelineError::SettingsParse(_)) => vec![
                "Run `reset` to restore default settings".to_string(),
            ],
            BundlerError::Bundler(e) => match e.stage() {
                Some(BuildStage::ClearingOutput) => {
                    vec!["Check that the export folder is writable".to_string()]
                }
                Some(BuildStage::Staging) => vec![
                    "Check that <asset folder>/source exists and its items are readable"
                        .to_string(),
                ],
                Some(BuildStage::Packaging) => vec![
                    "Check the packager output above; the manifest was left unchanged"
                        .to_string(),
                ],
                _ => Vec::new(),
            },
            BundlerError::Cli(_) => vec!["Run with --help for usage".to_string()],
            _ => Vec::new(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            BundlerError::Bundler(PipelineError::Cancelled(_)) => 130,
            BundlerError::Cli(CliError::InvalidArguments { .. }) => 2,
            _ => 1,
        }
    }
}
