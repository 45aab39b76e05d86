//! Command line interface for the asset bundle pipeline.
//!
//! This module provides the CLI for the pipeline, with argument parsing,
//! command execution, and user feedback.

mod args;
pub mod commands;
mod output;

pub use args::{Args, BuildArgs, Command, ListArgs, RuntimeConfig};
pub use output::OutputManager;

use crate::{
    bundler::SettingsStore,
    error::{CliError, Result},
};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let config = RuntimeConfig::from(&args);
    let store = args
        .settings
        .clone()
        .map(SettingsStore::new)
        .unwrap_or_else(SettingsStore::default_location);
    config.verbose_println(&format!("Settings file: {}", store.path().display()))?;

    match &args.command {
        Command::Build(build) => commands::build::execute(build, &store, &config).await,
        Command::Reset => commands::reset::execute(&store, &config).await,
        Command::List(list) => commands::list::execute(list, &store, &config).await,
    }
}

/// Create runtime configuration from arguments
pub fn create_runtime_config(args: &Args) -> RuntimeConfig {
    RuntimeConfig::from(args)
}
