//! Asset bundle pipeline library.
//!
//! This library stages source items, drives a bundle packager, relocates the
//! produced bundles into per-bundle output directories and maintains the
//! version and content manifests:
//! - [`bundler`] - the pipeline itself, usable without the CLI
//! - [`cli`] - the `build`, `reset` and `list` commands
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
