//! Command execution functions.
//!
//! - [`build`] - run a full build and persist the settings
//! - [`list`] - print the reconciled manifest
//! - [`reset`] - restore default settings and reload the manifests

pub mod build;
pub mod list;
pub mod reset;
