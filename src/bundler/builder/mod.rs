//! Build orchestration and coordination.
//!
//! This module provides the [`BundleBuildOrchestrator`] that drives one build
//! through its stages and the types describing the outcome.
//!
//! # Overview
//!
//! A build moves through
//!
//! ```text
//! Idle -> ClearingOutput -> Staging -> Packaging -> PostProcessing -> Reconciling -> Done
//! ```
//!
//! and ends in [`BuildState::Failed`] when any stage fails structurally.
//! Recoverable problems are collected as [`BuildWarning`]s on the
//! [`BuildReport`] instead.
//!
//! # Example
//!
//! ```no_run
//! use kodegen_bundler_assets::bundler::{
//!     ArchivePackager, BundleBuildOrchestrator, PlaceholderRenderer, SettingsBuilder,
//! };
//!
//! # async fn example() -> kodegen_bundler_assets::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .asset_folder("/work/Assets/AssetBundles")
//!     .export_folder("/work/AssetBundles")
//!     .build()?;
//!
//! let mut orchestrator =
//!     BundleBuildOrchestrator::new(settings, ArchivePackager::new(), PlaceholderRenderer::default());
//! let report = orchestrator.build().await?;
//!
//! for bundle in &report.bundles {
//!     println!("Built {} ({} bytes, sha256 {})", bundle.name, bundle.size, bundle.checksum);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA-256 of produced bundle files
//! - [`lock`] - exclusive build lock on the asset folder
//! - [`orchestrator`] - the [`BundleBuildOrchestrator`] state machine
//! - [`post_process`] - per-bundle output directories
//! - [`report`] - build reports and warnings

mod checksum;
mod lock;
mod orchestrator;
mod post_process;
mod report;

pub use checksum::calculate_sha256;
pub use lock::{BuildLock, LOCK_FILE_NAME};
pub use orchestrator::BundleBuildOrchestrator;
pub use post_process::{PostProcessOutcome, post_process};
pub use report::{BuildReport, BuildWarning, ProducedBundle};

use std::fmt;

/// A stage of a build, in execution order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize)]
pub enum BuildStage {
    /// Emptying the export folder.
    ClearingOutput,
    /// Discovering, staging and previewing source items.
    Staging,
    /// Running the packager over the staged tree.
    Packaging,
    /// Moving produced bundles into their output directories.
    PostProcessing,
    /// Re-reading the manifests.
    Reconciling,
}

impl BuildStage {
    /// All stages in execution order.
    pub const ALL: [BuildStage; 5] = [
        BuildStage::ClearingOutput,
        BuildStage::Staging,
        BuildStage::Packaging,
        BuildStage::PostProcessing,
        BuildStage::Reconciling,
    ];
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildStage::ClearingOutput => "clearing output",
            BuildStage::Staging => "staging",
            BuildStage::Packaging => "packaging",
            BuildStage::PostProcessing => "post-processing",
            BuildStage::Reconciling => "reconciling",
        };
        f.write_str(name)
    }
}

/// Where an orchestrator is in its build cycle.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum BuildState {
    /// No build has run yet, or the orchestrator was reset.
    #[default]
    Idle,
    /// Currently running the given stage.
    Running(BuildStage),
    /// The last build finished.
    Done,
    /// The last build failed; absorbing until the next build or reset.
    Failed(String),
}

impl BuildState {
    /// Whether a build is in flight.
    pub fn is_running(&self) -> bool {
        matches!(self, BuildState::Running(_))
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildState::Idle => f.write_str("idle"),
            BuildState::Running(stage) => write!(f, "{stage}"),
            BuildState::Done => f.write_str("done"),
            BuildState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
