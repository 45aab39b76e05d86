//! Main build orchestration and coordination.
//!
//! This module provides the [`BundleBuildOrchestrator`] that drives a build
//! through its stages and owns the reconciled manifest between builds.

use super::{
    BuildReport, BuildStage, BuildState, BuildWarning, lock::BuildLock, post_process::post_process,
};
use crate::bundler::{
    Error, Result,
    manifest::{BundleManifest, ManifestReconciler},
    packager::{PackageRequest, Packager},
    preview::{PreviewCache, PreviewCapturer, PreviewRenderer},
    settings::{BundleSettings, CONTENTS_FILE_NAME, CONTROL_FILE_NAME},
    staging::{self, ItemStager},
    utils::fs,
};
use std::{collections::HashMap, path::PathBuf};
use tokio_util::sync::CancellationToken;

/// Main build orchestrator.
///
/// Runs one build at a time through
/// `ClearingOutput -> Staging -> Packaging -> PostProcessing -> Reconciling`,
/// delegating packaging to a [`Packager`] and previews to a
/// [`PreviewRenderer`].
///
/// # Failure semantics
///
/// - Structural failures (export folder not writable, source folder not
///   listable, a source item that cannot be staged, packager failure) abort
///   the build with [`Error::Stage`] and leave the manifest untouched, both
///   in memory and in the control files on disk.
/// - Preview and per-bundle post-processing problems are reported as
///   [`BuildWarning`]s on the [`BuildReport`].
/// - The cancellation token is checked before each stage. A cancelled build
///   returns [`Error::Cancelled`] naming the stage that did not start.
///
/// Staging directories are removed at the end of every build, whatever its
/// outcome.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_assets::bundler::{
///     ArchivePackager, BundleBuildOrchestrator, BundleSettings, PlaceholderRenderer,
/// };
///
/// # async fn example(settings: BundleSettings) -> kodegen_bundler_assets::bundler::Result<()> {
/// let mut orchestrator =
///     BundleBuildOrchestrator::new(settings, ArchivePackager::new(), PlaceholderRenderer::default());
///
/// let report = orchestrator.build().await?;
/// for warning in &report.warnings {
///     eprintln!("warning: {warning}");
/// }
///
/// for record in orchestrator.manifest().records() {
///     println!("{} v{}", record.name, record.version);
/// }
/// # Ok(())
/// # }
/// ```
pub struct BundleBuildOrchestrator<P, R> {
    settings: BundleSettings,
    packager: P,
    capturer: PreviewCapturer<R>,
    state: BuildState,
    manifest: BundleManifest,
    cancel: CancellationToken,
}

impl<P, R> std::fmt::Debug for BundleBuildOrchestrator<P, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleBuildOrchestrator")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("manifest", &self.manifest)
            .finish_non_exhaustive()
    }
}

impl<P: Packager, R: PreviewRenderer> BundleBuildOrchestrator<P, R> {
    /// Creates an idle orchestrator with an empty manifest.
    ///
    /// Call [`refresh`](Self::refresh) to load the manifest of an earlier build.
    pub fn new(settings: BundleSettings, packager: P, renderer: R) -> Self {
        Self {
            settings,
            packager,
            capturer: PreviewCapturer::new(renderer),
            state: BuildState::Idle,
            manifest: BundleManifest::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `token` to cancel builds.
    ///
    /// Once cancelled, every later build is cancelled too until another token
    /// is installed.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels builds of this orchestrator.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Settings the next build runs with.
    pub fn settings(&self) -> &BundleSettings {
        &self.settings
    }

    /// Replaces the settings used by the next build.
    pub fn set_settings(&mut self, settings: BundleSettings) {
        self.settings = settings;
    }

    /// Current state.
    pub fn state(&self) -> &BuildState {
        &self.state
    }

    /// Manifest as of the last successful build or reload.
    pub fn manifest(&self) -> &BundleManifest {
        &self.manifest
    }

    /// Previews captured by the last build.
    pub fn previews(&self) -> &PreviewCache {
        self.capturer.cache()
    }

    /// Reloads the manifest from disk without building anything.
    pub async fn refresh(&mut self) -> Result<&BundleManifest> {
        self.manifest = ManifestReconciler::reload(&self.settings).await?;
        Ok(&self.manifest)
    }

    /// Restores default settings, resolved against the working directory, and
    /// reloads the manifest.
    pub async fn reset(&mut self) -> Result<&BundleManifest> {
        let base = std::env::current_dir()?;
        self.settings = BundleSettings::default().resolve(&base)?;
        self.state = BuildState::Idle;
        self.capturer.clear();
        log::info!(
            "Reset settings to defaults (assets {}, export {})",
            self.settings.asset_folder.display(),
            self.settings.export_folder.display()
        );
        self.refresh().await
    }

    /// Runs one full build.
    ///
    /// # Errors
    ///
    /// - [`Error::BuildInProgress`] when another build holds the lock
    /// - [`Error::Cancelled`] when the token was cancelled before a stage
    /// - [`Error::Stage`] for structural failures
    pub async fn build(&mut self) -> Result<BuildReport> {
        self.settings.validate()?;
        let _lock = BuildLock::acquire(&self.settings.asset_folder)?;

        let id = uuid::Uuid::new_v4();
        let started_at = chrono::Utc::now();
        log::info!(
            "Starting build {} ({} -> {})",
            id,
            self.settings.asset_folder.display(),
            self.settings.export_folder.display()
        );

        let result = self.run_stages(id, started_at).await;

        match staging::sweep_staging(&self.settings.asset_folder).await {
            Ok(removed) => log::debug!("Removed {} staging director(ies)", removed.len()),
            Err(e) => log::warn!("Failed to clean up staging directories: {}", e),
        }

        match result {
            Ok(report) => {
                self.state = BuildState::Done;
                log::info!(
                    "Build {} finished: {} bundle(s), {} warning(s) in {}ms",
                    id,
                    report.bundles.len(),
                    report.warnings.len(),
                    report.duration().num_milliseconds()
                );
                Ok(report)
            }
            Err(e) => {
                log::error!("Build {} failed: {}", id, e);
                self.state = BuildState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    async fn run_stages(
        &mut self,
        id: uuid::Uuid,
        started_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<BuildReport> {
        let mut warnings = Vec::new();

        // Read before the export folder is cleared: the packager continues the
        // old versions and the report diffs against them.
        let previous = ManifestReconciler::reload(&self.settings)
            .await
            .map_err(|e| e.at_stage(BuildStage::ClearingOutput))?;

        self.enter(BuildStage::ClearingOutput)?;
        // Bundle output only: the control files carry the version history and
        // must survive a build that fails or is cancelled later on.
        fs::clear_dir_except(
            &self.settings.export_folder,
            &[CONTROL_FILE_NAME, CONTENTS_FILE_NAME],
        )
        .await
            .map_err(|e| e.at_stage(BuildStage::ClearingOutput))?;

        self.enter(BuildStage::Staging)?;
        self.stage_items(&mut warnings)
            .await
            .map_err(|e| e.at_stage(BuildStage::Staging))?;

        self.enter(BuildStage::Packaging)?;
        let request = PackageRequest::from_settings(&self.settings, previous.versions.clone());
        log::info!("Packaging with {}", self.packager.name());
        self.packager
            .build_bundles(&request)
            .await
            .map_err(|e| e.at_stage(BuildStage::Packaging))?;

        self.enter(BuildStage::PostProcessing)?;
        let outcome = post_process(&self.settings, self.capturer.cache())
            .await
            .map_err(|e| e.at_stage(BuildStage::PostProcessing))?;
        warnings.extend(outcome.warnings);

        self.enter(BuildStage::Reconciling)?;
        let manifest = ManifestReconciler::reload(&self.settings)
            .await
            .map_err(|e| e.at_stage(BuildStage::Reconciling))?;
        warnings.extend(
            manifest
                .stale
                .iter()
                .map(|name| BuildWarning::StaleManifestEntry { name: name.clone() }),
        );
        let diff = manifest.diff(&previous);
        self.manifest = manifest;

        Ok(BuildReport {
            id,
            started_at,
            finished_at: chrono::Utc::now(),
            bundles: outcome.bundles,
            warnings,
            diff,
        })
    }

    /// Checks for cancellation, then moves into `stage`.
    fn enter(&mut self, stage: BuildStage) -> Result<()> {
        if self.cancel.is_cancelled() {
            log::warn!("Build cancelled before {}", stage);
            return Err(Error::Cancelled(stage));
        }
        log::info!("Build stage: {}", stage);
        self.state = BuildState::Running(stage);
        Ok(())
    }

    /// Stages every discovered source item and captures its preview.
    ///
    /// Items are handled one at a time in discovery order. When two items map
    /// to the same bundle name the later one wins.
    async fn stage_items(&mut self, warnings: &mut Vec<BuildWarning>) -> Result<()> {
        let leftovers = staging::sweep_staging(&self.settings.asset_folder).await?;
        if !leftovers.is_empty() {
            log::info!(
                "Removed {} leftover staging director(ies)",
                leftovers.len()
            );
        }
        self.capturer.clear();

        let items = staging::discover_sources(&self.settings).await?;
        let stager = ItemStager::new(&self.settings);
        let mut staged_from: HashMap<String, PathBuf> = HashMap::new();

        for item in &items {
            let staged = stager.stage(item).await?;

            if let Some(discarded) = staged_from.insert(staged.name.clone(), item.path.clone()) {
                log::warn!(
                    "{} and {} both map to bundle {}; keeping {}",
                    discarded.display(),
                    item.path.display(),
                    staged.name,
                    item.path.display()
                );
                self.capturer.forget(&staged.name);
                warnings.push(BuildWarning::StagingCollision {
                    name: staged.name.clone(),
                    kept: item.path.clone(),
                    discarded,
                });
            }

            if let Err(e) = self.capturer.capture(&staged).await {
                log::warn!("{}", e);
                warnings.push(BuildWarning::PreviewFailed {
                    name: staged.name.clone(),
                    reason: e.to_string(),
                });
            }
        }

        log::info!("Staged {} source item(s)", items.len());
        Ok(())
    }
}
