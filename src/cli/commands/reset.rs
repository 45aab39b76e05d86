//! `reset` command.

use super::list::print_manifest;
use crate::{
    bundler::{
        ArchivePackager, BundleBuildOrchestrator, BundleSettings, PlaceholderRenderer,
        SettingsStore,
    },
    cli::RuntimeConfig,
    error::Result,
};

/// Restores the default settings, persists them and reloads the manifests
/// without building anything.
pub async fn execute(store: &SettingsStore, config: &RuntimeConfig) -> Result<i32> {
    let mut orchestrator = BundleBuildOrchestrator::new(
        BundleSettings::default(),
        ArchivePackager::new(),
        PlaceholderRenderer::default(),
    );
    orchestrator.reset().await?;

    store.save(&BundleSettings::default()).await?;
    config.success(&format!(
        "Settings reset to defaults ({})",
        store.path().display()
    ))?;

    print_manifest(
        orchestrator.manifest(),
        &orchestrator.settings().export_folder,
        config,
        false,
    )?;
    Ok(0)
}
