//! `list` command.

use crate::{
    bundler::{BundleManifest, BundleRecord, ManifestReconciler, SettingsStore},
    cli::{ListArgs, RuntimeConfig},
    error::Result,
};
use std::path::Path;

/// Prints the bundles recorded in the export folder's manifests.
pub async fn execute(args: &ListArgs, store: &SettingsStore, config: &RuntimeConfig) -> Result<i32> {
    let mut settings = store.load().await?;
    if let Some(dir) = &args.export_folder {
        settings.export_folder = dir.clone();
    }
    let settings = settings.resolve(&std::env::current_dir()?)?;

    let manifest = ManifestReconciler::reload(&settings).await?;
    print_manifest(&manifest, &settings.export_folder, config, args.json)?;
    Ok(0)
}

/// Prints one line per bundle, or the records as JSON.
pub fn print_manifest(
    manifest: &BundleManifest,
    export_folder: &Path,
    config: &RuntimeConfig,
    json: bool,
) -> Result<()> {
    if json {
        config.println(&serde_json::to_string_pretty(&manifest.records())?)?;
        return Ok(());
    }

    if manifest.is_empty() {
        config.progress(&format!("No bundles recorded in {}", export_folder.display()))?;
        return Ok(());
    }

    for record in manifest.records() {
        let stale = manifest.stale.contains(&record.name);
        config.println(&format_record(&record, stale))?;
    }
    Ok(())
}

/// `name, Version: v, Contents: n, Size: Xkb`, flagged when the bundle file is missing.
pub fn format_record(record: &BundleRecord, stale: bool) -> String {
    let size = record
        .size_kb
        .map_or_else(|| "-".to_string(), |kb| format!("{kb}kb"));
    let line = format!(
        "{}, Version: {}, Contents: {}, Size: {size}",
        record.name,
        record.version,
        record.contents.len()
    );
    if stale {
        format!("{line} (stale: bundle file missing)")
    } else {
        line
    }
}
