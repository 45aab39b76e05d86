//! Per-bundle output directories.
//!
//! Every produced `<name><ext>` in the export folder is moved to
//! `<export>/<name>/source<ext>` and given a `config.json` descriptor and,
//! when one was captured, a `preview.png`. Problems with a single bundle are
//! reported as warnings and the loop moves on to the next one.

use super::{BuildWarning, ProducedBundle, checksum::calculate_sha256};
use crate::bundler::{
    Result,
    error::ErrorExt,
    naming,
    preview::PreviewCache,
    settings::{
        BundleSettings, CONTENTS_FILE_NAME, CONTROL_FILE_NAME, DESCRIPTOR_FILE_NAME,
        PREVIEW_FILE_NAME, RESERVED_BUNDLE_NAME,
    },
    utils::fs,
};
use std::path::{Path, PathBuf};

/// Bundles relocated by [`post_process`] and the problems met on the way.
#[derive(Debug, Default)]
pub struct PostProcessOutcome {
    /// Relocated bundles, excluding the reserved `source` bundle.
    pub bundles: Vec<ProducedBundle>,
    /// Per-bundle problems.
    pub warnings: Vec<BuildWarning>,
}

#[derive(serde::Serialize)]
struct Descriptor<'a> {
    name: &'a str,
}

/// Relocates every produced bundle in the export folder.
///
/// The reserved `source` bundle gets neither descriptor nor preview and its
/// directory is deleted once the loop is done.
///
/// # Errors
///
/// Fails when the export folder cannot be listed or the `source` output
/// cannot be removed. Everything else becomes a [`BuildWarning`].
pub async fn post_process(
    settings: &BundleSettings,
    previews: &PreviewCache,
) -> Result<PostProcessOutcome> {
    let mut outcome = PostProcessOutcome::default();

    for (name, file) in produced_bundles(settings).await? {
        let dir = settings.bundle_dir(&name);
        let target = dir.join(settings.bundle_file_name());

        if let Err(e) = relocate(&file, &dir, &target).await {
            log::warn!("Failed to relocate bundle {}: {}", name, e);
            outcome.warnings.push(BuildWarning::PostProcessFailed {
                name,
                reason: e.to_string(),
            });
            continue;
        }

        if name == RESERVED_BUNDLE_NAME {
            continue;
        }

        if let Err(e) = write_descriptor(&dir, &name).await {
            log::warn!("Failed to write descriptor for {}: {}", name, e);
            outcome.warnings.push(BuildWarning::PostProcessFailed {
                name: name.clone(),
                reason: e.to_string(),
            });
        }

        let has_preview = match previews
            .get(&name)
            .or_else(|| previews.get(&name.to_lowercase()))
        {
            Some(bytes) => match fs::write_atomic(&dir.join(PREVIEW_FILE_NAME), bytes).await {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Failed to write preview for {}: {}", name, e);
                    outcome.warnings.push(BuildWarning::PostProcessFailed {
                        name: name.clone(),
                        reason: e.to_string(),
                    });
                    false
                }
            },
            None => {
                log::warn!("No preview cached for bundle {}", name);
                outcome
                    .warnings
                    .push(BuildWarning::PreviewMissing { name: name.clone() });
                false
            }
        };

        let size = fs::file_len(&target).await.unwrap_or(0);
        let checksum = match calculate_sha256(&target).await {
            Ok(checksum) => checksum,
            Err(e) => {
                log::warn!("Failed to hash bundle {}: {}", name, e);
                outcome.warnings.push(BuildWarning::PostProcessFailed {
                    name: name.clone(),
                    reason: e.to_string(),
                });
                String::new()
            }
        };

        log::debug!("Post-processed bundle {} -> {}", name, target.display());
        outcome.bundles.push(ProducedBundle {
            name,
            path: target,
            size,
            checksum,
            has_preview,
        });
    }

    fs::remove_dir_all(&settings.bundle_dir(RESERVED_BUNDLE_NAME)).await?;
    Ok(outcome)
}

/// Produced bundle files in the export folder, as `(name, path)` in name order.
async fn produced_bundles(settings: &BundleSettings) -> Result<Vec<(String, PathBuf)>> {
    let export = &settings.export_folder;
    let mut entries = tokio::fs::read_dir(export)
        .await
        .fs_context("reading export folder", export)?;

    let mut bundles = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("reading export folder entry", export)?
    {
        let path = entry.path();
        let file_name = entry.file_name();
        if file_name == CONTROL_FILE_NAME || file_name == CONTENTS_FILE_NAME {
            continue;
        }
        if !entry
            .file_type()
            .await
            .fs_context("reading file type", &path)?
            .is_file()
        {
            continue;
        }
        if let Some(name) = naming::bundle_name_from_file(&path, &settings.bundle_extension) {
            bundles.push((name, path));
        }
    }

    bundles.sort();
    Ok(bundles)
}

async fn relocate(file: &Path, dir: &Path, target: &Path) -> Result<()> {
    fs::create_dir_all(dir, false).await?;
    fs::move_file(file, target).await
}

async fn write_descriptor(dir: &Path, name: &str) -> Result<()> {
    let descriptor = serde_json::to_vec(&Descriptor { name })?;
    fs::write_atomic(&dir.join(DESCRIPTOR_FILE_NAME), &descriptor).await
}
