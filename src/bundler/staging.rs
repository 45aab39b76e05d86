//! Source discovery and per-item staging.
//!
//! Each source item is copied into its own directory under the asset folder,
//! `<asset folder>/<bundle name>/model<ext>`, so the packager sees exactly one
//! logical item per directory. Staging directories are scratch space: they are
//! swept before staging and removed again when the build ends.

use super::{
    Error, Result,
    error::ErrorExt,
    naming,
    settings::{BundleSettings, RESERVED_BUNDLE_NAME, SOURCE_DIR_NAME, STAGED_FILE_STEM},
    utils::fs,
};
use std::path::{Path, PathBuf};

/// One discovered source item.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceItem {
    /// Absolute path of the item's definition file.
    pub path: PathBuf,
}

/// A source item after staging.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StagedItem {
    /// Normalized bundle name.
    pub name: String,
    /// Source item it was staged from.
    pub source: PathBuf,
    /// Staging directory.
    pub dir: PathBuf,
    /// Staged copy inside [`dir`](Self::dir).
    pub file: PathBuf,
}

/// Lists source items in discovery order.
///
/// Discovery is non-recursive and keeps regular files whose name ends with the
/// configured source extension. Dot-files are skipped. Items are ordered by path.
///
/// # Errors
///
/// Fails when the source folder cannot be read.
pub async fn discover_sources(settings: &BundleSettings) -> Result<Vec<SourceItem>> {
    let source_folder = settings.source_folder();
    let mut entries = tokio::fs::read_dir(&source_folder)
        .await
        .fs_context("reading source folder", &source_folder)?;

    let mut items = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("reading source folder entry", &source_folder)?
    {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .fs_context("reading file type", &path)?
            .is_file();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| !n.starts_with('.') && n.ends_with(&settings.source_extension));

        if is_file && matches {
            items.push(SourceItem { path });
        } else {
            log::debug!("Skipping non-source entry {}", path.display());
        }
    }

    items.sort_by(|a, b| a.path.cmp(&b.path));
    log::info!(
        "Discovered {} source item(s) in {}",
        items.len(),
        source_folder.display()
    );
    Ok(items)
}

/// Stages source items into their per-item directories.
#[derive(Clone, Debug)]
pub struct ItemStager {
    asset_folder: PathBuf,
    strip_variant: bool,
    lower_case: bool,
}

impl ItemStager {
    /// Stager for the asset folder and naming rules in `settings`.
    pub fn new(settings: &BundleSettings) -> Self {
        Self {
            asset_folder: settings.asset_folder.clone(),
            strip_variant: settings.strip_variant,
            lower_case: settings.lower_case_names,
        }
    }

    /// Bundle name `item` will be staged under.
    pub fn bundle_name(&self, item: &SourceItem) -> String {
        naming::normalize(&item.path, self.strip_variant, self.lower_case)
    }

    /// Copies `item` into `<asset folder>/<bundle name>/model<ext>`.
    ///
    /// Creating the directory is idempotent and the copy always overwrites, so
    /// a later item with the same bundle name replaces an earlier one.
    ///
    /// # Errors
    ///
    /// [`Error::StageFailure`] when the name is empty, reserved or starts with
    /// a dot, the directory cannot be created, or the source cannot be copied.
    pub async fn stage(&self, item: &SourceItem) -> Result<StagedItem> {
        let name = self.bundle_name(item);
        // Dot-named directories would be skipped by the sweep and the packager.
        if name.is_empty()
            || name.eq_ignore_ascii_case(RESERVED_BUNDLE_NAME)
            || name.starts_with('.')
        {
            return Err(Error::StageFailure {
                path: item.path.clone(),
                reason: format!("`{name}` cannot be used as a bundle name"),
            });
        }

        let dir = self.asset_folder.join(&name);
        let file = dir.join(staged_file_name(&item.path));

        fs::create_dir_all(&dir, false)
            .await
            .map_err(|e| stage_failure(item, e))?;
        fs::copy_file(&item.path, &file)
            .await
            .map_err(|e| stage_failure(item, e))?;

        log::debug!("Staged {} -> {}", item.path.display(), file.display());
        Ok(StagedItem {
            name,
            source: item.path.clone(),
            dir,
            file,
        })
    }
}

/// Removes every staging directory under the asset folder.
///
/// Everything except the `source` folder and hidden entries is treated as
/// staging output. Missing asset folders are fine.
pub async fn sweep_staging(asset_folder: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    let mut entries = match tokio::fs::read_dir(asset_folder).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(removed),
        Err(e) => return Err(e).fs_context("reading asset folder", asset_folder),
    };

    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("reading asset folder entry", asset_folder)?
    {
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name == SOURCE_DIR_NAME || name.starts_with('.') {
            continue;
        }
        if entry
            .file_type()
            .await
            .fs_context("reading file type", &path)?
            .is_dir()
        {
            fs::remove_dir_all(&path).await?;
            log::debug!("Removed staging directory {}", path.display());
            removed.push(path);
        }
    }

    Ok(removed)
}

/// `model.<ext>` where `<ext>` is the source item's own extension.
fn staged_file_name(source: &Path) -> String {
    match source.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{STAGED_FILE_STEM}.{ext}"),
        None => STAGED_FILE_STEM.to_string(),
    }
}

fn stage_failure(item: &SourceItem, error: Error) -> Error {
    Error::StageFailure {
        path: item.path.clone(),
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::SettingsBuilder;

    fn settings(root: &Path) -> BundleSettings {
        SettingsBuilder::new()
            .asset_folder(root.join("Assets/AssetBundles"))
            .export_folder(root.join("AssetBundles"))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn dot_named_items_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        std::fs::create_dir_all(settings.source_folder()).unwrap();
        let path = settings.source_folder().join(".chair.prefab");
        std::fs::write(&path, b"hidden").unwrap();

        let err = ItemStager::new(&settings)
            .stage(&SourceItem { path })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StageFailure { .. }));
        assert!(!settings.asset_folder.join(".chair").exists());
    }

    #[tokio::test]
    async fn discovery_skips_dot_files() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let source = settings.source_folder();
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join(".chair.prefab"), b"hidden").unwrap();
        std::fs::write(source.join(".prefab"), b"hidden").unwrap();
        std::fs::write(source.join("lamp.prefab"), b"lamp").unwrap();

        let items = discover_sources(&settings).await.unwrap();
        assert_eq!(
            items,
            vec![SourceItem {
                path: source.join("lamp.prefab")
            }]
        );
    }
}
