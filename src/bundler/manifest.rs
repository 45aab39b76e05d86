//! Manifest reconciliation.
//!
//! The reconciled manifest is the only view of bundle versions, contents and
//! sizes that consumers get. It is rebuilt from scratch on every reload: the
//! two control files are re-read and sizes are recomputed from the bundle
//! files on disk, so nothing cached from before a build survives it.

use super::{
    Result,
    control_file::{self, ContentMap, VersionMap},
    settings::{BundleSettings, RESERVED_BUNDLE_NAME},
    utils::fs,
};
use std::{collections::BTreeMap, path::PathBuf};

/// One produced bundle as seen by consumers.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct BundleRecord {
    /// Bundle name, as written to disk.
    pub name: String,
    /// Version recorded by the packager.
    pub version: u32,
    /// Assets contained in the bundle, in packager order.
    pub contents: Vec<String>,
    /// Size in kilobytes, absent when the bundle file is missing or empty.
    pub size_kb: Option<u64>,
}

/// Versions, contents and sizes of the bundles in the export folder.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize)]
pub struct BundleManifest {
    /// Bundle name to version.
    pub versions: VersionMap,
    /// Bundle name to contained assets.
    pub contents: ContentMap,
    /// Bundle name to size in kilobytes (bytes / 1024, rounded down).
    pub sizes: BTreeMap<String, u64>,
    /// Names with a version entry but no bundle file on disk.
    pub stale: Vec<String>,
}

impl BundleManifest {
    /// Whether the manifest lists no bundles.
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Records in name order, one per version entry.
    pub fn records(&self) -> Vec<BundleRecord> {
        self.versions
            .iter()
            .map(|(name, version)| BundleRecord {
                name: name.clone(),
                version: *version,
                contents: self.contents.get(name).cloned().unwrap_or_default(),
                size_kb: self.sizes.get(name).copied(),
            })
            .collect()
    }

    /// Record for `name`.
    pub fn record(&self, name: &str) -> Option<BundleRecord> {
        let version = *self.versions.get(name)?;
        Some(BundleRecord {
            name: name.to_string(),
            version,
            contents: self.contents.get(name).cloned().unwrap_or_default(),
            size_kb: self.sizes.get(name).copied(),
        })
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.versions.clear();
        self.contents.clear();
        self.sizes.clear();
        self.stale.clear();
    }

    /// Changes from `previous` to `self`.
    pub fn diff(&self, previous: &BundleManifest) -> ManifestDiff {
        let mut diff = ManifestDiff::default();

        for (name, version) in &self.versions {
            match previous.versions.get(name) {
                None => diff.added.push(name.clone()),
                Some(old) if old != version || previous.contents.get(name) != self.contents.get(name) => {
                    diff.updated.push(name.clone())
                }
                Some(_) => {}
            }
        }
        diff.removed = previous
            .versions
            .keys()
            .filter(|name| !self.versions.contains_key(*name))
            .cloned()
            .collect();

        diff
    }
}

/// Bundles added, removed and updated between two manifests.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize)]
pub struct ManifestDiff {
    /// Present now, absent before.
    pub added: Vec<String>,
    /// Present before, absent now.
    pub removed: Vec<String>,
    /// Present in both with a different version or content list.
    pub updated: Vec<String>,
}

impl ManifestDiff {
    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

/// Rebuilds [`BundleManifest`]s from the export folder.
///
/// Used both at the end of a build and by the read-only refresh path, which
/// reloads without building anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct ManifestReconciler;

impl ManifestReconciler {
    /// Reads both control files and recomputes sizes for `settings`.
    ///
    /// Missing control files read as empty. Entries whose bundle file is gone
    /// get no size and are listed as stale. The reserved `source` entry is
    /// dropped.
    pub async fn reload(settings: &BundleSettings) -> Result<BundleManifest> {
        let mut versions = control_file::read_versions(&settings.control_file_path()).await?;
        let mut contents = control_file::read_contents(&settings.contents_file_path()).await?;
        versions.remove(RESERVED_BUNDLE_NAME);
        contents.remove(RESERVED_BUNDLE_NAME);

        let mut sizes = BTreeMap::new();
        let mut stale = Vec::new();
        for name in versions.keys() {
            match bundle_file_len(settings, name).await {
                Some(0) => log::debug!("Bundle {} is empty, no size recorded", name),
                Some(len) => {
                    sizes.insert(name.clone(), len / 1024);
                }
                None => {
                    log::warn!(
                        "Manifest lists {} but no bundle file exists for it in {}",
                        name,
                        settings.export_folder.display()
                    );
                    stale.push(name.clone());
                }
            }
        }

        log::debug!(
            "Reloaded manifest: {} version(s), {} content list(s), {} size(s)",
            versions.len(),
            contents.len(),
            sizes.len()
        );
        Ok(BundleManifest {
            versions,
            contents,
            sizes,
            stale,
        })
    }
}

/// Candidate locations of a bundle file, most specific first.
pub fn bundle_file_candidates(settings: &BundleSettings, name: &str) -> [PathBuf; 3] {
    [
        settings.bundle_dir(name).join(settings.bundle_file_name()),
        settings
            .export_folder
            .join(format!("{name}{}", settings.bundle_extension)),
        settings.export_folder.join(name),
    ]
}

async fn bundle_file_len(settings: &BundleSettings, name: &str) -> Option<u64> {
    for candidate in bundle_file_candidates(settings, name) {
        if let Some(len) = fs::file_len(&candidate).await {
            return Some(len);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(entries: &[(&str, u32, &[&str])]) -> BundleManifest {
        let mut manifest = BundleManifest::default();
        for (name, version, contents) in entries {
            manifest.versions.insert(name.to_string(), *version);
            manifest
                .contents
                .insert(name.to_string(), contents.iter().map(|c| c.to_string()).collect());
        }
        manifest
    }

    #[test]
    fn diff_reports_added_removed_updated() {
        let before = manifest(&[("chair", 1, &["chair/model.prefab"]), ("lamp", 2, &[])]);
        let after = manifest(&[("chair", 2, &["chair/model.prefab"]), ("table", 1, &[])]);

        let diff = after.diff(&before);
        assert_eq!(diff.added, vec!["table"]);
        assert_eq!(diff.removed, vec!["lamp"]);
        assert_eq!(diff.updated, vec!["chair"]);
    }

    #[test]
    fn records_fill_missing_parts() {
        let mut manifest = manifest(&[("chair", 3, &["a", "b"])]);
        manifest.versions.insert("ghost".into(), 1);
        manifest.sizes.insert("chair".into(), 12);

        let records = manifest.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].size_kb, Some(12));
        assert_eq!(records[0].contents.len(), 2);
        assert_eq!(records[1].name, "ghost");
        assert!(records[1].contents.is_empty());
        assert_eq!(records[1].size_kb, None);
    }
}
