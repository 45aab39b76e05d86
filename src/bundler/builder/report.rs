//! Build reports.

use crate::bundler::manifest::ManifestDiff;
use chrono::{DateTime, Utc};
use std::{fmt, path::PathBuf};

/// One bundle produced by a successful build.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ProducedBundle {
    /// Bundle name.
    pub name: String,
    /// Final location, `<export>/<name>/source<ext>`.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// SHA-256 hex digest of the bundle file.
    pub checksum: String,
    /// Whether a `preview.png` was written next to it.
    pub has_preview: bool,
}

/// A recoverable problem met during a build.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildWarning {
    /// Two source items normalized to the same bundle name.
    StagingCollision {
        /// Shared bundle name.
        name: String,
        /// Item whose staged copy survived (discovered last).
        kept: PathBuf,
        /// Item whose staged copy was overwritten.
        discarded: PathBuf,
    },
    /// The renderer failed for a staged item.
    PreviewFailed {
        /// Bundle name.
        name: String,
        /// Failure details.
        reason: String,
    },
    /// A produced bundle has no cached preview.
    PreviewMissing {
        /// Bundle name.
        name: String,
    },
    /// A produced bundle could not be fully post-processed.
    PostProcessFailed {
        /// Bundle name.
        name: String,
        /// Failure details.
        reason: String,
    },
    /// The manifest lists a bundle with no file on disk.
    StaleManifestEntry {
        /// Bundle name.
        name: String,
    },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::StagingCollision {
                name,
                kept,
                discarded,
            } => write!(
                f,
                "{} and {} both map to bundle `{name}`; kept {}",
                discarded.display(),
                kept.display(),
                kept.display()
            ),
            BuildWarning::PreviewFailed { name, reason } => {
                write!(f, "no preview for `{name}`: {reason}")
            }
            BuildWarning::PreviewMissing { name } => {
                write!(f, "no cached preview for bundle `{name}`")
            }
            BuildWarning::PostProcessFailed { name, reason } => {
                write!(f, "post-processing `{name}` failed: {reason}")
            }
            BuildWarning::StaleManifestEntry { name } => {
                write!(f, "manifest lists `{name}` but its bundle file is missing")
            }
        }
    }
}

/// Outcome of a successful build.
#[derive(Clone, Debug, serde::Serialize)]
pub struct BuildReport {
    /// Unique id of this build.
    pub id: uuid::Uuid,
    /// When the build started.
    pub started_at: DateTime<Utc>,
    /// When the build finished.
    pub finished_at: DateTime<Utc>,
    /// Produced bundles in name order, excluding the reserved `source` bundle.
    pub bundles: Vec<ProducedBundle>,
    /// Recoverable problems, in the order they were met.
    pub warnings: Vec<BuildWarning>,
    /// Manifest changes relative to the previous build.
    pub diff: ManifestDiff,
}

impl BuildReport {
    /// Wall-clock duration of the build.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Produced bundle named `name`.
    pub fn bundle(&self, name: &str) -> Option<&ProducedBundle> {
        self.bundles.iter().find(|b| b.name == name)
    }
}
