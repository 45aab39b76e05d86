//! Packager collaborators.
//!
//! The packager turns the staged asset tree into one bundle file per staging
//! directory and writes the version and content manifests next to them. The
//! orchestrator calls it exactly once per build and only sees success or
//! failure.
//!
//! - [`ArchivePackager`] - built-in packager writing tar bundles
//! - [`CommandPackager`] - delegates to an external program

mod archive;
mod command;

pub use archive::ArchivePackager;
pub use command::{CommandPackager, PACKAGER_TIMEOUT};

use super::{
    Result,
    control_file::VersionMap,
    settings::{BundleSettings, PackagingOptions, TargetPlatform},
};
use std::{future::Future, path::PathBuf};

/// Everything the packager needs for one build.
#[derive(Clone, Debug)]
pub struct PackageRequest {
    /// Root of the staged tree (the asset folder).
    pub source_root: PathBuf,
    /// Folder bundle files and manifests are written to (the export folder).
    pub output_root: PathBuf,
    /// Target platform.
    pub platform: TargetPlatform,
    /// Option flags, already cleared when options are disabled.
    pub options: PackagingOptions,
    /// Extension of produced bundle files, including the leading dot.
    pub bundle_extension: String,
    /// Lower-case produced bundle names.
    pub lower_case_names: bool,
    /// Versions recorded by the previous build, read before the export folder
    /// was cleared.
    pub previous_versions: VersionMap,
}

impl PackageRequest {
    /// Request for `settings`, carrying the previous build's versions.
    pub fn from_settings(settings: &BundleSettings, previous_versions: VersionMap) -> Self {
        Self {
            source_root: settings.asset_folder.clone(),
            output_root: settings.export_folder.clone(),
            platform: settings.platform,
            options: settings.effective_options(),
            bundle_extension: settings.bundle_extension.clone(),
            lower_case_names: settings.lower_case_names,
            previous_versions,
        }
    }
}

/// Collaborator that packages the staged tree.
///
/// On success the output root holds one `<name><ext>` file per packaged
/// directory plus `bundleControl.txt` and `bundleContents.txt`.
pub trait Packager {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Packages every staging directory under `request.source_root`.
    fn build_bundles(&self, request: &PackageRequest) -> impl Future<Output = Result<()>> + Send;
}
