//! Core BundleSettings struct and the on-disk layout it implies.

use super::{PackagingOptions, TargetPlatform};
use crate::bundler::{Error, Result};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Subfolder of the asset folder holding the source items.
pub const SOURCE_DIR_NAME: &str = "source";

/// Bundle name reserved for the source subfolder itself.
///
/// The packager bundles every subfolder of the asset folder, so it also emits a
/// bundle for `source`. That bundle is scratch output and is removed during
/// post-processing.
pub const RESERVED_BUNDLE_NAME: &str = "source";

/// Versions manifest, relative to the export folder.
pub const CONTROL_FILE_NAME: &str = "bundleControl.txt";

/// Contents manifest, relative to the export folder.
pub const CONTENTS_FILE_NAME: &str = "bundleContents.txt";

/// File stem of the staged copy inside each staging directory.
pub const STAGED_FILE_STEM: &str = "model";

/// File stem of the relocated bundle inside each bundle directory.
pub const BUNDLE_FILE_STEM: &str = "source";

/// Descriptor written next to each relocated bundle.
pub const DESCRIPTOR_FILE_NAME: &str = "config.json";

/// Preview image written next to each relocated bundle.
pub const PREVIEW_FILE_NAME: &str = "preview.png";

/// Settings for one build.
///
/// Immutable for the duration of a build. Construct with
/// [`SettingsBuilder`](super::SettingsBuilder) or load from disk with
/// [`SettingsStore`](super::SettingsStore).
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_assets::bundler::{BundleSettings, SettingsBuilder};
///
/// # fn example() -> kodegen_bundler_assets::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .asset_folder("Assets/AssetBundles")
///     .export_folder("AssetBundles")
///     .lower_case_names(true)
///     .build()?;
/// assert_eq!(settings.bundle_extension, ".unity3d");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BundleSettings {
    /// Folder containing the `source` subfolder and the staging directories.
    ///
    /// Default: `Assets/AssetBundles`
    pub asset_folder: PathBuf,

    /// Folder the bundle directories and manifests are written to.
    ///
    /// Cleared at the start of every build.
    ///
    /// Default: `AssetBundles`
    pub export_folder: PathBuf,

    /// Extension of produced bundle files, including the leading dot.
    ///
    /// Default: `.unity3d`
    pub bundle_extension: String,

    /// Extension identifying source items, including the leading dot.
    ///
    /// Default: `.prefab`
    pub source_extension: String,

    /// Lower-case bundle names.
    ///
    /// Default: true
    pub lower_case_names: bool,

    /// Remove the `" variant"` marker from bundle names.
    ///
    /// Default: false
    pub strip_variant: bool,

    /// Forward [`options`](Self::options) to the packager. When off, every
    /// flag is sent cleared.
    ///
    /// Default: true
    pub apply_options: bool,

    /// Packaging option flags.
    pub options: PackagingOptions,

    /// Target platform.
    ///
    /// Default: [`TargetPlatform::StandaloneWindows64`]
    pub platform: TargetPlatform,
}

impl Default for BundleSettings {
    fn default() -> Self {
        Self {
            asset_folder: PathBuf::from("Assets/AssetBundles"),
            export_folder: PathBuf::from("AssetBundles"),
            bundle_extension: ".unity3d".to_string(),
            source_extension: ".prefab".to_string(),
            lower_case_names: true,
            strip_variant: false,
            apply_options: true,
            options: PackagingOptions::default(),
            platform: TargetPlatform::default(),
        }
    }
}

impl BundleSettings {
    /// Folder the source items are discovered in.
    pub fn source_folder(&self) -> PathBuf {
        self.asset_folder.join(SOURCE_DIR_NAME)
    }

    /// Path of the versions manifest.
    pub fn control_file_path(&self) -> PathBuf {
        self.export_folder.join(CONTROL_FILE_NAME)
    }

    /// Path of the contents manifest.
    pub fn contents_file_path(&self) -> PathBuf {
        self.export_folder.join(CONTENTS_FILE_NAME)
    }

    /// Directory a bundle is relocated into during post-processing.
    pub fn bundle_dir(&self, name: &str) -> PathBuf {
        self.export_folder.join(name)
    }

    /// File name of a relocated bundle, e.g. `source.unity3d`.
    pub fn bundle_file_name(&self) -> String {
        format!("{BUNDLE_FILE_STEM}{}", self.bundle_extension)
    }

    /// Option flags as the packager should see them.
    pub fn effective_options(&self) -> PackagingOptions {
        if self.apply_options {
            self.options
        } else {
            PackagingOptions::none()
        }
    }

    /// Resolves relative folders against `base`.
    pub fn resolve(mut self, base: &Path) -> Result<Self> {
        self.asset_folder = absolutize(&self.asset_folder, base)?;
        self.export_folder = absolutize(&self.export_folder, base)?;
        Ok(self)
    }

    /// Checks the settings for values that would make a build destructive or
    /// meaningless.
    ///
    /// Folders are compared as given, so call [`resolve`](Self::resolve) first
    /// when they may be relative.
    pub fn validate(&self) -> Result<()> {
        for (label, ext) in [
            ("bundle extension", &self.bundle_extension),
            ("source extension", &self.source_extension),
        ] {
            if ext.len() < 2 || !ext.starts_with('.') {
                return Err(Error::InvalidSettings(format!(
                    "{label} must look like `.ext`, got `{ext}`"
                )));
            }
            if ext.contains(['/', '\\']) {
                return Err(Error::InvalidSettings(format!(
                    "{label} must not contain path separators, got `{ext}`"
                )));
            }
        }

        if self.asset_folder.as_os_str().is_empty() || self.export_folder.as_os_str().is_empty()
        {
            return Err(Error::InvalidSettings(
                "asset folder and export folder must be set".to_string(),
            ));
        }

        // Clearing the export folder must never reach the sources, and staging
        // cleanup must never reach the export folder.
        if self.asset_folder.starts_with(&self.export_folder) {
            return Err(Error::InvalidSettings(format!(
                "export folder {} contains the asset folder {}",
                self.export_folder.display(),
                self.asset_folder.display()
            )));
        }
        if self.export_folder.starts_with(&self.asset_folder) {
            return Err(Error::InvalidSettings(format!(
                "export folder {} lies inside the asset folder {}",
                self.export_folder.display(),
                self.asset_folder.display()
            )));
        }

        Ok(())
    }
}

fn absolutize(path: &Path, base: &Path) -> Result<PathBuf> {
    Ok(path.absolutize_from(base)?.into_owned())
}
