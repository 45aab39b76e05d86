//! Builder for constructing BundleSettings.

use super::{BundleSettings, PackagingOptions, TargetPlatform};
use std::path::Path;

/// Builder for constructing [`BundleSettings`].
///
/// Starts from [`BundleSettings::default`]. Extensions given without a leading
/// dot get one. [`build`](Self::build) validates the result.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_assets::bundler::{SettingsBuilder, TargetPlatform};
///
/// # fn example() -> kodegen_bundler_assets::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .asset_folder("/project/Assets/AssetBundles")
///     .export_folder("/project/AssetBundles")
///     .bundle_extension("bundle")
///     .strip_variant(true)
///     .platform(TargetPlatform::Android)
///     .build()?;
/// assert_eq!(settings.bundle_extension, ".bundle");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    settings: BundleSettings,
}

impl SettingsBuilder {
    /// Creates a builder seeded with default settings.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a builder seeded with existing settings.
    pub fn from_settings(settings: BundleSettings) -> Self {
        Self { settings }
    }

    /// Sets the asset folder (holds `source/` and the staging directories).
    pub fn asset_folder<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.settings.asset_folder = path.as_ref().to_path_buf();
        self
    }

    /// Sets the export folder.
    pub fn export_folder<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.settings.export_folder = path.as_ref().to_path_buf();
        self
    }

    /// Sets the produced bundle extension.
    pub fn bundle_extension(mut self, ext: impl Into<String>) -> Self {
        self.settings.bundle_extension = dotted(ext.into());
        self
    }

    /// Sets the source item extension.
    pub fn source_extension(mut self, ext: impl Into<String>) -> Self {
        self.settings.source_extension = dotted(ext.into());
        self
    }

    /// Lower-case bundle names.
    pub fn lower_case_names(mut self, enabled: bool) -> Self {
        self.settings.lower_case_names = enabled;
        self
    }

    /// Strip the `" variant"` marker from bundle names.
    pub fn strip_variant(mut self, enabled: bool) -> Self {
        self.settings.strip_variant = enabled;
        self
    }

    /// Forward packaging options to the packager.
    pub fn apply_options(mut self, enabled: bool) -> Self {
        self.settings.apply_options = enabled;
        self
    }

    /// Sets all packaging options at once.
    pub fn options(mut self, options: PackagingOptions) -> Self {
        self.settings.options = options;
        self
    }

    /// Sets the target platform.
    pub fn platform(mut self, platform: TargetPlatform) -> Self {
        self.settings.platform = platform;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSettings`](crate::bundler::Error::InvalidSettings) when
    /// [`BundleSettings::validate`] rejects the result.
    pub fn build(mut self) -> crate::bundler::Result<BundleSettings> {
        self.settings.bundle_extension = dotted(self.settings.bundle_extension);
        self.settings.source_extension = dotted(self.settings.source_extension);
        self.settings.validate()?;
        Ok(self.settings)
    }
}

fn dotted(ext: String) -> String {
    if ext.is_empty() || ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_missing_dot_to_extensions() {
        let settings = SettingsBuilder::new()
            .bundle_extension("bundle")
            .source_extension(".prefab")
            .build()
            .unwrap();
        assert_eq!(settings.bundle_extension, ".bundle");
        assert_eq!(settings.source_extension, ".prefab");
    }

    #[test]
    fn rejects_export_folder_containing_assets() {
        let err = SettingsBuilder::new()
            .asset_folder("/project/out/Assets")
            .export_folder("/project/out")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("contains the asset folder"));
    }

    #[test]
    fn rejects_export_folder_inside_assets() {
        assert!(
            SettingsBuilder::new()
                .asset_folder("/project/Assets")
                .export_folder("/project/Assets/out")
                .build()
                .is_err()
        );
    }

    #[test]
    fn disabled_options_are_cleared() {
        let settings = SettingsBuilder::new().apply_options(false).build().unwrap();
        assert_eq!(settings.effective_options(), PackagingOptions::none());
        assert!(settings.options.collect_dependencies);
    }
}
