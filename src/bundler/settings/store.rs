//! Persisted settings.
//!
//! Settings are loaded once when a command starts and written back once when
//! it finishes successfully. Nothing else in the pipeline reads or writes this
//! file.

use super::BundleSettings;
use crate::bundler::{Result, error::ErrorExt, utils::fs};
use std::path::{Path, PathBuf};

/// TOML file holding the last used [`BundleSettings`].
#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the per-user default location,
    /// `<config dir>/kodegen/bundler-assets.toml`.
    ///
    /// Falls back to the working directory when the platform has no config
    /// directory.
    pub fn default_location() -> Self {
        let dir = dirs::config_dir()
            .map(|d| d.join("kodegen"))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir.join("bundler-assets.toml"))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads settings. A missing file yields the defaults.
    pub async fn load(&self) -> Result<BundleSettings> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => {
                let settings = toml::from_str(&text)?;
                log::debug!("Loaded settings from {}", self.path.display());
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!(
                    "No settings at {}, using defaults",
                    self.path.display()
                );
                Ok(BundleSettings::default())
            }
            Err(e) => Err(e).fs_context("reading settings", &self.path),
        }
    }

    /// Writes settings, replacing the previous file atomically.
    pub async fn save(&self, settings: &BundleSettings) -> Result<()> {
        let text = toml::to_string_pretty(settings)?;
        fs::write_atomic(&self.path, text.as_bytes()).await?;
        log::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}
