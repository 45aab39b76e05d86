//! Shared fixtures for the pipeline integration tests.
#![allow(dead_code)]

use kodegen_bundler_assets::bundler::{
    ArchivePackager, BundleSettings, Error, PackageRequest, Packager, PlaceholderRenderer,
    PreviewRenderer, Result, SettingsBuilder,
};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Temporary project with `Assets/AssetBundles/source` and an export folder.
pub struct Project {
    pub dir: TempDir,
    pub settings: BundleSettings,
}

impl Project {
    pub fn new() -> Self {
        Self::with(|builder| builder)
    }

    pub fn with(configure: impl FnOnce(SettingsBuilder) -> SettingsBuilder) -> Self {
        let dir = TempDir::new().unwrap();
        let builder = SettingsBuilder::new()
            .asset_folder(dir.path().join("Assets/AssetBundles"))
            .export_folder(dir.path().join("AssetBundles"));
        let settings = configure(builder).build().unwrap();
        std::fs::create_dir_all(settings.source_folder()).unwrap();
        Self { dir, settings }
    }

    /// Writes a source item into the source folder.
    pub fn add_source(&self, file_name: &str, contents: &[u8]) -> PathBuf {
        let path = self.settings.source_folder().join(file_name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn asset_folder(&self) -> &Path {
        &self.settings.asset_folder
    }

    pub fn export_folder(&self) -> &Path {
        &self.settings.export_folder
    }

    /// Names of the non-hidden entries directly under the asset folder, sorted.
    pub fn asset_entries(&self) -> Vec<String> {
        entries(self.asset_folder())
            .into_iter()
            .filter(|name| !name.starts_with('.'))
            .collect()
    }

    /// Names of the entries directly under the export folder, sorted.
    pub fn export_entries(&self) -> Vec<String> {
        entries(self.export_folder())
    }
}

pub fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Archive packager that counts its calls and records the staged tree it saw.
#[derive(Clone, Default)]
pub struct RecordingPackager {
    inner: ArchivePackager,
    pub calls: Arc<AtomicUsize>,
    pub staged: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl RecordingPackager {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Contents of `<staging dir>/<file>` as seen when the packager ran.
    pub fn staged_file(&self, relative: &str) -> Option<Vec<u8>> {
        self.staged.lock().unwrap().get(relative).cloned()
    }
}

impl Packager for RecordingPackager {
    fn name(&self) -> &str {
        "recording"
    }

    async fn build_bundles(&self, request: &PackageRequest) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut staged = self.staged.lock().unwrap();
            for entry in walkdir::WalkDir::new(&request.source_root) {
                let entry = entry?;
                if entry.file_type().is_file() {
                    let rel = entry.path().strip_prefix(&request.source_root)?;
                    let key = rel.to_string_lossy().replace('\\', "/");
                    staged.insert(key, std::fs::read(entry.path())?);
                }
            }
        }
        self.inner.build_bundles(request).await
    }
}

/// Packager that always fails.
#[derive(Clone, Copy, Default)]
pub struct FailingPackager;

impl Packager for FailingPackager {
    fn name(&self) -> &str {
        "failing"
    }

    async fn build_bundles(&self, _request: &PackageRequest) -> Result<()> {
        Err(Error::PackagerFailed {
            program: "failing".into(),
            reason: "simulated packager crash".into(),
        })
    }
}

/// Renderer that always fails.
#[derive(Clone, Copy, Default)]
pub struct FailingRenderer;

impl PreviewRenderer for FailingRenderer {
    async fn render_preview(&self, _staged_asset: &Path) -> Result<Vec<u8>> {
        Err(Error::GenericError("renderer unavailable".into()))
    }
}

/// Renderer that cancels `token` while rendering, so the build stops right
/// after staging.
#[derive(Clone)]
pub struct CancellingRenderer {
    pub token: CancellationToken,
}

impl PreviewRenderer for CancellingRenderer {
    async fn render_preview(&self, staged_asset: &Path) -> Result<Vec<u8>> {
        self.token.cancel();
        PlaceholderRenderer::with_size(4)
            .render_preview(staged_asset)
            .await
    }
}
