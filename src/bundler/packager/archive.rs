//! Built-in packager producing tar bundles.

use super::{PackageRequest, Packager};
use crate::bundler::{
    Error, Result,
    control_file::{self, ContentMap, VersionMap},
    settings::{CONTENTS_FILE_NAME, CONTROL_FILE_NAME, PackagingOptions, TargetPlatform},
};
use flate2::{Compression, write::GzEncoder};
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};
use tar::{Builder, Header, HeaderMode};

/// Name of the metadata entry at the start of every bundle.
pub const BUNDLE_INFO_ENTRY: &str = "bundle.json";

/// Packages each staging directory into a tar archive.
///
/// Every non-hidden subdirectory of the source root holding at least one file
/// becomes `<output>/<dirname><ext>`, gzip-compressed unless the request asks
/// for uncompressed bundles. Entries are written in sorted order; deterministic
/// requests additionally zero timestamps and ownership. Versions continue from
/// the previous build, new bundles start at 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArchivePackager;

impl ArchivePackager {
    /// Creates the packager.
    pub fn new() -> Self {
        Self
    }
}

/// Metadata stored as the first entry of each bundle.
#[derive(Debug, serde::Serialize)]
struct BundleInfo<'a> {
    name: &'a str,
    platform: TargetPlatform,
    options: PackagingOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    built_at: Option<String>,
}

/// One bundle written by the blocking stage.
struct WrittenBundle {
    name: String,
    contents: Vec<String>,
}

impl Packager for ArchivePackager {
    fn name(&self) -> &str {
        "archive"
    }

    async fn build_bundles(&self, request: &PackageRequest) -> Result<()> {
        let blocking_request = request.clone();
        let written = tokio::task::spawn_blocking(move || write_bundles(&blocking_request))
            .await
            .map_err(|e| Error::GenericError(format!("Packaging task panicked: {e}")))??;

        let mut versions = VersionMap::new();
        let mut contents = ContentMap::new();
        for bundle in written {
            let version = request
                .previous_versions
                .get(&bundle.name)
                .map_or(1, |v| v.saturating_add(1));
            versions.insert(bundle.name.clone(), version);
            contents.insert(bundle.name, bundle.contents);
        }

        control_file::write_versions(&request.output_root.join(CONTROL_FILE_NAME), &versions)
            .await?;
        control_file::write_contents(&request.output_root.join(CONTENTS_FILE_NAME), &contents)
            .await?;

        log::info!(
            "Packaged {} bundle(s) into {}",
            versions.len(),
            request.output_root.display()
        );
        Ok(())
    }
}

fn write_bundles(request: &PackageRequest) -> Result<Vec<WrittenBundle>> {
    std::fs::create_dir_all(&request.output_root)?;

    let mut dirs: Vec<PathBuf> = std::fs::read_dir(&request.source_root)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .map(|entry| entry.path())
        .collect();
    dirs.sort();

    let mut written: Vec<WrittenBundle> = Vec::new();
    for dir in dirs {
        let dir_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = if request.lower_case_names {
            dir_name.to_lowercase()
        } else {
            dir_name.clone()
        };

        let files = collect_files(&dir)?;
        if files.is_empty() {
            log::debug!("Skipping empty directory {}", dir.display());
            continue;
        }

        let archive_path = request
            .output_root
            .join(format!("{name}{}", request.bundle_extension));
        write_archive(&archive_path, &name, &dir, &files, request)?;
        log::debug!("Wrote {}", archive_path.display());

        let contents = files
            .iter()
            .map(|rel| format!("{dir_name}/{}", slashed(rel)))
            .collect();

        if let Some(existing) = written.iter_mut().find(|b| b.name == name) {
            log::warn!(
                "Directories differing only in case both map to bundle {}; keeping {}",
                name,
                dir.display()
            );
            existing.contents = contents;
        } else {
            written.push(WrittenBundle { name, contents });
        }
    }

    Ok(written)
}

/// Regular files under `dir`, relative to it, in sorted order.
fn collect_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.path().strip_prefix(dir)?.to_path_buf());
        }
    }
    Ok(files)
}

fn write_archive(
    archive_path: &Path,
    name: &str,
    dir: &Path,
    files: &[PathBuf],
    request: &PackageRequest,
) -> Result<()> {
    let file = File::create(archive_path)?;

    if request.options.uncompressed {
        let mut builder = Builder::new(file);
        append_entries(&mut builder, name, dir, files, request)?;
        builder.into_inner()?.flush()?;
    } else {
        let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));
        append_entries(&mut builder, name, dir, files, request)?;
        builder.into_inner()?.finish()?.flush()?;
    }
    Ok(())
}

fn append_entries<W: Write>(
    builder: &mut Builder<W>,
    name: &str,
    dir: &Path,
    files: &[PathBuf],
    request: &PackageRequest,
) -> Result<()> {
    let deterministic = request.options.deterministic;
    if deterministic {
        builder.mode(HeaderMode::Deterministic);
    }

    let info = BundleInfo {
        name,
        platform: request.platform,
        options: request.options,
        built_at: (!deterministic).then(|| chrono::Utc::now().to_rfc3339()),
    };
    let info = serde_json::to_vec_pretty(&info)?;

    let mut header = Header::new_gnu();
    header.set_size(info.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(if deterministic {
        0
    } else {
        chrono::Utc::now().timestamp().max(0) as u64
    });
    header.set_cksum();
    builder.append_data(&mut header, BUNDLE_INFO_ENTRY, info.as_slice())?;

    for rel in files {
        builder.append_path_with_name(dir.join(rel), slashed(rel))?;
    }
    Ok(())
}

fn slashed(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
