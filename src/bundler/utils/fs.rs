//! File system utilities for the bundle pipeline.
//!
//! Every helper here is idempotent where the pipeline needs it to be: removing
//! something that is already gone succeeds, and creating something that already
//! exists succeeds.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::{io, path::Path};
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }

    // create_dir_all is already idempotent - succeeds even if dir exists
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Idempotent
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

/// Removes a file if it exists.
pub async fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing file", path),
    }
}

/// Ensures `path` exists as a directory and deletes everything inside it.
///
/// The directory itself is kept. Running this on an empty directory is a no-op.
pub async fn clear_dir(path: &Path) -> Result<()> {
    clear_dir_except(path, &[]).await
}

/// Like [`clear_dir`], but leaves the direct children named in `keep`.
pub async fn clear_dir_except(path: &Path, keep: &[&str]) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)?;

    let mut entries = fs::read_dir(path)
        .await
        .fs_context("reading directory", path)?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("reading directory entry", path)?
    {
        let entry_path = entry.path();
        if keep.iter().any(|name| entry.file_name() == **name) {
            log::debug!("Keeping {}", entry_path.display());
            continue;
        }
        let file_type = entry
            .file_type()
            .await
            .fs_context("reading file type", &entry_path)?;

        if file_type.is_dir() {
            remove_dir_all(&entry_path).await?;
        } else {
            remove_file(&entry_path).await?;
        }
        log::debug!("Removed {}", entry_path.display());
    }

    Ok(())
}

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary. An existing destination
/// is overwritten.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    let metadata = fs::metadata(from)
        .await
        .fs_context("reading metadata", from)?;
    if !metadata.is_file() {
        return Err(Error::GenericError(format!("{from:?} is not a file")));
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying file", to)?;
    Ok(())
}

/// Moves a file, replacing any file already at the destination.
///
/// Falls back to copy and delete when a rename is not possible (for example
/// across filesystems).
pub async fn move_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }

    match fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(e).fs_context("moving file", from)
        }
        Err(e) => {
            log::debug!(
                "Rename {} -> {} failed ({}), copying instead",
                from.display(),
                to.display(),
                e
            );
            fs::copy(from, to).await.fs_context("copying file", to)?;
            remove_file(from).await
        }
    }
}

/// Writes `contents` to `path` through a sibling temporary file and a rename,
/// so readers never observe a partially written file.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .fs_context("creating directory", parent)?;
    }

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    tmp_name.push(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, contents)
        .await
        .fs_context("writing file", &tmp_path)?;

    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(e).fs_context("replacing file", path);
    }
    Ok(())
}

/// Length of a regular file, or `None` when it does not exist or is not a file.
pub async fn file_len(path: &Path) -> Option<u64> {
    match fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => Some(metadata.len()),
        _ => None,
    }
}
