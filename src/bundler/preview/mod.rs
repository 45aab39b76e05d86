//! Preview capture for staged items.
//!
//! A [`PreviewRenderer`] turns a staged asset into image bytes. The
//! [`PreviewCapturer`] makes sure the bytes are PNG and stores them in a
//! [`PreviewCache`] under both the natural-case and the lower-case bundle name,
//! so post-processing finds them whichever casing the packager used for the
//! produced file.
//!
//! Capture failures are never fatal to a build; the bundle just ends up
//! without a `preview.png`.

mod command;
mod placeholder;

pub use command::CommandRenderer;
pub use placeholder::PlaceholderRenderer;

use super::{Error, Result, staging::StagedItem};
use std::{collections::HashMap, future::Future, io::Cursor, path::Path, sync::Arc};

/// Collaborator that renders a preview image of a staged asset.
pub trait PreviewRenderer {
    /// Renders `staged_asset` into encoded image bytes (any format `image` can decode).
    fn render_preview(&self, staged_asset: &Path) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// PNG preview bytes shared between cache keys.
pub type PreviewBytes = Arc<[u8]>;

/// Preview images of the current build, keyed by bundle name.
#[derive(Debug, Default, Clone)]
pub struct PreviewCache {
    entries: HashMap<String, CachedPreview>,
}

#[derive(Debug, Clone)]
struct CachedPreview {
    owner: String,
    bytes: PreviewBytes,
}

impl PreviewCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `bytes` under `name` and its lower-case form.
    ///
    /// Returns the keys that previously held another bundle's preview. Those
    /// keys now point at `bytes`.
    pub fn insert(&mut self, name: &str, bytes: PreviewBytes) -> Vec<String> {
        let mut displaced = Vec::new();
        let lower = name.to_lowercase();

        for key in [name.to_string(), lower] {
            let previous = self.entries.insert(
                key.clone(),
                CachedPreview {
                    owner: name.to_string(),
                    bytes: bytes.clone(),
                },
            );
            let taken = previous.is_some_and(|p| p.owner != name);
            if taken && !displaced.contains(&key) {
                displaced.push(key);
            }
        }

        displaced
    }

    /// Preview stored under `name`.
    pub fn get(&self, name: &str) -> Option<&PreviewBytes> {
        self.entries.get(name).map(|entry| &entry.bytes)
    }

    /// Removes the keys currently owned by `name`.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|_, entry| entry.owner != name);
    }

    /// Number of keys in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Requests previews for staged items and caches them.
#[derive(Debug)]
pub struct PreviewCapturer<R> {
    renderer: R,
    cache: PreviewCache,
}

impl<R: PreviewRenderer> PreviewCapturer<R> {
    /// Capturer backed by `renderer`, with an empty cache.
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            cache: PreviewCache::new(),
        }
    }

    /// Renders a preview of `item` and caches it under the item's name.
    ///
    /// Returns the cached PNG bytes. Keys whose earlier preview was replaced by
    /// a different bundle are logged.
    pub async fn capture(&mut self, item: &StagedItem) -> Result<PreviewBytes> {
        let raw = self
            .renderer
            .render_preview(&item.file)
            .await
            .map_err(|e| capture_failure(item, e))?;

        let png = ensure_png(raw).map_err(|e| capture_failure(item, e))?;
        let bytes: PreviewBytes = png.into();

        for key in self.cache.insert(&item.name, bytes.clone()) {
            log::warn!(
                "Preview key `{}` was already used by another bundle; {} now owns it",
                key,
                item.name
            );
        }

        log::debug!("Captured {} byte preview for {}", bytes.len(), item.name);
        Ok(bytes)
    }

    /// Previews captured so far.
    pub fn cache(&self) -> &PreviewCache {
        &self.cache
    }

    /// Drops the preview cached for `name`, e.g. when its staged item was replaced.
    pub fn forget(&mut self, name: &str) {
        self.cache.remove(name);
    }

    /// Drops every cached preview.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

/// Returns `bytes` unchanged when they are PNG, otherwise decodes and re-encodes them.
pub fn ensure_png(bytes: Vec<u8>) -> Result<Vec<u8>> {
    if bytes.is_empty() {
        return Err(Error::GenericError("renderer returned no image data".into()));
    }
    if matches!(image::guess_format(&bytes), Ok(image::ImageFormat::Png)) {
        return Ok(bytes);
    }

    let image = image::load_from_memory(&bytes)?;
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
    Ok(png)
}

fn capture_failure(item: &StagedItem, error: Error) -> Error {
    Error::CaptureFailure {
        name: item.name.clone(),
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_answers_both_casings() {
        let mut cache = PreviewCache::new();
        let displaced = cache.insert("Chair", Arc::from(&b"png"[..]));

        assert!(displaced.is_empty());
        assert_eq!(cache.get("Chair").map(|b| &b[..]), Some(&b"png"[..]));
        assert_eq!(cache.get("chair").map(|b| &b[..]), Some(&b"png"[..]));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cache_reports_lower_case_collisions() {
        let mut cache = PreviewCache::new();
        cache.insert("Chair", Arc::from(&b"first"[..]));
        let displaced = cache.insert("chair", Arc::from(&b"second"[..]));

        assert_eq!(displaced, vec!["chair".to_string()]);
        assert_eq!(cache.get("chair").map(|b| &b[..]), Some(&b"second"[..]));
        assert_eq!(cache.get("Chair").map(|b| &b[..]), Some(&b"first"[..]));
    }

    #[test]
    fn non_png_images_are_reencoded() {
        let image = image::RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30]));
        let mut bmp = Vec::new();
        image::DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bmp), image::ImageFormat::Bmp)
            .unwrap();

        let png = ensure_png(bmp).unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), image::ImageFormat::Png);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(ensure_png(b"not an image".to_vec()).is_err());
        assert!(ensure_png(Vec::new()).is_err());
    }
}
