//! Built-in renderer producing a deterministic placeholder image.

use super::PreviewRenderer;
use crate::bundler::{Error, Result, error::ErrorExt};
use image::{ImageFormat, Rgba, RgbaImage};
use sha2::{Digest, Sha256};
use std::{io::Cursor, path::Path};

/// Renders a gradient tile whose colors derive from the staged file's hash.
///
/// Identical staged files always produce identical previews, which keeps
/// deterministic builds byte-stable without a real renderer.
#[derive(Clone, Copy, Debug)]
pub struct PlaceholderRenderer {
    size: u32,
}

impl Default for PlaceholderRenderer {
    fn default() -> Self {
        Self { size: 128 }
    }
}

impl PlaceholderRenderer {
    /// Renderer producing `size` x `size` tiles.
    pub fn with_size(size: u32) -> Self {
        Self { size: size.max(1) }
    }
}

impl PreviewRenderer for PlaceholderRenderer {
    async fn render_preview(&self, staged_asset: &Path) -> Result<Vec<u8>> {
        let data = tokio::fs::read(staged_asset)
            .await
            .fs_context("reading staged asset", staged_asset)?;
        let digest = Sha256::digest(&data).to_vec();
        let size = self.size;

        tokio::task::spawn_blocking(move || render_tile(&digest, size))
            .await
            .map_err(|e| Error::GenericError(format!("Preview task panicked: {e}")))?
    }
}

fn render_tile(digest: &[u8], size: u32) -> Result<Vec<u8>> {
    let from = [digest[0], digest[1], digest[2]];
    let to = [digest[3], digest[4], digest[5]];
    let span = (2 * size.saturating_sub(1)).max(1);

    let image = RgbaImage::from_fn(size, size, |x, y| {
        let t = (x + y) as f32 / span as f32;
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba([mix(from[0], to[0]), mix(from[1], to[1]), mix(from[2], to[2]), 255])
    });

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}
