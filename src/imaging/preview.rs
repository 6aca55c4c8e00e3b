/// Scaled previews for the before/after panes
///
/// Previews are rendered to RGBA in memory and handed to iced as an image
/// handle. Nothing is cached: every selection or completion renders again.

use iced::widget::image::Handle;
use image::{imageops::FilterType, RgbaImage};
use std::path::{Path, PathBuf};

use crate::error::{RemoverError, Result};

/// A preview ready to be drawn
#[derive(Debug, Clone)]
pub struct Preview {
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
}

/// Load a preview on the blocking pool
///
/// The error is flattened to a string so it can travel inside a `Message`.
pub async fn load_preview(path: PathBuf, target_width: u32) -> std::result::Result<Preview, String> {
    tokio::task::spawn_blocking(move || load_scaled_preview(&path, target_width))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
        .map_err(|e| e.to_string())
}

/// Open an image and scale it to `target_width`, keeping the aspect ratio
pub fn load_scaled_preview(path: &Path, target_width: u32) -> Result<Preview> {
    let pixels = scaled_preview_pixels(path, target_width)?;
    let (width, height) = pixels.dimensions();

    tracing::debug!(path = %path.display(), width, height, "Rendered preview");

    Ok(Preview {
        handle: Handle::from_rgba(width, height, pixels.into_raw()),
        width,
        height,
    })
}

/// Decode and resample with Lanczos3
fn scaled_preview_pixels(path: &Path, target_width: u32) -> Result<RgbaImage> {
    let img = image::open(path).map_err(|e| RemoverError::image_load(path, e))?;
    let target_height = scaled_height(img.width(), img.height(), target_width);

    Ok(image::imageops::resize(
        &img.to_rgba8(),
        target_width,
        target_height,
        FilterType::Lanczos3,
    ))
}

/// Height for `target_width` at the source aspect ratio, never zero
fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    if width == 0 {
        return 1;
    }
    let scaled = u64::from(target_width) * u64::from(height) / u64::from(width);
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}
