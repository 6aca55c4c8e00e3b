/// Background removal service
///
/// Decodes the source, hands it to the segmenter, checks the result and
/// writes it out. There is no state and no retry; every failure goes back
/// to the caller unchanged.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use super::segmenter::Segmenter;
use crate::error::{RemoverError, Result};

/// Wraps the segmentation collaborator and file I/O
#[derive(Clone)]
pub struct ImageService {
    segmenter: Arc<dyn Segmenter>,
}

impl ImageService {
    pub fn new(segmenter: Arc<dyn Segmenter>) -> Self {
        Self { segmenter }
    }

    /// Open `source_path` and run the segmenter on it
    ///
    /// The result must have the same pixel dimensions as the source.
    pub fn remove_background(&self, source_path: &Path) -> Result<DynamicImage> {
        let input = image::open(source_path).map_err(|e| RemoverError::image_load(source_path, e))?;

        let started = Instant::now();
        let output = self.segmenter.remove(&input)?;

        if output.dimensions() != input.dimensions() {
            return Err(RemoverError::inference(format!(
                "Model returned a {}x{} image for a {}x{} input",
                output.width(),
                output.height(),
                input.width(),
                input.height()
            )));
        }

        tracing::info!(
            source = %source_path.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Background removed"
        );
        Ok(output)
    }

    /// Write `image` in the format implied by the destination extension
    ///
    /// An existing file is replaced without asking.
    pub fn save_image(&self, image: &DynamicImage, destination_path: &Path) -> Result<()> {
        let format = ImageFormat::from_path(destination_path)
            .map_err(|e| RemoverError::image_write(destination_path, e))?;
        image
            .save_with_format(destination_path, format)
            .map_err(|e| RemoverError::image_write(destination_path, e))
    }

    /// The whole job the worker runs: remove, then save
    pub fn remove_and_save(&self, source: &Path, destination: &Path) -> Result<PathBuf> {
        let output = self.remove_background(source)?;
        self.save_image(&output, destination)?;
        Ok(destination.to_path_buf())
    }
}

/// Run one removal on the blocking pool
///
/// Resolves exactly once, after the segmenter call has returned. A panic in
/// the job comes back as a `Worker` error instead of taking the app down.
pub async fn run_removal(
    service: ImageService,
    source: PathBuf,
    destination: PathBuf,
) -> std::result::Result<PathBuf, String> {
    tokio::task::spawn_blocking(move || service.remove_and_save(&source, &destination))
        .await
        .map_err(|e| RemoverError::Worker(e.to_string()).to_string())?
        .map_err(|e| e.to_string())
}
