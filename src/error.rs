//! Error types for background removal operations

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for image service operations
pub type Result<T> = std::result::Result<T, RemoverError>;

/// Everything the image service can fail with
#[derive(Error, Debug)]
pub enum RemoverError {
    /// The source (or a preview source) could not be read or decoded
    #[error("Failed to load image '{}': {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The segmentation model failed or returned unusable data
    #[error("Inference error: {0}")]
    Inference(String),

    /// The result could not be written
    #[error("Failed to write image '{}': {source}", path.display())]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The background task died before reporting a result
    #[error("Worker error: {0}")]
    Worker(String),
}

impl RemoverError {
    pub fn image_load<P: AsRef<Path>>(path: P, source: image::ImageError) -> Self {
        Self::ImageLoad {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn image_write<P: AsRef<Path>>(path: P, source: image::ImageError) -> Self {
        Self::ImageWrite {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a new inference error
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }
}
