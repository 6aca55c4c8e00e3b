/// Application configuration
///
/// Everything here is compiled in. The app keeps no settings between runs,
/// so there is no config file to load or save.

use std::path::PathBuf;

/// Width of the before/after previews in pixels
pub const PREVIEW_WIDTH: u32 = 300;

/// Appended to the input file stem to name the result
pub const OUTPUT_SUFFIX: &str = "_no_bg";

/// Output extension; PNG keeps the alpha channel and is lossless
pub const OUTPUT_EXTENSION: &str = "png";

/// Extensions offered by the file picker's "Image files" filter
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// Runtime configuration handed to the application at startup
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub preview_width: u32,
    pub window_size: (f32, f32),
    /// Location of the U2-Net ONNX weights
    pub model_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preview_width: PREVIEW_WIDTH,
            window_size: (800.0, 600.0),
            model_path: default_model_path(),
        }
    }
}

/// Get the path where the model is expected
///
/// Uses the same location as the rembg tooling so an existing download is
/// picked up: `~/.u2net/u2net.onnx`. Falls back to the working directory
/// when no home directory is known.
fn default_model_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".u2net");
    path.push("u2net.onnx");
    path
}
