//! U2-Net background removal through ONNX Runtime
//!
//! Runs the `u2net.onnx` salient-object model: the source is squashed to
//! 320x320, the model predicts a foreground probability per pixel, and the
//! prediction is scaled back up and used as the alpha channel.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use image::{imageops::FilterType, DynamicImage, GrayImage};
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;

use super::segmenter::{apply_mask, Segmenter};
use crate::error::{RemoverError, Result};

/// Square input size the model was trained on
const INPUT_SIZE: u32 = 320;

/// ImageNet normalisation constants
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// The production segmenter
///
/// The ONNX session is created on the first call, inside the worker, so the
/// window comes up without waiting for the model to load.
pub struct U2NetSegmenter {
    model_path: PathBuf,
    session: Mutex<Option<Session>>,
}

impl U2NetSegmenter {
    pub fn new(model_path: PathBuf) -> Self {
        Self {
            model_path,
            session: Mutex::new(None),
        }
    }

    fn load_session(path: &Path) -> Result<Session> {
        if !path.exists() {
            return Err(RemoverError::inference(format!(
                "Model file not found: {}. Download u2net.onnx and place it there.",
                path.display()
            )));
        }

        let started = Instant::now();
        let session = Session::builder()
            .map_err(ort_error)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(ort_error)?
            .commit_from_file(path)
            .map_err(ort_error)?;

        tracing::info!(
            model = %path.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ONNX session created"
        );
        Ok(session)
    }

    /// Run the model and return the raw single-channel prediction
    fn predict(&self, input: Array4<f32>) -> Result<Vec<f32>> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| RemoverError::inference("ONNX session lock poisoned"))?;

        if guard.is_none() {
            *guard = Some(Self::load_session(&self.model_path)?);
        }
        let session = guard
            .as_mut()
            .ok_or_else(|| RemoverError::inference("ONNX session not initialized"))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| RemoverError::inference("Model declares no inputs"))?;

        let input_value = Value::from_array(input).map_err(ort_error)?;
        let outputs = session
            .run(vec![(input_name.as_str(), input_value)])
            .map_err(ort_error)?;

        let prediction = outputs[0].try_extract_array::<f32>().map_err(ort_error)?;
        let shape = prediction.shape().to_vec();
        let side = INPUT_SIZE as usize;
        if shape.len() != 4 || shape[2] != side || shape[3] != side {
            return Err(RemoverError::inference(format!(
                "Unexpected output shape {shape:?}, expected [1, 1, {side}, {side}]"
            )));
        }

        // First batch, first channel
        Ok(prediction.iter().take(side * side).copied().collect())
    }
}

impl Segmenter for U2NetSegmenter {
    fn remove(&self, image: &DynamicImage) -> Result<DynamicImage> {
        let started = Instant::now();
        let prediction = self.predict(to_input_tensor(image))?;
        let mask = prediction_to_mask(&prediction, image.width(), image.height())?;
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "U2-Net inference finished"
        );
        Ok(DynamicImage::ImageRgba8(apply_mask(image, &mask)))
    }
}

fn ort_error<E: std::fmt::Display>(err: E) -> RemoverError {
    RemoverError::inference(err.to_string())
}

/// Build the NCHW input tensor
///
/// Pixels are divided by the brightest channel value in the resized image
/// before mean/std normalisation.
fn to_input_tensor(image: &DynamicImage) -> Array4<f32> {
    let resized = image::imageops::resize(
        &image.to_rgb8(),
        INPUT_SIZE,
        INPUT_SIZE,
        FilterType::Lanczos3,
    );

    let max_value = resized
        .as_raw()
        .iter()
        .copied()
        .max()
        .map_or(0.0, f32::from)
        .max(1e-6);

    let side = INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, side, side));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for channel in 0..3 {
            let value = f32::from(pixel[channel]) / max_value;
            tensor[[0, channel, y as usize, x as usize]] = (value - MEAN[channel]) / STD[channel];
        }
    }
    tensor
}

/// Min-max normalise the prediction into an 8-bit mask at the source size
fn prediction_to_mask(prediction: &[f32], width: u32, height: u32) -> Result<GrayImage> {
    let (min, max) = prediction
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    if !range.is_finite() {
        return Err(RemoverError::inference("Model returned non-finite values"));
    }

    let bytes: Vec<u8> = prediction
        .iter()
        .map(|&v| {
            let normalized = if range > 0.0 { (v - min) / range } else { 0.0 };
            (normalized * 255.0).clamp(0.0, 255.0) as u8
        })
        .collect();

    let mask = GrayImage::from_raw(INPUT_SIZE, INPUT_SIZE, bytes)
        .ok_or_else(|| RemoverError::inference("Prediction does not fill a 320x320 mask"))?;

    Ok(image::imageops::resize(&mask, width, height, FilterType::Lanczos3))
}
