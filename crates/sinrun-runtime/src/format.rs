//! Model bundle format detection.

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::InferenceError;
use crate::Result;

/// File name of the ONNX graph inside a bundle directory.
pub const ONNX_MODEL_FILE: &str = "model.onnx";

const SAVED_MODEL_FILES: [&str; 2] = ["saved_model.pb", "saved_model.pbtxt"];

/// On-disk layout of a model bundle directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// TensorFlow SavedModel (`saved_model.pb` plus `variables/`).
    SavedModel,
    /// A single ONNX graph stored as `model.onnx`.
    Onnx,
}

impl ModelFormat {
    /// Inspect `dir` and work out which format it holds.
    ///
    /// A SavedModel wins when a directory contains both.
    pub fn detect(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(InferenceError::ModelLoad(format!(
                "model directory not found: {}",
                dir.display()
            )));
        }

        if SAVED_MODEL_FILES.iter().any(|f| dir.join(f).is_file()) {
            debug!("Detected SavedModel bundle in {}", dir.display());
            return Ok(ModelFormat::SavedModel);
        }

        if dir.join(ONNX_MODEL_FILE).is_file() {
            debug!("Detected ONNX bundle in {}", dir.display());
            return Ok(ModelFormat::Onnx);
        }

        Err(InferenceError::UnsupportedFormat(format!(
            "{} contains neither saved_model.pb nor {}",
            dir.display(),
            ONNX_MODEL_FILE
        )))
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFormat::SavedModel => write!(f, "saved-model"),
            ModelFormat::Onnx => write!(f, "onnx"),
        }
    }
}
