//! Loader that picks a backend from the bundle's on-disk format.

use std::path::Path;

use tracing::info;

use crate::error::InferenceError;
use crate::format::ModelFormat;
use crate::{InferenceBackend, ModelLoader, Operation, Result, Tensor};

#[cfg(feature = "tensorflow")]
use super::tensorflow::{TensorflowBackend, TensorflowLoader};

#[cfg(feature = "tract")]
use super::tract::{TractBackend, TractLoader};

/// Dispatches to whichever compiled-in backend understands the bundle.
#[derive(Debug, Default, Clone)]
pub struct AutoLoader {
    #[cfg(feature = "tensorflow")]
    tensorflow: TensorflowLoader,
    #[cfg(feature = "tract")]
    tract: TractLoader,
}

impl AutoLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A backend chosen at load time.
pub enum AutoBackend {
    #[cfg(feature = "tensorflow")]
    Tensorflow(TensorflowBackend),
    #[cfg(feature = "tract")]
    Tract(TractBackend),
}

impl ModelLoader for AutoLoader {
    type Backend = AutoBackend;

    fn load(&self, export_dir: &Path, tag: &str) -> Result<AutoBackend> {
        let format = ModelFormat::detect(export_dir)?;
        info!("Loading {} bundle from {}", format, export_dir.display());

        match format {
            #[cfg(feature = "tensorflow")]
            ModelFormat::SavedModel => self
                .tensorflow
                .load(export_dir, tag)
                .map(AutoBackend::Tensorflow),
            #[cfg(feature = "tract")]
            ModelFormat::Onnx => self.tract.load(export_dir, tag).map(AutoBackend::Tract),
            #[allow(unreachable_patterns)]
            other => Err(InferenceError::UnsupportedFormat(format!(
                "{} bundles need sinrun built with the `{}` feature",
                other,
                match other {
                    ModelFormat::SavedModel => "tensorflow",
                    ModelFormat::Onnx => "tract",
                }
            ))),
        }
    }
}

impl InferenceBackend for AutoBackend {
    fn operations(&self) -> Result<Vec<String>> {
        match self {
            #[cfg(feature = "tensorflow")]
            AutoBackend::Tensorflow(b) => b.operations(),
            #[cfg(feature = "tract")]
            AutoBackend::Tract(b) => b.operations(),
        }
    }

    fn find_operation(&self, name: &str) -> Result<Operation<'_>> {
        match self {
            #[cfg(feature = "tensorflow")]
            AutoBackend::Tensorflow(b) => b.find_operation(name),
            #[cfg(feature = "tract")]
            AutoBackend::Tract(b) => b.find_operation(name),
        }
    }

    fn run(&self, input: &Operation<'_>, tensor: &Tensor, output: &Operation<'_>) -> Result<Tensor> {
        match self {
            #[cfg(feature = "tensorflow")]
            AutoBackend::Tensorflow(b) => b.run(input, tensor, output),
            #[cfg(feature = "tract")]
            AutoBackend::Tract(b) => b.run(input, tensor, output),
        }
    }
}
