//! Inference runtime abstraction for sinrun.
//!
//! This crate wraps the external runtimes that actually execute models
//! behind one small interface:
//! - `tensorflow` for SavedModel bundles through the TensorFlow C library
//! - `tract` for ONNX graphs in pure Rust
//!
//! Every runtime handle is an owned value and is released on drop.

#[cfg(not(any(feature = "tensorflow", feature = "tract")))]
compile_error!("enable at least one of the `tensorflow` or `tract` features");

mod backend;
mod error;
mod format;
mod tensor;

pub use backend::{AutoBackend, AutoLoader, InferenceBackend, ModelLoader, Operation};
pub use error::InferenceError;
pub use format::{ModelFormat, ONNX_MODEL_FILE};
pub use tensor::{Tensor, TensorType};

#[cfg(feature = "tensorflow")]
pub use backend::tensorflow::{TensorflowBackend, TensorflowLoader};

#[cfg(feature = "tract")]
pub use backend::tract::{TractBackend, TractLoader};

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
