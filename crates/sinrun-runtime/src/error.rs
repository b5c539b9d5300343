//! Error types for the runtime layer.

use thiserror::Error;

/// Errors that can occur while loading or running a model.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// Failed to load the model bundle (missing directory, bad bundle, unknown tag).
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// No operation with the requested name exists in the graph.
    #[error("operation not found: {0}")]
    OperationNotFound(String),

    /// Invalid input tensor shape or type.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The runtime rejected or failed the run; carries its diagnostic message.
    #[error("inference failed: {0}")]
    RunFailed(String),

    /// Output tensor extraction failed.
    #[error("failed to extract output: {0}")]
    OutputExtraction(String),

    /// The bundle format is not recognised or its backend is not compiled in.
    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),

    /// I/O error when inspecting model files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
