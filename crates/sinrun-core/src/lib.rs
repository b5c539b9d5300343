//! Core library for sinrun.
//!
//! This crate provides:
//! - The inference harness (load a bundle, resolve operations, run once)
//! - Injectable configuration for bundle paths, operation names and input
//! - A diagnostic report comparing model output with `sin(x)`

pub mod config;
pub mod error;
pub mod harness;
pub mod report;

#[cfg(test)]
mod fake;

pub use config::{HarnessConfig, InputConfig, ModelConfig, OperationConfig, ReportConfig};
pub use error::{HarnessError, Result};
pub use harness::InferenceHarness;
pub use report::{Comparison, RunReport, TensorInfo};

/// Re-export runtime types.
pub use sinrun_runtime::{
    AutoLoader, InferenceBackend, InferenceError, ModelFormat, ModelLoader, Operation, Tensor,
    TensorType,
};

#[cfg(feature = "tensorflow")]
pub use sinrun_runtime::TensorflowLoader;

#[cfg(feature = "tract")]
pub use sinrun_runtime::TractLoader;
