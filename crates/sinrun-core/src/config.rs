//! Configuration structures for the harness.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

/// Main configuration for a harness run.
///
/// Defaults reproduce the bundled sine demo: `./sin_model_capi` tagged
/// `serve`, fed six floats through `serving_default_x`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Model bundle location.
    pub model: ModelConfig,

    /// Graph operations to bind.
    pub operations: OperationConfig,

    /// Literal input tensor.
    pub input: InputConfig,

    /// Diagnostic output.
    pub report: ReportConfig,
}

/// Model bundle location and meta graph tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing the saved model bundle.
    pub export_dir: PathBuf,

    /// Meta graph tag to load.
    pub tag: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("./sin_model_capi"),
            tag: "serve".to_string(),
        }
    }
}

/// Names of the input and output nodes, trusted as long as they exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationConfig {
    pub input: String,
    pub output: String,
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            input: "serving_default_x".to_string(),
            output: "StatefulPartitionedCall".to_string(),
        }
    }
}

/// Float32 input values and their shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub values: Vec<f32>,

    /// Tensor shape; the product must equal `values.len()`.
    pub shape: Vec<usize>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            values: vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5],
            shape: vec![6, 1],
        }
    }
}

impl InputConfig {
    /// Column vector `[n, 1]` holding `values`.
    pub fn column(values: Vec<f32>) -> Self {
        let shape = vec![values.len(), 1];
        Self { values, shape }
    }
}

/// Diagnostic output options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Log and report every operation in the graph after loading.
    pub list_operations: bool,

    /// Fail the run when any output deviates from `sin(x)` by more than this.
    pub tolerance: Option<f64>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            list_operations: true,
            tolerance: None,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| HarnessError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| HarnessError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check the parts of the configuration that can be checked without a model.
    pub fn validate(&self) -> Result<()> {
        if self.operations.input.is_empty() || self.operations.output.is_empty() {
            return Err(HarnessError::Config(
                "input and output operation names must not be empty".to_string(),
            ));
        }

        let expected: usize = self.input.shape.iter().product();
        if expected != self.input.values.len() {
            return Err(HarnessError::Config(format!(
                "input shape {:?} needs {} values, got {}",
                self.input.shape,
                expected,
                self.input.values.len()
            )));
        }

        if let Some(tolerance) = self.report.tolerance {
            if !(tolerance.is_finite() && tolerance >= 0.0) {
                return Err(HarnessError::Config(format!(
                    "tolerance must be a non-negative number, got {}",
                    tolerance
                )));
            }
        }

        Ok(())
    }
}
