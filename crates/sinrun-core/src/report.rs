//! Diagnostic report for a harness run.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use sinrun_runtime::Tensor;

use crate::error::{HarnessError, Result};

/// Shape, element type and byte size of a tensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TensorInfo {
    /// Dimension sizes, outermost first.
    pub shape: Vec<usize>,
    /// Runtime type tag (`TF_DataType` numbering).
    pub dtype: i32,
    /// Human readable element type.
    pub dtype_name: String,
    /// Total size of the element data.
    pub byte_size: usize,
}

impl TensorInfo {
    pub fn of(tensor: &Tensor) -> Self {
        let dtype = tensor.dtype();
        Self {
            shape: tensor.shape().to_vec(),
            dtype: dtype.tag(),
            dtype_name: dtype.name().to_string(),
            byte_size: tensor.byte_size(),
        }
    }
}

impl fmt::Display for TensorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.shape.iter().map(|d| d.to_string()).collect();
        writeln!(f, "Tensor shape: [{}]", dims.join(", "))?;
        writeln!(f, "Tensor type: {}", self.dtype)?;
        writeln!(f, "Tensor size: {} bytes", self.byte_size)
    }
}

/// One row of the results table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub input: f32,
    /// Value produced by the model.
    pub predicted: f64,
    /// Locally computed `sin(input)`.
    pub expected: f64,
    pub abs_error: f64,
}

impl Comparison {
    pub fn new(input: f32, predicted: f64) -> Self {
        let expected = f64::from(input.sin());
        Self {
            input,
            predicted,
            expected,
            abs_error: (predicted - expected).abs(),
        }
    }
}

/// Pair each input value with the model's output at the same position.
///
/// Extra elements on either side are ignored.
pub fn compare(inputs: &[f32], output: &Tensor) -> Vec<Comparison> {
    inputs
        .iter()
        .zip(output.to_f64_vec())
        .map(|(&x, y)| Comparison::new(x, y))
        .collect()
}

/// Everything a successful run prints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub model_dir: PathBuf,
    pub tag: String,
    /// Every operation in the graph, when listing was enabled.
    pub operations: Option<Vec<String>>,
    pub input: TensorInfo,
    pub output: TensorInfo,
    pub comparisons: Vec<Comparison>,
}

impl RunReport {
    /// Largest deviation from `sin(x)`, or 0 when there is nothing to
    /// compare. NaN if any output is NaN.
    pub fn max_abs_error(&self) -> f64 {
        self.comparisons
            .iter()
            .map(|c| c.abs_error)
            .fold(0.0, |max: f64, e| {
                if max.is_nan() || e.is_nan() {
                    f64::NAN
                } else {
                    max.max(e)
                }
            })
    }

    /// True when every output is within `tolerance` of `sin(x)`.
    pub fn within_tolerance(&self, tolerance: f64) -> bool {
        self.comparisons.iter().all(|c| c.abs_error <= tolerance)
    }

    /// Fail with [`HarnessError::ToleranceExceeded`] unless every output is
    /// within `tolerance`.
    pub fn check_tolerance(&self, tolerance: f64) -> Result<()> {
        if self.within_tolerance(tolerance) {
            Ok(())
        } else {
            Err(HarnessError::ToleranceExceeded {
                max_error: self.max_abs_error(),
                tolerance,
            })
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model loaded successfully.")?;

        if let Some(operations) = &self.operations {
            writeln!(f)?;
            writeln!(f, "=== All Operations in the Graph ===")?;
            for name in operations {
                writeln!(f, "Operation found: {}", name)?;
            }
            writeln!(f, "=== End ===")?;
            writeln!(f)?;
        }

        writeln!(f)?;
        writeln!(f, "Input tensor information:")?;
        write!(f, "{}", self.input)?;
        writeln!(f, "Success!")?;

        writeln!(f)?;
        writeln!(f, "Output tensor information:")?;
        write!(f, "{}", self.output)?;

        writeln!(f)?;
        writeln!(f, "Results:")?;
        for c in &self.comparisons {
            writeln!(
                f,
                "sin({:.1}) ≈ {:.6} (actual: {:.6})",
                c.input, c.predicted, c.expected
            )?;
        }

        Ok(())
    }
}
