//! The inference harness: load, resolve, feed, run, report.

use std::path::Path;

use tracing::{debug, info, warn};

use sinrun_runtime::{InferenceBackend, InferenceError, ModelLoader, Operation, Tensor};

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::report::{compare, RunReport, TensorInfo};

/// Drives one load and one run against an injected runtime.
pub struct InferenceHarness<L: ModelLoader> {
    loader: L,
    config: HarnessConfig,
}

impl<L: ModelLoader> InferenceHarness<L> {
    /// Create a harness; fails if the configuration is inconsistent.
    pub fn new(loader: L, config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { loader, config })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Open the bundle at `export_dir` with the meta graph tagged `tag`.
    pub fn load_model(&self, export_dir: &Path, tag: &str) -> Result<L::Backend> {
        let model = self
            .loader
            .load(export_dir, tag)
            .map_err(HarnessError::Load)?;
        info!("Model loaded from {}", export_dir.display());
        Ok(model)
    }

    /// Exact-match lookup of a graph operation. A miss reports every name
    /// the graph does contain.
    pub fn find_operation<'m>(model: &'m L::Backend, name: &str) -> Result<Operation<'m>> {
        match model.find_operation(name) {
            Ok(op) => {
                debug!("Found operation {} (#{})", op.name(), op.index());
                Ok(op)
            }
            Err(InferenceError::OperationNotFound(_)) => {
                let available = model.operations().unwrap_or_else(|e| {
                    warn!("Cannot list operations: {}", e);
                    Vec::new()
                });
                Err(HarnessError::OperationNotFound {
                    name: name.to_string(),
                    available,
                })
            }
            Err(e) => Err(HarnessError::Load(e)),
        }
    }

    /// Allocate a float tensor of `shape` holding a copy of `data`.
    pub fn build_input_tensor(data: &[f32], shape: &[usize]) -> Result<Tensor> {
        Tensor::from_f32(data, shape).map_err(HarnessError::InvalidInput)
    }

    /// One synchronous run: `tensor` into `input`, result from `output`.
    pub fn run(
        model: &L::Backend,
        input: &Operation<'_>,
        tensor: &Tensor,
        output: &Operation<'_>,
    ) -> Result<Tensor> {
        model.run(input, tensor, output).map_err(HarnessError::Run)
    }

    /// Shape, type tag and byte size of `tensor`.
    pub fn report(tensor: &Tensor) -> TensorInfo {
        TensorInfo::of(tensor)
    }

    /// Names of every operation in the loaded graph, logged as they are listed.
    pub fn list_operations(&self) -> Result<Vec<String>> {
        let model = self.load_model(&self.config.model.export_dir, &self.config.model.tag)?;
        enumerate(&model)
    }

    /// Run the whole sequence once and collect the report.
    ///
    /// Every runtime resource is released before this returns, on success
    /// and on every error path.
    pub fn execute(&self) -> Result<RunReport> {
        let model_cfg = &self.config.model;
        let model = self.load_model(&model_cfg.export_dir, &model_cfg.tag)?;

        let operations = if self.config.report.list_operations {
            Some(enumerate(&model)?)
        } else {
            None
        };

        let input_op = Self::find_operation(&model, &self.config.operations.input)?;
        let output_op = Self::find_operation(&model, &self.config.operations.output)?;

        let input = &self.config.input;
        let input_tensor = Self::build_input_tensor(&input.values, &input.shape)?;
        let input_info = Self::report(&input_tensor);
        debug!("Input tensor: {:?}", input_info);

        let output_tensor = Self::run(&model, &input_op, &input_tensor, &output_op)?;
        let output_info = Self::report(&output_tensor);
        info!(
            "Inference succeeded: {:?} {}",
            output_info.shape, output_info.dtype_name
        );

        Ok(RunReport {
            model_dir: model_cfg.export_dir.clone(),
            tag: model_cfg.tag.clone(),
            operations,
            input: input_info,
            output: output_info,
            comparisons: compare(&input.values, &output_tensor),
        })
    }
}

fn enumerate<B: InferenceBackend>(model: &B) -> Result<Vec<String>> {
    let operations = model.operations().map_err(HarnessError::Load)?;
    for name in &operations {
        info!("Operation found: {}", name);
    }
    Ok(operations)
}
