//! TensorFlow backend for SavedModel bundles, via the TensorFlow C library.

use std::path::Path;

use ::tensorflow as tf;
use ndarray::{ArrayD, IxDyn};
use tracing::{debug, trace};

use crate::error::InferenceError;
use crate::tensor::Tensor;
use crate::{InferenceBackend, ModelLoader, Operation, Result};

/// Loads SavedModel bundles into a fresh graph and session.
#[derive(Debug, Default, Clone)]
pub struct TensorflowLoader {
    /// Serialized `ConfigProto` applied to the session options, if any.
    config: Option<Vec<u8>>,
}

impl TensorflowLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a serialized `ConfigProto` to every session this loader opens.
    pub fn with_config(mut self, config: Vec<u8>) -> Self {
        self.config = Some(config);
        self
    }

    fn session_options(&self) -> Result<tf::SessionOptions> {
        let mut options = tf::SessionOptions::new();
        if let Some(config) = &self.config {
            options
                .set_config(config)
                .map_err(|e| InferenceError::ModelLoad(format!("invalid session config: {}", e)))?;
        }
        Ok(options)
    }
}

impl ModelLoader for TensorflowLoader {
    type Backend = TensorflowBackend;

    fn load(&self, export_dir: &Path, tag: &str) -> Result<TensorflowBackend> {
        debug!("Loading SavedModel from {} (tag {:?})", export_dir.display(), tag);

        // Options and graph are dropped on the error path.
        let options = self.session_options()?;
        let mut graph = tf::Graph::new();
        let bundle = tf::SavedModelBundle::load(&options, [tag], &mut graph, export_dir)
            .map_err(|status| InferenceError::ModelLoad(status.to_string()))?;

        Ok(TensorflowBackend { bundle, graph })
    }
}

/// A loaded SavedModel: its session and the graph it runs.
pub struct TensorflowBackend {
    // Declared first so the session is closed before the graph is released.
    bundle: tf::SavedModelBundle,
    graph: tf::Graph,
}

impl TensorflowBackend {
    fn graph_operation(&self, op: &Operation<'_>) -> Result<tf::Operation> {
        self.graph
            .operation_by_name(op.name())
            .map_err(|status| InferenceError::RunFailed(status.to_string()))?
            .ok_or_else(|| InferenceError::OperationNotFound(op.name().to_string()))
    }

    fn run_with<I: tf::TensorType + Clone>(
        &self,
        input: &tf::Operation,
        data: &ArrayD<I>,
        output: &tf::Operation,
    ) -> Result<Tensor> {
        let dims: Vec<u64> = data.shape().iter().map(|&d| d as u64).collect();
        let values: Vec<I> = data.iter().cloned().collect();
        let feed = tf::Tensor::<I>::new(&dims)
            .with_values(&values)
            .map_err(|status| InferenceError::InvalidInput(status.to_string()))?;

        let mut args = tf::SessionRunArgs::new();
        args.add_feed(input, 0, &feed);
        let token = args.request_fetch(output, 0);

        self.bundle
            .session
            .run(&mut args)
            .map_err(|status| InferenceError::RunFailed(status.to_string()))?;

        match output.output_type(0) {
            tf::DataType::Float => fetch::<f32>(&mut args, token).map(Tensor::Float32),
            tf::DataType::Double => fetch::<f64>(&mut args, token).map(Tensor::Float64),
            tf::DataType::Int32 => fetch::<i32>(&mut args, token).map(Tensor::Int32),
            tf::DataType::Int64 => fetch::<i64>(&mut args, token).map(Tensor::Int64),
            tf::DataType::UInt8 => fetch::<u8>(&mut args, token).map(Tensor::Uint8),
            other => Err(InferenceError::OutputExtraction(format!(
                "unsupported output type {} for '{}'",
                other,
                output.name().unwrap_or_default()
            ))),
        }
    }
}

fn fetch<T: tf::TensorType + Clone>(
    args: &mut tf::SessionRunArgs<'_>,
    token: tf::FetchToken,
) -> Result<ArrayD<T>> {
    let tensor: tf::Tensor<T> = args
        .fetch(token)
        .map_err(|status| InferenceError::OutputExtraction(status.to_string()))?;
    let shape: Vec<usize> = tensor.dims().iter().map(|&d| d as usize).collect();
    ArrayD::from_shape_vec(IxDyn(&shape), tensor.to_vec())
        .map_err(|e| InferenceError::OutputExtraction(e.to_string()))
}

impl InferenceBackend for TensorflowBackend {
    fn operations(&self) -> Result<Vec<String>> {
        self.graph
            .operation_iter()
            .map(|op| {
                op.name()
                    .map_err(|status| InferenceError::ModelLoad(status.to_string()))
            })
            .collect()
    }

    fn find_operation(&self, name: &str) -> Result<Operation<'_>> {
        let found = self
            .graph
            .operation_by_name(name)
            .map_err(|status| InferenceError::OperationNotFound(format!("{}: {}", name, status)))?;

        match found {
            Some(_) => {
                let index = self
                    .graph
                    .operation_iter()
                    .position(|op| op.name().is_ok_and(|n| n == name))
                    .unwrap_or_default();
                trace!("Resolved operation {} at index {}", name, index);
                Ok(Operation::new(name, index))
            }
            None => Err(InferenceError::OperationNotFound(name.to_string())),
        }
    }

    fn run(&self, input: &Operation<'_>, tensor: &Tensor, output: &Operation<'_>) -> Result<Tensor> {
        let input_op = self.graph_operation(input)?;
        let output_op = self.graph_operation(output)?;
        debug!("Running {} -> {}", input.name(), output.name());

        match tensor {
            Tensor::Float32(arr) => self.run_with(&input_op, arr, &output_op),
            Tensor::Float64(arr) => self.run_with(&input_op, arr, &output_op),
            Tensor::Int32(arr) => self.run_with(&input_op, arr, &output_op),
            Tensor::Int64(arr) => self.run_with(&input_op, arr, &output_op),
            Tensor::Uint8(arr) => self.run_with(&input_op, arr, &output_op),
        }
    }
}
