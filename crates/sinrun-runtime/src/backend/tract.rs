//! Tract backend for pure-Rust ONNX inference.

use std::path::Path;

use ndarray::ArrayD;
use tract_onnx::prelude::*;
use tract_onnx::tract_hir::infer::Factoid;
use tracing::{debug, warn};

use crate::error::InferenceError;
use crate::format::ONNX_MODEL_FILE;
use crate::tensor::{Tensor, TensorType};
use crate::{InferenceBackend, ModelLoader, Operation, Result};

/// Loads `model.onnx` from a bundle directory.
#[derive(Debug, Default, Clone)]
pub struct TractLoader;

impl TractLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ModelLoader for TractLoader {
    type Backend = TractBackend;

    fn load(&self, export_dir: &Path, tag: &str) -> Result<TractBackend> {
        let path = export_dir.join(ONNX_MODEL_FILE);
        debug!("Loading ONNX model with Tract from: {}", path.display());

        if !tag.is_empty() {
            warn!("ONNX bundles carry no tags, ignoring {:?}", tag);
        }

        let model = tract_onnx::onnx()
            .model_for_path(&path)
            .map_err(|e| InferenceError::ModelLoad(format!("{}: {}", path.display(), e)))?;

        debug!("Model has {} nodes", model.nodes().len());
        Ok(TractBackend { model })
    }
}

/// Backend using Tract; keeps the undecorated graph so every run can be
/// wired to the requested input and output nodes.
pub struct TractBackend {
    model: InferenceModel,
}

impl TractBackend {
    fn plan_for(
        &self,
        input: &Operation<'_>,
        tensor: &Tensor,
        output: &Operation<'_>,
    ) -> Result<SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>> {
        let mut model = self.model.clone();

        model
            .set_input_names([input.name()])
            .map_err(|e| InferenceError::RunFailed(format!("cannot feed {}: {:#}", input.name(), e)))?;
        model
            .set_output_names([output.name()])
            .map_err(|e| InferenceError::RunFailed(format!("cannot fetch {}: {:#}", output.name(), e)))?;
        let declared = model
            .input_fact(0)
            .map_err(|e| InferenceError::RunFailed(format!("cannot feed {}: {:#}", input.name(), e)))?;
        check_declared(declared, tensor)
            .map_err(|e| InferenceError::RunFailed(format!("input {}: {}", input.name(), e)))?;

        model
            .set_input_fact(0, InferenceFact::dt_shape(datum_type(tensor.dtype()), tensor.shape()))
            .map_err(|e| InferenceError::InvalidInput(format!("{:#}", e)))?;

        model
            .into_typed()
            .map_err(|e| InferenceError::RunFailed(format!("Failed to type model: {:#}", e)))?
            .into_optimized()
            .map_err(|e| InferenceError::RunFailed(format!("Failed to optimize: {:#}", e)))?
            .into_runnable()
            .map_err(|e| InferenceError::RunFailed(format!("{:#}", e)))
    }
}

/// The tensor must satisfy what the graph declares for its input: the
/// element type, the rank of a closed shape, and every fixed dimension.
/// Symbolic dimensions such as a batch `N` accept any length.
fn check_declared(declared: &InferenceFact, tensor: &Tensor) -> std::result::Result<(), String> {
    let dtype = datum_type(tensor.dtype());
    if let Some(expected) = declared.datum_type.concretize() {
        if expected != dtype {
            return Err(format!("expected {:?} elements, got {:?}", expected, dtype));
        }
    }

    let shape = tensor.shape();
    let dims: Vec<_> = declared.shape.dims().collect();
    if !declared.shape.is_open() && dims.len() != shape.len() {
        return Err(format!("expected rank {}, got shape {:?}", dims.len(), shape));
    }

    for (axis, (dim, &len)) in dims.iter().zip(shape).enumerate() {
        let fixed = dim.concretize().and_then(|d| d.to_i64().ok());
        if let Some(expected) = fixed {
            if expected != len as i64 {
                return Err(format!(
                    "expected {} along axis {}, got shape {:?}",
                    expected, axis, shape
                ));
            }
        }
    }

    Ok(())
}

fn datum_type(dtype: TensorType) -> DatumType {
    match dtype {
        TensorType::Float32 => f32::datum_type(),
        TensorType::Float64 => f64::datum_type(),
        TensorType::Int32 => i32::datum_type(),
        TensorType::Int64 => i64::datum_type(),
        TensorType::Uint8 => u8::datum_type(),
    }
}

fn to_tvalue<T: Datum + Clone>(arr: &ArrayD<T>) -> Result<TValue> {
    let data: Vec<T> = arr.iter().cloned().collect();
    let tract_tensor = tract_ndarray::ArrayD::from_shape_vec(tract_ndarray::IxDyn(arr.shape()), data)
        .map_err(|e| InferenceError::InvalidInput(e.to_string()))?;
    Ok(tract_tensor.into_tvalue())
}

fn convert_input(tensor: &Tensor) -> Result<TValue> {
    match tensor {
        Tensor::Float32(arr) => to_tvalue(arr),
        Tensor::Float64(arr) => to_tvalue(arr),
        Tensor::Int32(arr) => to_tvalue(arr),
        Tensor::Int64(arr) => to_tvalue(arr),
        Tensor::Uint8(arr) => to_tvalue(arr),
    }
}

fn from_view<T: Datum + Clone>(value: &TValue) -> Option<Result<ArrayD<T>>> {
    let view = value.to_array_view::<T>().ok()?;
    let shape: Vec<usize> = view.shape().to_vec();
    let data: Vec<T> = view.iter().cloned().collect();
    Some(
        ArrayD::from_shape_vec(ndarray::IxDyn(&shape), data)
            .map_err(|e| InferenceError::OutputExtraction(e.to_string())),
    )
}

fn convert_output(value: &TValue, name: &str) -> Result<Tensor> {
    if let Some(arr) = from_view::<f32>(value) {
        arr.map(Tensor::Float32)
    } else if let Some(arr) = from_view::<f64>(value) {
        arr.map(Tensor::Float64)
    } else if let Some(arr) = from_view::<i64>(value) {
        arr.map(Tensor::Int64)
    } else if let Some(arr) = from_view::<i32>(value) {
        arr.map(Tensor::Int32)
    } else if let Some(arr) = from_view::<u8>(value) {
        arr.map(Tensor::Uint8)
    } else {
        Err(InferenceError::OutputExtraction(format!(
            "unsupported output type {:?} for '{}'",
            value.datum_type(),
            name
        )))
    }
}

impl InferenceBackend for TractBackend {
    fn operations(&self) -> Result<Vec<String>> {
        Ok(self.model.nodes().iter().map(|node| node.name.clone()).collect())
    }

    fn find_operation(&self, name: &str) -> Result<Operation<'_>> {
        self.model
            .nodes()
            .iter()
            .find(|node| node.name == name)
            .map(|node| Operation::new(node.name.as_str(), node.id))
            .ok_or_else(|| InferenceError::OperationNotFound(name.to_string()))
    }

    fn run(&self, input: &Operation<'_>, tensor: &Tensor, output: &Operation<'_>) -> Result<Tensor> {
        debug!("Running {} -> {}", input.name(), output.name());
        let plan = self.plan_for(input, tensor, output)?;

        let outputs = plan
            .run(tvec!(convert_input(tensor)?))
            .map_err(|e| InferenceError::RunFailed(format!("{:#}", e)))?;

        let value = outputs.first().ok_or_else(|| {
            InferenceError::OutputExtraction(format!("'{}' produced no output", output.name()))
        })?;

        convert_output(value, output.name())
    }
}
