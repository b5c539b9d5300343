//! Owned tensor type passed to and returned from backends.

use ndarray::{ArrayD, IxDyn};

use crate::error::InferenceError;
use crate::Result;

/// Supported tensor element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorType {
    Float32,
    Float64,
    Int32,
    Int64,
    Uint8,
}

impl TensorType {
    /// Size of one element in bytes.
    pub fn size_of(self) -> usize {
        match self {
            TensorType::Float32 | TensorType::Int32 => 4,
            TensorType::Float64 | TensorType::Int64 => 8,
            TensorType::Uint8 => 1,
        }
    }

    /// Numeric type tag as used by the TensorFlow C API (`TF_DataType`).
    pub fn tag(self) -> i32 {
        match self {
            TensorType::Float32 => 1,
            TensorType::Float64 => 2,
            TensorType::Int32 => 3,
            TensorType::Uint8 => 4,
            TensorType::Int64 => 9,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TensorType::Float32 => "float32",
            TensorType::Float64 => "float64",
            TensorType::Int32 => "int32",
            TensorType::Int64 => "int64",
            TensorType::Uint8 => "uint8",
        }
    }
}

/// A typed, shaped buffer.
///
/// The tensor always owns its data. Constructors copy from the caller's
/// slice, so the source buffer can be dropped or reused right away.
#[derive(Debug, Clone, PartialEq)]
pub enum Tensor {
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
    Uint8(ArrayD<u8>),
}

impl Tensor {
    /// Create a Float32 tensor by copying `data` into a buffer of the given shape.
    ///
    /// Fails when `data.len()` differs from the element count implied by `shape`.
    pub fn from_f32(data: &[f32], shape: &[usize]) -> Result<Self> {
        from_slice(data, shape).map(Tensor::Float32)
    }

    /// Create a Float64 tensor by copying `data`.
    pub fn from_f64(data: &[f64], shape: &[usize]) -> Result<Self> {
        from_slice(data, shape).map(Tensor::Float64)
    }

    /// Create an Int32 tensor by copying `data`.
    pub fn from_i32(data: &[i32], shape: &[usize]) -> Result<Self> {
        from_slice(data, shape).map(Tensor::Int32)
    }

    /// Create an Int64 tensor by copying `data`.
    pub fn from_i64(data: &[i64], shape: &[usize]) -> Result<Self> {
        from_slice(data, shape).map(Tensor::Int64)
    }

    /// Create a Uint8 tensor by copying `data`.
    pub fn from_u8(data: &[u8], shape: &[usize]) -> Result<Self> {
        from_slice(data, shape).map(Tensor::Uint8)
    }

    /// Get the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        match self {
            Tensor::Float32(arr) => arr.shape(),
            Tensor::Float64(arr) => arr.shape(),
            Tensor::Int32(arr) => arr.shape(),
            Tensor::Int64(arr) => arr.shape(),
            Tensor::Uint8(arr) => arr.shape(),
        }
    }

    /// Get the data type of the tensor.
    pub fn dtype(&self) -> TensorType {
        match self {
            Tensor::Float32(_) => TensorType::Float32,
            Tensor::Float64(_) => TensorType::Float64,
            Tensor::Int32(_) => TensorType::Int32,
            Tensor::Int64(_) => TensorType::Int64,
            Tensor::Uint8(_) => TensorType::Uint8,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Tensor::Float32(arr) => arr.len(),
            Tensor::Float64(arr) => arr.len(),
            Tensor::Int32(arr) => arr.len(),
            Tensor::Int64(arr) => arr.len(),
            Tensor::Uint8(arr) => arr.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total size of the element data in bytes.
    pub fn byte_size(&self) -> usize {
        self.len() * self.dtype().size_of()
    }

    /// Try to get the inner Float32 array.
    pub fn as_f32(&self) -> Option<&ArrayD<f32>> {
        match self {
            Tensor::Float32(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to get the inner Int64 array.
    pub fn as_i64(&self) -> Option<&ArrayD<i64>> {
        match self {
            Tensor::Int64(arr) => Some(arr),
            _ => None,
        }
    }

    /// Copy the elements out as `f64`, whatever the element type.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            Tensor::Float32(arr) => arr.iter().map(|&v| f64::from(v)).collect(),
            Tensor::Float64(arr) => arr.iter().copied().collect(),
            Tensor::Int32(arr) => arr.iter().map(|&v| f64::from(v)).collect(),
            Tensor::Int64(arr) => arr.iter().map(|&v| v as f64).collect(),
            Tensor::Uint8(arr) => arr.iter().map(|&v| f64::from(v)).collect(),
        }
    }
}

fn from_slice<T: Clone>(data: &[T], shape: &[usize]) -> Result<ArrayD<T>> {
    let expected: usize = shape.iter().product();
    if expected != data.len() {
        return Err(InferenceError::InvalidInput(format!(
            "shape {:?} needs {} elements, got {}",
            shape,
            expected,
            data.len()
        )));
    }

    ArrayD::from_shape_vec(IxDyn(shape), data.to_vec())
        .map_err(|e| InferenceError::InvalidInput(e.to_string()))
}
