//! Inference backend implementations.

mod auto;

#[cfg(feature = "tensorflow")]
pub mod tensorflow;

#[cfg(feature = "tract")]
pub mod tract;

use std::marker::PhantomData;
use std::path::Path;

use crate::{Result, Tensor};

pub use auto::{AutoBackend, AutoLoader};

/// Entry point into an inference runtime.
///
/// A loader turns a model bundle directory into a live backend. Everything
/// the runtime allocates while loading (graph, session options, status) is
/// owned by Rust values, so a failed load releases whatever it had acquired
/// before returning the error.
pub trait ModelLoader {
    /// The loaded model type.
    type Backend: InferenceBackend;

    /// Load the bundle at `export_dir`, selecting the meta graph tagged `tag`.
    fn load(&self, export_dir: &Path, tag: &str) -> Result<Self::Backend>;
}

/// A loaded graph bound to an execution session.
///
/// Dropping the backend releases the session and then the graph.
pub trait InferenceBackend {
    /// Names of every operation in the graph, in graph order.
    fn operations(&self) -> Result<Vec<String>>;

    /// Look up an operation by exact name.
    ///
    /// Returns [`InferenceError::OperationNotFound`](crate::InferenceError::OperationNotFound)
    /// when the graph has no such node.
    fn find_operation(&self, name: &str) -> Result<Operation<'_>>;

    /// Run one synchronous inference: feed `tensor` to output 0 of `input`
    /// and fetch output 0 of `output`.
    fn run(&self, input: &Operation<'_>, tensor: &Tensor, output: &Operation<'_>) -> Result<Tensor>;
}

/// A named node inside a loaded graph.
///
/// The borrow ties the reference to the backend that produced it, so it
/// cannot be used after the graph is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation<'m> {
    name: String,
    index: usize,
    _graph: PhantomData<&'m ()>,
}

impl<'m> Operation<'m> {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            _graph: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the node in the backend's graph.
    pub fn index(&self) -> usize {
        self.index
    }
}
