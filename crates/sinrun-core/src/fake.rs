//! In-memory runtime that behaves like the sine SavedModel and keeps a
//! ledger of every handle it acquires and releases.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use sinrun_runtime::{
    InferenceBackend, InferenceError, ModelLoader, Operation, Result, Tensor,
};

const EXPORT_DIR: &str = "./sin_model_capi";
const INPUT: &str = "serving_default_x";
const OUTPUT: &str = "StatefulPartitionedCall";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Status,
    Options,
    Graph,
    Session,
    Tensor,
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    acquired: HashMap<Handle, usize>,
    released: HashMap<Handle, usize>,
    pub release_order: Vec<Handle>,
}

impl Ledger {
    pub fn acquired(&self, handle: Handle) -> usize {
        self.acquired.get(&handle).copied().unwrap_or(0)
    }

    pub fn released(&self, handle: Handle) -> usize {
        self.released.get(&handle).copied().unwrap_or(0)
    }

    pub fn live(&self, handle: Handle) -> usize {
        self.acquired(handle) - self.released(handle)
    }

    pub fn total_acquired(&self) -> usize {
        self.acquired.values().sum()
    }

    /// Every acquired handle released exactly once.
    pub fn balanced(&self) -> bool {
        self.acquired == self.released
    }
}

type SharedLedger = Rc<RefCell<Ledger>>;

#[derive(Debug)]
struct Tracked {
    handle: Handle,
    ledger: SharedLedger,
}

impl Tracked {
    fn acquire(handle: Handle, ledger: &SharedLedger) -> Self {
        *ledger.borrow_mut().acquired.entry(handle).or_default() += 1;
        Self {
            handle,
            ledger: Rc::clone(ledger),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        let mut ledger = self.ledger.borrow_mut();
        *ledger.released.entry(self.handle).or_default() += 1;
        ledger.release_order.push(self.handle);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Load,
    Lookup,
    Run,
}

#[derive(Clone, Default)]
pub struct FakeLoader {
    ledger: SharedLedger,
    failure: Option<Failure>,
    bias: f32,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failure: Failure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    /// A model whose outputs are off by `bias`.
    pub fn biased(bias: f32) -> Self {
        Self {
            bias,
            ..Self::default()
        }
    }

    pub fn ledger(&self) -> Ledger {
        self.ledger.borrow().clone()
    }
}

impl ModelLoader for FakeLoader {
    type Backend = FakeModel;

    fn load(&self, export_dir: &Path, tag: &str) -> Result<FakeModel> {
        let status = Tracked::acquire(Handle::Status, &self.ledger);
        let options = Tracked::acquire(Handle::Options, &self.ledger);
        let graph = Tracked::acquire(Handle::Graph, &self.ledger);

        if export_dir != Path::new(EXPORT_DIR) {
            return Err(InferenceError::ModelLoad(format!(
                "Could not find SavedModel .pb or .pbtxt at supplied export directory path: {}",
                export_dir.display()
            )));
        }
        if tag != "serve" {
            return Err(InferenceError::ModelLoad(format!(
                "MetaGraphDef associated with tags '{}' could not be found",
                tag
            )));
        }
        if self.failure == Some(Failure::Load) {
            return Err(InferenceError::ModelLoad("truncated variables index".to_string()));
        }

        let session = Tracked::acquire(Handle::Session, &self.ledger);
        drop(options);
        drop(status);

        let mut operations: Vec<String> = [
            INPUT,
            "sequential/dense/MatMul",
            "sequential/dense/BiasAdd",
            OUTPUT,
            "saver_filename",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        if self.failure == Some(Failure::Lookup) {
            operations.retain(|op| op != INPUT);
        }

        Ok(FakeModel {
            _session: session,
            _graph: graph,
            operations,
            failure: self.failure,
            bias: self.bias,
            ledger: Rc::clone(&self.ledger),
        })
    }
}

#[derive(Debug)]
pub struct FakeModel {
    _session: Tracked,
    _graph: Tracked,
    operations: Vec<String>,
    failure: Option<Failure>,
    bias: f32,
    ledger: SharedLedger,
}

impl InferenceBackend for FakeModel {
    fn operations(&self) -> Result<Vec<String>> {
        Ok(self.operations.clone())
    }

    fn find_operation(&self, name: &str) -> Result<Operation<'_>> {
        self.operations
            .iter()
            .position(|op| op == name)
            .map(|index| Operation::new(name, index))
            .ok_or_else(|| InferenceError::OperationNotFound(name.to_string()))
    }

    fn run(&self, input: &Operation<'_>, tensor: &Tensor, output: &Operation<'_>) -> Result<Tensor> {
        let _status = Tracked::acquire(Handle::Status, &self.ledger);

        if self.failure == Some(Failure::Run) {
            return Err(InferenceError::RunFailed(format!(
                "In[0] mismatch In[1] shape: {:?} vs. [1,8]",
                tensor.shape()
            )));
        }
        if input.name() != INPUT || output.name() != OUTPUT {
            return Err(InferenceError::RunFailed(format!(
                "no kernel path from {} to {}",
                input.name(),
                output.name()
            )));
        }

        let values = tensor
            .as_f32()
            .ok_or_else(|| InferenceError::RunFailed("expected a float tensor".to_string()))?;

        let _runtime_output = Tracked::acquire(Handle::Tensor, &self.ledger);
        let data: Vec<f32> = values.iter().map(|x| x.sin() + self.bias).collect();
        Tensor::from_f32(&data, tensor.shape())
    }
}
