//! Error types for the sinrun-core library.

use thiserror::Error;

use sinrun_runtime::InferenceError;

/// Process exit code for load, lookup, configuration and I/O failures.
pub const EXIT_FAILURE: i32 = 1;
/// Process exit code when the runtime rejects the inference run.
pub const EXIT_RUN_FAILURE: i32 = 2;
/// Process exit code when outputs fall outside the requested tolerance.
pub const EXIT_TOLERANCE: i32 = 3;

/// Main error type for the harness. Every variant is terminal.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// The bundle could not be opened (missing directory, bad bundle, unknown tag).
    #[error(transparent)]
    Load(InferenceError),

    /// A configured operation name is absent from the graph; `available`
    /// holds every name the graph does have.
    #[error("input or output operation not found: {name}{}", listing(.available))]
    OperationNotFound { name: String, available: Vec<String> },

    /// The literal input could not be turned into a tensor.
    #[error(transparent)]
    InvalidInput(InferenceError),

    /// The runtime failed the run; carries its diagnostic.
    #[error(transparent)]
    Run(InferenceError),

    /// Outputs differ from `sin(x)` by more than the requested tolerance.
    #[error("max deviation {max_error:.6} exceeds tolerance {tolerance}")]
    ToleranceExceeded { max_error: f64, tolerance: f64 },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// Exit code the process should terminate with.
    pub fn exit_code(&self) -> i32 {
        match self {
            HarnessError::Run(_) => EXIT_RUN_FAILURE,
            HarnessError::ToleranceExceeded { .. } => EXIT_TOLERANCE,
            _ => EXIT_FAILURE,
        }
    }
}

fn listing(available: &[String]) -> String {
    if available.is_empty() {
        return String::new();
    }
    let mut out = String::from("\n=== All Operations in the Graph ===\n");
    for name in available {
        out.push_str("Operation found: ");
        out.push_str(name);
        out.push('\n');
    }
    out.push_str("=== End ===");
    out
}

/// Result type for the harness.
pub type Result<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_exit_codes() {
        let load = HarnessError::Load(InferenceError::ModelLoad("missing".into()));
        let lookup = HarnessError::OperationNotFound {
            name: "serving_default_x".into(),
            available: vec![],
        };
        let run = HarnessError::Run(InferenceError::RunFailed("shape mismatch".into()));

        assert_eq!(load.exit_code(), 1);
        assert_eq!(lookup.exit_code(), 1);
        assert_eq!(run.exit_code(), 2);
        assert_eq!(
            HarnessError::ToleranceExceeded { max_error: 0.5, tolerance: 1e-3 }.exit_code(),
            3
        );
    }

    #[test]
    fn test_run_error_carries_runtime_message() {
        let run = HarnessError::Run(InferenceError::RunFailed("Expected shape [?,1]".into()));
        assert_eq!(run.to_string(), "inference failed: Expected shape [?,1]");
    }

    #[test]
    fn test_operation_not_found_lists_available_names() {
        let err = HarnessError::OperationNotFound {
            name: "serving_default_y".into(),
            available: vec!["serving_default_x".into(), "StatefulPartitionedCall".into()],
        };
        assert_eq!(
            err.to_string(),
            "input or output operation not found: serving_default_y\n\
             === All Operations in the Graph ===\n\
             Operation found: serving_default_x\n\
             Operation found: StatefulPartitionedCall\n\
             === End ==="
        );
    }

    #[test]
    fn test_operation_not_found_without_names() {
        let err = HarnessError::OperationNotFound { name: "x".into(), available: vec![] };
        assert_eq!(err.to_string(), "input or output operation not found: x");
    }
}
