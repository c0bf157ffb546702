//! Error taxonomy of the run engine.
//!
//! Every public operation of the executor, the sweep controller and the
//! artifact manager returns [`RunResult`]. Collaborator errors (stores, run
//! database, runtimes) are converted into the matching variant so callers
//! can decide on propagation by variant:
//!
//! - `Configuration`: raised before any side effect
//! - `Parse`: fatal to the task whose result could not be read
//! - `Storage`: fatal to one artifact `log` call
//! - `Persistence`: fatal to the call that triggered the write

use crate::rundb::DbError;
use crate::runtimes::base::RuntimeError;
use crate::store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while executing runs and logging artifacts.
#[derive(Error, Debug)]
pub enum RunError {
    /// Missing runtime entry point, unknown runtime kind or invalid options.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A runtime returned a serialized result that is not a run structure.
    #[error("Failed to parse task result: {source}")]
    Parse { source: serde_json::Error },

    /// An artifact body or file could not be written.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// The run database rejected a write.
    #[error("Persistence error: {0}")]
    Persistence(#[from] DbError),

    /// The runtime failed before producing any result.
    #[error("Execution failed: {0}")]
    Execution(String),

    /// Pipeline report documents could not be written.
    #[error("Failed to write report to {path}: {source}")]
    Report {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<RuntimeError> for RunError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::MissingHandler(_) | RuntimeError::MissingCommand(_) => {
                RunError::Configuration(err.to_string())
            }
            other => RunError::Execution(other.to_string()),
        }
    }
}

/// Type alias for Result with RunError.
pub type RunResult<T> = Result<T, RunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_handler_is_configuration_error() {
        let err: RunError = RuntimeError::MissingHandler("handler".to_string()).into();
        assert!(matches!(err, RunError::Configuration(_)));
        assert!(err.to_string().contains("handler must be provided"));
    }

    #[test]
    fn test_spawn_failure_is_execution_error() {
        let err: RunError = RuntimeError::Spawn {
            command: "nope".to_string(),
            reason: "not found".to_string(),
        }
        .into();
        assert!(matches!(err, RunError::Execution(_)));
    }
}
