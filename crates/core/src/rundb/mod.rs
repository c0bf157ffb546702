//! Run database: persistence of run records and artifact metadata.

pub mod file;

pub use file::FileRunDb;

use crate::secrets::SecretContext;
use rk_protocol::{ArtifactSummary, RunSpec};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to connect to run database at {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("Failed to write {what} to {path}: {source}")]
    Write {
        what: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: String,
        source: serde_json::Error,
    },

    #[error("Run database rejected {what}: {reason}")]
    Rejected { what: String, reason: String },
}

/// A run database backend.
///
/// `store_run` is called once per finalized run (every sweep child and the
/// sweep parent). `store_artifact` is called once per logged artifact.
pub trait RunDb: Send + Sync {
    /// Open the connection using the secrets resolved for the current run.
    fn connect(&self, _secrets: &SecretContext) -> Result<(), DbError> {
        Ok(())
    }

    fn store_run(
        &self,
        run: &RunSpec,
        uid: &str,
        project: &str,
        commit: bool,
    ) -> Result<(), DbError>;

    fn store_artifact(
        &self,
        key: &str,
        artifact: &ArtifactSummary,
        tag: &str,
        project: &str,
    ) -> Result<(), DbError>;
}

/// Build the run database configured by `url`; empty means none.
pub fn get_run_db(url: &str) -> Option<Arc<dyn RunDb>> {
    if url.trim().is_empty() {
        return None;
    }
    let root = url.strip_prefix("file://").unwrap_or(url);
    Some(Arc::new(FileRunDb::new(root)))
}
