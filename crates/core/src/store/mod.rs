//! Artifact storage backends.
//!
//! The artifact manager never touches storage directly: it asks a
//! [`StoreResolver`] for a handle on the target URL and writes through the
//! returned [`DataStore`]. [`StoreManager`] is the default resolver:
//!
//! - plain paths and `file://` URLs go to the local filesystem
//! - `memory://` URLs go to an in-process store (dry runs, tests)
//! - any other scheme is rejected with [`StoreError::UnsupportedScheme`]

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::io;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by store backends.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unsupported store scheme in {url}")]
    UnsupportedScheme { url: String },

    #[error("Object not found: {path}")]
    NotFound { path: String },

    #[error("Permission denied for {path}")]
    PermissionDenied { path: String },

    #[error("I/O error on {path}: {source}")]
    Io { path: String, source: io::Error },

    /// Strict uploads only: neither a body nor a local file was available.
    #[error("Nothing to upload for artifact {key}: no body and no local file")]
    MissingSource { key: String },
}

impl StoreError {
    /// Classify an I/O error on `path`.
    pub fn from_io(path: &str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound {
                path: path.to_string(),
            },
            io::ErrorKind::PermissionDenied => StoreError::PermissionDenied {
                path: path.to_string(),
            },
            _ => StoreError::Io {
                path: path.to_string(),
                source,
            },
        }
    }
}

/// A storage backend addressed by store-relative paths.
pub trait DataStore: Send + Sync {
    /// Write `body` at `path`, replacing any previous object.
    fn put(&self, path: &str, body: &[u8]) -> Result<(), StoreError>;

    /// Copy the local file at `local_path` to `path`.
    fn upload(&self, path: &str, local_path: &Path) -> Result<(), StoreError>;

    /// Read the object at `path`.
    fn get(&self, path: &str) -> Result<Vec<u8>, StoreError>;
}

/// Maps a target URL to a store handle and a store-relative path.
pub trait StoreResolver: Send + Sync {
    fn resolve(&self, url: &str) -> Result<(Arc<dyn DataStore>, String), StoreError>;
}

/// Default resolver over the filesystem and memory stores.
#[derive(Clone, Default)]
pub struct StoreManager {
    file: Arc<FileStore>,
    memory: Arc<MemoryStore>,
}

impl StoreManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The in-process store behind `memory://` URLs.
    pub fn memory(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.memory)
    }
}

impl StoreResolver for StoreManager {
    fn resolve(&self, url: &str) -> Result<(Arc<dyn DataStore>, String), StoreError> {
        if let Some(path) = url.strip_prefix("memory://") {
            return Ok((self.memory.clone(), path.to_string()));
        }
        if let Some(path) = url.strip_prefix("file://") {
            return Ok((self.file.clone(), path.to_string()));
        }
        if url.contains("://") {
            return Err(StoreError::UnsupportedScheme {
                url: url.to_string(),
            });
        }
        Ok((self.file.clone(), url.to_string()))
    }
}
