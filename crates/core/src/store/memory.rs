//! In-process store used for dry runs and tests.

use super::{DataStore, StoreError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn objects(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stored paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects().contains_key(path)
    }
}

impl DataStore for MemoryStore {
    fn put(&self, path: &str, body: &[u8]) -> Result<(), StoreError> {
        self.objects().insert(path.to_string(), body.to_vec());
        Ok(())
    }

    fn upload(&self, path: &str, local_path: &Path) -> Result<(), StoreError> {
        let body = std::fs::read(local_path)
            .map_err(|e| StoreError::from_io(&local_path.display().to_string(), e))?;
        self.put(path, &body)
    }

    fn get(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        self.objects()
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
            })
    }
}
