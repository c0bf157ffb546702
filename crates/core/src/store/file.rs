//! Local filesystem store.

use super::{DataStore, StoreError};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Stores objects as files; store paths are filesystem paths.
#[derive(Debug, Clone, Default)]
pub struct FileStore;

impl FileStore {
    fn ensure_parent(path: &str) -> Result<(), StoreError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StoreError::from_io(path, e))?;
            }
        }
        Ok(())
    }
}

impl DataStore for FileStore {
    fn put(&self, path: &str, body: &[u8]) -> Result<(), StoreError> {
        Self::ensure_parent(path)?;
        fs::write(path, body).map_err(|e| StoreError::from_io(path, e))?;
        debug!(path, bytes = body.len(), "Wrote object");
        Ok(())
    }

    fn upload(&self, path: &str, local_path: &Path) -> Result<(), StoreError> {
        Self::ensure_parent(path)?;
        if Path::new(path) == local_path {
            return Ok(());
        }
        fs::copy(local_path, path).map_err(|e| StoreError::from_io(path, e))?;
        debug!(path, source = %local_path.display(), "Uploaded file");
        Ok(())
    }

    fn get(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        fs::read(path).map_err(|e| StoreError::from_io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_put_creates_parent_directories() {
        let dir = tempdir().expect("Failed to create temp dir");
        let target = dir.path().join("a/b/c.txt");
        let target = target.to_str().expect("utf-8 path");

        FileStore.put(target, b"hello").expect("put");
        assert_eq!(FileStore.get(target).expect("get"), b"hello");
    }

    #[test]
    fn test_upload_copies_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let src = dir.path().join("src.bin");
        fs::write(&src, b"bytes").expect("write src");
        let target = dir.path().join("out/dst.bin");
        let target = target.to_str().expect("utf-8 path");

        FileStore.upload(target, &src).expect("upload");
        assert_eq!(fs::read(target).expect("read"), b"bytes");
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let dir = tempdir().expect("Failed to create temp dir");
        let missing = dir.path().join("missing");
        let result = FileStore.get(missing.to_str().expect("utf-8 path"));
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }
}
