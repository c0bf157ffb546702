//! JSON-file run database.
//!
//! Layout under the root directory:
//!
//! ```text
//! runs/<project>/<uid>-<iteration>.json
//! artifacts/<project>/<key>[-<tag>].json
//! ```

use super::{DbError, RunDb};
use crate::secrets::SecretContext;
use rk_protocol::{ArtifactSummary, RunSpec};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_PROJECT: &str = "default";

#[derive(Debug, Clone)]
pub struct FileRunDb {
    root: PathBuf,
}

impl FileRunDb {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn run_path(&self, project: &str, uid: &str, iteration: u32) -> PathBuf {
        self.root
            .join("runs")
            .join(project_dir(project))
            .join(format!("{}-{iteration}.json", sanitize(uid)))
    }

    pub fn artifact_path(&self, project: &str, key: &str, tag: &str) -> PathBuf {
        let file = if tag.is_empty() {
            format!("{}.json", sanitize(key))
        } else {
            format!("{}-{}.json", sanitize(key), sanitize(tag))
        };
        self.root
            .join("artifacts")
            .join(project_dir(project))
            .join(file)
    }

    /// Read back a stored run record.
    pub fn read_run(&self, project: &str, uid: &str, iteration: u32) -> Option<RunSpec> {
        let content = fs::read_to_string(self.run_path(project, uid, iteration)).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn write_json<T: Serialize>(&self, what: &str, path: &Path, value: &T) -> Result<(), DbError> {
        let body = serde_json::to_vec_pretty(value).map_err(|source| DbError::Serialize {
            what: what.to_string(),
            source,
        })?;
        let write_err = |source| DbError::Write {
            what: what.to_string(),
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, body).map_err(write_err)?;
        debug!(path = %path.display(), "Stored {}", what);
        Ok(())
    }
}

fn project_dir(project: &str) -> String {
    if project.is_empty() {
        DEFAULT_PROJECT.to_string()
    } else {
        sanitize(project)
    }
}

/// Reduce `name` to a single path component below the database root.
fn sanitize(name: &str) -> String {
    let flat = name.replace(['/', '\\'], "_");
    match flat.as_str() {
        "." | ".." => flat.replace('.', "_"),
        _ => flat,
    }
}

impl RunDb for FileRunDb {
    fn connect(&self, _secrets: &SecretContext) -> Result<(), DbError> {
        fs::create_dir_all(&self.root).map_err(|e| DbError::Connect {
            url: self.root.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn store_run(
        &self,
        run: &RunSpec,
        uid: &str,
        project: &str,
        _commit: bool,
    ) -> Result<(), DbError> {
        // Files are durable once written, so every store is a commit.
        let path = self.run_path(project, uid, run.metadata.iteration);
        self.write_json("run", &path, run)
    }

    fn store_artifact(
        &self,
        key: &str,
        artifact: &ArtifactSummary,
        tag: &str,
        project: &str,
    ) -> Result<(), DbError> {
        let path = self.artifact_path(project, key, tag);
        self.write_json("artifact", &path, artifact)
    }
}
