//! Per-run artifact registry.

use super::model::Artifact;
use super::{compute_hash, ArtifactEnv, UploadPolicy};
use crate::error::RunResult;
use crate::store::StoreError;
use indexmap::IndexMap;
use rk_protocol::{ExecutionRef, OutputArtifactDecl, RunSpec, SourceRef, Viewer};
use std::path::Path;
use tracing::debug;

/// Join a storage prefix and a key with exactly one `/`.
pub fn join_path(base: &str, key: &str) -> String {
    if base.is_empty() {
        return key.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}

/// What is being logged: a bare key (generic artifact) or a built artifact.
#[derive(Debug, Clone)]
pub enum LogItem {
    Key(String),
    Artifact(Box<Artifact>),
}

impl From<&str> for LogItem {
    fn from(key: &str) -> Self {
        LogItem::Key(key.to_string())
    }
}

impl From<String> for LogItem {
    fn from(key: String) -> Self {
        LogItem::Key(key)
    }
}

impl From<Artifact> for LogItem {
    fn from(artifact: Artifact) -> Self {
        LogItem::Artifact(Box::new(artifact))
    }
}

/// Options of a single `log` call. Empty strings mean "not given".
#[derive(Debug, Clone)]
pub struct LogOptions {
    pub body: Option<Vec<u8>>,
    pub target_path: String,
    pub src_path: String,
    pub tag: String,
    pub viewer: Viewer,
    pub upload: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            body: None,
            target_path: String::new(),
            src_path: String::new(),
            tag: String::new(),
            viewer: Viewer::None,
            upload: true,
        }
    }
}

impl LogOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn target_path(mut self, path: impl Into<String>) -> Self {
        self.target_path = path.into();
        self
    }

    pub fn src_path(mut self, path: impl Into<String>) -> Self {
        self.src_path = path.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn viewer(mut self, viewer: Viewer) -> Self {
        self.viewer = viewer;
        self
    }

    pub fn no_upload(mut self) -> Self {
        self.upload = false;
        self
    }
}

/// Registry of the artifacts logged by one run.
///
/// Target path resolution, in priority order:
/// 1. a non-empty path declared for the key in `spec.output_artifacts`
/// 2. the explicit `target_path` option (or the artifact's own)
/// 3. `output_path` joined with the key
pub struct ArtifactManager {
    env: ArtifactEnv,
    execution: ExecutionRef,
    run_tag: String,
    inputs: Vec<SourceRef>,
    output_path: String,
    outputs_spec: IndexMap<String, Option<String>>,
    registry: IndexMap<String, Artifact>,
}

impl ArtifactManager {
    /// A manager not bound to any run.
    pub fn new(env: ArtifactEnv) -> Self {
        Self {
            env,
            execution: ExecutionRef::default(),
            run_tag: String::new(),
            inputs: Vec::new(),
            output_path: String::new(),
            outputs_spec: IndexMap::new(),
            registry: IndexMap::new(),
        }
    }

    /// A manager bound to `run`: lineage, default tag and output settings
    /// come from the run.
    pub fn for_run(run: &RunSpec, env: ArtifactEnv) -> Self {
        let mut manager = Self::new(env);
        manager.execution = ExecutionRef {
            uid: run.uid().to_string(),
            name: run.metadata.name.clone(),
            project: run.metadata.project.clone(),
            iteration: run.metadata.iteration,
        };
        manager.run_tag = run.metadata.tag.clone();
        manager.inputs = run
            .spec
            .inputs
            .iter()
            .map(|(key, path)| SourceRef {
                key: key.clone(),
                path: path.clone(),
            })
            .collect();
        manager.load_spec(run);
        manager
    }

    /// Load the output path and per-key overrides from a run definition.
    pub fn load_spec(&mut self, run: &RunSpec) {
        if !run.spec.output_path.is_empty() {
            self.output_path = run.spec.output_path.clone();
        }
        for decl in &run.spec.output_artifacts {
            self.outputs_spec.insert(decl.key.clone(), decl.path.clone());
        }
    }

    /// Write declarations back into `spec` and summaries into `status`.
    pub fn store_spec(&self, run: &mut RunSpec) {
        run.spec.output_artifacts = self
            .outputs_spec
            .iter()
            .map(|(key, path)| OutputArtifactDecl {
                key: key.clone(),
                path: path.clone(),
            })
            .collect();
        run.spec.output_path = self.output_path.clone();
        run.status_mut().output_artifacts = self
            .registry
            .values()
            .map(Artifact::base_summary)
            .collect();
    }

    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    pub fn set_output_path(&mut self, path: impl Into<String>) {
        self.output_path = path.into();
    }

    /// Declare a target path override for `key`.
    pub fn add_override(&mut self, key: impl Into<String>, path: Option<String>) {
        self.outputs_spec.insert(key.into(), path);
    }

    pub fn get(&self, key: &str) -> Option<&Artifact> {
        self.registry.get(key)
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.registry.values()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    fn resolve_target(&self, key: &str, requested: &str) -> String {
        if let Some(Some(path)) = self.outputs_spec.get(key) {
            if !path.is_empty() {
                return path.clone();
            }
        }
        if !requested.is_empty() {
            return requested.to_string();
        }
        join_path(&self.output_path, key)
    }

    /// Register an artifact, upload its content and record it in the run
    /// database. Logging the same key again replaces the registry entry.
    pub fn log(&mut self, item: impl Into<LogItem>, options: LogOptions) -> RunResult<()> {
        let LogOptions {
            body,
            target_path,
            src_path,
            tag,
            viewer,
            upload,
        } = options;

        let (mut artifact, requested) = match item.into() {
            LogItem::Key(key) => {
                let mut artifact = Artifact::new(key, body.clone());
                artifact.src_path = src_path;
                artifact.viewer = viewer;
                (artifact, target_path)
            }
            LogItem::Artifact(artifact) => {
                let mut artifact = *artifact;
                let requested = if target_path.is_empty() {
                    artifact.target_path.clone()
                } else {
                    target_path
                };
                if !src_path.is_empty() {
                    artifact.src_path = src_path;
                }
                if !viewer.is_none() {
                    artifact.viewer = viewer;
                }
                (artifact, requested)
            }
        };

        let key = artifact.key().to_string();
        let target = self.resolve_target(&key, &requested);
        artifact.target_path = target.clone();
        let resolved_tag = [tag.as_str(), artifact.tag.as_str(), self.run_tag.as_str()]
            .into_iter()
            .find(|t| !t.is_empty())
            .unwrap_or_default()
            .to_string();
        artifact.tag = resolved_tag;

        let payload = body
            .or_else(|| artifact.get_body().map(|b| b.into_owned()))
            .filter(|b| !b.is_empty());
        if self.env.calc_hash {
            if let Some(bytes) = &payload {
                artifact.hash = Some(compute_hash(bytes));
            }
        }
        let local_source = if artifact.src_path.is_empty() {
            key.clone()
        } else {
            artifact.src_path.clone()
        };

        self.registry.insert(key.clone(), artifact);

        if upload {
            self.upload(&key, &target, payload.as_deref(), &local_source)?;
        }

        if let Some(db) = self.env.rundb.clone() {
            if let Some(artifact) = self.registry.get_mut(&key) {
                if artifact.sources.is_empty() {
                    artifact.sources = self.inputs.clone();
                }
                artifact.execution = Some(self.execution.clone());
                db.store_artifact(
                    &key,
                    &artifact.full_summary(),
                    &artifact.tag,
                    &self.execution.project,
                )?;
            }
        }
        Ok(())
    }

    fn upload(
        &self,
        key: &str,
        target: &str,
        payload: Option<&[u8]>,
        local_source: &str,
    ) -> RunResult<()> {
        let (store, path) = self.env.stores.resolve(target)?;
        if let Some(body) = payload {
            store.put(&path, body)?;
            debug!(key, target, "Uploaded artifact body");
            return Ok(());
        }

        let local = Path::new(local_source);
        if local.is_file() {
            store.upload(&path, local)?;
            debug!(key, target, source = local_source, "Uploaded artifact file");
            return Ok(());
        }

        match self.env.upload_policy {
            UploadPolicy::Strict => Err(StoreError::MissingSource {
                key: key.to_string(),
            }
            .into()),
            UploadPolicy::Lenient => {
                debug!(key, "No body or local file; recorded metadata only");
                Ok(())
            }
        }
    }
}
