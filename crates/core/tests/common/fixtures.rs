//! Test fixtures for sample projects and an in-memory run database.

use rk_core::rundb::{DbError, RunDb};
use rk_protocol::{ArtifactSummary, RunSpec};
use serde_json::Value;
use std::sync::Mutex;
use tempfile::TempDir;

/// Build a `name -> values` hyperparameter map.
#[allow(dead_code)]
pub fn hyperparams(entries: &[(&str, Vec<Value>)]) -> rk_protocol::HyperParams {
    entries
        .iter()
        .map(|(name, values)| (name.to_string(), values.clone()))
        .collect()
}

/// Create a temporary project with a `.runkit/` directory.
///
/// The project holds a `config.toml` pointing the run database and the
/// report into the project itself, plus a `train` run definition that
/// sweeps `lr` over two values.
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let root = temp_dir.path();
    let rk_dir = root.join(".runkit");
    std::fs::create_dir_all(rk_dir.join("runs"))?;

    let config_toml = format!(
        r#"output_path = "memory://artifacts"
rundb = "{db}"

[report]
enabled = true
dir = "{report}"
"#,
        db = root.join("db").display(),
        report = root.join("report").display(),
    );
    std::fs::write(rk_dir.join("config.toml"), config_toml)?;

    let train_yaml = r#"metadata:
  name: train
  project: demo
spec:
  parameters:
    epochs: 2
  hyperparams:
    lr: [0.1, 0.01]
  hyper_param_options:
    selector: max.accuracy
"#;
    std::fs::write(rk_dir.join("runs/train.yaml"), train_yaml)?;

    Ok(temp_dir)
}

/// A stored artifact record.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct StoredArtifact {
    pub key: String,
    pub summary: ArtifactSummary,
    pub tag: String,
    pub project: String,
}

/// Run database that keeps every record in memory.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingRunDb {
    pub runs: Mutex<Vec<RunSpec>>,
    pub artifacts: Mutex<Vec<StoredArtifact>>,
}

#[allow(dead_code)]
impl RecordingRunDb {
    pub fn runs(&self) -> Vec<RunSpec> {
        self.runs.lock().unwrap().clone()
    }

    pub fn artifacts(&self) -> Vec<StoredArtifact> {
        self.artifacts.lock().unwrap().clone()
    }
}

impl RunDb for RecordingRunDb {
    fn store_run(
        &self,
        run: &RunSpec,
        _uid: &str,
        _project: &str,
        _commit: bool,
    ) -> Result<(), DbError> {
        self.runs.lock().unwrap().push(run.clone());
        Ok(())
    }

    fn store_artifact(
        &self,
        key: &str,
        artifact: &ArtifactSummary,
        tag: &str,
        project: &str,
    ) -> Result<(), DbError> {
        self.artifacts.lock().unwrap().push(StoredArtifact {
            key: key.to_string(),
            summary: artifact.clone(),
            tag: tag.to_string(),
            project: project.to_string(),
        });
        Ok(())
    }
}
