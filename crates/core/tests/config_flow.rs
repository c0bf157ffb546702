//! Loading a project directory and executing one of its run definitions.

mod common;

use common::*;
use rk_core::config::load_config;
use rk_core::engine::SweepController;
use rk_core::rundb::FileRunDb;
use rk_core::runtimes::MockRuntime;
use rk_protocol::{RunState, METRICS_FILE, UI_METADATA_FILE};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_project_run_end_to_end() {
    let project = create_test_project().expect("Failed to create test project");
    let root = project.path();

    let config = load_config(root).await.expect("Failed to load config");
    let mut run = config.find_run("train").cloned().expect("run 'train'");
    config.apply_defaults(&mut run);
    assert_eq!(run.spec.output_path, "memory://artifacts");

    let runtime = MockRuntime::from_fn(|task| {
        let lr = task.spec.parameters["lr"].as_f64().unwrap_or(0.0);
        let mut result = task.clone();
        result
            .status_mut()
            .outputs
            .insert("accuracy".to_string(), json!(lr * 10.0));
        Ok(result.into())
    });
    let controller = SweepController::new(config.executor(Arc::new(runtime.clone())));
    let hyperparams = run.spec.hyperparams.clone();

    let parent = controller.run(run, &hyperparams).await.expect("sweep");

    assert_eq!(runtime.calls().len(), 2);
    assert_eq!(parent.state(), Some(RunState::Completed));
    let best = parent.status.as_ref().and_then(|s| s.best_iteration);
    assert_eq!(best, Some(1));

    let db = FileRunDb::new(root.join("db"));
    let stored = db.read_run("demo", parent.uid(), 0).expect("parent persisted");
    assert_eq!(stored.state(), Some(RunState::Completed));
    assert!(db.read_run("demo", parent.uid(), 2).is_some());

    assert!(root.join("report").join(METRICS_FILE).is_file());
    assert!(root.join("report").join(UI_METADATA_FILE).is_file());
}

#[tokio::test]
async fn test_missing_project_uses_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = load_config(dir.path()).await.expect("defaults");

    assert!(config.runs.is_empty());
    assert!(config.rundb().is_none());
    assert!(config.report_renderer().is_none());
}
