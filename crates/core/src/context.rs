//! Execution context handed to in-process handlers.

use crate::artifacts::{ArtifactEnv, ArtifactManager, LogItem, LogOptions};
use crate::error::RunResult;
use indexmap::IndexMap;
use rk_protocol::{Parameters, RunSpec, RunState};
use serde_json::Value;

/// What a handler sees of its task, and where it reports results.
///
/// ```no_run
/// use rk_core::context::RunContext;
/// use rk_core::artifacts::LogOptions;
///
/// fn train(ctx: &mut RunContext) -> rk_core::error::RunResult<()> {
///     let lr = ctx.param("lr").and_then(|v| v.as_f64()).unwrap_or(0.1);
///     ctx.log_result("accuracy", 1.0 - lr);
///     ctx.log_artifact("model", LogOptions::new().body(b"weights".to_vec()))
/// }
/// ```
pub struct RunContext {
    run: RunSpec,
    artifacts: ArtifactManager,
    outputs: IndexMap<String, Value>,
    error: Option<String>,
}

impl RunContext {
    pub fn new(run: RunSpec, env: ArtifactEnv) -> Self {
        let artifacts = ArtifactManager::for_run(&run, env);
        Self {
            run,
            artifacts,
            outputs: IndexMap::new(),
            error: None,
        }
    }

    pub fn uid(&self) -> &str {
        self.run.uid()
    }

    pub fn iteration(&self) -> u32 {
        self.run.metadata.iteration
    }

    pub fn parameters(&self) -> &Parameters {
        &self.run.spec.parameters
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.run.spec.parameters.get(name)
    }

    /// Path of a declared input object.
    pub fn input(&self, key: &str) -> Option<&str> {
        self.run.spec.inputs.get(key).map(String::as_str)
    }

    pub fn log_result(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.outputs.insert(key.into(), value.into());
    }

    pub fn log_results<K, V>(&mut self, results: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in results {
            self.log_result(key, value);
        }
    }

    pub fn log_artifact(&mut self, item: impl Into<LogItem>, options: LogOptions) -> RunResult<()> {
        self.artifacts.log(item, options)
    }

    pub fn artifacts(&self) -> &ArtifactManager {
        &self.artifacts
    }

    /// Mark the task failed; outputs logged so far are kept.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// The task result: outputs, artifact summaries and error state.
    pub fn into_result(self) -> RunSpec {
        let Self {
            mut run,
            artifacts,
            outputs,
            error,
        } = self;
        artifacts.store_spec(&mut run);
        let status = run.status_mut();
        status.outputs.extend(outputs);
        if let Some(message) = error {
            status.state = Some(RunState::Error);
            status.error = Some(message);
        }
        run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DataStore, StoreManager};
    use serde_json::json;
    use std::sync::Arc;

    fn context(run: RunSpec) -> (RunContext, StoreManager) {
        let stores = StoreManager::new();
        let env = ArtifactEnv::new(Arc::new(stores.clone()));
        (RunContext::new(run, env), stores)
    }

    #[test]
    fn test_results_and_artifacts_flow_into_status() {
        let mut run = RunSpec::new("train").with_param("lr", 0.25);
        run.spec.output_path = "memory://out".to_string();
        let (mut ctx, stores) = context(run);

        assert_eq!(ctx.param("lr"), Some(&json!(0.25)));
        ctx.log_result("accuracy", 0.75);
        ctx.log_results([("loss", json!(0.1)), ("epochs", json!(3))]);
        ctx.log_artifact("model", LogOptions::new().body(b"w".to_vec()))
            .unwrap();

        let result = ctx.into_result();
        let status = result.status.expect("status");
        assert_eq!(status.outputs["accuracy"], json!(0.75));
        assert_eq!(status.outputs.len(), 3);
        assert_eq!(status.output_artifacts.len(), 1);
        assert_eq!(status.state, None);
        assert_eq!(stores.memory().get("out/model").unwrap(), b"w");
    }

    #[test]
    fn test_set_error_marks_result() {
        let (mut ctx, _) = context(RunSpec::new("train"));
        ctx.log_result("partial", 1);
        ctx.set_error("diverged");

        let result = ctx.into_result();
        assert_eq!(result.state(), Some(RunState::Error));
        let status = result.status.expect("status");
        assert_eq!(status.error.as_deref(), Some("diverged"));
        assert_eq!(status.outputs["partial"], json!(1));
    }
}
