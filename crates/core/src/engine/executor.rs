//! Single-task execution and finalization.

use crate::error::{RunError, RunResult};
use crate::report::ReportRenderer;
use crate::rundb::RunDb;
use crate::runtimes::{RawResult, Runtime};
use crate::secrets::{SecretsProvider, SecretsStore};
use crate::state::{
    assign_uid, carry_identity, complete_state, fail_run, finish_run, start_run, EventSink,
};
use rk_protocol::{RunEvent, RunSpec};
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tracing::{debug, info, warn};

/// Executes tasks through one runtime and finalizes their results.
///
/// The executor is shared by every iteration of a sweep: it holds no
/// per-task state.
pub struct RunExecutor {
    runtime: Arc<dyn Runtime>,
    rundb: Option<Arc<dyn RunDb>>,
    secrets: Arc<dyn SecretsProvider>,
    report: Option<ReportRenderer>,
    events: EventSink,
}

impl RunExecutor {
    /// Create an executor without a run database, report or event channel.
    ///
    /// # Arguments
    ///
    /// * `runtime` - The strategy that executes each task
    pub fn new(runtime: Arc<dyn Runtime>) -> Self {
        Self {
            runtime,
            rundb: None,
            secrets: Arc::new(SecretsStore),
            report: None,
            events: EventSink::disabled(),
        }
    }

    pub fn with_rundb(mut self, rundb: Arc<dyn RunDb>) -> Self {
        self.rundb = Some(rundb);
        self
    }

    pub fn with_secrets(mut self, secrets: Arc<dyn SecretsProvider>) -> Self {
        self.secrets = secrets;
        self
    }

    /// Write pipeline report documents on every finalization.
    pub fn with_report(mut self, renderer: ReportRenderer) -> Self {
        self.report = Some(renderer);
        self
    }

    pub fn with_events(mut self, tx: Sender<RunEvent>) -> Self {
        self.events = EventSink::new(tx);
        self
    }

    pub fn runtime_kind(&self) -> &str {
        self.runtime.kind()
    }

    pub(crate) fn events(&self) -> &EventSink {
        &self.events
    }

    /// Validate a run against the runtime and assign its uid.
    ///
    /// # Errors
    ///
    /// `RunError::Configuration` when the run names a different runtime kind
    /// or the runtime lacks its entry point.
    pub fn prepare(&self, run: &mut RunSpec) -> RunResult<()> {
        let kind = self.runtime.kind();
        let requested = run.spec.runtime.kind.trim();
        if requested.is_empty() {
            run.spec.runtime.kind = kind.to_string();
        } else if requested != kind {
            return Err(RunError::Configuration(format!(
                "run '{}' requests runtime '{}' but the executor uses '{}'",
                run.metadata.name, requested, kind
            )));
        }
        self.runtime.validate(run)?;
        assign_uid(run);
        Ok(())
    }

    /// Execute one task and finalize its result.
    ///
    /// # Returns
    ///
    /// The finalized result, or `RunSpec::default()` when the runtime
    /// reported nothing.
    ///
    /// # Errors
    ///
    /// Configuration errors are raised before the runtime is invoked.
    /// Runtime, parse, report and persistence failures are returned as-is.
    pub async fn execute(&self, mut run: RunSpec) -> RunResult<RunSpec> {
        self.prepare(&mut run)?;
        info!(
            uid = run.uid(),
            name = %run.metadata.name,
            iteration = run.metadata.iteration,
            runtime = self.runtime.kind(),
            "Executing run"
        );
        start_run(&run, &self.events).await;

        let raw = self.runtime.run(&run, &self.events).await?;
        let raw = match raw.parse().map_err(|source| RunError::Parse { source })? {
            Some(mut result) => {
                carry_identity(&run, &mut result);
                RawResult::from(result)
            }
            None => RawResult::Empty,
        };
        self.finalize(raw).await
    }

    /// Turn a raw task result into a persisted, final run structure.
    ///
    /// In order: render the report, set the final state (completed unless
    /// already error), stamp `last_update`, persist.
    pub async fn finalize(&self, raw: RawResult) -> RunResult<RunSpec> {
        let Some(mut result) = raw.parse().map_err(|source| RunError::Parse { source })? else {
            debug!("Runtime reported no result");
            return Ok(RunSpec::default());
        };

        if let Some(report) = &self.report {
            report.render_and_write(&result)?;
        }
        complete_state(result.status_mut());
        self.save_run(&result)?;
        finish_run(&result, &self.events).await;
        Ok(result)
    }

    /// Record a task that failed before producing a result.
    ///
    /// Persistence is best effort: a database failure is logged, not
    /// returned.
    pub async fn record_failure(&self, task: RunSpec, error: &RunError) -> RunSpec {
        let failed = fail_run(task, &error.to_string());
        if let Err(e) = self.save_run(&failed) {
            warn!(uid = failed.uid(), error = %e, "Failed to persist failed run");
        }
        finish_run(&failed, &self.events).await;
        failed
    }

    fn save_run(&self, run: &RunSpec) -> RunResult<()> {
        let Some(db) = &self.rundb else {
            return Ok(());
        };
        let secrets = self.secrets.resolve(run);
        db.connect(&secrets)?;
        db.store_run(run, run.uid(), &run.metadata.project, true)?;
        Ok(())
    }
}
