//! Hyperparameter sweep orchestration.

use super::executor::RunExecutor;
use crate::error::{RunError, RunResult};
use crate::runtimes::RawResult;
use crate::sweep::{aggregate_iterations, expand, Selector, TaskGenerator};
use chrono::Utc;
use rk_protocol::{HyperParams, RunEvent, RunSpec, RunState, RunStatus};
use tracing::{info, warn};

/// Runs one child task per hyperparameter combination and folds the results
/// into the parent run.
pub struct SweepController {
    executor: RunExecutor,
}

impl SweepController {
    pub fn new(executor: RunExecutor) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &RunExecutor {
        &self.executor
    }

    /// Execute `run`, sweeping over `hyperparams` when it is non-empty.
    ///
    /// Children run sequentially in grid order. A child whose runtime or
    /// result parsing fails is recorded as an error-state row and the sweep
    /// continues; configuration errors abort before any child runs.
    ///
    /// # Returns
    ///
    /// The finalized parent: `status.iterations` holds one row per child,
    /// and `status.state` is `error` when too many children failed.
    pub async fn run(&self, mut run: RunSpec, hyperparams: &HyperParams) -> RunResult<RunSpec> {
        if hyperparams.is_empty() {
            return self.executor.execute(run).await;
        }

        self.executor.prepare(&mut run)?;
        let options = run.spec.hyper_param_options.clone();
        let selector = options
            .selector
            .as_deref()
            .map(Selector::parse)
            .transpose()?;
        let grid = expand(hyperparams, options.strategy)?;
        run.spec.hyperparams = hyperparams.clone();

        let start_time = Utc::now();
        info!(
            uid = run.uid(),
            tasks = grid.len(),
            "Starting hyperparameter sweep"
        );
        self.executor
            .events()
            .emit(RunEvent::SweepStarted {
                uid: run.uid().to_string(),
                tasks: grid.len(),
            })
            .await;

        let mut results = Vec::with_capacity(grid.len());
        for task in TaskGenerator::new(&run, &grid) {
            let iteration = task.metadata.iteration;
            let record = match self.executor.execute(task.clone()).await {
                Ok(result) if result.is_empty() => task,
                Ok(result) => result,
                Err(RunError::Configuration(reason)) => {
                    return Err(RunError::Configuration(reason));
                }
                Err(e) => {
                    warn!(uid = run.uid(), iteration, error = %e, "Sweep iteration failed");
                    self.executor.record_failure(task, &e).await
                }
            };
            self.executor
                .events()
                .emit(RunEvent::IterationFinished {
                    uid: run.uid().to_string(),
                    iteration,
                    state: record.state(),
                })
                .await;
            results.push(record);
        }

        let failed = results
            .iter()
            .filter(|r| r.state() == Some(RunState::Error))
            .count();
        let mut status = RunStatus {
            start_time: Some(start_time),
            iterations: Some(aggregate_iterations(&results)),
            ..Default::default()
        };
        if let Some(best) = selector.as_ref().and_then(|s| s.select(&results)) {
            status.best_iteration = Some(best.metadata.iteration);
            if let Some(best_status) = &best.status {
                status.outputs = best_status.outputs.clone();
            }
        }
        if sweep_failed(failed, results.len(), options.max_errors) {
            status.state = Some(RunState::Error);
            status.error = Some(format!("{} of {} iterations failed", failed, results.len()));
        }
        run.status = Some(status);

        let parent = self.executor.finalize(RawResult::from(run)).await?;
        info!(
            uid = parent.uid(),
            failed,
            state = parent.state().map_or("", RunState::as_str),
            "Hyperparameter sweep finished"
        );
        self.executor
            .events()
            .emit(RunEvent::SweepFinished {
                uid: parent.uid().to_string(),
                state: parent.state(),
                best_iteration: parent.status.as_ref().and_then(|s| s.best_iteration),
            })
            .await;
        Ok(parent)
    }
}

/// With `max_errors` set, more failures than allowed fail the parent;
/// without it, only a sweep where every child failed does.
fn sweep_failed(failed: usize, total: usize, max_errors: Option<usize>) -> bool {
    match max_errors {
        Some(limit) => failed > limit,
        None => total > 0 && failed == total,
    }
}
