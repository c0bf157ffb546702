//! Run state transitions.
//!
//! This module provides functions for moving a run through its lifecycle
//! (uid assignment, start, completion, failure) and emitting the matching
//! progress events.

use chrono::Utc;
use rk_protocol::{RunEvent, RunSpec, RunState, RunStatus};
use tokio::sync::mpsc::Sender;
use uuid::Uuid;

/// Optional progress channel.
///
/// Sends never fail the run: a closed or missing receiver drops the event.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<Sender<RunEvent>>,
}

impl EventSink {
    pub fn new(tx: Sender<RunEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub async fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event).await;
        }
    }
}

/// Assign a fresh uid unless the run already has one.
///
/// # Returns
///
/// The (possibly pre-existing) uid.
pub fn assign_uid(run: &mut RunSpec) -> &str {
    let missing = run.metadata.uid.as_deref().is_none_or(str::is_empty);
    if missing {
        run.metadata.uid = Some(Uuid::new_v4().simple().to_string());
    }
    run.uid()
}

/// Emit the start event for a task handed to its runtime.
pub async fn start_run(run: &RunSpec, events: &EventSink) {
    events
        .emit(RunEvent::RunStarted {
            uid: run.uid().to_string(),
            name: run.metadata.name.clone(),
            iteration: run.metadata.iteration,
        })
        .await;
}

/// Mark the status completed unless it already carries an error, and
/// stamp `last_update`.
pub fn complete_state(status: &mut RunStatus) {
    if status.state != Some(RunState::Error) {
        status.state = Some(RunState::Completed);
    }
    status.last_update = Some(Utc::now());
}

/// Convert a task into an error-state record.
///
/// # Arguments
///
/// * `task` - The task that failed
/// * `error` - Error message to store in `status.error`
pub fn fail_run(mut task: RunSpec, error: &str) -> RunSpec {
    let status = task.status_mut();
    status.state = Some(RunState::Error);
    status.error = Some(error.to_string());
    status.last_update = Some(Utc::now());
    task
}

/// Emit the finish event for a finalized run.
pub async fn finish_run(run: &RunSpec, events: &EventSink) {
    events
        .emit(RunEvent::RunFinished {
            uid: run.uid().to_string(),
            iteration: run.metadata.iteration,
            state: run.state(),
        })
        .await;
}

/// Copy uid, iteration and parameters from the submitted task when the
/// runtime dropped them from its result.
pub fn carry_identity(task: &RunSpec, result: &mut RunSpec) {
    if result.spec.parameters.is_empty() {
        result.spec.parameters = task.spec.parameters.clone();
    }
    if result.uid().is_empty() {
        result.metadata.uid = task.metadata.uid.clone();
    }
    if result.metadata.iteration == 0 {
        result.metadata.iteration = task.metadata.iteration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_assign_uid_once() {
        let mut run = RunSpec::new("train");
        let uid = assign_uid(&mut run).to_string();
        assert_eq!(uid.len(), 32);
        assert_eq!(assign_uid(&mut run), uid);
    }

    #[test]
    fn test_assign_uid_keeps_existing() {
        let mut run = RunSpec::new("train");
        run.metadata.uid = Some("given".to_string());
        assert_eq!(assign_uid(&mut run), "given");
    }

    #[test]
    fn test_complete_state_keeps_error() {
        let mut status = RunStatus {
            state: Some(RunState::Error),
            ..Default::default()
        };
        complete_state(&mut status);
        assert_eq!(status.state, Some(RunState::Error));
        assert!(status.last_update.is_some());

        let mut status = RunStatus::default();
        complete_state(&mut status);
        assert_eq!(status.state, Some(RunState::Completed));
    }

    #[test]
    fn test_fail_run() {
        let failed = fail_run(RunSpec::new("train"), "boom");
        assert_eq!(failed.state(), Some(RunState::Error));
        assert_eq!(
            failed.status.as_ref().and_then(|s| s.error.as_deref()),
            Some("boom")
        );
    }

    #[test]
    fn test_carry_identity() {
        let mut task = RunSpec::new("train");
        task.metadata.uid = Some("u1".to_string());
        task.metadata.iteration = 3;

        let mut result = RunSpec::default();
        result.status_mut().outputs.insert("a".into(), 1.into());
        carry_identity(&task, &mut result);
        assert_eq!(result.uid(), "u1");
        assert_eq!(result.metadata.iteration, 3);
    }

    #[test]
    fn test_carry_identity_parameters() {
        let task = RunSpec::new("train").with_param("lr", 0.1);

        let mut bare = RunSpec::default();
        carry_identity(&task, &mut bare);
        assert_eq!(bare.spec.parameters, task.spec.parameters);

        let mut own = RunSpec::default().with_param("lr", 0.5);
        carry_identity(&task, &mut own);
        assert_eq!(own.spec.parameters["lr"], serde_json::json!(0.5));
    }

    #[tokio::test]
    async fn test_start_and_finish_events() {
        let (tx, mut rx) = mpsc::channel(10);
        let events = EventSink::new(tx);
        let mut run = RunSpec::new("train");
        run.metadata.uid = Some("u1".to_string());

        start_run(&run, &events).await;
        complete_state(run.status_mut());
        finish_run(&run, &events).await;

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            RunEvent::RunStarted { uid, iteration: 0, .. } if uid == "u1"
        ));
        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            RunEvent::RunFinished {
                state: Some(RunState::Completed),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_disabled_sink_is_silent() {
        EventSink::disabled()
            .emit(RunEvent::LogLine {
                uid: "u".to_string(),
                content: "x".to_string(),
            })
            .await;
    }
}
