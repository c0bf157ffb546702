//! Mock runtime implementation for testing and dry runs.

use super::base::{RawResult, Runtime, RuntimeError};
use crate::state::EventSink;
use async_trait::async_trait;
use rk_protocol::RunSpec;
use std::sync::{Arc, Mutex};

type Script = Arc<dyn Fn(&RunSpec) -> Result<RawResult, RuntimeError> + Send + Sync>;

/// Produces results from a script instead of running anything, and records
/// every task it was given.
#[derive(Clone)]
pub struct MockRuntime {
    kind: String,
    script: Script,
    calls: Arc<Mutex<Vec<RunSpec>>>,
}

impl MockRuntime {
    pub fn from_fn<F>(script: F) -> Self
    where
        F: Fn(&RunSpec) -> Result<RawResult, RuntimeError> + Send + Sync + 'static,
    {
        Self {
            kind: "mock".to_string(),
            script: Arc::new(script),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Echo each task back with its parameters as outputs.
    pub fn echo() -> Self {
        Self::from_fn(|run| {
            let mut result = run.clone();
            let outputs = run.spec.parameters.clone();
            result.status_mut().outputs = outputs;
            Ok(result.into())
        })
    }

    /// Report nothing for every task.
    pub fn empty() -> Self {
        Self::from_fn(|_| Ok(RawResult::Empty))
    }

    /// Fail every task with an execution error.
    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::from_fn(move |_| Err(RuntimeError::ExecutionError(message.clone())))
    }

    /// Return the same serialized text for every task.
    pub fn serialized(text: &str) -> Self {
        let text = text.to_string();
        Self::from_fn(move |_| Ok(RawResult::Serialized(text.clone())))
    }

    /// Register under a different runtime kind.
    pub fn with_kind(mut self, kind: &str) -> Self {
        self.kind = kind.to_string();
        self
    }

    /// Tasks received so far, in call order.
    pub fn calls(&self) -> Vec<RunSpec> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Runtime for MockRuntime {
    fn kind(&self) -> &str {
        &self.kind
    }

    async fn run(&self, run: &RunSpec, _events: &EventSink) -> Result<RawResult, RuntimeError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(run.clone());
        (self.script)(run)
    }
}
