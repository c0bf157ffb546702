//! In-process handler runtime.

use super::base::{RawResult, Runtime, RuntimeError};
use crate::artifacts::ArtifactEnv;
use crate::context::RunContext;
use crate::error::RunResult;
use crate::state::EventSink;
use async_trait::async_trait;
use rk_protocol::RunSpec;
use std::sync::Arc;

/// Entry point of a handler task.
pub type Handler = Arc<dyn Fn(&mut RunContext) -> RunResult<()> + Send + Sync>;

/// Runs a Rust closure against a [`RunContext`].
///
/// A handler error does not fail the call: it becomes an error-state result
/// that keeps whatever the handler logged before failing.
#[derive(Clone)]
pub struct HandlerRuntime {
    handler: Option<Handler>,
    env: ArtifactEnv,
}

impl HandlerRuntime {
    pub fn new(env: ArtifactEnv) -> Self {
        Self { handler: None, env }
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut RunContext) -> RunResult<()> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }
}

#[async_trait]
impl Runtime for HandlerRuntime {
    fn kind(&self) -> &str {
        "handler"
    }

    fn validate(&self, _run: &RunSpec) -> Result<(), RuntimeError> {
        match self.handler {
            Some(_) => Ok(()),
            None => Err(RuntimeError::MissingHandler(self.kind().to_string())),
        }
    }

    async fn run(&self, run: &RunSpec, _events: &EventSink) -> Result<RawResult, RuntimeError> {
        let handler = self
            .handler
            .as_ref()
            .ok_or_else(|| RuntimeError::MissingHandler(self.kind().to_string()))?;

        let mut ctx = RunContext::new(run.clone(), self.env.clone());
        if let Err(e) = handler(&mut ctx) {
            ctx.set_error(e.to_string());
        }
        Ok(ctx.into_result().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RunError;
    use rk_protocol::RunState;
    use serde_json::json;

    #[test]
    fn test_validate_without_handler() {
        let runtime = HandlerRuntime::new(ArtifactEnv::default());
        assert_eq!(
            runtime.validate(&RunSpec::new("x")),
            Err(RuntimeError::MissingHandler("handler".to_string()))
        );
    }

    #[tokio::test]
    async fn test_handler_outputs() {
        let runtime = HandlerRuntime::new(ArtifactEnv::default()).with_handler(|ctx| {
            let p = ctx.param("p").and_then(|v| v.as_i64()).unwrap_or(0);
            ctx.log_result("double", p * 2);
            Ok(())
        });

        let run = RunSpec::new("double").with_param("p", 21);
        let raw = runtime.run(&run, &EventSink::disabled()).await.unwrap();
        let result = raw.parse().unwrap().expect("result");
        assert_eq!(result.status.expect("status").outputs["double"], json!(42));
    }

    #[tokio::test]
    async fn test_handler_error_becomes_error_state() {
        let runtime = HandlerRuntime::new(ArtifactEnv::default())
            .with_handler(|_| Err(RunError::Execution("bad input".to_string())));

        let raw = runtime
            .run(&RunSpec::new("x"), &EventSink::disabled())
            .await
            .unwrap();
        let result = raw.parse().unwrap().expect("result");
        assert_eq!(result.state(), Some(RunState::Error));
    }
}
