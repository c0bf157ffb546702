//! Base Runtime trait and supporting types.

use crate::state::EventSink;
use async_trait::async_trait;
use rk_protocol::RunSpec;
use thiserror::Error;

/// What a runtime handed back for one task.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    /// The runtime reported nothing.
    Empty,
    /// An already structured result.
    Structured(Box<RunSpec>),
    /// A serialized (JSON) result.
    Serialized(String),
}

impl RawResult {
    /// Decode into a run structure.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the result is empty (no variant, blank text, or a
    /// structure equal to `{}`).
    pub fn parse(self) -> Result<Option<RunSpec>, serde_json::Error> {
        let run = match self {
            RawResult::Empty => return Ok(None),
            RawResult::Structured(run) => *run,
            RawResult::Serialized(text) => {
                if text.trim().is_empty() {
                    return Ok(None);
                }
                serde_json::from_str::<RunSpec>(&text)?
            }
        };
        Ok(if run.is_empty() { None } else { Some(run) })
    }
}

impl From<RunSpec> for RawResult {
    fn from(run: RunSpec) -> Self {
        RawResult::Structured(Box::new(run))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("handler must be provided for {0} runtime")]
    MissingHandler(String),
    #[error("command must be provided for {0} runtime")]
    MissingCommand(String),
    #[error("Runtime not available: {0}")]
    NotAvailable(String),
    #[error("Failed to spawn command '{command}': {reason}")]
    Spawn { command: String, reason: String },
    #[error("Execution failed: {0}")]
    ExecutionError(String),
}

/// A strategy for executing one task.
///
/// Runtimes are shared by every iteration of a sweep, so `run` takes the
/// task by reference and must not keep per-task state.
#[async_trait]
pub trait Runtime: Send + Sync {
    /// Runtime kind as written in `spec.runtime.kind`.
    fn kind(&self) -> &str;

    /// Reject tasks this runtime cannot execute, before any side effect.
    fn validate(&self, _run: &RunSpec) -> Result<(), RuntimeError> {
        Ok(())
    }

    async fn run(&self, run: &RunSpec, events: &EventSink) -> Result<RawResult, RuntimeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rk_protocol::RunState;

    fn serialized(text: &str) -> RawResult {
        RawResult::Serialized(text.to_string())
    }

    struct EchoRuntime;

    #[async_trait]
    impl Runtime for EchoRuntime {
        fn kind(&self) -> &str {
            "echo"
        }

        async fn run(&self, run: &RunSpec, _events: &EventSink) -> Result<RawResult, RuntimeError> {
            Ok(run.clone().into())
        }
    }

    #[tokio::test]
    async fn test_runtime_returns_structured_result() {
        let runtime = EchoRuntime;
        let run = RunSpec::new("echo").with_param("p", 1);
        assert!(runtime.validate(&run).is_ok());

        let raw = runtime.run(&run, &EventSink::disabled()).await.unwrap();
        let parsed = raw.parse().unwrap().expect("non-empty result");
        assert_eq!(parsed.metadata.name, "echo");
    }

    #[test]
    fn test_parse_empty_variants() {
        assert_eq!(RawResult::Empty.parse().unwrap(), None);
        assert_eq!(serialized("  \n").parse().unwrap(), None);
        assert_eq!(serialized("{}").parse().unwrap(), None);
        assert_eq!(RawResult::from(RunSpec::default()).parse().unwrap(), None);
    }

    #[test]
    fn test_parse_serialized_result() {
        let text = r#"{"metadata":{"name":"t","iteration":2},"status":{"state":"completed","outputs":{"acc":0.9}}}"#;
        let run = serialized(text).parse().unwrap().expect("non-empty result");
        assert_eq!(run.metadata.iteration, 2);
        assert_eq!(run.state(), Some(RunState::Completed));
    }

    #[test]
    fn test_parse_invalid_text() {
        assert!(serialized("not json").parse().is_err());
        assert!(serialized("[1, 2]").parse().is_err());
    }
}
