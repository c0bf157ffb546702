//! Subprocess runtime.
//!
//! The task is serialized as JSON into the `RUNKIT_EXEC_CONFIG` environment
//! variable of the child process. Every non-empty stdout line is forwarded
//! as a [`RunEvent::LogLine`]; the last one is taken as the serialized
//! result. A non-zero exit status turns into an error-state result that
//! carries the captured stderr.

use super::base::{RawResult, Runtime, RuntimeError};
use crate::state::{fail_run, EventSink};
use async_trait::async_trait;
use rk_protocol::{RunEvent, RunSpec};
use std::pin::Pin;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

/// Environment variable carrying the serialized task.
pub const EXEC_CONFIG_ENV: &str = "RUNKIT_EXEC_CONFIG";

/// One item of subprocess output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(String),
    Exit {
        success: bool,
        code: Option<i32>,
        stderr: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct LocalRuntime;

impl LocalRuntime {
    pub fn new() -> Self {
        Self
    }

    /// Spawn `command` and stream its non-empty stdout lines, followed by a
    /// final [`OutputLine::Exit`].
    pub fn stream_output(
        command: String,
        args: Vec<String>,
        working_dir: Option<String>,
        exec_config: String,
    ) -> Pin<Box<dyn Stream<Item = Result<OutputLine, RuntimeError>> + Send>> {
        let stream = async_stream::stream! {
            let mut cmd = Command::new(&command);
            cmd.args(&args);
            if let Some(dir) = &working_dir {
                cmd.current_dir(dir);
            }
            cmd.env(EXEC_CONFIG_ENV, &exec_config);
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());

            let mut child = match cmd.spawn() {
                Ok(child) => child,
                Err(e) => {
                    yield Err(RuntimeError::Spawn {
                        command: command.clone(),
                        reason: e.to_string(),
                    });
                    return;
                }
            };

            let stdout = match child.stdout.take() {
                Some(stdout) => stdout,
                None => {
                    yield Err(RuntimeError::ExecutionError(
                        "Failed to capture stdout".to_string()
                    ));
                    return;
                }
            };
            let stderr_task = child.stderr.take().map(|mut pipe| {
                tokio::spawn(async move {
                    let mut buf = String::new();
                    let _ = pipe.read_to_string(&mut buf).await;
                    buf
                })
            });

            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if line.trim().is_empty() {
                    continue;
                }
                yield Ok(OutputLine::Stdout(line));
            }

            let stderr = match stderr_task {
                Some(task) => task.await.unwrap_or_default(),
                None => String::new(),
            };

            match child.wait().await {
                Ok(status) => yield Ok(OutputLine::Exit {
                    success: status.success(),
                    code: status.code(),
                    stderr,
                }),
                Err(e) => yield Err(RuntimeError::ExecutionError(format!(
                    "Failed to wait for '{}': {}",
                    command, e
                ))),
            }
        };

        Box::pin(stream)
    }
}

#[async_trait]
impl Runtime for LocalRuntime {
    fn kind(&self) -> &str {
        "local"
    }

    fn validate(&self, run: &RunSpec) -> Result<(), RuntimeError> {
        if run.spec.runtime.command.trim().is_empty() {
            return Err(RuntimeError::MissingCommand(self.kind().to_string()));
        }
        Ok(())
    }

    async fn run(&self, run: &RunSpec, events: &EventSink) -> Result<RawResult, RuntimeError> {
        self.validate(run)?;
        let exec_config = serde_json::to_string(run)
            .map_err(|e| RuntimeError::ExecutionError(format!("Failed to serialize task: {e}")))?;

        let runtime = &run.spec.runtime;
        let mut stream = Self::stream_output(
            runtime.command.clone(),
            runtime.args.clone(),
            runtime.workdir.clone(),
            exec_config,
        );

        let mut last_line = None;
        while let Some(item) = stream.next().await {
            match item? {
                OutputLine::Stdout(line) => {
                    debug!(uid = run.uid(), "{}", line);
                    events
                        .emit(RunEvent::LogLine {
                            uid: run.uid().to_string(),
                            content: line.clone(),
                        })
                        .await;
                    last_line = Some(line);
                }
                OutputLine::Exit {
                    success: false,
                    code,
                    stderr,
                } => {
                    let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                    let message = format!("process exited with {}: {}", code, stderr.trim());
                    return Ok(fail_run(run.clone(), &message).into());
                }
                OutputLine::Exit { .. } => {}
            }
        }

        Ok(match last_line {
            Some(line) => RawResult::Serialized(line),
            None => RawResult::Empty,
        })
    }
}
