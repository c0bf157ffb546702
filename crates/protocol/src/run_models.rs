//! Run structure models.
//!
//! A run is described by three sections that travel together between the
//! orchestrator, the runtimes and the run database:
//!
//! - `metadata`: identity of the run (uid, project, iteration)
//! - `spec`: what to execute and with which parameters
//! - `status`: the result container, absent until execution completes
//!
//! Parameter and hyperparameter maps are order-preserving: declaration order
//! drives sweep enumeration and iteration table columns.

use crate::artifact_models::ArtifactSummary;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Parameter name to scalar value.
pub type Parameters = IndexMap<String, Value>;

/// Parameter name to ordered list of candidate values.
pub type HyperParams = IndexMap<String, Vec<Value>>;

/// Lifecycle state of a run or sweep child.
///
/// The only transitions performed by the orchestrator are
/// `Running -> Completed` and "keep `Error`": a result that reports
/// `Error` is never downgraded.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// The run has been handed to a runtime and has not been finalized yet.
    Running,

    /// The run was finalized without an error signal.
    Completed,

    /// The runtime (or the orchestrator on its behalf) reported a failure.
    Error,
}

impl RunState {
    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Error => "error",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RunMetadata {
    /// Unique identifier, assigned once on first processing.
    ///
    /// Sweep children share the uid of their parent and are told apart by
    /// `iteration`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    /// Human-readable run name, also used to look up run definitions.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub project: String,

    /// Default tag applied to artifacts logged by this run.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,

    /// 0 for a top-level run, 1..N for sweep children.
    #[serde(default)]
    pub iteration: u32,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub labels: IndexMap<String, String>,
}

/// Which runtime executes the run and how it is invoked.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RuntimeSpec {
    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,
}

/// Explicit target path override for one artifact key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifactDecl {
    pub key: String,

    /// Empty or missing means "no override".
    #[serde(default)]
    pub path: Option<String>,
}

/// A declared secret source, resolved by the secrets provider.
///
/// Supported kinds are `env` (comma separated variable names in `source`)
/// and `inline` (a `name -> value` map in `source`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SecretSource {
    pub kind: String,
    pub source: Value,
}

/// How hyperparameter lists are combined into iterations.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HyperParamStrategy {
    /// Full Cartesian product of all lists.
    #[default]
    Grid,

    /// Position-wise zip of equal-length lists.
    List,
}

/// Options that shape a hyperparameter sweep.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct HyperParamOptions {
    #[serde(default)]
    pub strategy: HyperParamStrategy,

    /// Best-iteration criteria, `max.<output>` or `min.<output>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,

    /// Number of failed children tolerated before the parent run is marked
    /// as failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_errors: Option<usize>,
}

impl HyperParamOptions {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// The declarative part of a run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ExecutionSpec {
    #[serde(default)]
    pub parameters: Parameters,

    #[serde(default)]
    pub runtime: RuntimeSpec,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub hyperparams: HyperParams,

    #[serde(default, skip_serializing_if = "HyperParamOptions::is_default")]
    pub hyper_param_options: HyperParamOptions,

    /// Default directory prefix for artifacts without an explicit target.
    #[serde(default)]
    pub output_path: String,

    #[serde(default)]
    pub output_artifacts: Vec<OutputArtifactDecl>,

    /// Declared input objects (`name -> url`), used as artifact lineage.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub inputs: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secret_sources: Vec<SecretSource>,
}

/// Result container of a run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RunStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<RunState>,

    #[serde(default)]
    pub outputs: IndexMap<String, Value>,

    #[serde(default)]
    pub output_artifacts: Vec<ArtifactSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,

    /// Iteration rollup, only present on sweep parents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<IterationTable>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_iteration: Option<u32>,
}

/// A complete run structure.
///
/// The same type is used for run definitions, sweep children and task
/// results: a task result is a `RunSpec` whose `status` is populated.
///
/// # Example
///
/// ```yaml
/// metadata:
///   name: train
///   project: demo
/// spec:
///   runtime:
///     kind: local
///     command: python3
///     args: ["train.py"]
///   parameters:
///     epochs: 3
///   hyperparams:
///     lr: [0.1, 0.2]
///     bs: [8, 16]
///   output_path: /out
///   output_artifacts:
///     - key: report
///       path: /custom/report.html
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RunSpec {
    #[serde(default)]
    pub metadata: RunMetadata,

    #[serde(default)]
    pub spec: ExecutionSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RunStatus>,
}

impl RunSpec {
    /// Create an empty run definition with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        let mut run = Self::default();
        run.metadata.name = name.into();
        run
    }

    /// Set the runtime kind and command.
    pub fn with_runtime(mut self, kind: &str, command: &str, args: Vec<String>) -> Self {
        self.spec.runtime.kind = kind.to_string();
        self.spec.runtime.command = command.to_string();
        self.spec.runtime.args = args;
        self
    }

    /// Set a single parameter.
    pub fn with_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.spec.parameters.insert(name.to_string(), value.into());
        self
    }

    /// Set the hyperparameter grid.
    pub fn with_hyper_params(mut self, hyperparams: HyperParams) -> Self {
        self.spec.hyperparams = hyperparams;
        self
    }

    /// Declare an input object.
    pub fn with_input(mut self, key: &str, path: &str) -> Self {
        self.spec.inputs.insert(key.to_string(), path.to_string());
        self
    }

    /// True for the `{}` result: nothing was set anywhere.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The run uid, or an empty string when it has not been assigned.
    pub fn uid(&self) -> &str {
        self.metadata.uid.as_deref().unwrap_or("")
    }

    pub fn state(&self) -> Option<RunState> {
        self.status.as_ref().and_then(|s| s.state)
    }

    /// Access the status, creating an empty one if needed.
    pub fn status_mut(&mut self) -> &mut RunStatus {
        self.status.get_or_insert_with(RunStatus::default)
    }
}

/// Tabular iteration rollup.
///
/// Row 0 is the header (`param.*`, `output.*`, `state`, `iter`); every
/// following row is one sweep child. Serialized as a plain array of arrays.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct IterationTable(pub Vec<Vec<Value>>);

impl IterationTable {
    pub fn header(&self) -> &[Value] {
        self.0.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Data rows, header excluded.
    pub fn rows(&self) -> &[Vec<Value>] {
        self.0.get(1..).unwrap_or(&[])
    }

    /// Number of rows, header included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Position of a column in the header.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header().iter().position(|h| h.as_str() == Some(name))
    }

    /// Cell of data row `row` (0-based, header excluded) in column `name`.
    pub fn cell(&self, row: usize, name: &str) -> Option<&Value> {
        let col = self.column(name)?;
        self.rows().get(row)?.get(col)
    }
}
