//! Run progress events.
//!
//! The executor and the sweep controller publish these on an optional
//! channel so that a front end (the CLI, a dashboard) can follow a run
//! without polling the run database.
//!
//! Uses tagged enum serialization:
//! ```json
//! {
//!   "type": "iterationFinished",
//!   "payload": {
//!     "uid": "0f3c...",
//!     "iteration": 2,
//!     "state": "completed"
//!   }
//! }
//! ```

use crate::run_models::RunState;
use serde::{Deserialize, Serialize};

/// Events sent from the core while runs execute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum RunEvent {
    /// A single task was handed to its runtime.
    RunStarted {
        uid: String,
        name: String,
        iteration: u32,
    },

    /// A runtime produced a line of output.
    LogLine { uid: String, content: String },

    /// A single task was finalized.
    RunFinished {
        uid: String,
        iteration: u32,
        state: Option<RunState>,
    },

    /// A hyperparameter sweep is about to execute `tasks` children.
    SweepStarted { uid: String, tasks: usize },

    /// One sweep child was recorded (successfully or not).
    IterationFinished {
        uid: String,
        iteration: u32,
        state: Option<RunState>,
    },

    /// The sweep parent was aggregated and finalized.
    SweepFinished {
        uid: String,
        state: Option<RunState>,
        best_iteration: Option<u32>,
    },
}
