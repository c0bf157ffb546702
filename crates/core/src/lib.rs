//! # rk-core
//!
//! Run execution, hyperparameter sweeps and artifact management for runkit.
//!
//! This crate provides:
//! - Configuration loading from the `.runkit/` directory
//! - Runtime abstraction (local subprocess, in-process handler, mock)
//! - Single-run execution and hyperparameter sweep orchestration
//! - Artifact logging to data stores with run database lineage
//! - Pipeline UI report rendering
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and management
//! - [`runtimes`]: Runtime trait and implementations
//! - [`engine`]: Run executor and sweep controller
//! - [`sweep`]: Grid expansion, task generation and iteration rollup
//! - [`artifacts`]: Artifact model and manager
//! - [`context`]: Handler-facing run context
//! - [`report`]: Metrics and UI metadata documents
//! - [`store`] / [`rundb`]: Data stores and run database
//! - [`state`]: Run lifecycle and progress events

pub mod artifacts;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod report;
pub mod rundb;
pub mod runtimes;
pub mod secrets;
pub mod state;
pub mod store;
pub mod sweep;

pub use error::{RunError, RunResult};
