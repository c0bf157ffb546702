//! # rk-protocol
//!
//! Data models shared by every runkit crate.
//!
//! This crate defines the structures used for:
//! - Run definitions and task results (YAML files, runtime output, run DB)
//! - Artifact summaries embedded in run status
//! - Pipeline UI report documents
//! - Project configuration from `config.toml`
//! - Run progress events
//!
//! ## Modules
//!
//! - [`run_models`]: Run structure, status and iteration table
//! - [`artifact_models`]: Artifact summaries, viewers and lineage
//! - [`report_models`]: Metrics and UI metadata documents
//! - [`config_models`]: Global configuration from config.toml
//! - [`events`]: Progress events published during execution
//!
//! ## Design Principles
//!
//! - Minimal dependencies: only serde, serde_json, indexmap and chrono
//! - Order-preserving maps wherever declaration order is observable
//! - Independent compilation: no dependencies on other runkit crates

pub mod artifact_models;
pub mod config_models;
pub mod events;
pub mod report_models;
pub mod run_models;

// Re-export all public types for convenience
pub use artifact_models::*;
pub use config_models::*;
pub use events::*;
pub use report_models::*;
pub use run_models::*;
