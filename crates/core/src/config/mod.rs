//! Configuration loading and management.
//!
//! This module provides functionality to load the project settings and run
//! definitions from the `.runkit/` directory structure.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_run_file};
pub use models::AppConfig;
