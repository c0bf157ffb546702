//! Runtime strategies.
//!
//! A runtime executes one task and hands back its [`base::RawResult`]. The
//! executor never knows how: it only sees the [`base::Runtime`] trait.
//!
//! - `local`: a subprocess receiving the task as JSON in its environment
//! - `handler`: an in-process Rust closure
//! - `mock`: scripted results for tests and dry runs

pub mod base;
pub mod handler;
pub mod local;
pub mod mock;
pub mod registry;

pub use base::{RawResult, Runtime, RuntimeError};
pub use handler::{Handler, HandlerRuntime};
pub use local::{LocalRuntime, EXEC_CONFIG_ENV};
pub use mock::MockRuntime;
pub use registry::{RuntimeRegistry, DEFAULT_RUNTIME};
