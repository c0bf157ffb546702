//! Shared helpers for the integration tests.
//!
//! - Fixtures: sample `.runkit/` projects and run definitions
//! - Assertions over progress event sequences
//! - An in-memory run database that records every call

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
