//! Run execution engine.
//!
//! The `RunExecutor` executes one task through a runtime and finalizes its
//! result (report, final state, persistence). The `SweepController` fans a
//! run out over its hyperparameter combinations, executes every child with
//! the same executor and aggregates them into the parent.

pub mod executor;
pub mod sweep;

pub use executor::RunExecutor;
pub use sweep::SweepController;
