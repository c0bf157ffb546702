//! Hyperparameter sweep building blocks.
//!
//! - [`grid`]: expand value lists into parameter combinations
//! - [`tasks`]: turn combinations into child tasks
//! - [`iterations`]: aggregate child results into the iteration table
//! - [`selector`]: pick the best child by an output value

pub mod grid;
pub mod iterations;
pub mod selector;
pub mod tasks;

pub use grid::{expand, expand_grid, expand_list, ExpandedGrid};
pub use iterations::aggregate_iterations;
pub use selector::{Selector, SelectorOrder};
pub use tasks::TaskGenerator;
