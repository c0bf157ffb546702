//! Hyperparameter expansion.
//!
//! Grid: the cartesian product of all value lists. Row `i` is decoded as a
//! mixed-radix number whose most significant digit is the first parameter,
//! so the first parameter varies slowest and the last varies fastest:
//!
//! ```text
//! {p1: [1, 2], p2: [a, b]}  ->  p1 = [1, 1, 2, 2]
//!                               p2 = [a, b, a, b]
//! ```
//!
//! List: the i-th values of every list, zipped; all lists must have the
//! same length.

use crate::error::{RunError, RunResult};
use indexmap::IndexMap;
use rk_protocol::{HyperParamStrategy, HyperParams, Parameters};
use serde_json::Value;

/// Column-oriented result of an expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedGrid {
    columns: IndexMap<String, Vec<Value>>,
    len: usize,
}

impl ExpandedGrid {
    /// Number of parameter combinations.
    ///
    /// An empty hyperparameter map still yields one (empty) combination.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// False when there were no hyperparameters at all.
    pub fn is_sweep(&self) -> bool {
        !self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn columns(&self) -> &IndexMap<String, Vec<Value>> {
        &self.columns
    }

    /// The parameter assignment of row `index`.
    pub fn point(&self, index: usize) -> Option<Parameters> {
        if index >= self.len {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|(name, values)| (name.clone(), values[index].clone()))
                .collect(),
        )
    }
}

/// Cartesian product of all value lists.
pub fn expand_grid(hyperparams: &HyperParams) -> ExpandedGrid {
    if hyperparams.is_empty() {
        return ExpandedGrid {
            columns: IndexMap::new(),
            len: 1,
        };
    }

    let len: usize = hyperparams.values().map(Vec::len).product();
    let mut columns = IndexMap::with_capacity(hyperparams.len());
    // Product of the lengths of every parameter after the current one.
    let mut stride = len;
    for (name, values) in hyperparams {
        let mut column = Vec::with_capacity(len);
        if !values.is_empty() {
            stride /= values.len();
            for i in 0..len {
                column.push(values[(i / stride) % values.len()].clone());
            }
        }
        columns.insert(name.clone(), column);
    }
    ExpandedGrid { columns, len }
}

/// Element-wise zip of equally long value lists.
pub fn expand_list(hyperparams: &HyperParams) -> RunResult<ExpandedGrid> {
    let mut lengths = hyperparams.iter().map(|(name, values)| (name, values.len()));
    let Some((_, len)) = lengths.next() else {
        return Ok(ExpandedGrid {
            columns: IndexMap::new(),
            len: 1,
        });
    };
    if let Some((name, other)) = lengths.find(|(_, l)| *l != len) {
        return Err(RunError::Configuration(format!(
            "list strategy needs equally long hyperparameter lists: '{}' has {} values, expected {}",
            name, other, len
        )));
    }
    Ok(ExpandedGrid {
        columns: hyperparams.clone(),
        len,
    })
}

pub fn expand(hyperparams: &HyperParams, strategy: HyperParamStrategy) -> RunResult<ExpandedGrid> {
    match strategy {
        HyperParamStrategy::Grid => Ok(expand_grid(hyperparams)),
        HyperParamStrategy::List => expand_list(hyperparams),
    }
}
