//! Best-iteration selection.

use crate::error::{RunError, RunResult};
use rk_protocol::{RunSpec, RunState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorOrder {
    Max,
    Min,
}

/// A `max.<output>` or `min.<output>` criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub order: SelectorOrder,
    pub output: String,
}

impl Selector {
    pub fn parse(text: &str) -> RunResult<Self> {
        let invalid = || {
            RunError::Configuration(format!(
                "invalid selector '{}': expected max.<output> or min.<output>",
                text
            ))
        };
        let (order, output) = text.trim().split_once('.').ok_or_else(invalid)?;
        let order = match order {
            "max" => SelectorOrder::Max,
            "min" => SelectorOrder::Min,
            _ => return Err(invalid()),
        };
        if output.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            order,
            output: output.to_string(),
        })
    }

    /// The child with the best numeric value of the output.
    ///
    /// Failed children and children without a numeric value are skipped;
    /// ties go to the lowest iteration.
    pub fn select<'a>(&self, results: &'a [RunSpec]) -> Option<&'a RunSpec> {
        let mut best: Option<(&RunSpec, f64)> = None;
        for result in results {
            if result.state() == Some(RunState::Error) {
                continue;
            }
            let Some(value) = result
                .status
                .as_ref()
                .and_then(|s| s.outputs.get(&self.output))
                .and_then(|v| v.as_f64())
            else {
                continue;
            };
            let better = match best {
                None => true,
                Some((current, current_value)) => match self.order {
                    SelectorOrder::Max => {
                        value > current_value
                            || (value == current_value
                                && result.metadata.iteration < current.metadata.iteration)
                    }
                    SelectorOrder::Min => {
                        value < current_value
                            || (value == current_value
                                && result.metadata.iteration < current.metadata.iteration)
                    }
                },
            };
            if better {
                best = Some((result, value));
            }
        }
        best.map(|(run, _)| run)
    }
}
