//! Child task generation.

use super::grid::ExpandedGrid;
use rk_protocol::RunSpec;
use std::iter::FusedIterator;

/// Yields one child task per row of an [`ExpandedGrid`].
///
/// Task `i` is a copy of the base run with the row's values merged into
/// `spec.parameters` (overriding same-named base parameters) and
/// `metadata.iteration = i + 1`. The base run is never modified, so cloning
/// the generator (or calling [`restart`](Self::restart)) replays the exact
/// same sequence.
#[derive(Debug, Clone)]
pub struct TaskGenerator<'a> {
    base: &'a RunSpec,
    grid: &'a ExpandedGrid,
    next: usize,
}

impl<'a> TaskGenerator<'a> {
    pub fn new(base: &'a RunSpec, grid: &'a ExpandedGrid) -> Self {
        Self {
            base,
            grid,
            next: 0,
        }
    }

    pub fn restart(&mut self) {
        self.next = 0;
    }

    /// Task for row `index` (zero-based), without advancing.
    pub fn task(&self, index: usize) -> Option<RunSpec> {
        let point = self.grid.point(index)?;
        let mut task = self.base.clone();
        task.spec.parameters.extend(point);
        task.metadata.iteration = u32::try_from(index + 1).unwrap_or(u32::MAX);
        Some(task)
    }
}

impl Iterator for TaskGenerator<'_> {
    type Item = RunSpec;

    fn next(&mut self) -> Option<RunSpec> {
        let task = self.task(self.next)?;
        self.next += 1;
        Some(task)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TaskGenerator<'_> {}

impl FusedIterator for TaskGenerator<'_> {}
